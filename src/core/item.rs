//! Runtime register descriptors.

use super::types::RegisterType;

/// A named bit range inside one arena.
///
/// Items never own storage: an item is resolved against its arena every time
/// it is read or written, so any number of items may overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterItem {
    pub name: String,
    pub reg_type: RegisterType,
    /// Size in bits.
    pub size: u32,
    /// Offset in bits from the start of the arena.
    pub offset: u32,
    /// Lane width in bits for packed registers, 0 otherwise.
    pub packed_size: u32,
    pub is_float: bool,
    pub flags: Option<String>,
    pub comment: Option<String>,
    /// Position in profile order.
    pub index: usize,
    /// Arena holding this register.
    pub arena: RegisterType,
}

impl RegisterItem {
    /// First bit past the register. Layout guarantees this does not overflow.
    pub fn end(&self) -> u32 {
        self.offset + self.size
    }

    /// Whether `other` lies entirely inside this register.
    pub fn covers(&self, other: &RegisterItem) -> bool {
        self.arena == other.arena && self.offset <= other.offset && self.end() >= other.end()
    }

    pub fn overlaps(&self, other: &RegisterItem) -> bool {
        self.arena == other.arena && self.offset < other.end() && other.offset < self.end()
    }

    /// Number of lanes for packed registers, 1 otherwise.
    pub fn lane_count(&self) -> u32 {
        if self.packed_size == 0 || self.packed_size >= self.size {
            1
        } else {
            self.size / self.packed_size
        }
    }
}

/// Drop every item that is covered by a larger item of the same arena.
///
/// Items with identical ranges keep the one with the lowest index. Order of
/// the remaining items is preserved.
pub fn filter_items_covered<'a>(items: &[&'a RegisterItem]) -> Vec<&'a RegisterItem> {
    items
        .iter()
        .copied()
        .filter(|item| {
            !items.iter().any(|other| {
                !std::ptr::eq(*other, *item)
                    && other.covers(item)
                    && (other.size > item.size || other.index < item.index)
            })
        })
        .collect()
}
