//! Layout builder: turns profile definitions into register items and arena sizes.
//!
//! Automatic offsets place a register right after the previous register of
//! the same arena. A later definition with an existing name replaces the
//! earlier one but keeps its index, so profiles can override registers.

use hashbrown::HashMap;

use super::error::{RegError, RegResult};
use super::item::RegisterItem;
use super::types::RegisterType;
use crate::profile::RegisterProfile;

/// Result of laying out a profile.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Items in index order.
    pub items: Vec<RegisterItem>,
    /// Required arena size in bytes, per arena type.
    pub arena_sizes: [usize; RegisterType::COUNT],
}

impl Layout {
    pub fn arena_size(&self, ty: RegisterType) -> usize {
        self.arena_sizes[ty.index()]
    }
}

pub fn build_layout(profile: &RegisterProfile) -> RegResult<Layout> {
    let mut items: Vec<RegisterItem> = Vec::with_capacity(profile.defs.len());
    let mut by_name: HashMap<&str, usize> = HashMap::new();
    let mut next_offset = [0u32; RegisterType::COUNT];

    for def in &profile.defs {
        let arena = def.arena_type;
        let offset = def.offset.unwrap_or(next_offset[arena.index()]);
        let end = offset
            .checked_add(def.size)
            .ok_or_else(|| RegError::LayoutOverflow {
                name: def.name.clone(),
            })?;
        next_offset[arena.index()] = end;

        let index = match by_name.get(def.name.as_str()) {
            Some(&existing) => {
                log::debug!("Register {} redefined, keeping index {existing}", def.name);
                existing
            }
            None => items.len(),
        };

        let item = RegisterItem {
            name: def.name.clone(),
            reg_type: def.reg_type,
            size: def.size,
            offset,
            packed_size: def.packed,
            is_float: def.reg_type == RegisterType::Fpu,
            flags: def.flags.clone(),
            comment: def.comment.clone(),
            index,
            arena,
        };

        if index == items.len() {
            by_name.insert(def.name.as_str(), index);
            items.push(item);
        } else {
            items[index] = item;
        }
    }

    let arena_sizes = arena_sizes(&items);

    log::trace!(
        "Laid out {} registers, gpr arena {} bytes",
        items.len(),
        arena_sizes[RegisterType::Gpr.index()]
    );

    Ok(Layout { items, arena_sizes })
}

/// Bytes each arena needs to hold `items`.
pub(crate) fn arena_sizes(items: &[RegisterItem]) -> [usize; RegisterType::COUNT] {
    let mut sizes = [0usize; RegisterType::COUNT];
    for item in items {
        let bytes = item.end().div_ceil(8) as usize;
        let size = &mut sizes[item.arena.index()];
        *size = (*size).max(bytes);
    }
    sizes
}
