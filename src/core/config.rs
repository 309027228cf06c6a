//! Architecture metadata for a register table.

/// Settings that change how register contents are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    /// Native word size of the architecture in bits.
    pub bits: u32,
    /// Byte order used for byte-aligned registers.
    pub big_endian: bool,
    /// ARM thumb state.
    pub is_thumb: bool,
}

impl TableConfig {
    pub fn new(bits: u32) -> Self {
        Self {
            bits,
            ..Self::default()
        }
    }

    pub fn big_endian(mut self, big_endian: bool) -> Self {
        self.big_endian = big_endian;
        self
    }

    pub fn thumb(mut self, is_thumb: bool) -> Self {
        self.is_thumb = is_thumb;
        self
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            bits: 64,
            big_endian: false,
            is_thumb: false,
        }
    }
}
