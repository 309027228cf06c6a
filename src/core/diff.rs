//! Incremental diffing of two arena images.

use super::error::{RegError, RegResult};
use super::item::RegisterItem;
use super::register_file::RegisterTable;
use super::types::RegisterType;
use super::value::bits_differ;

impl RegisterTable {
    /// First register of arena `ty` after `after` (by index) whose bits differ
    /// between `a` and `b`.
    ///
    /// Pass the previous result back as `after` to continue the scan; `None`
    /// starts from the first register. Both buffers must be the same length
    /// and at least as large as the arena.
    pub fn next_diff(
        &self,
        ty: RegisterType,
        a: &[u8],
        b: &[u8],
        after: Option<&RegisterItem>,
    ) -> RegResult<Option<&RegisterItem>> {
        self.scan_diff(ty, a, b, after, None)
    }

    /// Like [`next_diff`](Self::next_diff) but only considers `size`-bit registers.
    pub fn next_diff_sized(
        &self,
        ty: RegisterType,
        a: &[u8],
        b: &[u8],
        after: Option<&RegisterItem>,
        size: u32,
    ) -> RegResult<Option<&RegisterItem>> {
        self.scan_diff(ty, a, b, after, Some(size))
    }

    /// Diff the live arena `ty` against `other`.
    pub fn next_diff_live(
        &self,
        ty: RegisterType,
        other: &[u8],
        after: Option<&RegisterItem>,
    ) -> RegResult<Option<&RegisterItem>> {
        self.next_diff(ty, self.regset(ty).arena().bytes(), other, after)
    }

    fn scan_diff(
        &self,
        ty: RegisterType,
        a: &[u8],
        b: &[u8],
        after: Option<&RegisterItem>,
        size: Option<u32>,
    ) -> RegResult<Option<&RegisterItem>> {
        if a.len() != b.len() {
            return Err(RegError::SizeMismatch {
                expected: a.len(),
                actual: b.len(),
            });
        }
        let arena_size = self.regset(ty).arena().size();
        if a.len() < arena_size {
            return Err(RegError::SizeMismatch {
                expected: arena_size,
                actual: a.len(),
            });
        }

        let found = self
            .items(ty)
            .filter(|item| after.map_or(true, |prev| item.index > prev.index))
            .filter(|item| size.map_or(true, |size| item.size == size))
            .find(|item| bits_differ(a, b, item.offset, item.size));

        if let Some(item) = found {
            log::trace!("Register {} differs", item.name);
        }
        Ok(found)
    }
}
