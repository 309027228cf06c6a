// This module implements the per-type register storage. A RegArena is a zero-initialised
// byte buffer holding the bit-packed contents of every register of one arena type. A
// RegisterSet owns the live arena for its type together with a LIFO pool of owned
// snapshots, the indices of the register items stored in the arena, a name lookup and a
// mask of the register types represented. Snapshots are deep copies, so later writes to
// the live arena never reach a pushed snapshot. Every operation replaces or mutates the
// whole buffer in one step; there is no partially applied state.

//! Register arenas and their snapshot stacks.

use hashbrown::HashMap;

use super::error::{RegError, RegResult};

/// Byte buffer backing all registers of one arena type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegArena {
    bytes: Vec<u8>,
}

impl RegArena {
    /// Create a zeroed arena of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Resize in place, keeping the common prefix and zero-filling new bytes.
    pub fn resize(&mut self, size: usize) {
        self.bytes.resize(size, 0);
    }

    pub fn zero(&mut self) {
        self.bytes.fill(0);
    }
}

/// Storage and lookup state for one arena type.
#[derive(Debug, Clone, Default)]
pub struct RegisterSet {
    /// Live register contents.
    pub(crate) arena: RegArena,
    /// Saved snapshots, top of stack last.
    pub(crate) pool: Vec<RegArena>,
    /// Indices into the table's flat item list, in index order.
    pub(crate) regs: Vec<usize>,
    /// Register name to index into the flat item list.
    pub(crate) ht_regs: HashMap<String, usize>,
    /// Which register types live in this set (`1 << type`).
    pub(crate) mask: u32,
    /// Position of the sequential iterator in `regs`.
    pub(crate) cursor: usize,
}

impl RegisterSet {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            arena: RegArena::new(size),
            ..Self::default()
        }
    }

    pub fn arena(&self) -> &RegArena {
        &self.arena
    }

    /// Number of snapshots on the stack.
    pub fn depth(&self) -> usize {
        self.pool.len()
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    pub fn len(&self) -> usize {
        self.regs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regs.is_empty()
    }

    /// Save a deep copy of the live arena. Returns the new depth.
    pub fn push(&mut self) -> usize {
        self.pool.push(self.arena.clone());
        self.pool.len()
    }

    /// Restore the most recent snapshot. An empty stack leaves the arena untouched
    /// and returns `false`.
    pub fn pop(&mut self) -> bool {
        match self.pool.pop() {
            Some(saved) => {
                self.arena = saved;
                true
            }
            None => false,
        }
    }

    /// Replace the live arena with `bytes`, returning the previous contents.
    pub fn swap(&mut self, bytes: Vec<u8>) -> RegResult<Vec<u8>> {
        if bytes.len() != self.arena.size() {
            return Err(RegError::SizeMismatch {
                expected: self.arena.size(),
                actual: bytes.len(),
            });
        }
        let old = std::mem::replace(&mut self.arena, RegArena::from_bytes(bytes));
        Ok(old.into_bytes())
    }

    pub fn zero(&mut self) {
        self.arena.zero();
    }

    /// Resize the live arena and every snapshot to `size` bytes.
    pub fn fit(&mut self, size: usize) {
        self.arena.resize(size);
        for saved in &mut self.pool {
            saved.resize(size);
        }
    }
}
