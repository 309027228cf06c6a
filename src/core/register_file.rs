//! Register table: the owner of all register state.
//!
//! This module implements the RegisterTable, the single ownership root of a
//! profile's register state. It holds one [`RegisterSet`] per arena type, the
//! flat item list in index order, the role table and the read-only names.
//! Items carry no back-pointers; everything is resolved through the table.

use std::array;

use hashbrown::HashSet;

use super::arena::RegisterSet;
use super::config::TableConfig;
use super::error::{RegError, RegResult};
use super::item::RegisterItem;
use super::layout::{arena_sizes, build_layout, Layout};
use super::types::{RegisterRole, RegisterType};
use crate::profile::{parse_gdb_to_profile, parse_profile, RegisterProfile};

/// Register state for one architecture profile.
#[derive(Debug, Clone)]
pub struct RegisterTable {
    /// Text of the installed profile.
    profile_text: Option<String>,
    profile: RegisterProfile,
    /// Role to register name.
    names: [Option<String>; RegisterRole::COUNT],
    regsets: [RegisterSet; RegisterType::COUNT],
    /// All items, position equals index.
    items: Vec<RegisterItem>,
    read_only: HashSet<String>,
    config: TableConfig,
}

impl RegisterTable {
    /// Create an empty table with the default configuration.
    pub fn new() -> Self {
        Self::with_config(TableConfig::default())
    }

    pub fn with_config(config: TableConfig) -> Self {
        Self {
            profile_text: None,
            profile: RegisterProfile::new(),
            names: array::from_fn(|_| None),
            regsets: array::from_fn(|_| RegisterSet::default()),
            items: Vec::new(),
            read_only: HashSet::new(),
            config,
        }
    }

    /// Create a table and install `profile` in it.
    pub fn from_profile(profile: &str) -> RegResult<Self> {
        let mut table = Self::new();
        table.set_profile_string(profile)?;
        Ok(table)
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TableConfig) {
        self.config = config;
    }

    pub fn bits(&self) -> u32 {
        self.config.bits
    }

    pub fn is_big_endian(&self) -> bool {
        self.config.big_endian
    }

    pub fn profile(&self) -> &RegisterProfile {
        &self.profile
    }

    pub fn profile_text(&self) -> Option<&str> {
        self.profile_text.as_deref()
    }

    /// Parse and install a profile.
    ///
    /// On error the table is left exactly as it was. Installing the text that
    /// is already installed is a no-op that keeps register contents.
    pub fn set_profile_string(&mut self, text: &str) -> RegResult<()> {
        if self.profile_text.as_deref() == Some(text) {
            return Ok(());
        }
        let profile = parse_profile(text)?;
        let layout = build_layout(&profile)?;
        self.install(text.to_string(), profile, layout);
        Ok(())
    }

    /// Translate a gdb register description and install it.
    ///
    /// Parse errors carry line numbers of the gdb text. The stored profile
    /// text is the printed form of the translated profile.
    pub fn set_gdb_profile_string(&mut self, text: &str) -> RegResult<()> {
        let profile = parse_gdb_to_profile(text)?;
        let profile_text = profile.to_string();
        if self.profile_text.as_deref() == Some(profile_text.as_str()) {
            return Ok(());
        }
        let layout = build_layout(&profile)?;
        self.install(profile_text, profile, layout);
        Ok(())
    }

    fn install(&mut self, text: String, profile: RegisterProfile, layout: Layout) {
        let mut names: [Option<String>; RegisterRole::COUNT] = array::from_fn(|_| None);
        for alias in &profile.aliases {
            names[alias.role.index()] = Some(alias.reg_name.clone());
        }

        self.regsets = array::from_fn(|i| RegisterSet::new(layout.arena_sizes[i]));
        self.items = layout.items;
        self.names = names;
        self.profile = profile;
        self.profile_text = Some(text);
        self.reindex();

        log::debug!(
            "Installed register profile: {} registers, {} aliases",
            self.items.len(),
            self.profile.aliases.len()
        );
    }

    /// Recompute indices, per-set item lists and name maps from the flat list.
    ///
    /// Items keep their relative order, so calling this twice changes nothing.
    pub fn reindex(&mut self) {
        self.items.sort_by_key(|item| item.index);
        for set in &mut self.regsets {
            set.regs.clear();
            set.ht_regs.clear();
            set.mask = 0;
            set.cursor = 0;
        }
        for (index, item) in self.items.iter_mut().enumerate() {
            item.index = index;
            let set = &mut self.regsets[item.arena.index()];
            set.regs.push(index);
            set.ht_regs.insert(item.name.clone(), index);
            set.mask |= item.reg_type.mask_bit();
        }
    }

    // ---------------------------------------------------------------------
    // Roles
    // ---------------------------------------------------------------------

    /// Bind `role` to register `name`, replacing any previous binding.
    pub fn set_name(&mut self, role: RegisterRole, name: &str) {
        self.names[role.index()] = Some(name.to_string());
    }

    /// Register name bound to `role`.
    pub fn get_name(&self, role: RegisterRole) -> Option<&str> {
        self.names[role.index()].as_deref()
    }

    /// Parse a role token such as `PC` or `a0`.
    pub fn role_by_name(name: &str) -> Option<RegisterRole> {
        RegisterRole::from_name(name)
    }

    /// Resolve a role through the name table. Soft-fails when the role is
    /// unbound or bound to a register that does not exist.
    pub fn get_by_role(&self, role: RegisterRole) -> Option<&RegisterItem> {
        let name = self.get_name(role)?;
        self.lookup(name)
    }

    // ---------------------------------------------------------------------
    // Lookups
    // ---------------------------------------------------------------------

    fn lookup(&self, name: &str) -> Option<&RegisterItem> {
        self.regsets
            .iter()
            .find_map(|set| set.ht_regs.get(name))
            .map(|&idx| &self.items[idx])
    }

    /// Find a register by exact name, falling back to role tokens (`PC`, `SP`, ...).
    pub fn get(&self, name: &str) -> Option<&RegisterItem> {
        self.lookup(name)
            .or_else(|| RegisterRole::from_name(name).and_then(|role| self.get_by_role(role)))
    }

    /// Like [`get`](Self::get) but tries role tokens first.
    pub fn get_by_role_or_name(&self, name: &str) -> Option<&RegisterItem> {
        RegisterRole::from_name(name)
            .and_then(|role| self.get_by_role(role))
            .or_else(|| self.lookup(name))
    }

    /// Find a register by name restricted to a register type or arena.
    pub fn get_of_type(&self, name: &str, ty: RegisterType) -> Option<&RegisterItem> {
        self.lookup(name)
            .filter(|item| item.reg_type == ty || item.arena == ty)
    }

    /// Find the `size`-bit register of arena `ty` ending `bit_delta` bits below
    /// the end of the arena.
    pub fn get_at(&self, ty: RegisterType, size: u32, bit_delta: u32) -> Option<&RegisterItem> {
        let set = &self.regsets[ty.index()];
        let arena_bits = u32::try_from(set.arena.size()).ok()?.checked_mul(8)?;
        let end = arena_bits.checked_sub(bit_delta)?;
        self.items(ty)
            .find(|item| item.size == size && item.end() == end)
    }

    /// Item with the given index.
    pub fn index_get(&self, index: usize) -> Option<&RegisterItem> {
        self.items.get(index)
    }

    /// Items stored in arena `ty`, in index order.
    pub fn items(&self, ty: RegisterType) -> impl Iterator<Item = &RegisterItem> + '_ {
        self.regsets[ty.index()]
            .regs
            .iter()
            .map(move |&idx| &self.items[idx])
    }

    /// Items whose register type is `ty`, wherever they are stored.
    pub fn items_of_type(&self, ty: RegisterType) -> impl Iterator<Item = &RegisterItem> + '_ {
        self.items.iter().filter(move |item| item.reg_type == ty)
    }

    pub fn all_items(&self) -> &[RegisterItem] {
        &self.items
    }

    pub fn regset(&self, ty: RegisterType) -> &RegisterSet {
        &self.regsets[ty.index()]
    }

    pub(crate) fn regset_mut(&mut self, ty: RegisterType) -> &mut RegisterSet {
        &mut self.regsets[ty.index()]
    }

    /// Next item of arena `ty` for the sequential iterator.
    pub fn iter_next(&mut self, ty: RegisterType) -> Option<&RegisterItem> {
        let set = &mut self.regsets[ty.index()];
        let idx = *set.regs.get(set.cursor)?;
        set.cursor += 1;
        Some(&self.items[idx])
    }

    pub fn iter_reset(&mut self, ty: RegisterType) {
        self.regsets[ty.index()].cursor = 0;
    }

    // ---------------------------------------------------------------------
    // Read-only registers
    // ---------------------------------------------------------------------

    pub fn is_read_only(&self, item: &RegisterItem) -> bool {
        self.read_only.contains(&item.name)
    }

    pub fn set_read_only(&mut self, name: &str, read_only: bool) {
        if read_only {
            self.read_only.insert(name.to_string());
        } else {
            self.read_only.remove(name);
        }
    }

    pub(crate) fn check_writable(&self, name: &str) -> RegResult<()> {
        if self.read_only.contains(name) {
            log::warn!("Refusing write to read-only register {name}");
            return Err(RegError::ReadOnly {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Width siblings
    // ---------------------------------------------------------------------

    fn sibling(&self, name: &str, from: u32, to: u32) -> Option<&str> {
        let item = self.lookup(name).filter(|item| item.size == from)?;
        self.items(item.arena)
            .find(|other| other.offset == item.offset && other.size == to)
            .map(|other| other.name.as_str())
    }

    /// Name of the 64-bit register sharing storage with the 32-bit register `name`.
    pub fn reg_32_to_64(&self, name: &str) -> Option<&str> {
        self.sibling(name, 32, 64)
    }

    /// Name of the 32-bit register sharing storage with the 64-bit register `name`.
    pub fn reg_64_to_32(&self, name: &str) -> Option<&str> {
        self.sibling(name, 64, 32)
    }

    /// Calling convention string built from the return and argument roles,
    /// e.g. `rax reg(rdi, rsi, rdx)`.
    pub fn profile_to_cc(&self) -> Option<String> {
        let args: Vec<&str> = RegisterRole::ARGS
            .iter()
            .map_while(|&role| self.get_name(role))
            .collect();
        let first = args.first()?;
        let ret = self.get_name(RegisterRole::R0).unwrap_or(*first);
        Some(format!("{ret} reg({})", args.join(", ")))
    }

    // ---------------------------------------------------------------------
    // Arena stack
    // ---------------------------------------------------------------------

    /// Snapshot every arena. Returns the new stack depth.
    pub fn arena_push(&mut self) -> usize {
        let mut depth = 0;
        for set in &mut self.regsets {
            depth = set.push();
        }
        log::trace!("Pushed register arenas, depth {depth}");
        depth
    }

    /// Restore the last snapshot of every arena. Returns `false` and changes
    /// nothing when the stack is empty.
    pub fn arena_pop(&mut self) -> bool {
        if self.regsets[RegisterType::Gpr.index()].depth() == 0 {
            log::trace!("Arena pop on empty stack ignored");
            return false;
        }
        for set in &mut self.regsets {
            set.pop();
        }
        true
    }

    /// Number of snapshots on the stack.
    pub fn arena_depth(&self) -> usize {
        self.regsets[RegisterType::Gpr.index()].depth()
    }

    /// Replace arena `ty` with `bytes`, returning its previous contents.
    pub fn arena_swap(&mut self, ty: RegisterType, bytes: Vec<u8>) -> RegResult<Vec<u8>> {
        log::trace!("Swapping {ty} arena");
        self.regset_mut(ty).swap(bytes)
    }

    pub fn arena_zero(&mut self, ty: RegisterType) {
        self.regset_mut(ty).zero();
    }

    /// Resize every arena and snapshot to what the current layout needs.
    /// Returns the total arena size in bytes.
    pub fn fit_arena(&mut self) -> usize {
        let sizes = arena_sizes(&self.items);
        for (set, &size) in self.regsets.iter_mut().zip(sizes.iter()) {
            set.fit(size);
        }
        sizes.iter().sum()
    }

    /// Copy of the GPR arena.
    pub fn arena_peek(&self) -> Vec<u8> {
        self.regsets[RegisterType::Gpr.index()].arena.bytes().to_vec()
    }

    /// Overwrite the start of the GPR arena with `bytes`.
    pub fn arena_poke(&mut self, bytes: &[u8]) -> RegResult<()> {
        self.set_bytes(RegisterType::Gpr, bytes)
    }

    /// Copy `source` into a buffer sized like the GPR arena, truncating or
    /// zero-filling as needed.
    pub fn arena_dup(&self, source: &[u8]) -> Vec<u8> {
        let mut out = vec![0; self.regsets[RegisterType::Gpr.index()].arena.size()];
        let n = out.len().min(source.len());
        out[..n].copy_from_slice(&source[..n]);
        out
    }
}

impl Default for RegisterTable {
    fn default() -> Self {
        Self::new()
    }
}
