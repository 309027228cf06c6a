//! Closed enumerations shared by the whole engine.
//!
//! Register types select the arena a register lives in and roles give
//! architecture independent names to registers such as the program counter.
//! Both sets are fixed, so tables keyed by them are plain arrays.

use std::fmt;
use std::str::FromStr;

use super::error::RegError;

/// Register class. Every class owns one arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegisterType {
    /// General purpose.
    Gpr = 0,
    /// Debug registers.
    Drx = 1,
    /// Floating point.
    Fpu = 2,
    Mmx = 3,
    Xmm = 4,
    Ymm = 5,
    /// Flag bits. Stored in the GPR arena unless told otherwise.
    Flg = 6,
    Seg = 7,
    /// System.
    Sys = 8,
    Sec = 9,
    /// Vector.
    Vc = 10,
    /// Vector control.
    Vcc = 11,
    /// Control.
    Ctr = 12,
}

impl RegisterType {
    /// Number of register types, and therefore arenas.
    pub const COUNT: usize = 13;

    /// All types in arena order.
    pub const ALL: [RegisterType; Self::COUNT] = [
        RegisterType::Gpr,
        RegisterType::Drx,
        RegisterType::Fpu,
        RegisterType::Mmx,
        RegisterType::Xmm,
        RegisterType::Ymm,
        RegisterType::Flg,
        RegisterType::Seg,
        RegisterType::Sys,
        RegisterType::Sec,
        RegisterType::Vc,
        RegisterType::Vcc,
        RegisterType::Ctr,
    ];

    /// Index of this type in per-type arrays.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Profile keyword for this type.
    pub const fn name(self) -> &'static str {
        match self {
            RegisterType::Gpr => "gpr",
            RegisterType::Drx => "drx",
            RegisterType::Fpu => "fpu",
            RegisterType::Mmx => "mmx",
            RegisterType::Xmm => "xmm",
            RegisterType::Ymm => "ymm",
            RegisterType::Flg => "flg",
            RegisterType::Seg => "seg",
            RegisterType::Sys => "sys",
            RegisterType::Sec => "sec",
            RegisterType::Vc => "vc",
            RegisterType::Vcc => "vcc",
            RegisterType::Ctr => "ctr",
        }
    }

    /// Look up a type by its profile keyword (case-insensitive).
    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|ty| ty.name().eq_ignore_ascii_case(s))
    }

    /// Arena used when a definition does not name one explicitly.
    pub const fn default_arena(self) -> Self {
        match self {
            RegisterType::Flg => RegisterType::Gpr,
            other => other,
        }
    }

    /// Bit used for this type in a register set's type mask.
    pub const fn mask_bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for RegisterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for RegisterType {
    type Err = RegError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| RegError::not_found(format!("register type '{s}'")))
    }
}

/// Canonical register roles, shared by every architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegisterRole {
    /// Program counter.
    Pc = 0,
    /// Stack pointer.
    Sp,
    /// Status register.
    Sr,
    /// Base pointer.
    Bp,
    /// Link register.
    Lr,
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
    A7,
    A8,
    A9,
    R0,
    R1,
    R2,
    R3,
    Zf,
    Sf,
    Cf,
    Of,
    /// Syscall number (orig_eax, rax, r0, x0).
    Sn,
}

impl RegisterRole {
    pub const COUNT: usize = 24;

    pub const ALL: [RegisterRole; Self::COUNT] = [
        RegisterRole::Pc,
        RegisterRole::Sp,
        RegisterRole::Sr,
        RegisterRole::Bp,
        RegisterRole::Lr,
        RegisterRole::A0,
        RegisterRole::A1,
        RegisterRole::A2,
        RegisterRole::A3,
        RegisterRole::A4,
        RegisterRole::A5,
        RegisterRole::A6,
        RegisterRole::A7,
        RegisterRole::A8,
        RegisterRole::A9,
        RegisterRole::R0,
        RegisterRole::R1,
        RegisterRole::R2,
        RegisterRole::R3,
        RegisterRole::Zf,
        RegisterRole::Sf,
        RegisterRole::Cf,
        RegisterRole::Of,
        RegisterRole::Sn,
    ];

    /// Argument roles in calling order.
    pub const ARGS: [RegisterRole; 10] = [
        RegisterRole::A0,
        RegisterRole::A1,
        RegisterRole::A2,
        RegisterRole::A3,
        RegisterRole::A4,
        RegisterRole::A5,
        RegisterRole::A6,
        RegisterRole::A7,
        RegisterRole::A8,
        RegisterRole::A9,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Token used by `=XX` alias lines.
    pub const fn name(self) -> &'static str {
        match self {
            RegisterRole::Pc => "PC",
            RegisterRole::Sp => "SP",
            RegisterRole::Sr => "SR",
            RegisterRole::Bp => "BP",
            RegisterRole::Lr => "LR",
            RegisterRole::A0 => "A0",
            RegisterRole::A1 => "A1",
            RegisterRole::A2 => "A2",
            RegisterRole::A3 => "A3",
            RegisterRole::A4 => "A4",
            RegisterRole::A5 => "A5",
            RegisterRole::A6 => "A6",
            RegisterRole::A7 => "A7",
            RegisterRole::A8 => "A8",
            RegisterRole::A9 => "A9",
            RegisterRole::R0 => "R0",
            RegisterRole::R1 => "R1",
            RegisterRole::R2 => "R2",
            RegisterRole::R3 => "R3",
            RegisterRole::Zf => "ZF",
            RegisterRole::Sf => "SF",
            RegisterRole::Cf => "CF",
            RegisterRole::Of => "OF",
            RegisterRole::Sn => "SN",
        }
    }

    /// Parse a role token, ignoring case.
    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|role| role.name().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for RegisterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for RegisterRole {
    type Err = RegError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| RegError::not_found(format!("register role '{s}'")))
    }
}
