//! Register profile data structures and text formats.
//!
//! A register profile describes the registers of one architecture: their
//! class, size, position inside the class arena and the canonical roles
//! some of them play. Profiles are plain text:
//!
//! ```text
//! # Comments start with a hash
//! =PC    rip
//! =SP    rsp
//! gpr    rax     .64   0    0
//! gpr    eax     .32   0    0
//! gpr    ah      .8    1    0
//! flg    eflags  .32   ?    0   c1p.a.zstido.n.rv
//! xmm@fpu xmm0   .128  .256 .32  # first sse register
//! ```
//!
//! Sizes and lane widths are bytes unless prefixed with `.` (bits). Offsets
//! are bytes, `B.b` (bytes plus bits), `.N` (bits) or `?` to place the
//! register right after the previous one in the same arena.

use std::fmt;
use std::str::FromStr;

use crate::core::types::{RegisterRole, RegisterType};

pub mod gdb;
pub mod parser;

pub use gdb::{parse_gdb_profile, parse_gdb_to_profile};
pub use parser::parse_profile;

/// `=ROLE name` directive binding a canonical role to a register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAlias {
    pub role: RegisterRole,
    /// The role token as written (e.g. `PC`).
    pub alias: String,
    /// Register the role resolves to.
    pub reg_name: String,
}

/// One register line of a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDefinition {
    pub reg_type: RegisterType,
    /// Arena holding the storage (flags live in the GPR arena, xmm may live in fpu).
    pub arena_type: RegisterType,
    pub name: String,
    /// Size in bits.
    pub size: u32,
    /// Lane width in bits for packed (vector) registers, 0 when not packed.
    pub packed: u32,
    /// Offset in bits inside the arena, `None` to place automatically.
    pub offset: Option<u32>,
    pub comment: Option<String>,
    /// One character per bit, starting at bit 0 (e.g. `c1p.a.zstido.n.rv`).
    pub flags: Option<String>,
}

impl RegisterDefinition {
    /// Number of lanes of a packed register, 1 otherwise.
    pub fn lane_count(&self) -> u32 {
        if self.packed == 0 || self.packed >= self.size {
            1
        } else {
            self.size / self.packed
        }
    }
}

/// Parsed profile: role aliases and register definitions in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegisterProfile {
    pub aliases: Vec<RoleAlias>,
    pub defs: Vec<RegisterDefinition>,
}

impl RegisterProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> crate::core::RegResult<Self> {
        parse_profile(text)
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty() && self.defs.is_empty()
    }

    /// Last alias given for `role`, if any.
    pub fn alias_for(&self, role: RegisterRole) -> Option<&RoleAlias> {
        self.aliases.iter().rev().find(|alias| alias.role == role)
    }
}

impl FromStr for RegisterProfile {
    type Err = crate::core::RegError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_profile(s)
    }
}

impl fmt::Display for RegisterProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for alias in &self.aliases {
            writeln!(f, "={}\t{}", alias.role, alias.reg_name)?;
        }
        for def in &self.defs {
            if def.arena_type == def.reg_type.default_arena() {
                write!(f, "{}", def.reg_type)?;
            } else {
                write!(f, "{}@{}", def.reg_type, def.arena_type)?;
            }
            write!(f, "\t{}\t.{}", def.name, def.size)?;
            match def.offset {
                Some(offset) => write!(f, "\t.{offset}")?,
                None => write!(f, "\t?")?,
            }
            if def.packed == 0 {
                write!(f, "\t0")?;
            } else {
                write!(f, "\t.{}", def.packed)?;
            }
            if let Some(flags) = &def.flags {
                write!(f, "\t{flags}")?;
            }
            if let Some(comment) = &def.comment {
                write!(f, "\t#{comment}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
