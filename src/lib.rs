//! regstate - register profiles and bit-accurate register state.
//!
//! regstate turns a textual register profile (register names, classes, bit
//! sizes, bit offsets and role aliases) into register state that can be read
//! and written by name, by canonical role or through condition codes.
//! Overlapping sub-registers share storage exactly.
//!
//! # Primary Usage
//!
//! ```
//! use regstate::{RegisterRole, RegisterTable};
//!
//! let mut table = RegisterTable::from_profile(
//!     "=PC eax\n\
//!      gpr eax .32 0 0\n\
//!      gpr ax  .16 0 0\n\
//!      gpr al  .8  0 0\n",
//! )?;
//! table.setv("eax", 0x1234_5678)?;
//! assert_eq!(table.getv("ax")?, 0x5678);
//! assert_eq!(table.getv("al")?, 0x78);
//! assert_eq!(table.get_value_by_role(RegisterRole::Pc)?, 0x1234_5678);
//! # Ok::<(), regstate::RegError>(())
//! ```
//!
//! # Architecture
//!
//! - [`profile`] - Profile data model, text parser and gdb translation
//! - [`core`] - Layout, arenas, register table and the operations on it

pub mod core;
pub mod profile;

pub use crate::core::{
    // Table and descriptors
    RegisterTable, RegisterItem, RegisterSet, RegArena, TableConfig,
    // Enumerations
    RegisterRole, RegisterType, Condition, Flag, RegFlags,
    // Values
    BitVector,
    // Errors
    RegError, RegResult,
};
pub use profile::{
    parse_gdb_profile, parse_gdb_to_profile, parse_profile, RegisterDefinition, RegisterProfile,
    RoleAlias,
};
