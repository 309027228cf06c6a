// This module is the hub of the register engine. It exports and organizes the pieces that
// turn a parsed register profile into live register state: the closed register type and
// role enumerations, architecture metadata, the error type, the arbitrary width bit
// vector, arenas with their snapshot stacks, the layout builder, the register table that
// owns everything, and the accessor, condition and diff operations implemented on it.
// Items are plain descriptors resolved against their arena on each access, so any number
// of registers can alias the same bytes without shared mutable state.

//! Core register engine.
//!
//! # Key Components
//!
//! ## Layout (`layout`, `item`)
//! - Arena sizes computed from the furthest register end
//! - Automatic offsets and profile overrides
//! - Stable indices in profile order
//!
//! ## Storage (`arena`)
//! - One zero-initialised byte arena per register type
//! - LIFO snapshot stack, swap, zero, fit
//!
//! ## Register Table (`register_file`)
//! - Lookup by name, role, position and index
//! - Atomic profile installation
//!
//! ## Access (`value`, `cond`, `diff`)
//! - Integer, bit vector and raw byte access with endianness
//! - Condition code evaluation and forcing
//! - Incremental diff between two arena images

pub mod arena;
pub mod bitvector;
pub mod cond;
pub mod config;
pub mod diff;
pub mod error;
pub mod item;
pub mod layout;
pub mod register_file;
pub mod types;
pub mod value;

pub use arena::{RegArena, RegisterSet};
pub use bitvector::BitVector;
pub use cond::{Condition, Flag, RegFlags};
pub use config::TableConfig;
pub use error::{RegError, RegResult};
pub use item::{filter_items_covered, RegisterItem};
pub use layout::{build_layout, Layout};
pub use register_file::RegisterTable;
pub use types::{RegisterRole, RegisterType};
