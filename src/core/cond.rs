// This module implements architecture independent condition codes. Six canonical flag
// bits (sign, zero, half-carry, carry, overflow, parity) are located either inside the
// status register bound to the SR role, using the per-bit letters of its flags
// descriptor, or in dedicated one-bit flag registers bound to the ZF/SF/CF/OF roles or
// named af/pf. Conditions are boolean formulas over those bits. Forcing a condition
// searches the assignments of the bits the formula reads and applies the cheapest one:
// fewest changed bits, then keeping S and O, then C, changing Z first.

//! Condition codes over flag bits.

use std::fmt;
use std::str::FromStr;

use super::error::{RegError, RegResult};
use super::register_file::RegisterTable;
use super::types::RegisterRole;

/// Condition codes, named after the comparison they test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Equal: Z.
    Eq,
    /// Not equal: !Z.
    Ne,
    /// Carry: C.
    Cf,
    /// Negative: S.
    Neg,
    /// Overflow: O.
    Of,
    /// Unsigned greater: !C && !Z.
    Hi,
    /// Unsigned greater or equal: !C.
    He,
    /// Unsigned lower: C.
    Lo,
    /// Unsigned lower or equal: C || Z.
    Loe,
    /// Signed greater or equal: S == O.
    Ge,
    /// Signed greater: S == O && !Z.
    Gt,
    /// Signed lower: S != O.
    Lt,
    /// Signed lower or equal: S != O || Z.
    Le,
}

impl Condition {
    pub const COUNT: usize = 13;

    pub const ALL: [Condition; Self::COUNT] = [
        Condition::Eq,
        Condition::Ne,
        Condition::Cf,
        Condition::Neg,
        Condition::Of,
        Condition::Hi,
        Condition::He,
        Condition::Lo,
        Condition::Loe,
        Condition::Ge,
        Condition::Gt,
        Condition::Lt,
        Condition::Le,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Condition::Eq => "eq",
            Condition::Ne => "ne",
            Condition::Cf => "cf",
            Condition::Neg => "neg",
            Condition::Of => "of",
            Condition::Hi => "hi",
            Condition::He => "he",
            Condition::Lo => "lo",
            Condition::Loe => "loe",
            Condition::Ge => "ge",
            Condition::Gt => "gt",
            Condition::Lt => "lt",
            Condition::Le => "le",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        let s = s.to_ascii_lowercase();
        match s.as_str() {
            "carry" => Some(Condition::Cf),
            "negative" => Some(Condition::Neg),
            "overflow" => Some(Condition::Of),
            _ => Self::ALL.iter().copied().find(|c| c.name() == s),
        }
    }

    /// Evaluate the formula over a set of flags.
    pub fn eval(self, f: &RegFlags) -> bool {
        match self {
            Condition::Eq => f.z,
            Condition::Ne => !f.z,
            Condition::Cf => f.c,
            Condition::Neg => f.s,
            Condition::Of => f.o,
            Condition::Hi => !f.c && !f.z,
            Condition::He => !f.c,
            Condition::Lo => f.c,
            Condition::Loe => f.c || f.z,
            Condition::Ge => f.s == f.o,
            Condition::Gt => f.s == f.o && !f.z,
            Condition::Lt => f.s != f.o,
            Condition::Le => f.s != f.o || f.z,
        }
    }

    /// Flags read by the formula.
    pub fn inputs(self) -> &'static [Flag] {
        match self {
            Condition::Eq | Condition::Ne => &[Flag::Z],
            Condition::Cf | Condition::He | Condition::Lo => &[Flag::C],
            Condition::Neg => &[Flag::S],
            Condition::Of => &[Flag::O],
            Condition::Hi | Condition::Loe => &[Flag::C, Flag::Z],
            Condition::Ge | Condition::Lt => &[Flag::S, Flag::O],
            Condition::Gt | Condition::Le => &[Flag::S, Flag::O, Flag::Z],
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Condition {
    type Err = RegError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| RegError::not_found(format!("condition '{s}'")))
    }
}

/// One of the canonical flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    S,
    Z,
    A,
    C,
    O,
    P,
}

impl Flag {
    pub const ALL: [Flag; 6] = [Flag::S, Flag::Z, Flag::A, Flag::C, Flag::O, Flag::P];

    /// Letter used for this bit in a flags descriptor.
    pub const fn letter(self) -> char {
        match self {
            Flag::S => 's',
            Flag::Z => 'z',
            Flag::A => 'a',
            Flag::C => 'c',
            Flag::O => 'o',
            Flag::P => 'p',
        }
    }

    pub const fn role(self) -> Option<RegisterRole> {
        match self {
            Flag::S => Some(RegisterRole::Sf),
            Flag::Z => Some(RegisterRole::Zf),
            Flag::C => Some(RegisterRole::Cf),
            Flag::O => Some(RegisterRole::Of),
            Flag::A | Flag::P => None,
        }
    }

    /// Conventional name of a dedicated one-bit register.
    pub const fn reg_name(self) -> &'static str {
        match self {
            Flag::S => "sf",
            Flag::Z => "zf",
            Flag::A => "af",
            Flag::C => "cf",
            Flag::O => "of",
            Flag::P => "pf",
        }
    }
}

/// All six canonical flags at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegFlags {
    /// Sign, negative number (msb).
    pub s: bool,
    /// Zero.
    pub z: bool,
    /// Half-carry adjust (carry at nibble level).
    pub a: bool,
    /// Carry.
    pub c: bool,
    /// Overflow.
    pub o: bool,
    /// Parity (lsb).
    pub p: bool,
}

impl RegFlags {
    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::S => self.s,
            Flag::Z => self.z,
            Flag::A => self.a,
            Flag::C => self.c,
            Flag::O => self.o,
            Flag::P => self.p,
        }
    }

    pub fn set(&mut self, flag: Flag, value: bool) {
        match flag {
            Flag::S => self.s = value,
            Flag::Z => self.z = value,
            Flag::A => self.a = value,
            Flag::C => self.c = value,
            Flag::O => self.o = value,
            Flag::P => self.p = value,
        }
    }
}

/// Where a flag bit lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagLocation {
    /// Bit `bit` of the status register with item index `index`.
    Status { index: usize, bit: u32 },
    /// A dedicated register; non-zero means set.
    Register { index: usize },
}

impl FlagLocation {
    fn index(self) -> usize {
        match self {
            FlagLocation::Status { index, .. } | FlagLocation::Register { index } => index,
        }
    }
}

/// Ordering key for candidate flag assignments; smaller is preferred.
fn change_cost(from: &RegFlags, to: &RegFlags) -> (u32, u32, bool, bool, bool) {
    let s = from.s != to.s;
    let o = from.o != to.o;
    let c = from.c != to.c;
    let z = from.z != to.z;
    let changed = Flag::ALL.iter().filter(|&&f| from.get(f) != to.get(f)).count() as u32;
    (changed, s as u32 + o as u32, c, z, s)
}

impl RegisterTable {
    fn locate_flag(&self, flag: Flag) -> Option<FlagLocation> {
        if let Some(sr) = self.get_by_role(RegisterRole::Sr).filter(|sr| sr.size <= 64) {
            let bit = sr
                .flags
                .as_deref()
                .and_then(|desc| desc.chars().position(|ch| ch == flag.letter()))
                .map(|pos| pos as u32)
                .filter(|&pos| pos < sr.size);
            if let Some(bit) = bit {
                return Some(FlagLocation::Status {
                    index: sr.index,
                    bit,
                });
            }
        }

        flag.role()
            .and_then(|role| self.get_by_role(role))
            .or_else(|| self.get(flag.reg_name()))
            .filter(|item| item.size <= 64)
            .map(|item| FlagLocation::Register { index: item.index })
    }

    fn read_flag(&self, loc: FlagLocation) -> RegResult<bool> {
        let item = &self.all_items()[loc.index()];
        let value = self.get_value(item)?;
        Ok(match loc {
            FlagLocation::Status { bit, .. } => value & (1 << bit) != 0,
            FlagLocation::Register { .. } => value != 0,
        })
    }

    /// Write several flag bits, refusing all of them if any target is read-only.
    fn write_flags(&mut self, writes: &[(FlagLocation, bool)]) -> RegResult<()> {
        for (loc, _) in writes {
            let name = &self.all_items()[loc.index()].name;
            self.check_writable(name)?;
        }

        for &(loc, value) in writes {
            let item = self.all_items()[loc.index()].clone();
            let new = match loc {
                FlagLocation::Status { bit, .. } => {
                    let old = self.get_value(&item)?;
                    if value {
                        old | (1 << bit)
                    } else {
                        old & !(1 << bit)
                    }
                }
                FlagLocation::Register { .. } => value as u64,
            };
            self.set_value(&item, new)?;
        }
        Ok(())
    }

    fn require_inputs(&self, cond: Condition) -> RegResult<Vec<(Flag, FlagLocation)>> {
        cond.inputs()
            .iter()
            .map(|&flag| {
                self.locate_flag(flag)
                    .map(|loc| (flag, loc))
                    .ok_or_else(|| RegError::ConditionUnresolved {
                        condition: cond.name().to_string(),
                    })
            })
            .collect()
    }

    /// Evaluate a condition against the current flag bits.
    pub fn evaluate(&self, cond: Condition) -> RegResult<bool> {
        let mut flags = RegFlags::default();
        for (flag, loc) in self.require_inputs(cond)? {
            flags.set(flag, self.read_flag(loc)?);
        }
        Ok(cond.eval(&flags))
    }

    /// Change the fewest flag bits needed for `cond` to evaluate to `desired`.
    pub fn force(&mut self, cond: Condition, desired: bool) -> RegResult<()> {
        let inputs = self.require_inputs(cond)?;
        let mut current = RegFlags::default();
        for &(flag, loc) in &inputs {
            current.set(flag, self.read_flag(loc)?);
        }
        if cond.eval(&current) == desired {
            return Ok(());
        }

        let best = (0u32..1 << inputs.len())
            .filter_map(|mask| {
                let mut candidate = current;
                for (i, &(flag, _)) in inputs.iter().enumerate() {
                    if mask & (1 << i) != 0 {
                        candidate.set(flag, !candidate.get(flag));
                    }
                }
                (cond.eval(&candidate) == desired).then_some(candidate)
            })
            .min_by_key(|candidate| change_cost(&current, candidate))
            .ok_or_else(|| RegError::ConditionUnresolved {
                condition: cond.name().to_string(),
            })?;

        let writes: Vec<(FlagLocation, bool)> = inputs
            .iter()
            .filter(|&&(flag, _)| best.get(flag) != current.get(flag))
            .map(|&(flag, loc)| (loc, best.get(flag)))
            .collect();
        log::trace!("Forcing {cond} to {desired}: {} bit(s) changed", writes.len());
        self.write_flags(&writes)
    }

    /// Read all six flags. Flags that cannot be located read as clear.
    pub fn retrieve_flags(&self) -> RegResult<RegFlags> {
        let mut flags = RegFlags::default();
        let mut found = false;
        for flag in Flag::ALL {
            if let Some(loc) = self.locate_flag(flag) {
                flags.set(flag, self.read_flag(loc)?);
                found = true;
            }
        }
        if !found {
            return Err(RegError::ConditionUnresolved {
                condition: "flags".to_string(),
            });
        }
        Ok(flags)
    }

    /// Write all six flags. Flags that cannot be located are skipped.
    pub fn apply_flags(&mut self, flags: &RegFlags) -> RegResult<()> {
        let writes: Vec<(FlagLocation, bool)> = Flag::ALL
            .iter()
            .filter_map(|&flag| self.locate_flag(flag).map(|loc| (loc, flags.get(flag))))
            .collect();
        if writes.is_empty() {
            return Err(RegError::ConditionUnresolved {
                condition: "flags".to_string(),
            });
        }
        self.write_flags(&writes)
    }
}
