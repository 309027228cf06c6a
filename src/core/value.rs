//! Typed access to register contents.
//!
//! All direct reads and writes of arena bytes go through this module. A
//! register is resolved against its arena on every access: the item only
//! supplies the arena, bit offset and bit size.
//!
//! Registers that start on a byte boundary and span whole bytes are stored
//! in the table's byte order. Everything else (single flag bits, odd-sized
//! fields) uses little-endian bit numbering: bit `i` of the arena is bit
//! `i % 8` of byte `i / 8`.

use super::bitvector::BitVector;
use super::error::{RegError, RegResult};
use super::item::RegisterItem;
use super::register_file::RegisterTable;
use super::types::{RegisterRole, RegisterType};

/// Location of a register's bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    pub arena: RegisterType,
    pub offset: u32,
    pub size: u32,
}

impl From<&RegisterItem> for Slot {
    fn from(item: &RegisterItem) -> Self {
        Self {
            arena: item.arena,
            offset: item.offset,
            size: item.size,
        }
    }
}

impl Slot {
    fn is_byte_aligned(&self) -> bool {
        self.offset % 8 == 0 && self.size % 8 == 0
    }

    fn byte_range(&self) -> std::ops::Range<usize> {
        let start = (self.offset / 8) as usize;
        start..start + (self.size / 8) as usize
    }
}

fn get_bit(bytes: &[u8], bit: usize) -> bool {
    bytes[bit / 8] & (1 << (bit % 8)) != 0
}

fn set_bit(bytes: &mut [u8], bit: usize, value: bool) {
    if value {
        bytes[bit / 8] |= 1 << (bit % 8);
    } else {
        bytes[bit / 8] &= !(1 << (bit % 8));
    }
}

/// Whether bits `[offset, offset + size)` differ between two buffers.
pub(crate) fn bits_differ(a: &[u8], b: &[u8], offset: u32, size: u32) -> bool {
    let slot = Slot {
        arena: RegisterType::Gpr,
        offset,
        size,
    };
    if slot.is_byte_aligned() {
        let range = slot.byte_range();
        return a[range.clone()] != b[range];
    }
    (offset as usize..(offset + size) as usize).any(|bit| get_bit(a, bit) != get_bit(b, bit))
}

fn check_bounds(bytes: &[u8], slot: Slot) -> RegResult<()> {
    let available = bytes.len() * 8;
    let end = slot.offset as usize + slot.size as usize;
    if end > available {
        return Err(RegError::SizeMismatch {
            expected: available,
            actual: end,
        });
    }
    Ok(())
}

fn check_u64_width(item: &RegisterItem) -> RegResult<()> {
    if item.size > 64 {
        return Err(RegError::SizeMismatch {
            expected: 64,
            actual: item.size as usize,
        });
    }
    Ok(())
}

impl RegisterTable {
    fn load(&self, slot: Slot) -> RegResult<BitVector> {
        let bytes = self.regset(slot.arena).arena().bytes();
        check_bounds(bytes, slot)?;

        if slot.is_byte_aligned() {
            let chunk = &bytes[slot.byte_range()];
            return Ok(if self.is_big_endian() {
                BitVector::from_bytes_be(chunk, slot.size)
            } else {
                BitVector::from_bytes_le(chunk, slot.size)
            });
        }

        let mut bv = BitVector::new(slot.size);
        for i in 0..slot.size {
            bv.set(i, get_bit(bytes, (slot.offset + i) as usize));
        }
        Ok(bv)
    }

    fn store(&mut self, slot: Slot, bv: &BitVector) -> RegResult<()> {
        let big_endian = self.is_big_endian();
        let bytes = self.regset_mut(slot.arena).arena.bytes_mut();
        check_bounds(bytes, slot)?;

        if slot.is_byte_aligned() {
            let chunk = &mut bytes[slot.byte_range()];
            if big_endian {
                chunk.copy_from_slice(&bv.to_bytes_be());
            } else {
                chunk.copy_from_slice(bv.as_bytes());
            }
            return Ok(());
        }

        for i in 0..slot.size {
            set_bit(bytes, (slot.offset + i) as usize, bv.get(i));
        }
        Ok(())
    }

    fn write_value(&mut self, name: &str, slot: Slot, value: u64) -> RegResult<()> {
        self.check_writable(name)?;
        self.store(slot, &BitVector::from_u64(value, slot.size))
    }

    /// Read a register of at most 64 bits.
    pub fn get_value(&self, item: &RegisterItem) -> RegResult<u64> {
        check_u64_width(item)?;
        let bv = self.load(Slot::from(item))?;
        Ok(bv.to_u64().unwrap_or_default())
    }

    /// Write the low `item.size` bits of `value`. Overlapping registers only
    /// see the bits inside this register's range change.
    pub fn set_value(&mut self, item: &RegisterItem, value: u64) -> RegResult<()> {
        check_u64_width(item)?;
        self.write_value(&item.name, Slot::from(item), value)
    }

    /// Read a register of any width.
    pub fn get_bv(&self, item: &RegisterItem) -> RegResult<BitVector> {
        self.load(Slot::from(item))
    }

    /// Write a register of any width. The vector must be exactly as wide as
    /// the register.
    pub fn set_bv(&mut self, item: &RegisterItem, bv: &BitVector) -> RegResult<()> {
        self.check_writable(&item.name)?;
        if bv.len() != item.size {
            return Err(RegError::SizeMismatch {
                expected: item.size as usize,
                actual: bv.len() as usize,
            });
        }
        self.store(Slot::from(item), bv)
    }

    /// Interpret a 32 or 64-bit register as an IEEE float.
    pub fn get_float(&self, item: &RegisterItem) -> RegResult<f64> {
        match item.size {
            32 => Ok(f32::from_bits(self.get_value(item)? as u32) as f64),
            64 => Ok(f64::from_bits(self.get_value(item)?)),
            other => Err(RegError::SizeMismatch {
                expected: 64,
                actual: other as usize,
            }),
        }
    }

    pub fn get_value_by_role(&self, role: RegisterRole) -> RegResult<u64> {
        let item = self
            .get_by_role(role)
            .ok_or_else(|| RegError::not_found(format!("register for role {role}")))?;
        self.get_value(item)
    }

    pub fn set_value_by_role(&mut self, role: RegisterRole, value: u64) -> RegResult<()> {
        let item = self
            .get_by_role(role)
            .ok_or_else(|| RegError::not_found(format!("register for role {role}")))?;
        check_u64_width(item)?;
        let slot = Slot::from(item);
        let name = item.name.clone();
        self.write_value(&name, slot, value)
    }

    /// Read a register by name or role token.
    pub fn getv(&self, name: &str) -> RegResult<u64> {
        let item = self
            .get(name)
            .ok_or_else(|| RegError::not_found(format!("register '{name}'")))?;
        self.get_value(item)
    }

    /// Write a register by name or role token.
    pub fn setv(&mut self, name: &str, value: u64) -> RegResult<()> {
        let item = self
            .get(name)
            .ok_or_else(|| RegError::not_found(format!("register '{name}'")))?;
        check_u64_width(item)?;
        let slot = Slot::from(item);
        let item_name = item.name.clone();
        self.write_value(&item_name, slot, value)
    }

    /// Copy of the whole arena `ty`.
    pub fn get_bytes(&self, ty: RegisterType) -> Vec<u8> {
        self.regset(ty).arena().bytes().to_vec()
    }

    /// Overwrite the start of arena `ty` with `bytes`. Raw writes ignore the
    /// read-only set.
    pub fn set_bytes(&mut self, ty: RegisterType, bytes: &[u8]) -> RegResult<()> {
        let arena = &mut self.regset_mut(ty).arena;
        if bytes.len() > arena.size() {
            return Err(RegError::SizeMismatch {
                expected: arena.size(),
                actual: bytes.len(),
            });
        }
        arena.bytes_mut()[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Load arena `ty` from a hex string such as `"0x78563412"`. Returns the
    /// number of bytes written.
    pub fn set_bytes_hex(&mut self, ty: RegisterType, hex: &str) -> RegResult<usize> {
        let bytes = decode_hex(hex)?;
        self.set_bytes(ty, &bytes)?;
        Ok(bytes.len())
    }

    /// Fill the arenas in type order from one contiguous buffer, as produced
    /// by a debugger register dump.
    pub fn read_regs(&mut self, buf: &[u8]) -> RegResult<()> {
        let total: usize = RegisterType::ALL
            .iter()
            .map(|&ty| self.regset(ty).arena().size())
            .sum();
        if buf.len() > total {
            return Err(RegError::SizeMismatch {
                expected: total,
                actual: buf.len(),
            });
        }

        let mut rest = buf;
        for ty in RegisterType::ALL {
            if rest.is_empty() {
                break;
            }
            let n = self.regset(ty).arena().size().min(rest.len());
            let (chunk, tail) = rest.split_at(n);
            self.set_bytes(ty, chunk)?;
            rest = tail;
        }
        Ok(())
    }
}

fn decode_hex(hex: &str) -> RegResult<Vec<u8>> {
    let digits: String = hex
        .trim()
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(RegError::parse(1, format!("Invalid hex digit '{bad}'")));
    }
    if digits.len() % 2 != 0 {
        return Err(RegError::parse(1, "Odd number of hex digits"));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            let byte = &digits[i..i + 2];
            u8::from_str_radix(byte, 16)
                .map_err(|_| RegError::parse(1, format!("Invalid hex byte '{byte}'")))
        })
        .collect()
}
