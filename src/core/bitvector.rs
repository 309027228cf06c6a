//! Arbitrary width bit vector used for registers wider than 64 bits.
//!
//! Bits are kept in little-endian order: bit `i` lives in byte `i / 8` at
//! position `i % 8`. Bits above `len` are always zero so two vectors of the
//! same width compare equal exactly when their values do.

use std::fmt;

use num_bigint::BigUint;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BitVector {
    bytes: Vec<u8>,
    len: u32,
}

impl BitVector {
    /// Create an all-zero vector of `len` bits.
    pub fn new(len: u32) -> Self {
        Self {
            bytes: vec![0; byte_len(len)],
            len,
        }
    }

    pub fn from_u64(value: u64, len: u32) -> Self {
        Self::from_bytes_le(&value.to_le_bytes(), len)
    }

    /// Build from little-endian bytes, truncating or zero-extending to `len` bits.
    pub fn from_bytes_le(bytes: &[u8], len: u32) -> Self {
        let mut bytes_out = vec![0; byte_len(len)];
        let n = bytes.len().min(bytes_out.len());
        bytes_out[..n].copy_from_slice(&bytes[..n]);
        Self {
            bytes: bytes_out,
            len,
        }
        .normalize()
    }

    /// Build from big-endian bytes, truncating or zero-extending to `len` bits.
    pub fn from_bytes_be(bytes: &[u8], len: u32) -> Self {
        let reversed: Vec<u8> = bytes.iter().rev().copied().collect();
        Self::from_bytes_le(&reversed, len)
    }

    pub fn from_biguint(value: &BigUint, len: u32) -> Self {
        Self::from_bytes_le(&value.to_bytes_le(), len)
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }

    pub fn get(&self, bit: u32) -> bool {
        if bit >= self.len {
            return false;
        }
        self.bytes[(bit / 8) as usize] & (1 << (bit % 8)) != 0
    }

    pub fn set(&mut self, bit: u32, value: bool) {
        if bit >= self.len {
            return;
        }
        let byte = &mut self.bytes[(bit / 8) as usize];
        if value {
            *byte |= 1 << (bit % 8);
        } else {
            *byte &= !(1 << (bit % 8));
        }
    }

    /// Little-endian byte image, `ceil(len / 8)` bytes long.
    pub fn to_bytes_le(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn to_bytes_be(&self) -> Vec<u8> {
        self.bytes.iter().rev().copied().collect()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Value as an integer, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.bytes.iter().skip(8).any(|&b| b != 0) {
            return None;
        }
        let mut buf = [0u8; 8];
        let n = self.bytes.len().min(8);
        buf[..n].copy_from_slice(&self.bytes[..n]);
        Some(u64::from_le_bytes(buf))
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_le(&self.bytes)
    }

    fn normalize(mut self) -> Self {
        let rem = self.len % 8;
        if rem != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= (1u8 << rem) - 1;
            }
        }
        self
    }
}

fn byte_len(bits: u32) -> usize {
    bits.div_ceil(8) as usize
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        if self.bytes.is_empty() {
            return write!(f, "0");
        }
        for byte in self.bytes.iter().rev() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
