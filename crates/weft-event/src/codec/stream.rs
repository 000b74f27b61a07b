//! Two-stream compact encoding.
//!
//! Values are split between a byte stream and a bit stream. Integers store
//! their minimal little-endian bytes in the byte stream and their byte count
//! in the bit stream; booleans live only in the bit stream. The output is
//! `bytes || bits || reverse(varint(len(bits)))`, so a reader finds the bit
//! stream from the end of the buffer.
//!
//! Every value has exactly one encoding. The reader rejects anything a
//! [`Writer`] would not have produced.

use crate::error::EventError;

const U16_SIZE_BITS: u32 = 1;
const U32_SIZE_BITS: u32 = 2;
const U64_SIZE_BITS: u32 = 3;

#[derive(Debug, Default)]
struct BitWriter {
    buf: Vec<u8>,
    len: usize,
}

impl BitWriter {
    /// Append the `width` low bits of `value`, least significant first
    fn write(&mut self, width: u32, value: u64) {
        for i in 0..width {
            if self.len % 8 == 0 {
                self.buf.push(0);
            }
            if (value >> i) & 1 == 1 {
                self.buf[self.len / 8] |= 1 << (self.len % 8);
            }
            self.len += 1;
        }
    }
}

/// Minimal number of bytes needed for `value`, at least one
fn byte_len(value: u64) -> usize {
    let significant_bits = 64 - value.leading_zeros() as usize;
    significant_bits.div_ceil(8).max(1)
}

#[derive(Debug, Default)]
pub struct Writer {
    bytes: Vec<u8>,
    bits: BitWriter,
}

impl Writer {
    pub fn new() -> Self {
        Writer::default()
    }

    pub fn bits(&mut self, width: u32, value: u64) {
        self.bits.write(width, value);
    }

    pub fn bool(&mut self, value: bool) {
        self.bits.write(1, value as u64);
    }

    pub fn u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn u16(&mut self, value: u16) {
        self.uint(U16_SIZE_BITS, value as u64);
    }

    pub fn u32(&mut self, value: u32) {
        self.uint(U32_SIZE_BITS, value as u64);
    }

    pub fn u64(&mut self, value: u64) {
        self.uint(U64_SIZE_BITS, value);
    }

    /// Sign bit followed by the magnitude
    pub fn i64(&mut self, value: i64) {
        self.bool(value < 0);
        self.u64(value.unsigned_abs());
    }

    pub fn fixed_bytes(&mut self, value: &[u8]) {
        self.bytes.extend_from_slice(value);
    }

    /// Length-prefixed bytes. Callers bound the length before writing.
    pub fn slice_bytes(&mut self, value: &[u8]) {
        self.u32(value.len() as u32);
        self.bytes.extend_from_slice(value);
    }

    fn uint(&mut self, size_bits: u32, value: u64) {
        let size = byte_len(value);
        self.bits.write(size_bits, (size - 1) as u64);
        self.bytes.extend_from_slice(&value.to_le_bytes()[..size]);
    }

    pub fn finish(self) -> Vec<u8> {
        let mut out = self.bytes;
        out.extend_from_slice(&self.bits.buf);

        let mut len = self.bits.buf.len() as u64;
        let mut trailer = Vec::with_capacity(4);
        loop {
            let group = (len & 0x7f) as u8;
            len >>= 7;
            if len == 0 {
                trailer.push(group);
                break;
            }
            trailer.push(group | 0x80);
        }
        out.extend(trailer.iter().rev());
        out
    }
}

#[derive(Debug)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    bits: &'a [u8],
    bit_pos: usize,
}

impl<'a> Reader<'a> {
    /// Split `raw` into its byte and bit streams
    pub fn new(raw: &'a [u8]) -> Result<Self, EventError> {
        let mut bits_len: u64 = 0;
        let mut shift = 0u32;
        let mut end = raw.len();
        loop {
            if end == 0 {
                return Err(EventError::Truncated);
            }
            end -= 1;
            let group = raw[end];
            if shift > 56 {
                return Err(EventError::NonCanonical("bit stream length overflows"));
            }
            bits_len |= ((group & 0x7f) as u64) << shift;
            if group & 0x80 == 0 {
                if group == 0 && shift > 0 {
                    return Err(EventError::NonCanonical("over-long bit stream length"));
                }
                break;
            }
            shift += 7;
        }

        if bits_len > end as u64 {
            return Err(EventError::Truncated);
        }
        let bits_start = end - bits_len as usize;
        Ok(Reader {
            bytes: &raw[..bits_start],
            pos: 0,
            bits: &raw[bits_start..end],
            bit_pos: 0,
        })
    }

    /// Bytes left in the byte stream
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn peek_bits(&self, width: u32) -> Result<u64, EventError> {
        let width = width as usize;
        if self.bit_pos + width > self.bits.len() * 8 {
            return Err(EventError::Truncated);
        }
        let mut value = 0u64;
        for i in 0..width {
            let pos = self.bit_pos + i;
            let bit = (self.bits[pos / 8] >> (pos % 8)) & 1;
            value |= (bit as u64) << i;
        }
        Ok(value)
    }

    pub fn bits(&mut self, width: u32) -> Result<u64, EventError> {
        let value = self.peek_bits(width)?;
        self.bit_pos += width as usize;
        Ok(value)
    }

    pub fn bool(&mut self) -> Result<bool, EventError> {
        Ok(self.bits(1)? == 1)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], EventError> {
        if n > self.remaining() {
            return Err(EventError::Truncated);
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, EventError> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, EventError> {
        Ok(self.uint(U16_SIZE_BITS)? as u16)
    }

    pub fn u32(&mut self) -> Result<u32, EventError> {
        Ok(self.uint(U32_SIZE_BITS)? as u32)
    }

    pub fn u64(&mut self) -> Result<u64, EventError> {
        self.uint(U64_SIZE_BITS)
    }

    pub fn i64(&mut self) -> Result<i64, EventError> {
        let negative = self.bool()?;
        let magnitude = self.u64()?;
        if negative {
            if magnitude == 0 {
                return Err(EventError::NonCanonical("negative zero"));
            }
            if magnitude > 1 << 63 {
                return Err(EventError::NonCanonical("signed integer out of range"));
            }
            Ok((magnitude as i64).wrapping_neg())
        } else {
            i64::try_from(magnitude)
                .map_err(|_| EventError::NonCanonical("signed integer out of range"))
        }
    }

    pub fn fixed_bytes<const N: usize>(&mut self) -> Result<[u8; N], EventError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Length-prefixed bytes, borrowed from the input.
    ///
    /// The length is checked against `limit` and the remaining input before
    /// anything is copied.
    pub fn slice_bytes(
        &mut self,
        what: &'static str,
        limit: usize,
    ) -> Result<&'a [u8], EventError> {
        let len = self.u32()? as usize;
        if len > limit {
            return Err(EventError::TooLarge {
                what,
                len: len as u64,
                limit: limit as u64,
            });
        }
        self.take(len)
    }

    fn uint(&mut self, size_bits: u32) -> Result<u64, EventError> {
        let size = self.bits(size_bits)? as usize + 1;
        let raw = self.take(size)?;
        if size > 1 && raw[size - 1] == 0 {
            return Err(EventError::NonCanonical("integer is not minimally encoded"));
        }
        let mut le = [0u8; 8];
        le[..size].copy_from_slice(raw);
        Ok(u64::from_le_bytes(le))
    }

    /// Require that both streams were consumed exactly
    pub fn finish(self) -> Result<(), EventError> {
        if self.pos != self.bytes.len() {
            return Err(EventError::NonCanonical("trailing bytes"));
        }
        if self.bits.len() != self.bit_pos.div_ceil(8) {
            return Err(EventError::NonCanonical("trailing bit stream bytes"));
        }
        let used_in_last = self.bit_pos % 8;
        if used_in_last != 0 && self.bits[self.bits.len() - 1] >> used_in_last != 0 {
            return Err(EventError::NonCanonical("non-zero padding bits"));
        }
        Ok(())
    }
}
