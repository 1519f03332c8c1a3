// SPDX-License-Identifier: MIT

//! Bit packing and unpacking of report data.
//!
//! HID reports are a little-endian bit stream, see Section 8.4: the first field
//! occupies the least significant bits of the first byte, and a field that
//! does not fit into the remainder of a byte continues in the least significant
//! bits of the next byte. This module knows nothing about fields or report IDs,
//! it only moves values of 0 to 32 bits in and out of byte buffers.

/// Pulls values of arbitrary bit width from a byte slice, in order.
///
/// ```
/// # use hidtree::bits::BitReader;
/// let mut reader = BitReader::new(&[0b1010_0011, 0x0f]);
/// assert_eq!(reader.read(2), Some(0b11));
/// assert_eq!(reader.read(10), Some(0b1111_101000));
/// assert_eq!(reader.read(8), None);
/// assert_eq!(reader.read(4), Some(0));
/// ```
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bytes: std::slice::Iter<'a, u8>,
    /// The unread bits of the current byte, shifted down to bit 0
    shifted: u32,
    /// The number of valid bits in `shifted`
    remaining: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        BitReader {
            bytes: bytes.iter(),
            shifted: 0,
            remaining: 0,
        }
    }

    /// The number of bits not yet read.
    pub fn remaining_bits(&self) -> usize {
        self.remaining + self.bytes.len() * 8
    }

    /// Reads the next `width` bits as unsigned value. Returns `None` and
    /// consumes nothing if fewer than `width` bits remain or if `width`
    /// exceeds 32.
    pub fn read(&mut self, width: usize) -> Option<u32> {
        if width > 32 || width > self.remaining_bits() {
            return None;
        }

        let mut accumulator: u64 = 0;
        let mut filled = 0;
        while filled < width {
            if self.remaining == 0 {
                self.shifted = u32::from(*self.bytes.next()?);
                self.remaining = 8;
            }
            let take = (width - filled).min(self.remaining);
            let mask = (1u32 << take) - 1;
            accumulator |= u64::from(self.shifted & mask) << filled;
            self.shifted >>= take;
            self.remaining -= take;
            filled += take;
        }

        Some(accumulator as u32)
    }
}

/// Packs values of arbitrary bit width into a byte buffer, in order.
///
/// Values are OR-ed into the buffer so that fields smaller than a byte
/// share that byte. The buffer grows as needed.
///
/// ```
/// # use hidtree::bits::BitWriter;
/// let mut writer = BitWriter::new();
/// writer.write(0b11, 2);
/// writer.write(0b1111_101000, 10);
/// assert_eq!(writer.into_bytes(), vec![0b1010_0011, 0x0f]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    byte_index: usize,
    bit_offset: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer whose buffer starts with `prefix`, writing starts
    /// at the first byte after the prefix. The buffer is zero-filled to
    /// at least `len` bytes.
    pub fn with_prefix(prefix: &[u8], len: usize) -> Self {
        let mut bytes = prefix.to_vec();
        if bytes.len() < len {
            bytes.resize(len, 0);
        }
        BitWriter {
            bytes,
            byte_index: prefix.len(),
            bit_offset: 0,
        }
    }

    /// The current write position in bits from the start of the buffer.
    pub fn position(&self) -> usize {
        self.byte_index * 8 + self.bit_offset
    }

    /// Writes the lowest `width` bits of `value` at the current position.
    /// Bits of `value` above `width` are discarded. Widths above 32 write
    /// `value` zero-extended.
    pub fn write(&mut self, value: u32, width: usize) {
        if width == 0 {
            return;
        }

        let mask: u64 = if width >= 32 {
            u64::from(u32::MAX)
        } else {
            (1u64 << width) - 1
        };
        let shifted = (u64::from(value) & mask) << self.bit_offset;
        let nbytes = (self.bit_offset + width).div_ceil(8);

        let end = self.byte_index + nbytes;
        if self.bytes.len() < end {
            self.bytes.resize(end, 0);
        }
        for (i, byte) in self.bytes[self.byte_index..end].iter_mut().enumerate() {
            let chunk = shifted.checked_shr(8 * i as u32).unwrap_or(0);
            *byte |= chunk as u8;
        }

        self.bit_offset += width;
        self.byte_index += self.bit_offset / 8;
        self.bit_offset %= 8;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
