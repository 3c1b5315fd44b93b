//! Little-endian bit extractor over a compressed layer.
//!
//! Words are fetched as little-endian `u16` and their bits consumed least
//! significant first. At most 16 bits are buffered ahead of the read cursor.

use crate::file::KwzError;

/// Variable-width reader used by the tile decompressor
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
	data: &'a [u8],
	offset: usize,
	bit_value: u32,
	bit_index: i32,
}

impl<'a> BitReader<'a> {
	/// Creates a reader over `data`, starting at byte `offset`.
	pub fn new(data: &'a [u8], offset: usize) -> Self {
		Self {
			data,
			offset,
			bit_value: 0,
			// nothing buffered yet
			bit_index: 16,
		}
	}

	/// Byte offset of the next word to be fetched.
	pub fn offset(&self) -> usize {
		self.offset
	}

	/// Reads `n` bits (1 to 16).
	///
	/// # Errors
	///
	/// [`KwzError::TruncatedBitstream`] if a word past the end of the data is needed.
	pub fn read_bits(&mut self, n: u32) -> Result<u16, KwzError> {
		debug_assert!((1..=16).contains(&n));

		if self.bit_index + n as i32 > 16 {
			let word = self
				.data
				.get(self.offset..self.offset + 2)
				.map(|bytes| u16::from_le_bytes([bytes[0], bytes[1]]))
				.ok_or(KwzError::TruncatedBitstream {
					offset: self.offset,
					length: self.data.len(),
				})?;
			self.bit_value |= u32::from(word) << (16 - self.bit_index) as u32;
			self.offset += 2;
			self.bit_index -= 16;
		}

		let mask = (1u32 << n) - 1;
		let result = self.bit_value & mask;
		self.bit_value >>= n;
		self.bit_index += n as i32;
		Ok(result as u16)
	}
}
