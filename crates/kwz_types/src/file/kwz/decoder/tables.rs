//! Line lookup tables of the tile codec.
//!
//! A line is one 8-pixel row of a tile, each pixel 0, 1 or 2, so there are
//! 3^8 = 6561 possible lines. A line index is read as eight base-3 digits
//! `a..h` (most significant first); the pixels are laid out as
//! `[b, a, d, c, f, e, h, g]`.
//!
//! The shifted table maps the index of a line to the index of the line the
//! bitstream pairs it with in alternating tiles. It re-weights the same
//! digits as `729, 243, 81, 27, 9, 3, 1, 2187`.

use std::sync::OnceLock;

use crate::file::{
	KwzError,
	kwz::constants::{COMMON_LINE_COUNT, LINE_TABLE_SIZE, TILE_SIZE},
};

/// One 8-pixel tile row
pub type Line = [u8; TILE_SIZE];

/// Line indices reachable through a 5-bit common index
pub const COMMON_LINE_INDEX_TABLE: [u16; COMMON_LINE_COUNT] = [
	0x0000, 0x0CD0, 0x19A0, 0x02D9, 0x088B, 0x0051, 0x00F3, 0x0009, 0x001B, 0x0001, 0x0003,
	0x05B2, 0x1116, 0x00A2, 0x01E6, 0x0012, 0x0036, 0x0002, 0x0006, 0x0B64, 0x08DC, 0x0144,
	0x00FC, 0x0024, 0x001C, 0x0004, 0x0334, 0x099C, 0x0668, 0x1338, 0x1004, 0x166C,
];

/// Counterparts of [`COMMON_LINE_INDEX_TABLE`] used by alternating common tiles
pub const COMMON_SHIFTED_LINE_INDEX_TABLE: [u16; COMMON_LINE_COUNT] = [
	0x0000, 0x0CD0, 0x19A0, 0x0003, 0x02D9, 0x088B, 0x0051, 0x00F3, 0x0009, 0x001B, 0x0001,
	0x0006, 0x05B2, 0x1116, 0x00A2, 0x01E6, 0x0012, 0x0036, 0x0002, 0x02DC, 0x0B64, 0x08DC,
	0x0144, 0x00FC, 0x0024, 0x001C, 0x099C, 0x0334, 0x1338, 0x0668, 0x166C, 0x1004,
];

const fn digits(index: usize) -> [usize; 8] {
	[
		(index / 2187) % 3,
		(index / 729) % 3,
		(index / 243) % 3,
		(index / 81) % 3,
		(index / 27) % 3,
		(index / 9) % 3,
		(index / 3) % 3,
		index % 3,
	]
}

fn build_line_table() -> Box<[Line]> {
	(0..LINE_TABLE_SIZE)
		.map(|index| {
			let [a, b, c, d, e, f, g, h] = digits(index);
			[b, a, d, c, f, e, h, g].map(|digit| digit as u8)
		})
		.collect()
}

fn build_shifted_table() -> Box<[u16]> {
	(0..LINE_TABLE_SIZE)
		.map(|index| {
			let [a, b, c, d, e, f, g, h] = digits(index);
			(a * 729 + b * 243 + c * 81 + d * 27 + e * 9 + f * 3 + g + h * 2187) as u16
		})
		.collect()
}

/// Every possible line, indexed by raw line index.
pub fn line_table() -> &'static [Line] {
	static LINE_TABLE: OnceLock<Box<[Line]>> = OnceLock::new();
	LINE_TABLE.get_or_init(build_line_table)
}

/// Shifted counterpart of every raw line index.
pub fn shifted_line_index_table() -> &'static [u16] {
	static SHIFTED_LINE_INDEX_TABLE: OnceLock<Box<[u16]>> = OnceLock::new();
	SHIFTED_LINE_INDEX_TABLE.get_or_init(build_shifted_table)
}

/// Resolves a raw 13-bit line index.
///
/// # Errors
///
/// [`KwzError::InvalidLineIndex`] for indices of 6561 and above.
pub fn line(index: u16) -> Result<&'static Line, KwzError> {
	line_table().get(usize::from(index)).ok_or(KwzError::InvalidLineIndex(index))
}

/// Resolves the shifted counterpart of a raw line index.
///
/// # Errors
///
/// [`KwzError::InvalidLineIndex`] for indices of 6561 and above.
pub fn shifted_index(index: u16) -> Result<u16, KwzError> {
	shifted_line_index_table()
		.get(usize::from(index))
		.copied()
		.ok_or(KwzError::InvalidLineIndex(index))
}

/// Resolves a 5-bit common index to its line.
pub fn common_line(index: u16) -> &'static Line {
	&line_table()[usize::from(COMMON_LINE_INDEX_TABLE[usize::from(index) % COMMON_LINE_COUNT])]
}

/// Resolves a 5-bit common index to the shifted common line.
pub fn common_shifted_line(index: u16) -> &'static Line {
	&line_table()
		[usize::from(COMMON_SHIFTED_LINE_INDEX_TABLE[usize::from(index) % COMMON_LINE_COUNT])]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_line_table_shape() {
		let table = line_table();
		assert_eq!(table.len(), 6561);
		assert_eq!(table[0], [0; 8]);
		assert_eq!(table[6560], [2; 8]);
		// h = 1 lands in the 7th pixel
		assert_eq!(table[1], [0, 0, 0, 0, 0, 0, 1, 0]);
		// a = 1 lands in the 2nd pixel
		assert_eq!(table[2187], [0, 1, 0, 0, 0, 0, 0, 0]);
	}

	#[test]
	fn test_line_table_covers_every_line_once() {
		let mut seen = std::collections::HashSet::new();
		for line in line_table() {
			assert!(line.iter().all(|&p| p < 3));
			assert!(seen.insert(*line));
		}
	}

	#[test]
	fn test_common_constants_resolve() {
		assert_eq!(common_line(0), &[0; 8]);
		assert_eq!(common_line(1), &[1; 8]);
		assert_eq!(common_line(2), &[2; 8]);
		assert_eq!(common_shifted_line(1), &[1; 8]);
		assert_eq!(line(0x0CD0).unwrap(), &[1; 8]);
		assert_eq!(line(0x19A0).unwrap(), &[2; 8]);
	}

	#[test]
	fn test_shifted_table_is_permutation() {
		let table = shifted_line_index_table();
		assert_eq!(table.len(), 6561);
		let mut seen = vec![false; 6561];
		for &index in table {
			assert!(!seen[usize::from(index)]);
			seen[usize::from(index)] = true;
		}
		assert_eq!(shifted_index(1).unwrap(), 2187);
		assert_eq!(shifted_index(2187).unwrap(), 729);
		assert_eq!(shifted_index(0x0CD0).unwrap(), 0x0CD0);
	}

	#[test]
	fn test_invalid_raw_index() {
		assert!(matches!(line(6561), Err(KwzError::InvalidLineIndex(6561))));
		assert!(matches!(shifted_index(8191), Err(KwzError::InvalidLineIndex(8191))));
	}
}
