//! Tile decompressor for a single layer.
//!
//! The canvas is walked in 128x128 macro tiles, left to right then top to
//! bottom, and inside each macro tile in 8x8 tiles in the same order. Tiles
//! whose origin falls outside the 320x240 canvas are not visited. Every tile
//! starts with a 3-bit type selector:
//!
//! | Type | Payload                                    | Rows                         |
//! |------|--------------------------------------------|------------------------------|
//! | 0    | 5-bit common index                         | all rows the same line       |
//! | 1    | 13-bit raw index                           | all rows the same line       |
//! | 2    | 5-bit common index                         | common / shifted common, alternating |
//! | 3    | 13-bit raw index                           | line / shifted line, alternating |
//! | 4    | 8-bit row mask, then 5 or 13 bits per row  | bit set = common, clear = raw |
//! | 5    | 5-bit count                                | skip this tile and `count` more |
//! | 6    | none                                       | tile left untouched          |
//! | 7    | 2-bit pattern, 1-bit common flag, 2 lines  | four fixed row patterns      |

use crate::file::{
	KwzError,
	kwz::constants::{FRAME_HEIGHT, FRAME_WIDTH, LAYER_PIXELS, MACRO_TILE_SIZE, TILE_SIZE},
};

use super::{
	bit_reader::BitReader,
	tables::{self, Line},
};

/// An 8x8 tile as eight lines
type Tile = [Line; TILE_SIZE];

mod tile_type {
	pub const COMMON: u16 = 0;
	pub const RAW: u16 = 1;
	pub const COMMON_ALTERNATING: u16 = 2;
	pub const RAW_ALTERNATING: u16 = 3;
	pub const PER_ROW: u16 = 4;
	pub const SKIP: u16 = 5;
	pub const RESERVED: u16 = 6;
}

fn read_common(reader: &mut BitReader<'_>) -> Result<&'static Line, KwzError> {
	reader.read_bits(5).map(tables::common_line)
}

fn read_raw(reader: &mut BitReader<'_>) -> Result<&'static Line, KwzError> {
	let index = reader.read_bits(13)?;
	tables::line(index)
}

fn alternating(a: &Line, b: &Line) -> Tile {
	std::array::from_fn(|row| if row % 2 == 0 { *a } else { *b })
}

/// Picks line A or B for `row` of a type 7 tile.
fn pattern_uses_b(pattern: u16, row: usize) -> bool {
	match pattern {
		0 => row % 2 != 0,
		1 => row % 3 == 0,
		2 => row % 3 == 2,
		_ => row % 2 == 1,
	}
}

/// Decodes one tile, returning `None` when nothing is drawn.
///
/// Skip tiles report the number of additional tiles to move past through `skip`.
fn read_tile(reader: &mut BitReader<'_>, skip: &mut usize) -> Result<Option<Tile>, KwzError> {
	let tile = match reader.read_bits(3)? {
		tile_type::COMMON => [*read_common(reader)?; TILE_SIZE],
		tile_type::RAW => [*read_raw(reader)?; TILE_SIZE],
		tile_type::COMMON_ALTERNATING => {
			let index = reader.read_bits(5)?;
			alternating(tables::common_line(index), tables::common_shifted_line(index))
		}
		tile_type::RAW_ALTERNATING => {
			let index = reader.read_bits(13)?;
			let a = tables::line(index)?;
			let b = tables::line(tables::shifted_index(index)?)?;
			alternating(a, b)
		}
		tile_type::PER_ROW => {
			let flags = reader.read_bits(8)?;
			let mut tile = [[0; TILE_SIZE]; TILE_SIZE];
			for (row, line) in tile.iter_mut().enumerate() {
				*line = if flags & (1 << row) != 0 {
					*read_common(reader)?
				} else {
					*read_raw(reader)?
				};
			}
			tile
		}
		tile_type::SKIP => {
			*skip = usize::from(reader.read_bits(5)?);
			return Ok(None);
		}
		tile_type::RESERVED => return Ok(None),
		// three bits, so only the pattern tile is left
		_ => {
			let mut pattern = reader.read_bits(2)?;
			let (a, b) = if reader.read_bits(1)? == 1 {
				let a = read_common(reader)?;
				let b = read_common(reader)?;
				pattern = (pattern + 1) % 4;
				(a, b)
			} else {
				(read_raw(reader)?, read_raw(reader)?)
			};
			std::array::from_fn(|row| if pattern_uses_b(pattern, row) { *b } else { *a })
		}
	};
	Ok(Some(tile))
}

fn write_tile(tile: &Tile, layer: &mut [u8; LAYER_PIXELS], x: usize, y: usize) {
	for (row, line) in tile.iter().enumerate() {
		let start = (y + row) * FRAME_WIDTH + x;
		layer[start..start + TILE_SIZE].copy_from_slice(line);
	}
}

/// Decompresses `data` into `layer`, a 320x240 plane of pixel values.
///
/// Pixels of skipped and reserved tiles keep their previous value.
///
/// # Errors
///
/// - [`KwzError::TruncatedBitstream`] if the stream ends before the canvas is covered
/// - [`KwzError::InvalidLineIndex`] if a raw index is past the line table
pub fn decompress_layer(data: &[u8], layer: &mut [u8; LAYER_PIXELS]) -> Result<(), KwzError> {
	let mut reader = BitReader::new(data, 0);

	for macro_y in (0..FRAME_HEIGHT).step_by(MACRO_TILE_SIZE) {
		for macro_x in (0..FRAME_WIDTH).step_by(MACRO_TILE_SIZE) {
			for tile_y in (0..MACRO_TILE_SIZE).step_by(TILE_SIZE) {
				let y = macro_y + tile_y;
				if y >= FRAME_HEIGHT {
					break;
				}

				let mut tile_x = 0;
				while tile_x < MACRO_TILE_SIZE {
					let x = macro_x + tile_x;
					if x >= FRAME_WIDTH {
						break;
					}

					let mut skip = 0;
					if let Some(tile) = read_tile(&mut reader, &mut skip)? {
						write_tile(&tile, layer, x, y);
					}
					tile_x += (skip + 1) * TILE_SIZE;
				}
			}
		}
	}

	Ok(())
}
