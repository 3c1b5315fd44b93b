//! Fixed frame palette and color roles.
//!
//! Decoded layers hold pixel values 0 (empty), 1 (first color) and 2 (second
//! color). Each frame picks the actual colors by storing palette indices in
//! its flags word, one per [`ColorRole`].

use std::fmt;

use serde::Serialize;

/// RGBA color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
	/// Red component (0-255)
	pub r: u8,
	/// Green component (0-255)
	pub g: u8,
	/// Blue component (0-255)
	pub b: u8,
	/// Alpha component (0-255)
	pub a: u8,
}

impl Color {
	/// Creates a new RGBA color.
	pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
		Self {
			r,
			g,
			b,
			a,
		}
	}

	/// Creates a new RGB color with full opacity.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self::new(r, g, b, 255)
	}

	/// Creates a transparent black color.
	pub const fn transparent() -> Self {
		Self::new(0, 0, 0, 0)
	}

	/// Returns the color as an `[r, g, b, a]` array.
	pub const fn to_array(self) -> [u8; 4] {
		[self.r, self.g, self.b, self.a]
	}
}

impl Default for Color {
	fn default() -> Self {
		Self::transparent()
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "RGBA({}, {}, {}, {})", self.r, self.g, self.b, self.a)
	}
}

/// The global palette: white, near-black, red, yellow, green, blue, transparent.
pub const FRAME_PALETTE: [Color; 7] = [
	Color::rgb(0xFF, 0xFF, 0xFF),
	Color::rgb(0x14, 0x14, 0x14),
	Color::rgb(0xFF, 0x17, 0x17),
	Color::rgb(0xFF, 0xE6, 0x00),
	Color::rgb(0x00, 0x82, 0x32),
	Color::rgb(0x06, 0xAE, 0xFF),
	Color::transparent(),
];

/// Looks up a palette index; the 4-bit fields can hold values past the palette.
pub fn palette_color(index: u8) -> Option<Color> {
	FRAME_PALETTE.get(usize::from(index)).copied()
}

/// The seven color slots a frame assigns palette indices to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColorRole {
	/// Background paper
	Paper,
	/// Layer A, pixel value 1
	LayerAFirst,
	/// Layer A, pixel value 2
	LayerASecond,
	/// Layer B, pixel value 1
	LayerBFirst,
	/// Layer B, pixel value 2
	LayerBSecond,
	/// Layer C, pixel value 1
	LayerCFirst,
	/// Layer C, pixel value 2
	LayerCSecond,
}

impl ColorRole {
	/// All roles in flags-word order
	pub const ALL: [ColorRole; 7] = [
		ColorRole::Paper,
		ColorRole::LayerAFirst,
		ColorRole::LayerASecond,
		ColorRole::LayerBFirst,
		ColorRole::LayerBSecond,
		ColorRole::LayerCFirst,
		ColorRole::LayerCSecond,
	];

	/// Bit offset of this role's 4-bit index inside the frame flags word.
	pub const fn shift(self) -> u32 {
		match self {
			ColorRole::Paper => 0,
			ColorRole::LayerAFirst => 8,
			ColorRole::LayerASecond => 12,
			ColorRole::LayerBFirst => 16,
			ColorRole::LayerBSecond => 20,
			ColorRole::LayerCFirst => 24,
			ColorRole::LayerCSecond => 28,
		}
	}

	/// Role used by `layer` (0 = A) for pixel value `value` (1 or 2).
	pub fn for_layer_pixel(layer: usize, value: u8) -> Option<Self> {
		match (layer, value) {
			(0, 1) => Some(ColorRole::LayerAFirst),
			(0, 2) => Some(ColorRole::LayerASecond),
			(1, 1) => Some(ColorRole::LayerBFirst),
			(1, 2) => Some(ColorRole::LayerBSecond),
			(2, 1) => Some(ColorRole::LayerCFirst),
			(2, 2) => Some(ColorRole::LayerCSecond),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_palette_lookup() {
		assert_eq!(palette_color(0), Some(Color::rgb(0xFF, 0xFF, 0xFF)));
		assert_eq!(palette_color(6), Some(Color::transparent()));
		assert_eq!(palette_color(7), None);
	}

	#[test]
	fn test_role_for_layer_pixel() {
		assert_eq!(ColorRole::for_layer_pixel(1, 2), Some(ColorRole::LayerBSecond));
		assert_eq!(ColorRole::for_layer_pixel(0, 0), None);
		assert_eq!(ColorRole::for_layer_pixel(3, 1), None);
	}
}
