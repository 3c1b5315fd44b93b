//! Frame decompression engine.
//!
//! A frame is three independently compressed 320x240 layers. Frames may be
//! drawn on top of the previous frame, so decoding frame `n` can require
//! decoding `n - 1` first, which in turn may need `n - 2`, and so on.
//!
//! The decoder itself is immutable. All state that carries from one decode to
//! the next lives in a [`DecodeCache`]: the index of the last completely
//! decoded frame and the raster it left behind. Independent caches can be
//! used with one decoder at the same time.
//!
//! # Examples
//!
//! ```no_run
//! use kwz_types::file::kwz::{DecodeCache, File};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = File::open("animation.kwz")?;
//! let decoder = file.decoder()?;
//! let mut cache = DecodeCache::new();
//!
//! let raster = decoder.decode_frame(&mut cache, 3)?;
//! println!("layer A pixel at (10, 20): {:?}", raster.pixel(0, 10, 20));
//! # Ok(())
//! # }
//! ```

mod bit_reader;
mod layer;
pub mod tables;

#[cfg(test)]
pub(crate) mod test_util;

pub use bit_reader::BitReader;
pub use layer::decompress_layer;

use log::trace;

use crate::file::KwzError;

use super::{
	constants::{FRAME_HEIGHT, FRAME_WIDTH, LAYER_COUNT, LAYER_PIXELS, UNCHANGED_LAYER_SIZE},
	frame_data::FrameOffsets,
	meta::FrameMetaTable,
};

/// Mask selecting all three layers
pub const ALL_LAYERS: u8 = 0b111;

/// Three 320x240 layers of pixel values (0 = empty, 1 and 2 = colors)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameRaster {
	// always LAYER_COUNT planes
	layers: Box<[[u8; LAYER_PIXELS]]>,
}

impl FrameRaster {
	/// Width of every layer
	pub const WIDTH: usize = FRAME_WIDTH;
	/// Height of every layer
	pub const HEIGHT: usize = FRAME_HEIGHT;

	/// Creates an empty raster.
	pub fn new() -> Self {
		Self {
			layers: vec![[0; LAYER_PIXELS]; LAYER_COUNT].into_boxed_slice(),
		}
	}

	/// Pixels of `layer` (0 = A), row-major.
	pub fn layer(&self, layer: usize) -> Option<&[u8]> {
		self.layers.get(layer).map(<[u8; LAYER_PIXELS]>::as_slice)
	}

	fn layer_mut(&mut self, layer: usize) -> &mut [u8; LAYER_PIXELS] {
		&mut self.layers[layer]
	}

	/// Pixel value of `layer` at `(x, y)`.
	pub fn pixel(&self, layer: usize, x: usize, y: usize) -> Option<u8> {
		if x >= FRAME_WIDTH || y >= FRAME_HEIGHT {
			return None;
		}
		self.layer(layer).map(|pixels| pixels[y * FRAME_WIDTH + x])
	}

	/// All layers back to back: A, then B, then C.
	pub fn as_bytes(&self) -> &[u8] {
		self.layers.as_flattened()
	}

	/// Resets every pixel to 0.
	pub fn clear(&mut self) {
		self.layers.as_flattened_mut().fill(0);
	}
}

impl Default for FrameRaster {
	fn default() -> Self {
		Self::new()
	}
}

/// State carried between decode calls
#[derive(Debug, Clone, Default)]
pub struct DecodeCache {
	last_decoded: Option<usize>,
	raster: FrameRaster,
}

impl DecodeCache {
	/// Creates a cache with nothing decoded.
	pub fn new() -> Self {
		Self::default()
	}

	/// Index of the last frame decoded to completion.
	pub fn last_decoded(&self) -> Option<usize> {
		self.last_decoded
	}

	/// The raster left by the last decode.
	pub fn raster(&self) -> &FrameRaster {
		&self.raster
	}

	/// Forgets the last decoded frame and blanks the raster.
	pub fn reset(&mut self) {
		self.last_decoded = None;
		self.raster.clear();
	}
}

/// Decoder over the frame data of one file
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
	payload: &'a [u8],
	offsets: FrameOffsets,
	layer_visibility: [bool; LAYER_COUNT],
	meta: &'a FrameMetaTable,
}

impl<'a> Decoder<'a> {
	/// Creates a decoder over the frame data payload (the bytes after the CRC).
	///
	/// # Errors
	///
	/// [`KwzError::MalformedContainer`] if the layer sizes in `meta` need more
	/// bytes than `payload` holds.
	pub fn new(
		payload: &'a [u8],
		meta: &'a FrameMetaTable,
		layer_visibility: [bool; LAYER_COUNT],
	) -> Result<Self, KwzError> {
		let offsets = FrameOffsets::compute(meta, payload.len())?;
		Ok(Self {
			payload,
			offsets,
			layer_visibility,
			meta,
		})
	}

	/// Number of frames that can be decoded.
	pub fn frame_count(&self) -> usize {
		self.meta.len()
	}

	/// Per-frame offsets into the payload.
	pub fn offsets(&self) -> &FrameOffsets {
		&self.offsets
	}

	/// Header visibility of the three layers; hidden layers are never decoded.
	pub fn layer_visibility(&self) -> [bool; LAYER_COUNT] {
		self.layer_visibility
	}

	/// Decodes frame `index`, decoding earlier frames first where it is drawn
	/// on top of them.
	///
	/// The result lives in `cache` and stays valid until the next call. When
	/// `index` is already the last decoded frame the cached raster is returned
	/// as is. A layer whose diffing bit is set starts blank in that frame.
	///
	/// # Errors
	///
	/// - [`KwzError::FrameOutOfRange`] if `index` is past the last frame
	/// - [`KwzError::TruncatedBitstream`] or [`KwzError::InvalidLineIndex`] if
	///   a layer stream is corrupt
	///
	/// On error the cache is reset, so no partially decoded raster is reused.
	pub fn decode_frame<'c>(
		&self,
		cache: &'c mut DecodeCache,
		index: usize,
	) -> Result<&'c FrameRaster, KwzError> {
		if index >= self.frame_count() {
			return Err(KwzError::FrameOutOfRange {
				index,
				count: self.frame_count(),
			});
		}

		if cache.last_decoded == Some(index) {
			return Ok(&cache.raster);
		}

		let chain = self.reference_chain(cache, index);
		for &(frame, mask) in chain.iter().rev() {
			if let Err(err) = self.decode_layers(&mut cache.raster, frame, mask) {
				cache.reset();
				return Err(err);
			}
			cache.last_decoded = Some(frame);
		}

		Ok(&cache.raster)
	}

	/// Decodes frames `0..frame_count()` in order with a private cache.
	pub fn frames(&self) -> FrameIter<'_, 'a> {
		FrameIter {
			decoder: self,
			cache: DecodeCache::new(),
			next: 0,
		}
	}

	fn diffing_mask(&self, index: usize) -> u8 {
		self.meta.get(index).map_or(0, |entry| entry.flags.diffing_mask())
	}

	/// Frames to decode, requested frame first, each with the layer mask it is
	/// decoded with.
	///
	/// Walks back while the previous frame is not the cached one and some
	/// layer still depends on it. A layer drops out of the mask as soon as
	/// one frame along the way has its diffing bit set, since that frame
	/// blanks the layer before drawing it.
	fn reference_chain(&self, cache: &DecodeCache, index: usize) -> Vec<(usize, u8)> {
		let mut chain = vec![(index, ALL_LAYERS)];
		let mut frame = index;
		let mut mask = ALL_LAYERS;

		while frame > 0 && cache.last_decoded != Some(frame - 1) && mask != 0 {
			mask &= !self.diffing_mask(frame) & ALL_LAYERS;
			frame -= 1;
			trace!("frame {index} needs frame {frame} for layers {mask:03b}");
			chain.push((frame, mask));
		}

		chain
	}

	fn decode_layers(&self, raster: &mut FrameRaster, index: usize, mask: u8) -> Result<(), KwzError> {
		let entry = self.meta.get(index).ok_or(KwzError::FrameOutOfRange {
			index,
			count: self.frame_count(),
		})?;
		let mut offset = self.offsets.offset(index).unwrap_or_default();

		if index == 0 {
			raster.clear();
		}

		let restarted = entry.flags.diffing_mask();
		for (layer, &size) in entry.layer_sizes.iter().enumerate() {
			let len = usize::from(size);
			let start = offset;
			offset += len;

			if mask & (1 << layer) == 0 || !self.layer_visibility[layer] {
				continue;
			}
			// a diffing layer does not build on the previous frame
			if restarted & (1 << layer) != 0 {
				raster.layer_mut(layer).fill(0);
			}
			if size == UNCHANGED_LAYER_SIZE {
				continue;
			}

			let data = self
				.payload
				.get(start..start + len)
				.ok_or_else(|| KwzError::truncated(start, len, self.payload))?;
			decompress_layer(data, raster.layer_mut(layer))?;
		}

		Ok(())
	}
}

/// Sequential iterator over decoded frames, see [`Decoder::frames`]
#[derive(Debug)]
pub struct FrameIter<'d, 'a> {
	decoder: &'d Decoder<'a>,
	cache: DecodeCache,
	next: usize,
}

impl Iterator for FrameIter<'_, '_> {
	type Item = Result<FrameRaster, KwzError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.next >= self.decoder.frame_count() {
			return None;
		}
		let index = self.next;
		self.next += 1;
		Some(self.decoder.decode_frame(&mut self.cache, index).cloned())
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let remaining = self.decoder.frame_count().saturating_sub(self.next);
		(remaining, Some(remaining))
	}
}

impl ExactSizeIterator for FrameIter<'_, '_> {}
