//! Bitstream builder for decoder tests.

/// One tile as the decompressor reads it
#[derive(Debug, Clone, Copy)]
pub(crate) enum TileOp {
	Common(u16),
	Raw(u16),
	CommonAlternating(u16),
	RawAlternating(u16),
	/// `(common, index)` per row
	PerRow([(bool, u16); 8]),
	Skip(u16),
	Reserved,
	Pattern {
		pattern: u8,
		common: bool,
		a: u16,
		b: u16,
	},
}

/// LSB-first bit packer producing an even-length byte stream
#[derive(Debug, Default)]
pub(crate) struct LayerWriter {
	bytes: Vec<u8>,
	acc: u64,
	bits: u32,
}

impl LayerWriter {
	pub(crate) fn write(&mut self, value: u16, n: u32) {
		self.acc |= u64::from(value & ((1u32 << n) - 1) as u16) << self.bits;
		self.bits += n;
		while self.bits >= 8 {
			self.bytes.push(self.acc as u8);
			self.acc >>= 8;
			self.bits -= 8;
		}
	}

	pub(crate) fn op(&mut self, op: &TileOp) {
		match *op {
			TileOp::Common(index) => {
				self.write(0, 3);
				self.write(index, 5);
			}
			TileOp::Raw(index) => {
				self.write(1, 3);
				self.write(index, 13);
			}
			TileOp::CommonAlternating(index) => {
				self.write(2, 3);
				self.write(index, 5);
			}
			TileOp::RawAlternating(index) => {
				self.write(3, 3);
				self.write(index, 13);
			}
			TileOp::PerRow(rows) => {
				self.write(4, 3);
				let flags = rows
					.iter()
					.enumerate()
					.fold(0u16, |flags, (row, &(common, _))| flags | (u16::from(common) << row));
				self.write(flags, 8);
				for (common, index) in rows {
					self.write(index, if common { 5 } else { 13 });
				}
			}
			TileOp::Skip(count) => {
				self.write(5, 3);
				self.write(count, 5);
			}
			TileOp::Reserved => self.write(6, 3),
			TileOp::Pattern {
				pattern,
				common,
				a,
				b,
			} => {
				self.write(7, 3);
				self.write(u16::from(pattern), 2);
				self.write(u16::from(common), 1);
				let width = if common { 5 } else { 13 };
				self.write(a, width);
				self.write(b, width);
			}
		}
	}

	pub(crate) fn finish(mut self) -> Vec<u8> {
		if self.bits > 0 {
			self.bytes.push(self.acc as u8);
		}
		if self.bytes.len() % 2 == 1 {
			self.bytes.push(0);
		}
		self.bytes
	}

	/// Packs a sequence of tiles into a layer stream.
	pub(crate) fn encode(ops: &[TileOp]) -> Vec<u8> {
		let mut writer = Self::default();
		for op in ops {
			writer.op(op);
		}
		writer.finish()
	}

	/// A layer filled with one common line (1200 bytes).
	pub(crate) fn solid(common_index: u16) -> Vec<u8> {
		Self::encode(&[TileOp::Common(common_index); 1200])
	}
}
