//! Custom-alphabet base-32 codec used for `.KWZ` filenames.
//!
//! The alphabet is not RFC 4648. Input bits are packed five at a time, most
//! significant bit first; the final group is padded with zero bits on the
//! right. Decoding keeps only whole bytes, so trailing padding bits vanish.
//!
//! ```
//! use kwz_types::file::kwz::base32;
//!
//! let name = base32::encode(&[0x01, 0x00, 0x00, 0x00, 0x01]);
//! assert_eq!(name, "cjcccccw");
//! assert_eq!(base32::decode(&name).unwrap(), vec![0x01, 0x00, 0x00, 0x00, 0x01]);
//! ```

use crate::file::KwzError;

/// The 32 symbols, indexed by 5-bit group value
pub const ALPHABET: &[u8; 32] = b"cwmfjordvegbalksnthpyxquiz012345";

/// Maps an ASCII byte back to its 5-bit value.
fn symbol_value(c: char) -> Option<u8> {
	if !c.is_ascii() {
		return None;
	}
	ALPHABET.iter().position(|&s| s == c as u8).map(|p| p as u8)
}

/// Encodes bytes into the custom base-32 alphabet.
///
/// Output length is `ceil(bits / 5)`.
pub fn encode(data: &[u8]) -> String {
	let mut out = String::with_capacity((data.len() * 8).div_ceil(5));
	let mut buffer: u32 = 0;
	let mut bits = 0u32;

	for &byte in data {
		buffer = (buffer << 8) | u32::from(byte);
		bits += 8;
		while bits >= 5 {
			bits -= 5;
			out.push(ALPHABET[((buffer >> bits) & 0x1F) as usize] as char);
		}
		buffer &= (1 << bits) - 1;
	}

	if bits > 0 {
		out.push(ALPHABET[((buffer << (5 - bits)) & 0x1F) as usize] as char);
	}

	out
}

/// Decodes a custom base-32 string.
///
/// Produces `floor(len * 5 / 8)` bytes; leftover low bits are discarded.
///
/// # Errors
///
/// Returns [`KwzError::InvalidBase32Character`] for any symbol outside
/// [`ALPHABET`].
pub fn decode(input: &str) -> Result<Vec<u8>, KwzError> {
	let mut out = Vec::with_capacity(input.len() * 5 / 8);
	let mut buffer: u32 = 0;
	let mut bits = 0u32;

	for (position, character) in input.chars().enumerate() {
		let value = symbol_value(character).ok_or(KwzError::InvalidBase32Character {
			character,
			position,
		})?;

		buffer = (buffer << 5) | u32::from(value);
		bits += 5;
		if bits >= 8 {
			bits -= 8;
			out.push((buffer >> bits) as u8);
			buffer &= (1 << bits) - 1;
		}
	}

	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_encode_sample_filename() {
		let mut source = [0u8; 17];
		source[0] = 0x01;
		source[4] = 0x01;
		source[9..13].copy_from_slice(&0x1963_830Cu32.to_le_bytes());
		source[13..17].copy_from_slice(&0x1963_830Cu32.to_le_bytes());

		assert_eq!(encode(&source), "cjcccccwcccccccanltthfjfaaan");
	}

	#[test]
	fn test_decode_sample_filename() {
		let decoded = decode("cjcccccwcccccccanltthfjfaaan").unwrap();
		assert_eq!(decoded.len(), 17);
		assert_eq!(&decoded[..9], &[0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]);
		assert_eq!(u32::from_le_bytes(decoded[9..13].try_into().unwrap()), 0x1963_830C);
		assert_eq!(u32::from_le_bytes(decoded[13..17].try_into().unwrap()), 0x1963_830C);
	}

	#[test]
	fn test_roundtrip_multiple_of_five_bits() {
		let samples: [&[u8]; 3] = [
			&[0xFF, 0x00, 0xAA, 0x55, 0x12],
			&[0x00; 10],
			&[0xDE, 0xAD, 0xBE, 0xEF, 0x42, 0x01, 0x23, 0x45, 0x67, 0x89],
		];
		for sample in samples {
			let encoded = encode(sample);
			assert_eq!(encoded.len(), sample.len() * 8 / 5);
			assert_eq!(decode(&encoded).unwrap(), sample);
		}
	}

	#[test]
	fn test_output_length_rounds_up() {
		assert_eq!(encode(&[0xFF]).len(), 2);
		assert_eq!(encode(&[0xFF, 0xFF]).len(), 4);
		assert_eq!(encode(&[]), "");
	}

	#[test]
	fn test_partial_group_keeps_high_bits() {
		// 0xFF -> 11111 111(00)
		assert_eq!(encode(&[0xFF]), "52");
		assert_eq!(decode("52").unwrap(), vec![0xFF]);
	}

	#[test]
	fn test_decode_invalid_character() {
		let err = decode("cjcXcc").unwrap_err();
		assert!(matches!(
			err,
			KwzError::InvalidBase32Character {
				character: 'X',
				position: 3
			}
		));
		assert!(decode("cé").is_err());
	}
}
