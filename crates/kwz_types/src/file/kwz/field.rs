//! Fixed-width byte and text fields.
//!
//! Values shorter than the field are padded with NUL; reads trim at the first NUL.

use encoding_rs::UTF_16LE;

use crate::file::KwzError;

/// Copies `value` into `field`, zero-filling the remainder.
pub(crate) fn write_padded(
	field: &mut [u8],
	value: &[u8],
	name: &'static str,
) -> Result<(), KwzError> {
	if value.len() > field.len() {
		return Err(KwzError::FieldTooLong {
			field: name,
			max: field.len(),
			actual: value.len(),
		});
	}
	field.fill(0);
	field[..value.len()].copy_from_slice(value);
	Ok(())
}

/// Returns `bytes` up to (not including) the first NUL.
pub(crate) fn trim_nul(bytes: &[u8]) -> &[u8] {
	let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
	&bytes[..end]
}

/// Decodes a NUL-padded UTF-16LE field.
pub(crate) fn decode_utf16(raw: &[u8]) -> String {
	let (text, _had_errors) = UTF_16LE.decode_without_bom_handling(raw);
	text.split('\0').next().unwrap_or_default().to_string()
}

/// Encodes `value` as UTF-16LE into a field of `field.len() / 2` code units.
pub(crate) fn encode_utf16(field: &mut [u8], value: &str, name: &'static str) -> Result<(), KwzError> {
	let units: Vec<u16> = value.encode_utf16().collect();
	let max = field.len() / 2;
	if units.len() > max {
		return Err(KwzError::FieldTooLong {
			field: name,
			max,
			actual: units.len(),
		});
	}
	field.fill(0);
	for (slot, unit) in field.chunks_exact_mut(2).zip(units) {
		slot.copy_from_slice(&unit.to_le_bytes());
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_write_padded_clears_previous_value() {
		let mut field = [0xFFu8; 6];
		write_padded(&mut field, b"ab", "test").unwrap();
		assert_eq!(field, [b'a', b'b', 0, 0, 0, 0]);
		assert_eq!(trim_nul(&field), b"ab");
	}

	#[test]
	fn test_write_padded_rejects_long_value() {
		let mut field = [0u8; 2];
		let err = write_padded(&mut field, b"abc", "test").unwrap_err();
		assert!(matches!(
			err,
			KwzError::FieldTooLong {
				field: "test",
				max: 2,
				actual: 3
			}
		));
		assert_eq!(field, [0, 0]);
	}

	#[test]
	fn test_utf16_roundtrip() {
		let mut field = [0u8; 22];
		encode_utf16(&mut field, "Nintendo", "name").unwrap();
		assert_eq!(&field[..4], &[0x4E, 0x00, 0x69, 0x00]);
		assert_eq!(&field[16..], &[0; 6]);
		assert_eq!(decode_utf16(&field), "Nintendo");
	}

	#[test]
	fn test_utf16_counts_code_units() {
		let mut field = [0u8; 22];
		assert!(encode_utf16(&mut field, "うごくメモ帳うごくメモ帳", "name").is_err());
		encode_utf16(&mut field, "うごくメモ帳", "name").unwrap();
		assert_eq!(decode_utf16(&field), "うごくメモ帳");
	}
}
