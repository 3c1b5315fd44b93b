//! End-to-end tests for `kwz-rs`

mod fixture;

use std::io::Cursor;

use fixture::three_frame_file;
use kwz_rs::prelude::*;

fn tile_is(raster: &FrameRaster, layer: usize, value: u8) -> bool {
	(0..8).all(|y| (0..8).all(|x| raster.pixel(layer, x, y) == Some(value)))
}

#[test_log::test]
fn test_written_file_parses_strictly() {
	let bytes = three_frame_file().to_bytes();
	let file = KwzFile::from_bytes_with_config(&bytes, KwzParseConfig::strict()).unwrap();

	assert_eq!(file.frame_count(), 3);
	assert_eq!(file.header().author_name(AuthorRole::Root), "tester");
	assert_eq!(file.header().frame_speed(), 8);
	assert!(file.header().loop_playback());
	assert!(file.header().filenames_consistent().unwrap());
	assert_eq!(file.thumbnail().map(|t| t.data().len()), Some(4));
	assert!(file.checksums().iter().all(|c| c.is_valid()));
	assert_eq!(file.to_bytes(), bytes);
}

#[test_log::test]
fn test_from_reader_matches_from_bytes() {
	let bytes = three_frame_file().to_bytes();
	let from_reader = KwzFile::from_reader(Cursor::new(&bytes)).unwrap();
	assert_eq!(from_reader, KwzFile::from_bytes(&bytes).unwrap());
}

#[test_log::test]
fn test_sequential_frames_accumulate_layers() {
	let file = KwzFile::from_bytes(&three_frame_file().to_bytes()).unwrap();
	let decoder = file.decoder().unwrap();
	let frames: Vec<FrameRaster> = decoder.frames().collect::<Result<_, _>>().unwrap();
	assert_eq!(frames.len(), 3);

	assert!(frames[0].layer(0).unwrap().iter().all(|&p| p == 1));
	assert!(frames[0].layer(1).unwrap().iter().all(|&p| p == 0));

	assert!(frames[1].layer(0).unwrap().iter().all(|&p| p == 1));
	assert!(tile_is(&frames[1], 1, 2));
	assert_eq!(frames[1].pixel(1, 8, 0), Some(0));
	assert!(frames[1].layer(2).unwrap().iter().all(|&p| p == 0));

	assert!(frames[2].layer(2).unwrap().iter().all(|&p| p == 2));
	assert!(tile_is(&frames[2], 1, 2));
}

#[test_log::test]
fn test_random_access_matches_sequential_decode() {
	let file = three_frame_file();
	let decoder = file.decoder().unwrap();
	let sequential: Vec<FrameRaster> = decoder.frames().collect::<Result<_, _>>().unwrap();

	for index in [2, 0, 1, 2] {
		let mut cache = DecodeCache::new();
		let raster = decoder.decode_frame(&mut cache, index).unwrap();
		assert_eq!(raster, &sequential[index]);
		assert_eq!(cache.last_decoded(), Some(index));
	}
}

#[test_log::test]
fn test_hidden_layer_is_not_decoded() {
	let mut file = three_frame_file();
	file.header_mut().set_layer_visible(0, false);
	let file = KwzFile::from_bytes(&file.to_bytes()).unwrap();

	let decoder = file.decoder().unwrap();
	assert_eq!(decoder.layer_visibility(), [false, true, true]);
	let mut cache = DecodeCache::new();
	let raster = decoder.decode_frame(&mut cache, 1).unwrap();
	assert!(raster.layer(0).unwrap().iter().all(|&p| p == 0));
	assert!(tile_is(raster, 1, 2));
}

#[test_log::test]
fn test_trailing_unknown_chunk_stops_parsing() {
	let mut bytes = three_frame_file().to_bytes();
	bytes.extend_from_slice(b"KSN\x01");
	bytes.extend_from_slice(&16u32.to_le_bytes());
	bytes.extend_from_slice(&[0; 16]);

	let file = KwzFile::from_bytes_with_config(&bytes, KwzParseConfig::strict()).unwrap();
	assert_eq!(file.unknown_chunk(), Some(*b"KSN\x01"));
	assert_eq!(file.frame_count(), 3);
}

#[test_log::test]
fn test_corrupt_frame_data_checksum() {
	let mut bytes = three_frame_file().to_bytes();
	let last = bytes.len() - 1;
	bytes[last] ^= 0xFF;

	assert!(KwzFile::from_bytes(&bytes).is_ok());

	let lenient = KwzFile::from_bytes_with_config(&bytes, KwzParseConfig::lenient()).unwrap();
	assert!(matches!(
		lenient.verify_checksums(),
		Err(KwzError::ChecksumMismatch {
			kind: ChunkKind::FrameData,
			..
		})
	));

	assert!(matches!(
		KwzFile::from_bytes_with_config(&bytes, KwzParseConfig::strict()),
		Err(KwzError::ChecksumMismatch {
			kind: ChunkKind::FrameData,
			..
		})
	));
}

#[test_log::test]
fn test_truncated_layer_stream_resets_cache() {
	let mut file = three_frame_file();
	let mut meta = file.meta().unwrap().clone();
	let mut frame_data = file.frame_data().unwrap().clone();

	// cut layer C of frame 2 down to 4 bytes
	let entry = meta.get_mut(2).unwrap();
	let full = usize::from(entry.layer_sizes[2]);
	entry.layer_sizes[2] = 4;
	let mut payload = frame_data.payload().to_vec();
	payload.truncate(payload.len() - full + 4);
	frame_data = kwz_rs::prelude::file::kwz::FrameData::new(payload);

	file.set_meta(meta).unwrap();
	file.set_frame_data(Some(frame_data));

	let decoder = file.decoder().unwrap();
	let mut cache = DecodeCache::new();
	decoder.decode_frame(&mut cache, 1).unwrap();
	assert!(matches!(
		decoder.decode_frame(&mut cache, 2),
		Err(KwzError::TruncatedBitstream { .. })
	));
	assert_eq!(cache.last_decoded(), None);
	assert!(matches!(
		decoder.decode_frame(&mut cache, 3),
		Err(KwzError::FrameOutOfRange { index: 3, count: 3 })
	));
}

#[test_log::test]
fn test_frame_colors_and_draw_order() {
	let file = three_frame_file();
	let entry = file.meta().unwrap().get(0).unwrap();

	assert_eq!(entry.color(ColorRole::Paper), Some(FRAME_PALETTE[1]));
	assert_eq!(entry.color(ColorRole::LayerAFirst), Some(FRAME_PALETTE[2]));
	assert_eq!(entry.layer_draw_order(), [2, 1, 0]);
}

#[test_log::test]
fn test_save_and_open() {
	let path = std::env::temp_dir().join(format!("kwz-rs-test-{}.kwz", std::process::id()));
	let file = three_frame_file();
	file.save(&path).unwrap();

	let opened = KwzFile::open(&path).unwrap();
	std::fs::remove_file(&path).unwrap();
	assert_eq!(opened.to_bytes(), file.to_bytes());
	assert_eq!(opened.header().author_name(AuthorRole::Current), "tester");
}
