//! KWZ file format constants.
//!
//! Chunk tags, fixed record sizes and frame geometry shared by the container
//! parser and the frame decoder.

/// Tag of the file header chunk
pub const HEADER_MAGIC: [u8; 4] = *b"KFH\x14";

/// Tag of the thumbnail chunk
pub const THUMBNAIL_MAGIC: [u8; 4] = *b"KTN\x02";

/// Tag of the per-frame metadata chunk
pub const META_MAGIC: [u8; 4] = *b"KMI\x05";

/// Tag of the compressed frame data chunk
pub const FRAME_DATA_MAGIC: [u8; 4] = *b"KMC\x02";

/// Size of a chunk's tag + declared size prefix
pub const CHUNK_PREFIX_SIZE: usize = 8;

/// Size of the CRC32 field following the size in checksummed chunks
pub const CRC_SIZE: usize = 4;

/// Offset of the first payload byte in checksummed chunks
pub const CHECKSUMMED_PAYLOAD_OFFSET: usize = CHUNK_PREFIX_SIZE + CRC_SIZE;

/// Number of header bytes covered by the CRC32 (everything after the CRC field)
pub const HEADER_PAYLOAD_SIZE: usize = 200;

/// Declared size written in the header chunk (CRC field + payload)
pub const HEADER_DECLARED_SIZE: u32 = (CRC_SIZE + HEADER_PAYLOAD_SIZE) as u32;

/// Total size of the header chunk in bytes
pub const HEADER_SIZE: usize = CHECKSUMMED_PAYLOAD_OFFSET + HEADER_PAYLOAD_SIZE;

/// Size of an author id field
pub const AUTHOR_ID_SIZE: usize = 10;

/// Number of UTF-16 code units in an author name field
pub const AUTHOR_NAME_CHARS: usize = 11;

/// Size in bytes of an author name field
pub const AUTHOR_NAME_SIZE: usize = AUTHOR_NAME_CHARS * 2;

/// Size of a base-32 filename field
pub const FILENAME_SIZE: usize = 28;

/// Number of author id bytes that go into a derived filename
pub const FILENAME_AUTHOR_PREFIX: usize = 9;

/// Size of the raw (author id prefix + two timestamps) filename source
pub const FILENAME_SOURCE_SIZE: usize = FILENAME_AUTHOR_PREFIX + 8;

/// Size of a single frame metadata record
pub const FRAME_META_SIZE: usize = 28;

/// Compressed layer size that marks a layer as unchanged from the previous frame
pub const UNCHANGED_LAYER_SIZE: u16 = 38;

/// Number of layers in a frame
pub const LAYER_COUNT: usize = 3;

/// Frame width in pixels
pub const FRAME_WIDTH: usize = 320;

/// Frame height in pixels
pub const FRAME_HEIGHT: usize = 240;

/// Number of pixels in a single layer
pub const LAYER_PIXELS: usize = FRAME_WIDTH * FRAME_HEIGHT;

/// Edge length of a tile, the atomic unit of the layer codec
pub const TILE_SIZE: usize = 8;

/// Edge length of the macro tiles the canvas is traversed in
pub const MACRO_TILE_SIZE: usize = 128;

/// Number of entries in the line table (3^8)
pub const LINE_TABLE_SIZE: usize = 6561;

/// Number of entries in the common line tables
pub const COMMON_LINE_COUNT: usize = 32;
