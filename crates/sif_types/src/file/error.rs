//! Error types for SIF encoding and decoding.

use thiserror::Error;

/// Errors that can occur when encoding or decoding SIF images.
#[derive(Debug, Error)]
pub enum SifError {
	/// Not enough data to parse or encode
	#[error("insufficient data: expected at least {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},

	/// Invalid magic number
	#[error("invalid magic number: expected 0x{expected:04X}, got 0x{actual:04X}")]
	InvalidMagic {
		/// Expected magic value (high 12 bits)
		expected: u16,
		/// Actual first two bytes of the input
		actual: u16,
	},

	/// Channel count other than 3
	#[error("unsupported channel count {0}, only 3-channel RGB is recognized")]
	UnsupportedChannels(u8),

	/// Width or height of zero or beyond the encodable maximum
	#[error("image {axis} out of range: {value} (must be 1..={max})")]
	DimensionOutOfRange {
		/// Which dimension was rejected
		axis: &'static str,
		/// The offending value
		value: u64,
		/// Highest accepted value
		max: u32,
	},

	/// Decoded raster would not fit in addressable memory
	#[error("decoded raster would need {bytes} bytes")]
	OutputTooLarge {
		/// Required raster size in bytes
		bytes: u64,
	},

	/// Input ended where another slice header was required
	#[error("truncated image: expected a slice header at byte {position}")]
	TruncatedImage {
		/// Byte offset where the slice header should start
		position: usize,
	},

	/// Slice header with a zero payload size
	#[error("slice at byte {position} declares an empty payload")]
	EmptySlicePayload {
		/// Byte offset of the slice header
		position: usize,
	},

	/// Slice header with a zero height
	#[error("slice at byte {position} declares zero height")]
	EmptySliceHeight {
		/// Byte offset of the slice header
		position: usize,
	},

	/// Slice payload extends past the end of the input
	#[error("slice payload overruns input: {position} + {size} exceeds {available} bytes")]
	SliceOverrun {
		/// Byte offset of the payload
		position: usize,
		/// Declared payload size
		size: usize,
		/// Total input size
		available: usize,
	},

	/// Sum of slice heights exceeds the image height
	#[error("slice heights overflow the image: {declared} rows declared, image has {height}")]
	SliceHeightOverflow {
		/// Running total of slice rows including the offending slice
		declared: u64,
		/// Image height from the file header
		height: u32,
	},

	/// Opcode stream ended before the slice was fully reconstructed
	#[error("opcode stream ends prematurely at payload byte {position}")]
	UnexpectedEndOfSlice {
		/// Offset within the slice payload
		position: usize,
	},

	/// Slice payload was not consumed exactly
	#[error("slice payload size mismatch: declared {declared} bytes, consumed {consumed}")]
	SliceSizeMismatch {
		/// Payload size from the slice header
		declared: usize,
		/// Bytes actually consumed by the opcode stream
		consumed: usize,
	},

	/// Run data left over after the last pixel of a slice
	#[error("run data extends past the last pixel of the slice")]
	DanglingRunData,

	/// End-of-slice marker absent or overwritten
	#[error("missing end-of-slice marker at byte {position}")]
	MissingEndMarker {
		/// Byte offset where the marker was expected
		position: usize,
	},

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}
