//! SIF image decompression.
//!
//! The decoder walks the same tile scan as the encoder and mirrors its
//! prediction, dictionary and run state byte for byte. Any opcode that
//! would read past the slice payload, and any payload that does not
//! reconstruct the slice exactly, fails the whole image; no partial
//! raster is ever returned.

use crate::file::SifError;

use super::constants::{
	END_OF_SLICE_MARKER, END_OF_SLICE_MARKER_SIZE, MAGIC, MAX_DIMENSION, MINIMUM_IMAGE_SIZE,
	MINIMUM_SLICE_SIZE, RUN_CACHE_SIZE, RUN_MINIMUM_LENGTH,
};
use super::context::{Dictionary, SlidingWindow, blend};
use super::layout::DeltaLayout;
use super::pixel::{Delta, Pixel};
use super::traversal::{ScanPos, TileScan};
use super::{ContentDescriptor, Flags, Predictor, opcodes, uleb128};

struct SliceDecoder<'a> {
	src: &'a [u8],
	position: usize,
	layout: DeltaLayout,
	predictor: Predictor,
	use_2d: bool,
	dict: Dictionary,
	window: SlidingWindow,
	prev: Pixel,
	run_cache: [u8; RUN_CACHE_SIZE],
	cache_index: usize,
	run: u32,
	run0: u32,
}

impl<'a> SliceDecoder<'a> {
	fn new(flags: Flags, src: &'a [u8]) -> Self {
		let predictor = flags.predictor();
		Self {
			src,
			position: 0,
			layout: DeltaLayout::new(flags.delta_bias()),
			predictor,
			use_2d: predictor != Predictor::Direct && flags.use_2d_prediction(),
			dict: Dictionary::new(flags.use_contextual_dict()),
			window: SlidingWindow::new(),
			prev: Pixel::ZERO,
			run_cache: [0; RUN_CACHE_SIZE],
			cache_index: 0,
			run: 0,
			run0: 0,
		}
	}

	fn read_byte(&mut self) -> Result<u8, SifError> {
		let Some(&byte) = self.src.get(self.position) else {
			return Err(SifError::UnexpectedEndOfSlice {
				position: self.position,
			});
		};
		self.position += 1;
		Ok(byte)
	}

	/// Parses a run opcode and fills the cache with its body, expanding
	/// the embedded zero-skip bytes. The sentinel is exactly two literal
	/// zeros; the skip byte that follows never re-triggers it.
	fn fill_run_cache(&mut self, op: u8) -> Result<(), SifError> {
		let mut run = u32::from(op & !opcodes::prefix_mask(3));
		if run > 0xF {
			run &= 0xF;
			run |= u32::from(self.read_byte()?) << 4;
		}
		run += 1;
		debug_assert!(run as usize <= RUN_CACHE_SIZE);
		let len = run as usize;
		let mut index = 0usize;
		let mut zeros = 0u32;
		while index < len {
			let byte = self.read_byte()?;
			self.run_cache[index] = byte;
			index += 1;
			zeros = if byte > 0 { 0 } else { zeros + 1 };
			if zeros == RUN_MINIMUM_LENGTH {
				let mut skip = u32::from(self.read_byte()?);
				while index < len && skip > 0 {
					self.run_cache[index] = 0;
					index += 1;
					skip -= 1;
				}
				zeros = 0;
			}
		}
		self.run = run;
		self.cache_index = 0;
		self.run0 = 0;
		Ok(())
	}

	/// Produces the pixel for one scan position.
	///
	/// Dictionary hits bypass prediction entirely; every other source
	/// yields a residual that is reconstructed against the previous
	/// pixel, mirroring the encoder's decorrelation.
	fn decode_pixel(&mut self, pos: ScanPos) -> Result<Pixel, SifError> {
		let mut delta = Delta::ZERO;
		let mut add_to_dict = false;
		let mut direct_hit = None;
		loop {
			if self.run0 > 0 {
				self.run0 -= 1;
				break;
			}
			if self.run > 0 {
				let byte = self.run_cache[self.cache_index];
				self.cache_index += 1;
				self.run -= 1;
				delta = self.layout.unpack_run_delta(byte);
				break;
			}
			let op = self.read_byte()?;
			if op & opcodes::prefix_mask(3) == opcodes::RUN_DELTA_8B {
				// The first cached delta belongs to this same position,
				// so loop around without consuming a pixel.
				self.fill_run_cache(op)?;
				continue;
			}
			if op & opcodes::prefix_mask(5) == opcodes::RUN_DELTA0 {
				self.run0 = u32::from(op ^ opcodes::RUN_DELTA0);
				break;
			}
			if op & opcodes::prefix_mask(2) == opcodes::REDUCED_OFFSET {
				let slot = self
					.dict
					.slot_from_offset(op ^ opcodes::REDUCED_OFFSET, self.prev);
				direct_hit = Some(self.dict.get(slot));
				break;
			}
			add_to_dict = true;
			if op & opcodes::prefix_mask(1) == opcodes::DELTA_15B {
				let low = self.read_byte()?;
				delta = DeltaLayout::unpack_15b(op, low);
			} else if op & opcodes::prefix_mask(4) == opcodes::DELTA_20B {
				let mid = self.read_byte()?;
				let low = self.read_byte()?;
				delta = self.layout.unpack_20b(op, mid, low);
			} else {
				delta = Delta {
					r: if op & 0x04 != 0 { self.read_byte()? as i8 } else { 0 },
					g: if op & 0x02 != 0 { self.read_byte()? as i8 } else { 0 },
					b: if op & 0x01 != 0 { self.read_byte()? as i8 } else { 0 },
				};
			}
			break;
		}

		let pixel = match direct_hit {
			Some(stored) => stored,
			None => {
				let pixel = self.reconstruct(delta, pos);
				if add_to_dict {
					let slot = self.dict.slot(pixel, self.prev);
					self.dict.insert(slot, pixel);
				}
				pixel
			}
		};
		self.prev = pixel;
		if self.use_2d {
			self.window.push(pixel);
		}
		Ok(pixel)
	}

	fn reconstruct(&self, delta: Delta, pos: ScanPos) -> Pixel {
		let mut prediction = self.prev;
		match self.predictor {
			Predictor::Direct => Pixel {
				r: prediction.r.wrapping_add(delta.r as u8),
				g: prediction.g.wrapping_add(delta.g as u8),
				b: prediction.b.wrapping_add(delta.b as u8),
			},
			Predictor::DecorrelateFromRed => {
				if self.use_2d && pos.y > 0 {
					prediction.r = blend(prediction.r, self.window.above(pos.x).r);
				}
				let anchor = delta.r as u8;
				Pixel {
					r: prediction.r.wrapping_add(anchor),
					g: prediction.g.wrapping_add(delta.g as u8).wrapping_add(anchor),
					b: prediction.b.wrapping_add(delta.b as u8).wrapping_add(anchor),
				}
			}
			Predictor::DecorrelateFromGreen => {
				if self.use_2d && pos.y > 0 {
					prediction.g = blend(prediction.g, self.window.above(pos.x).g);
				}
				let anchor = delta.g as u8;
				Pixel {
					r: prediction.r.wrapping_add(delta.r as u8).wrapping_add(anchor),
					g: prediction.g.wrapping_add(anchor),
					b: prediction.b.wrapping_add(delta.b as u8).wrapping_add(anchor),
				}
			}
			Predictor::DecorrelateFromBlue => {
				if self.use_2d && pos.y > 0 {
					prediction.b = blend(prediction.b, self.window.above(pos.x).b);
				}
				let anchor = delta.b as u8;
				Pixel {
					r: prediction.r.wrapping_add(delta.r as u8).wrapping_add(anchor),
					g: prediction.g.wrapping_add(delta.g as u8).wrapping_add(anchor),
					b: prediction.b.wrapping_add(anchor),
				}
			}
		}
	}
}

/// Decompresses one slice payload into `dst`, which must cover exactly
/// the slice raster. Returns the number of payload bytes consumed.
pub(crate) fn decompress_slice(
	width: u32,
	height: u32,
	flags: Flags,
	payload: &[u8],
	dst: &mut [u8],
) -> Result<usize, SifError> {
	let mut decoder = SliceDecoder::new(flags, payload);
	for pos in TileScan::new(width as usize, height as usize, flags.tile_height()) {
		let pixel = decoder.decode_pixel(pos)?;
		dst[pos.offset] = pixel.r;
		dst[pos.offset + 1] = pixel.g;
		dst[pos.offset + 2] = pixel.b;
	}
	if decoder.run > 0 || decoder.run0 > 0 {
		return Err(SifError::DanglingRunData);
	}
	Ok(decoder.position)
}

/// Parses a complete SIF byte stream into its descriptor and a row-major
/// RGB raster.
///
/// The returned descriptor carries the flags of the last decoded slice.
pub fn decompress_image(src: &[u8]) -> Result<(ContentDescriptor, Vec<u8>), SifError> {
	if src.len() < MINIMUM_IMAGE_SIZE {
		return Err(SifError::InsufficientData {
			expected: MINIMUM_IMAGE_SIZE,
			actual: src.len(),
		});
	}
	let magic = u16::from_be_bytes([src[0], src[1]]);
	let mut position = 2usize;
	if magic & 0xFFF0 != MAGIC {
		return Err(SifError::InvalidMagic {
			expected: MAGIC,
			actual: magic,
		});
	}
	let channels = (magic & 0x0F) as u8;
	if channels != 3 {
		return Err(SifError::UnsupportedChannels(channels));
	}
	let width = read_dimension(src, &mut position, "width")?;
	let height = read_dimension(src, &mut position, "height")?;

	let stride = u64::from(width) * u64::from(channels);
	let raster = stride * u64::from(height);
	let Ok(raster) = usize::try_from(raster) else {
		return Err(SifError::OutputTooLarge { bytes: raster });
	};
	let stride = stride as usize;
	let mut dst = vec![0u8; raster];

	let mut flags = Flags::default();
	let mut total_height = 0u32;
	let mut offset = 0usize;
	while total_height < height {
		if position + MINIMUM_SLICE_SIZE > src.len() {
			return Err(SifError::TruncatedImage { position });
		}
		let header_position = position;
		let size = u32::from_le_bytes([
			src[position],
			src[position + 1],
			src[position + 2],
			src[position + 3],
		]) as usize;
		position += 4;
		flags = Flags::from_bits(src[position]);
		position += 1;
		let slice_height = uleb128::read(src, &mut position);

		if size == 0 {
			return Err(SifError::EmptySlicePayload {
				position: header_position,
			});
		}
		if slice_height == 0 {
			return Err(SifError::EmptySliceHeight {
				position: header_position,
			});
		}
		if position + size > src.len() {
			return Err(SifError::SliceOverrun {
				position,
				size,
				available: src.len(),
			});
		}
		let declared = u64::from(total_height) + slice_height;
		if declared > u64::from(height) {
			return Err(SifError::SliceHeightOverflow { declared, height });
		}
		let slice_height = slice_height as u32;

		let region = &mut dst[offset..offset + stride * slice_height as usize];
		let payload = &src[position..position + size];
		let consumed = decompress_slice(width, slice_height, flags, payload, region)?;
		if consumed != size {
			return Err(SifError::SliceSizeMismatch {
				declared: size,
				consumed,
			});
		}
		position += size;
		if position + END_OF_SLICE_MARKER_SIZE > src.len()
			|| src[position..position + END_OF_SLICE_MARKER_SIZE] != END_OF_SLICE_MARKER
		{
			return Err(SifError::MissingEndMarker { position });
		}
		position += END_OF_SLICE_MARKER_SIZE;
		total_height += slice_height;
		offset += stride * slice_height as usize;
	}

	let descriptor = ContentDescriptor {
		width,
		height,
		channels,
		flags,
	};
	Ok((descriptor, dst))
}

fn read_dimension(src: &[u8], position: &mut usize, axis: &'static str) -> Result<u32, SifError> {
	let value = uleb128::read(src, position);
	if value == 0 || value > u64::from(MAX_DIMENSION) {
		return Err(SifError::DimensionOutOfRange {
			axis,
			value,
			max: MAX_DIMENSION,
		});
	}
	Ok(value as u32)
}

/// Header information for one slice of a SIF stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceInfo {
	/// Coding flags of the slice.
	pub flags: Flags,
	/// Rows covered by the slice.
	pub height: u32,
	/// Payload size in bytes, excluding header and end marker.
	pub size: u32,
}

/// Image structure recovered by [`probe`] without decoding any payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
	/// Image width in pixels.
	pub width: u32,
	/// Image height in pixels.
	pub height: u32,
	/// Channel count, always 3.
	pub channels: u8,
	/// Per-slice headers in file order.
	pub slices: Vec<SliceInfo>,
}

/// Walks the file and slice headers of a SIF stream without decompressing
/// any pixels. Useful for inspecting dimensions and slice structure
/// before committing to a full decode.
pub fn probe(src: &[u8]) -> Result<ImageInfo, SifError> {
	if src.len() < MINIMUM_IMAGE_SIZE {
		return Err(SifError::InsufficientData {
			expected: MINIMUM_IMAGE_SIZE,
			actual: src.len(),
		});
	}
	let magic = u16::from_be_bytes([src[0], src[1]]);
	let mut position = 2usize;
	if magic & 0xFFF0 != MAGIC {
		return Err(SifError::InvalidMagic {
			expected: MAGIC,
			actual: magic,
		});
	}
	let channels = (magic & 0x0F) as u8;
	if channels != 3 {
		return Err(SifError::UnsupportedChannels(channels));
	}
	let width = read_dimension(src, &mut position, "width")?;
	let height = read_dimension(src, &mut position, "height")?;

	let mut slices = Vec::new();
	let mut total_height = 0u64;
	while total_height < u64::from(height) {
		if position + MINIMUM_SLICE_SIZE > src.len() {
			return Err(SifError::TruncatedImage { position });
		}
		let header_position = position;
		let size = u32::from_le_bytes([
			src[position],
			src[position + 1],
			src[position + 2],
			src[position + 3],
		]);
		position += 4;
		let flags = Flags::from_bits(src[position]);
		position += 1;
		let slice_height = uleb128::read(src, &mut position);
		if size == 0 {
			return Err(SifError::EmptySlicePayload {
				position: header_position,
			});
		}
		if slice_height == 0 {
			return Err(SifError::EmptySliceHeight {
				position: header_position,
			});
		}
		if position + size as usize > src.len() {
			return Err(SifError::SliceOverrun {
				position,
				size: size as usize,
				available: src.len(),
			});
		}
		total_height += slice_height;
		if total_height > u64::from(height) {
			return Err(SifError::SliceHeightOverflow {
				declared: total_height,
				height,
			});
		}
		position += size as usize;
		if position + END_OF_SLICE_MARKER_SIZE > src.len()
			|| src[position..position + END_OF_SLICE_MARKER_SIZE] != END_OF_SLICE_MARKER
		{
			return Err(SifError::MissingEndMarker { position });
		}
		position += END_OF_SLICE_MARKER_SIZE;
		slices.push(SliceInfo {
			flags,
			height: slice_height as u32,
			size,
		});
	}
	Ok(ImageInfo {
		width,
		height,
		channels,
		slices,
	})
}
