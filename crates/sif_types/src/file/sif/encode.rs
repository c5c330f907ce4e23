//! SIF image compression.
//!
//! A slice is compressed in a single pass over the tile scan. Each pixel
//! is predicted from the previous one (optionally refined from the row
//! above and decorrelated across channels), classified by the size of
//! its residual, and emitted either into the pending run cache or as a
//! standalone opcode. The image layer splits the raster into slices whose
//! worst-case payload fits a 32-bit size field and frames each one with a
//! header and an end marker.

use crate::file::SifError;

use super::constants::{END_OF_SLICE_MARKER, END_OF_SLICE_MARKER_SIZE, MAGIC};
use super::context::{Dictionary, SlidingWindow, blend};
use super::layout::DeltaLayout;
use super::pixel::{Delta, Pixel};
use super::run::RunCache;
use super::traversal::{ScanPos, TileScan};
use super::{ContentDescriptor, Flags, Predictor, opcodes, uleb128};

/// Worst-case payload for one slice: four bytes per pixel plus the end
/// marker.
pub(crate) fn compress_slice_bound(width: u32, height: u32, channels: u8) -> u64 {
	u64::from(width) * u64::from(height) * (u64::from(channels) + 1)
		+ END_OF_SLICE_MARKER_SIZE as u64
}

/// Worst-case output size for a whole image, assuming the splitter
/// degrades to one row per slice.
pub fn compress_image_bound(image: &ContentDescriptor) -> u64 {
	let file_header = 2 + 2 * uleb128::MAX_BYTES as u64;
	let slice_header = 4 + 1 + uleb128::MAX_BYTES as u64;
	file_header
		+ u64::from(image.height)
			* (slice_header + compress_slice_bound(image.width, 1, image.channels))
}

/// Tallest slice starting at `remaining` rows whose worst-case payload
/// still fits the 32-bit slice size field.
pub(crate) fn split_slice_height(width: u32, remaining: u32, channels: u8) -> u32 {
	let mut height = remaining;
	while compress_slice_bound(width, height, channels) > u64::from(u32::MAX) {
		height -= 1;
	}
	height
}

struct SliceEncoder<'a> {
	layout: DeltaLayout,
	predictor: Predictor,
	use_2d: bool,
	dict: Dictionary,
	window: SlidingWindow,
	cache: RunCache,
	prev: Pixel,
	dst: &'a mut Vec<u8>,
}

impl<'a> SliceEncoder<'a> {
	fn new(flags: Flags, dst: &'a mut Vec<u8>) -> Self {
		let predictor = flags.predictor();
		Self {
			layout: DeltaLayout::new(flags.delta_bias()),
			predictor,
			use_2d: predictor != Predictor::Direct && flags.use_2d_prediction(),
			dict: Dictionary::new(flags.use_contextual_dict()),
			window: SlidingWindow::new(),
			cache: RunCache::new(),
			prev: Pixel::ZERO,
			dst,
		}
	}

	/// Prediction residual for `pixel` at scan position `pos`.
	///
	/// The anchor channel predicts from the previous pixel (smoothed with
	/// the row above when 2-D prediction applies) and its residual is
	/// folded into the other two channels' predictions before their
	/// residuals are taken.
	fn compute_delta(&self, pixel: Pixel, pos: ScanPos) -> Delta {
		let mut prediction = self.prev;
		match self.predictor {
			Predictor::Direct => {}
			Predictor::DecorrelateFromRed => {
				if self.use_2d && pos.y > 0 {
					prediction.r = blend(prediction.r, self.window.above(pos.x).r);
				}
				let anchor = pixel.r.wrapping_sub(prediction.r);
				prediction.g = prediction.g.wrapping_add(anchor);
				prediction.b = prediction.b.wrapping_add(anchor);
			}
			Predictor::DecorrelateFromGreen => {
				if self.use_2d && pos.y > 0 {
					prediction.g = blend(prediction.g, self.window.above(pos.x).g);
				}
				let anchor = pixel.g.wrapping_sub(prediction.g);
				prediction.r = prediction.r.wrapping_add(anchor);
				prediction.b = prediction.b.wrapping_add(anchor);
			}
			Predictor::DecorrelateFromBlue => {
				if self.use_2d && pos.y > 0 {
					prediction.b = blend(prediction.b, self.window.above(pos.x).b);
				}
				let anchor = pixel.b.wrapping_sub(prediction.b);
				prediction.r = prediction.r.wrapping_add(anchor);
				prediction.g = prediction.g.wrapping_add(anchor);
			}
		}
		Delta {
			r: pixel.r.wrapping_sub(prediction.r) as i8,
			g: pixel.g.wrapping_sub(prediction.g) as i8,
			b: pixel.b.wrapping_sub(prediction.b) as i8,
		}
	}

	fn encode_pixel(&mut self, pixel: Pixel, pos: ScanPos, last_pixel: usize) {
		let delta = self.compute_delta(pixel, pos);
		if self.layout.in_small_range(delta) {
			self.cache.push(self.layout.pack_run_delta(delta));
			if self.cache.is_full() || pos.offset == last_pixel {
				self.cache.flush(self.dst);
			}
		} else {
			if !self.cache.is_empty() {
				self.cache.flush(self.dst);
			}
			let slot = self.dict.slot(pixel, self.prev);
			if self.dict.get(slot) == pixel {
				self.dst.push(opcodes::REDUCED_OFFSET | (slot as u8 & 0x3F));
			} else {
				self.dict.insert(slot, pixel);
				self.encode_delta(delta);
			}
		}
		self.prev = pixel;
		if self.use_2d {
			self.window.push(pixel);
		}
	}

	fn encode_delta(&mut self, delta: Delta) {
		if DeltaLayout::fits_15b(delta) {
			self.dst.extend_from_slice(&DeltaLayout::pack_15b(delta));
		} else if self.layout.fits_20b(delta) {
			self.dst.extend_from_slice(&self.layout.pack_20b(delta));
		} else {
			let tag_index = self.dst.len();
			let mut tag = opcodes::MASK_DELTA_8BPC;
			self.dst.push(tag);
			if delta.r != 0 {
				self.dst.push(delta.r as u8);
				tag |= 0x04;
			}
			if delta.g != 0 {
				self.dst.push(delta.g as u8);
				tag |= 0x02;
			}
			if delta.b != 0 {
				self.dst.push(delta.b as u8);
				tag |= 0x01;
			}
			debug_assert!(tag & 0x07 > 0);
			self.dst[tag_index] = tag;
		}
	}
}

/// Compresses one slice raster into `dst`, appending the opcode stream
/// without the slice header or end marker.
pub(crate) fn compress_slice(
	width: u32,
	height: u32,
	flags: Flags,
	src: &[u8],
	dst: &mut Vec<u8>,
) {
	let scan = TileScan::new(width as usize, height as usize, flags.tile_height());
	let last_pixel = scan.last_pixel_offset();
	let mut encoder = SliceEncoder::new(flags, dst);
	for pos in scan {
		let pixel = Pixel {
			r: src[pos.offset],
			g: src[pos.offset + 1],
			b: src[pos.offset + 2],
		};
		encoder.encode_pixel(pixel, pos, last_pixel);
	}
	if !encoder.cache.is_empty() {
		encoder.cache.flush(encoder.dst);
	}
}

/// Compresses a row-major RGB raster into a complete SIF byte stream.
///
/// The descriptor's flags apply to every slice. Fails on an invalid
/// descriptor or when `src` holds fewer bytes than the raster needs.
pub fn compress_image(image: &ContentDescriptor, src: &[u8]) -> Result<Vec<u8>, SifError> {
	image.validate()?;
	let raster = image.raster_size() as usize;
	if src.len() < raster {
		return Err(SifError::InsufficientData {
			expected: raster,
			actual: src.len(),
		});
	}

	let mut dst = Vec::with_capacity(compress_image_bound(image) as usize);
	dst.push((MAGIC >> 8) as u8);
	dst.push(MAGIC as u8 | image.channels);
	uleb128::write(&mut dst, image.width);
	uleb128::write(&mut dst, image.height);

	let stride = image.width as usize * usize::from(image.channels);
	let mut total_height = 0u32;
	let mut offset = 0usize;
	while total_height < image.height {
		let slice_height =
			split_slice_height(image.width, image.height - total_height, image.channels);

		let size_index = dst.len();
		dst.extend_from_slice(&[0u8; 4]);
		dst.push(image.flags.bits());
		uleb128::write(&mut dst, slice_height);

		let payload_start = dst.len();
		compress_slice(image.width, slice_height, image.flags, &src[offset..], &mut dst);
		let payload_size = (dst.len() - payload_start) as u32;
		dst[size_index..size_index + 4].copy_from_slice(&payload_size.to_le_bytes());
		dst.extend_from_slice(&END_OF_SLICE_MARKER);

		offset += stride * slice_height as usize;
		total_height += slice_height;
	}
	Ok(dst)
}
