//! End-to-end tests exercising the public `sif-rs` surface.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sif_rs::prelude::*;

fn checker_raster(width: u32, height: u32) -> Vec<u8> {
	let mut pixels = Vec::with_capacity((width * height * 3) as usize);
	for y in 0..height {
		for x in 0..width {
			if (x + y) % 2 == 0 {
				pixels.extend_from_slice(&[255, 255, 255]);
			} else {
				pixels.extend_from_slice(&[0, 0, 0]);
			}
		}
	}
	pixels
}

#[test]
fn checkerboard_roundtrips_across_predictors() {
	let pixels = checker_raster(40, 33);
	for predictor in [
		Predictor::Direct,
		Predictor::DecorrelateFromRed,
		Predictor::DecorrelateFromGreen,
		Predictor::DecorrelateFromBlue,
	] {
		let flags = Flags::default().with_predictor(predictor).with_2d_prediction(true);
		let descriptor = ContentDescriptor::new(40, 33, flags);
		let encoded = compress_image(&descriptor, &pixels).unwrap();
		let (_, decoded) = decompress_image(&encoded).unwrap();
		assert_eq!(decoded, pixels, "predictor {predictor:?}");
	}
}

#[test]
fn photographic_noise_roundtrips_with_every_tool_enabled() {
	let mut rng = SmallRng::seed_from_u64(42);
	let width = 129u32;
	let height = 65u32;
	// Low-amplitude noise over a gradient, close to photographic content.
	let mut pixels = Vec::with_capacity((width * height * 3) as usize);
	for y in 0..height {
		for x in 0..width {
			let base = (x + 2 * y) as u8;
			pixels.push(base.wrapping_add(rng.random::<u8>() & 7));
			pixels.push(base.wrapping_add(rng.random::<u8>() & 7));
			pixels.push(base.wrapping_add(rng.random::<u8>() & 7));
		}
	}
	let flags = Flags::default()
		.with_predictor(Predictor::DecorrelateFromGreen)
		.with_2d_prediction(true)
		.with_contextual_dict(true)
		.with_delta_bias(DeltaBias::Green)
		.with_tile_height_code(1);
	let descriptor = ContentDescriptor::new(width, height, flags);
	let encoded = compress_image(&descriptor, &pixels).unwrap();
	let (decoded_descriptor, decoded) = decompress_image(&encoded).unwrap();
	assert_eq!(decoded_descriptor.width, width);
	assert_eq!(decoded_descriptor.height, height);
	assert_eq!(decoded, pixels);
}

#[test]
fn compressed_size_stays_under_the_published_bound() {
	let descriptor = ContentDescriptor::new(100, 100, Flags::default());
	let pixels: Vec<u8> = (0..100 * 100 * 3).map(|i| (i % 255) as u8).collect();
	let encoded = compress_image(&descriptor, &pixels).unwrap();
	assert!((encoded.len() as u64) <= compress_image_bound(&descriptor));
}

#[test]
fn probe_reports_slice_structure_without_decoding() {
	let flags = Flags::default().with_delta_bias(DeltaBias::Blue);
	let descriptor = ContentDescriptor::new(50, 20, flags);
	let encoded = compress_image(&descriptor, &checker_raster(50, 20)).unwrap();
	let info = probe(&encoded).unwrap();
	assert_eq!(info.width, 50);
	assert_eq!(info.height, 20);
	assert_eq!(info.channels, 3);
	assert_eq!(info.slices.iter().map(|s| u64::from(s.height)).sum::<u64>(), 20);
	for slice in &info.slices {
		assert_eq!(slice.flags.delta_bias(), DeltaBias::Blue);
		assert!(slice.size > 0);
	}
}

#[test]
fn garbage_input_is_rejected_not_panicked() {
	let mut rng = SmallRng::seed_from_u64(99);
	// Undersized input.
	assert!(decompress_image(&[0x51, 0xF3, 0x01]).is_err());
	// Valid header followed by random bytes must error out, never panic.
	for _ in 0..64 {
		let mut stream = vec![0x51, 0xF3, 0x08, 0x08];
		stream.extend((0..40).map(|_| rng.random::<u8>()));
		let _ = decompress_image(&stream);
	}
}
