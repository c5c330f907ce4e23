//! Benchmark helper utilities for `sif-rs`
//!
//! This module generates synthetic rasters with different statistics so
//! the benchmarks exercise the codec's distinct code paths: long runs on
//! flat content, packed small deltas on gradients, and the standalone
//! delta and dictionary opcodes on noise.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A solid single-colour raster; compresses almost entirely into runs.
pub fn flat_raster(width: u32, height: u32) -> Vec<u8> {
	vec![0x30; (width * height * 3) as usize]
}

/// A smooth two-axis gradient; compresses into runs of small deltas.
pub fn gradient_raster(width: u32, height: u32) -> Vec<u8> {
	let mut pixels = Vec::with_capacity((width * height * 3) as usize);
	for y in 0..height {
		for x in 0..width {
			pixels.push((x & 0xFF) as u8);
			pixels.push((y & 0xFF) as u8);
			pixels.push(((x + y) & 0xFF) as u8);
		}
	}
	pixels
}

/// Deterministic noise; defeats prediction and stresses the standalone
/// opcodes and the dictionary.
pub fn noise_raster(width: u32, height: u32) -> Vec<u8> {
	let mut rng = SmallRng::seed_from_u64(0x51F0);
	(0..(width * height * 3) as usize).map(|_| rng.random()).collect()
}

/// Common benchmark sizes for synthetic test data
pub mod sizes {
	/// Tiny image: 64x64 (4,096 pixels)
	pub const TINY: (u32, u32) = (64, 64);
	/// Small image: 256x256 (65,536 pixels)
	pub const SMALL: (u32, u32) = (256, 256);
	/// Medium image: 512x512 (262,144 pixels)
	pub const MEDIUM: (u32, u32) = (512, 512);
	/// Large image: 1024x768 (786,432 pixels)
	pub const LARGE: (u32, u32) = (1024, 768);
	/// HD resolution: 1920x1080 (2,073,600 pixels)
	pub const XLARGE: (u32, u32) = (1920, 1080);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rasters_match_their_dimensions() {
		assert_eq!(flat_raster(64, 64).len(), 64 * 64 * 3);
		assert_eq!(gradient_raster(31, 7).len(), 31 * 7 * 3);
		assert_eq!(noise_raster(16, 16).len(), 16 * 16 * 3);
	}

	#[test]
	fn noise_is_deterministic() {
		assert_eq!(noise_raster(8, 8), noise_raster(8, 8));
	}
}
