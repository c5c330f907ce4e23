//! Prelude module for `sif_types`.
//!
//! This module provides a convenient way to import commonly used types,
//! functions and constants.
//!
//! # Examples
//!
//! ```rust
//! use sif_types::prelude::*;
//!
//! let descriptor = ContentDescriptor::new(1, 1, Flags::default());
//! let encoded = compress_image(&descriptor, &[255, 0, 0]).unwrap();
//! let file = SifFile::from_bytes(&encoded).unwrap();
//! assert_eq!(file.pixels(), &[255, 0, 0]);
//! ```

// File module types
#[doc(inline)]
pub use crate::file::{
	// Error type
	SifError,

	// SIF types
	ContentDescriptor,
	DeltaBias,
	Flags,
	ImageInfo,
	Predictor,
	SifFile,
	SliceInfo,
};

// Codec entry points
#[doc(inline)]
pub use crate::file::sif::{compress_image, compress_image_bound, decompress_image, probe};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
