//! This crate provides the core data types and codec implementation for
//! the `sif-rs` project.
//!
//! # File Formats
//!
//! - **SIF**: a lossless single-pass compressor for 3-channel 8-bit
//!   raster images, framed as independently coded horizontal slices
//!
//! # Examples
//!
//! ```rust
//! use sif_types::file::sif::{compress_image, decompress_image, ContentDescriptor, Flags};
//!
//! let descriptor = ContentDescriptor::new(2, 2, Flags::default());
//! let pixels = vec![0u8; 2 * 2 * 3];
//! let encoded = compress_image(&descriptor, &pixels).unwrap();
//! let (decoded_descriptor, decoded) = decompress_image(&encoded).unwrap();
//! assert_eq!(decoded_descriptor.width, 2);
//! assert_eq!(decoded, pixels);
//! ```

pub mod file;
pub mod prelude;

// Re-export commonly used types at crate root for convenience
pub use file::{
	ContentDescriptor, DeltaBias, Flags, ImageInfo, Predictor, SifError, SifFile, SliceInfo,
};
