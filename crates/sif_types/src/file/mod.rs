//! File format support for the `sif-rs` project.

mod error;

pub mod sif;

// Re-export unified error type
pub use error::SifError;

// Re-export main file types
pub use sif::{
	ContentDescriptor, DeltaBias, File as SifFile, Flags, ImageInfo, Predictor, SliceInfo,
};
