//! `sif-rs` is a lossless image codec for 3-channel 8-bit rasters with
//! streaming-friendly slice framing, plus a small command-line tool for
//! converting common raster formats to and from SIF.
//!
//! The codec itself lives in the [`sif_types`] crate; this crate
//! re-exports it for convenience.

pub use sif_types::*;

/// `use sif_rs::prelude::*;` to import commonly used items.
pub use sif_types::prelude;
