//! Command-line utility for the SIF image codec.
//!
//! Converts between SIF and any raster format the `image` crate can
//! read or write, and inspects the slice structure of existing files.

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use serde::Serialize;
use sif_rs::prelude::*;

#[derive(Parser)]
#[command(name = "sif", version, about = "Convert images to and from the SIF format")]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Compress a raster image into a SIF file
	Encode {
		/// Input image, any format the `image` crate can read
		input: PathBuf,
		/// Output SIF file
		output: PathBuf,
		/// Prediction model
		#[arg(long, value_enum, default_value = "direct")]
		predictor: PredictorArg,
		/// Enable 2-D prediction (effective with a decorrelating predictor)
		#[arg(long)]
		two_d: bool,
		/// Choose dictionary buckets from the previous pixel's luminance
		#[arg(long)]
		contextual_dict: bool,
		/// Channel that gets the narrow run range
		#[arg(long, value_enum, default_value = "red")]
		bias: BiasArg,
		/// Tile height code: 0 to 3 for heights 15, 31, 63, 127
		#[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(..=3))]
		tile_height_code: u8,
	},
	/// Decompress a SIF file into a raster image
	Decode {
		/// Input SIF file
		input: PathBuf,
		/// Output image, format chosen by extension
		output: PathBuf,
	},
	/// Print the structure of a SIF file
	Info {
		/// Input SIF file
		input: PathBuf,
		/// Emit machine-readable JSON
		#[arg(long)]
		json: bool,
	},
}

#[derive(Clone, Copy, ValueEnum)]
enum PredictorArg {
	Direct,
	Red,
	Green,
	Blue,
}

impl From<PredictorArg> for Predictor {
	fn from(arg: PredictorArg) -> Self {
		match arg {
			PredictorArg::Direct => Predictor::Direct,
			PredictorArg::Red => Predictor::DecorrelateFromRed,
			PredictorArg::Green => Predictor::DecorrelateFromGreen,
			PredictorArg::Blue => Predictor::DecorrelateFromBlue,
		}
	}
}

#[derive(Clone, Copy, ValueEnum)]
enum BiasArg {
	Red,
	Green,
	Blue,
}

impl From<BiasArg> for DeltaBias {
	fn from(arg: BiasArg) -> Self {
		match arg {
			BiasArg::Red => DeltaBias::Red,
			BiasArg::Green => DeltaBias::Green,
			BiasArg::Blue => DeltaBias::Blue,
		}
	}
}

fn main() {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	let result = match cli.command {
		Command::Encode {
			input,
			output,
			predictor,
			two_d,
			contextual_dict,
			bias,
			tile_height_code,
		} => {
			let flags = Flags::default()
				.with_predictor(predictor.into())
				.with_2d_prediction(two_d)
				.with_contextual_dict(contextual_dict)
				.with_delta_bias(bias.into())
				.with_tile_height_code(tile_height_code);
			encode(&input, &output, flags)
		}
		Command::Decode { input, output } => decode(&input, &output),
		Command::Info { input, json } => print_info(&input, json),
	};

	if let Err(e) = result {
		error!("{e}");
		std::process::exit(1);
	}
}

fn encode(input: &Path, output: &Path, flags: Flags) -> Result<(), Box<dyn Error>> {
	let source = image::open(input)?.to_rgb8();
	let (width, height) = source.dimensions();
	let descriptor = ContentDescriptor::new(width, height, flags);
	let pixels = source.into_raw();
	let raw_size = pixels.len();

	let file = SifFile::new(descriptor, pixels)?;
	let written = file.save(output)?;

	info!(
		"{}: {} -> {} bytes ({:.1}% of raw)",
		output.display(),
		raw_size,
		written,
		written as f64 * 100.0 / raw_size as f64
	);
	Ok(())
}

fn decode(input: &Path, output: &Path) -> Result<(), Box<dyn Error>> {
	let file = SifFile::open(input)?;
	let descriptor = *file.descriptor();
	let raster = image::RgbImage::from_raw(descriptor.width, descriptor.height, file.into_pixels())
		.ok_or("decoded raster does not match its descriptor")?;
	raster.save(output)?;

	info!("{}: {}", output.display(), descriptor);
	Ok(())
}

#[derive(Serialize)]
struct InfoReport {
	width: u32,
	height: u32,
	channels: u8,
	slices: Vec<SliceReport>,
}

#[derive(Serialize)]
struct SliceReport {
	height: u32,
	size: u32,
	flags: u8,
	tile_height: usize,
	predictor: String,
	two_d_prediction: bool,
	contextual_dict: bool,
	delta_bias: String,
}

fn print_info(input: &Path, json: bool) -> Result<(), Box<dyn Error>> {
	let data = std::fs::read(input)?;
	let image_info = probe(&data)?;

	if json {
		let report = InfoReport {
			width: image_info.width,
			height: image_info.height,
			channels: image_info.channels,
			slices: image_info
				.slices
				.iter()
				.map(|slice| SliceReport {
					height: slice.height,
					size: slice.size,
					flags: slice.flags.bits(),
					tile_height: slice.flags.tile_height(),
					predictor: format!("{:?}", slice.flags.predictor()),
					two_d_prediction: slice.flags.use_2d_prediction(),
					contextual_dict: slice.flags.use_contextual_dict(),
					delta_bias: format!("{:?}", slice.flags.delta_bias()),
				})
				.collect(),
		};
		println!("{}", serde_json::to_string_pretty(&report)?);
		return Ok(());
	}

	info!(
		"{}: {}x{}, {} channels, {} slice(s)",
		input.display(),
		image_info.width,
		image_info.height,
		image_info.channels,
		image_info.slices.len()
	);
	for (index, slice) in image_info.slices.iter().enumerate() {
		info!(
			"  slice {}: {} rows, {} bytes, {}",
			index, slice.height, slice.size, slice.flags
		);
	}
	Ok(())
}
