//! KWZ animation CLI utility.
//!
//! Provides three subcommands:
//! - `info`: print the header, chunk checksums and per-frame metadata.
//! - `verify`: check checksums and derived filenames, then decode every frame.
//! - `render`: decode frames and write them as composited PNG images.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example kwz_utils info animation.kwz
//! cargo run --example kwz_utils info animation.kwz --json
//! cargo run --example kwz_utils verify animation.kwz --strict
//! cargo run --example kwz_utils render animation.kwz out/ --frame 3
//! ```

use std::{fs, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use image::{Rgba, RgbaImage};
use log::{error, info, warn};
use kwz_rs::prelude::file::kwz::{
	AuthorRole, Color, ColorRole, DecodeCache, File as KwzFile, FrameMeta, FrameRaster, ParseConfig,
};

fn main() -> Result<()> {
	// Initialize logger with default level set to info if RUST_LOG is not set
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	match cli.command {
		Command::Info(opts) => run_info(opts),
		Command::Verify(opts) => run_verify(opts),
		Command::Render(opts) => run_render(opts),
	}
}

#[derive(Parser)]
#[command(name = "kwz_utils")]
#[command(author = "kwz-rs project")]
#[command(version)]
#[command(about = "Inspect, verify and render .KWZ animation files", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Print header, checksums and frame metadata
	Info(InfoArgs),
	/// Verify checksums and filenames, then decode every frame
	Verify(VerifyArgs),
	/// Render frames to PNG
	Render(RenderArgs),
}

#[derive(Args)]
struct InfoArgs {
	/// Path to a .KWZ file
	#[arg(value_name = "FILE")]
	file: PathBuf,

	/// Print machine-readable JSON instead of text
	#[arg(long, default_value_t = false)]
	json: bool,

	/// Print every frame's metadata record
	#[arg(short, long, default_value_t = false)]
	verbose: bool,
}

#[derive(Args)]
struct VerifyArgs {
	/// Path to a .KWZ file
	#[arg(value_name = "FILE")]
	file: PathBuf,

	/// Reject checksum mismatches and missing frame chunks while parsing
	#[arg(long, default_value_t = false)]
	strict: bool,
}

#[derive(Args)]
struct RenderArgs {
	/// Path to a .KWZ file
	#[arg(value_name = "FILE")]
	file: PathBuf,

	/// Output directory for the PNG files
	#[arg(value_name = "OUT_DIR")]
	output: PathBuf,

	/// Only render this frame
	#[arg(short, long, value_name = "INDEX")]
	frame: Option<usize>,
}

fn run_info(opts: InfoArgs) -> Result<()> {
	let kwz = KwzFile::open(&opts.file)
		.with_context(|| format!("Failed to open {}", opts.file.display()))?;

	if opts.json {
		let json = serde_json::json!({
			"header": kwz.header(),
			"checksums": kwz.checksums(),
			"frames": kwz.meta(),
			"unknown_chunk": kwz.unknown_chunk().map(hex::encode),
		});
		println!("{}", serde_json::to_string_pretty(&json)?);
		return Ok(());
	}

	println!("{}", kwz.header());
	for role in AuthorRole::ALL {
		println!("{role} author id: {}", hex::encode(kwz.header().author_id(role)));
	}

	println!("\nChunks:");
	for checksum in kwz.checksums() {
		let status = if checksum.is_valid() {
			"ok"
		} else {
			"MISMATCH"
		};
		println!("  {:<10} crc {:#010X} {status}", checksum.kind.to_string(), checksum.stored);
	}
	if let Some(thumbnail) = kwz.thumbnail() {
		println!("  Thumbnail: {} bytes", thumbnail.data().len());
	}
	if let Some(frame_data) = kwz.frame_data() {
		println!("  Frame data: {} bytes", frame_data.payload().len());
	}
	if let Some(tag) = kwz.unknown_chunk() {
		println!("  Stopped at unknown chunk {}", hex::encode(tag));
	}

	if opts.verbose
		&& let Some(meta) = kwz.meta()
	{
		println!("\nFrames:");
		for (index, entry) in meta.iter().enumerate() {
			print_frame(index, entry);
		}
	}

	Ok(())
}

fn print_frame(index: usize, entry: &FrameMeta) {
	println!(
		"  #{index:<4} sizes {:?} depths {:?} flags {:#010X} diff {:03b} paper {} prev {}",
		entry.layer_sizes,
		entry.layer_depths,
		entry.flags.bits(),
		entry.flags.diffing_mask(),
		entry.flags.paper_color_index(),
		entry.flags.based_on_prev_frame(),
	);
}

fn run_verify(opts: VerifyArgs) -> Result<()> {
	let config = if opts.strict {
		ParseConfig::strict()
	} else {
		ParseConfig::lenient()
	};
	let kwz = KwzFile::open_with_config(&opts.file, config)
		.with_context(|| format!("Failed to parse {}", opts.file.display()))?;

	let mut problems = 0usize;

	if let Err(err) = kwz.verify_checksums() {
		error!("✗ {err}");
		problems += 1;
	} else {
		info!("✓ Checksums match");
	}

	if kwz.header().filenames_consistent()? {
		info!("✓ Filenames match author ids and timestamps");
	} else {
		error!("✗ Filenames do not match author ids and timestamps");
		problems += 1;
	}

	if let Some(tag) = kwz.unknown_chunk() {
		warn!("Parsing stopped at unknown chunk {}", hex::encode(tag));
	}

	let decoder = kwz.decoder()?;
	let mut decoded = 0usize;
	for (index, frame) in decoder.frames().enumerate() {
		match frame {
			Ok(_) => decoded += 1,
			Err(err) => {
				error!("✗ Frame {index}: {err}");
				problems += 1;
			}
		}
	}
	info!("✓ Decoded {decoded}/{} frames", decoder.frame_count());

	if problems > 0 {
		bail!("{problems} problem(s) found in {}", opts.file.display());
	}
	Ok(())
}

fn run_render(opts: RenderArgs) -> Result<()> {
	let kwz = KwzFile::open(&opts.file)
		.with_context(|| format!("Failed to open {}", opts.file.display()))?;
	let meta = kwz.meta().context("File has no frame metadata")?;
	let decoder = kwz.decoder()?;

	let frames: Vec<usize> = match opts.frame {
		Some(index) if index >= decoder.frame_count() => {
			bail!("Frame {index} out of range (frame count: {})", decoder.frame_count())
		}
		Some(index) => vec![index],
		None => (0..decoder.frame_count()).collect(),
	};

	fs::create_dir_all(&opts.output)?;
	let mut cache = DecodeCache::new();
	for index in frames {
		let raster = decoder.decode_frame(&mut cache, index)?;
		let entry = meta.get(index).context("Missing metadata record")?;
		let img = composite(raster, entry);

		let path = opts.output.join(format!("frame_{index:04}.png"));
		img.save(&path).with_context(|| format!("Failed to save {}", path.display()))?;
		info!("✓ Image saved: {}", path.display());
	}

	Ok(())
}

/// Paints the paper color, then every layer back to front with alpha-over.
fn composite(raster: &FrameRaster, entry: &FrameMeta) -> RgbaImage {
	let paper = entry.color(ColorRole::Paper).unwrap_or_default();
	let mut img =
		RgbaImage::from_pixel(FrameRaster::WIDTH as u32, FrameRaster::HEIGHT as u32, Rgba(paper.to_array()));

	for layer in entry.layer_draw_order() {
		let Some(pixels) = raster.layer(layer) else {
			continue;
		};
		let colors = [1u8, 2].map(|value| {
			ColorRole::for_layer_pixel(layer, value).and_then(|role| entry.color(role))
		});

		for (i, &value) in pixels.iter().enumerate() {
			let Some(Some(color)) = value.checked_sub(1).and_then(|v| colors.get(usize::from(v))) else {
				continue;
			};
			let x = (i % FrameRaster::WIDTH) as u32;
			let y = (i / FrameRaster::WIDTH) as u32;
			let dst = img.get_pixel_mut(x, y);
			*dst = blend(*color, *dst);
		}
	}

	img
}

/// Straight alpha-over of `src` onto `dst`.
fn blend(src: Color, dst: Rgba<u8>) -> Rgba<u8> {
	let alpha = u32::from(src.a);
	if alpha == 255 {
		return Rgba(src.to_array());
	}
	let inverse = 255 - alpha;
	let dst_alpha = u32::from(dst[3]) * inverse / 255;
	let out_alpha = alpha + dst_alpha;
	if out_alpha == 0 {
		return Rgba([0, 0, 0, 0]);
	}
	let channel = |s: u8, d: u8| ((u32::from(s) * alpha + u32::from(d) * dst_alpha) / out_alpha) as u8;
	Rgba([
		channel(src.r, dst[0]),
		channel(src.g, dst[1]),
		channel(src.b, dst[2]),
		out_alpha as u8,
	])
}
