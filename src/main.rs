//! Offline depth-to-color registration tool

use std::path::Path;

use ::image::ColorType;
use color_eyre::Result;
use tracing::{info, warn};

use rgbd::image::scale_depth_to_mm;
use rgbd::{align_depth_to_color, CalibrationRegistry, Config, ImageBuffer, StreamType};

fn main() -> Result<()> {
    // Initialize error handling and logging
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter("rgbd=debug,rgbd_align=debug")
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .init();

    info!("rgbd-align launching...");

    let path = std::env::args().nth(1).unwrap_or_else(|| "rgbd.toml".into());
    let config = if Path::new(&path).exists() {
        Config::load(&path)?
    } else {
        warn!("{} not found, using default configuration", path);
        Config::default()
    };

    let calibration = CalibrationRegistry::new();
    calibration.apply(&config.calibration);

    let depth_stream = config.sensor.depth_stream();
    let color_model = calibration.intrinsics(StreamType::Color)?;
    let depth_model = calibration.intrinsics(depth_stream)?;
    let depth_to_color = calibration.extrinsics(depth_stream, StreamType::Color)?;

    let depth_image = ::image::open(&config.align.depth_path)?.into_luma16();
    let mut depth = ImageBuffer::from_image(&depth_image.into())?;
    scale_depth_to_mm(&mut depth, config.sensor.depth_units)?;

    let color_image = ::image::open(&config.align.color_path)?.into_rgb8();
    let color = ImageBuffer::from_image(&color_image.into())?;

    info!(
        "aligning {}x{} {} onto {}x{} color",
        depth.cols(),
        depth.rows(),
        depth_stream,
        color.cols(),
        color.rows()
    );

    let aligned = align_depth_to_color(
        &color_model,
        &depth_model,
        &depth_to_color,
        &color,
        &depth,
        depth_stream,
    )?;
    aligned
        .to_image(ColorType::L16)?
        .save(&config.align.output_path)?;

    info!("wrote {}", config.align.output_path.display());
    Ok(())
}
