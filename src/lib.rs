pub mod calibration;
pub mod camera;
pub mod capture;
pub mod error;
pub mod image;
pub mod pipeline;
pub mod stream;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ::config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

pub use calibration::CalibrationRegistry;
pub use camera::{CameraModel, DistortionModel, Extrinsics};
pub use capture::{FrameSink, RgbdSensor, SensorDriver, TimeStampedFrame};
pub use error::{Error, Result};
pub use image::ImageBuffer;
pub use pipeline::{align_depth_to_color, FrameCache};
pub use stream::StreamType;

/// System configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sensor: SensorConfig,
    pub calibration: CalibrationConfig,
    pub align: AlignConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub streams: Vec<StreamType>,
    /// Meters per raw depth unit.
    pub depth_units: f32,
    /// Device emits depth already aligned to rectified color.
    pub hardware_depth_registration: bool,
    /// Depth is aligned to color on the host.
    pub software_depth_registration: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            streams: vec![StreamType::Color, StreamType::Depth],
            depth_units: 0.001,
            hardware_depth_registration: false,
            software_depth_registration: false,
        }
    }
}

impl SensorConfig {
    /// Stream carrying depth for this configuration.
    pub fn depth_stream(&self) -> StreamType {
        if self.hardware_depth_registration {
            StreamType::RectifiedColorAlignedDepth
        } else {
            StreamType::Depth
        }
    }

    /// Configured streams with depth replaced by [`depth_stream`](Self::depth_stream);
    /// color is added when depth is registered on the host.
    pub fn requested_streams(&self) -> Vec<StreamType> {
        let mut streams: Vec<_> = self
            .streams
            .iter()
            .map(|stream| match stream {
                StreamType::Depth => self.depth_stream(),
                other => *other,
            })
            .collect();
        if self.software_depth_registration {
            streams.push(StreamType::Color);
        }
        streams.sort();
        streams.dedup();
        streams
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Keyed by stream frame name, e.g. `depth`.
    pub intrinsics: BTreeMap<StreamType, CameraModel>,
    pub extrinsics: Vec<ExtrinsicsConfig>,
}

/// Transform from `from`'s camera frame into `to`'s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtrinsicsConfig {
    pub from: StreamType,
    pub to: StreamType,
    /// Row-major.
    pub rotation: [[f32; 3]; 3],
    /// Meters.
    pub translation: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    pub depth_path: PathBuf,
    pub color_path: PathBuf,
    pub output_path: PathBuf,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            depth_path: "depth.png".into(),
            color_path: "color.png".into(),
            output_path: "aligned_depth.png".into(),
        }
    }
}

impl Config {
    /// Reads a TOML file, then applies `RGBD__SECTION__KEY` environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(File::from(path.as_ref()).format(FileFormat::Toml))
            .add_source(Environment::with_prefix("RGBD").separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Parses TOML text without consulting the environment.
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
