//! RGB-D device front end tying a driver to the frame cache and calibration

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use super::{FrameSink, SensorDriver, TimeStampedFrame};
use crate::calibration::CalibrationRegistry;
use crate::error::{Error, Result};
use crate::pipeline::{align_depth_to_color, FrameCache};
use crate::stream::StreamType;

pub struct RgbdSensor<D: SensorDriver> {
    driver: D,
    supported: BTreeSet<StreamType>,
    enabled: Vec<StreamType>,
    cache: Arc<FrameCache>,
    calibration: Arc<CalibrationRegistry>,
}

impl<D: SensorDriver> RgbdSensor<D> {
    /// `supported` must name at least one depth and one color stream.
    pub fn new(supported: &[StreamType], mut driver: D) -> Result<Self> {
        let supported: BTreeSet<_> = supported.iter().copied().collect();
        if !supported.iter().any(|s| s.is_depth()) {
            return Err(Error::Configuration(
                "a sensor must support at least one depth stream".into(),
            ));
        }
        if !supported.iter().any(|s| s.is_color()) {
            return Err(Error::Configuration(
                "a sensor must support at least one color stream".into(),
            ));
        }

        let calibration = Arc::new(CalibrationRegistry::new());
        let streams: Vec<_> = supported.iter().copied().collect();
        calibration.seed_identity(&streams);
        driver.load_calibration(&calibration)?;

        info!(
            "{} {} supports {:?}",
            driver.camera_model(),
            driver.camera_id(),
            streams
        );

        Ok(Self {
            driver,
            supported,
            enabled: Vec::new(),
            cache: Arc::new(FrameCache::new()),
            calibration,
        })
    }

    pub fn start(&mut self, streams: &[StreamType]) -> Result<()> {
        if let Some(stream) = streams.iter().find(|s| !self.supports(**s)) {
            return Err(Error::Configuration(format!(
                "{} does not support {stream}",
                self.driver.camera_model()
            )));
        }

        let mut enabled = streams.to_vec();
        enabled.sort();
        enabled.dedup();

        self.cache.reset(&enabled);
        self.driver
            .start(&enabled, FrameSink::new(Arc::clone(&self.cache)))?;
        self.enabled = enabled;

        for stream in &self.enabled {
            let model = self.calibration.intrinsics(*stream)?;
            info!("{} intrinsics: {}", stream, model);
        }
        for from in &self.enabled {
            for to in &self.enabled {
                if from == to {
                    continue;
                }
                if let Ok(extrinsics) = self.calibration.extrinsics(*from, *to) {
                    debug!("{} -> {} extrinsics: {}", from, to, extrinsics);
                }
            }
        }

        info!("{} started", self.driver.camera_model());
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        self.driver.stop()?;
        self.cache.clear();
        self.enabled.clear();
        info!("{} stopped", self.driver.camera_model());
        Ok(())
    }

    pub fn camera_model(&self) -> &str {
        self.driver.camera_model()
    }

    pub fn camera_id(&self) -> &str {
        self.driver.camera_id()
    }

    pub fn supports(&self, stream: StreamType) -> bool {
        self.supported.contains(&stream)
    }

    pub fn supported_streams(&self) -> Vec<StreamType> {
        self.supported.iter().copied().collect()
    }

    pub fn enabled_streams(&self) -> &[StreamType] {
        &self.enabled
    }

    pub fn is_enabled(&self, stream: StreamType) -> bool {
        self.enabled.contains(&stream)
    }

    pub fn latest(&self, stream: StreamType) -> TimeStampedFrame {
        self.cache.latest(stream)
    }

    pub fn calibration(&self) -> &Arc<CalibrationRegistry> {
        &self.calibration
    }

    pub fn cache(&self) -> &Arc<FrameCache> {
        &self.cache
    }

    /// Aligns the latest `depth_stream` frame to the latest color frame.
    ///
    /// The result carries the depth frame's timestamp.
    pub fn register_depth_to_color(&self, depth_stream: StreamType) -> Result<TimeStampedFrame> {
        if !depth_stream.is_depth() {
            return Err(Error::Configuration(format!(
                "{depth_stream} is not a depth stream"
            )));
        }

        let color = self.latest(StreamType::Color);
        let depth = self.latest(depth_stream);
        let (Some(color_image), Some(depth_image)) = (&color.image, &depth.image) else {
            return Err(Error::Configuration(format!(
                "no {} and {depth_stream} frames to register",
                StreamType::Color
            )));
        };

        let color_model = self.calibration.intrinsics(StreamType::Color)?;
        let depth_model = self.calibration.intrinsics(depth_stream)?;
        let depth_to_color = self.calibration.extrinsics(depth_stream, StreamType::Color)?;

        let aligned = align_depth_to_color(
            &color_model,
            &depth_model,
            &depth_to_color,
            color_image,
            depth_image,
            depth_stream,
        )?;
        Ok(TimeStampedFrame::new(aligned, depth.timestamp))
    }
}
