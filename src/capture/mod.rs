pub mod frame;
pub mod sensor;

use std::sync::Arc;

use crate::calibration::CalibrationRegistry;
use crate::error::Result;
use crate::pipeline::FrameCache;
use crate::stream::StreamType;

pub use frame::TimeStampedFrame;
pub use sensor::RgbdSensor;

/// Hardware side of a sensor: owns the device handle and produces frames.
pub trait SensorDriver: Send {
    fn camera_model(&self) -> &str;

    fn camera_id(&self) -> &str;

    /// Writes factory calibration into `calibration`. Called once, after identity
    /// extrinsics have been seeded.
    fn load_calibration(&mut self, _calibration: &CalibrationRegistry) -> Result<()> {
        Ok(())
    }

    /// Begins streaming `streams`; every capture cycle goes out through `sink`.
    fn start(&mut self, streams: &[StreamType], sink: FrameSink) -> Result<()>;

    fn stop(&mut self) -> Result<()>;
}

/// Handle a driver publishes capture cycles through.
#[derive(Clone)]
pub struct FrameSink {
    cache: Arc<FrameCache>,
}

impl FrameSink {
    pub fn new(cache: Arc<FrameCache>) -> Self {
        Self { cache }
    }

    /// Publishes one capture cycle; see [`FrameCache::update`].
    pub fn publish<I>(&self, batch: I)
    where
        I: IntoIterator<Item = (StreamType, TimeStampedFrame)>,
    {
        self.cache.update(batch);
    }
}
