use std::sync::Arc;

use crate::image::ImageBuffer;

/// Latest image of one stream plus the producer's timestamp.
///
/// Cloning shares the buffer; a clone stays valid after the cache slot it came from
/// has been replaced.
#[derive(Debug, Clone, Default)]
pub struct TimeStampedFrame {
    pub image: Option<Arc<ImageBuffer>>,
    pub timestamp: u64,
}

impl TimeStampedFrame {
    pub fn new(image: ImageBuffer, timestamp: u64) -> Self {
        Self {
            image: Some(Arc::new(image)),
            timestamp,
        }
    }

    /// No image, timestamp 0.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_none()
    }
}
