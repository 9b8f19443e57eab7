//! Thread-safe store of per-stream intrinsics and per-pair extrinsics.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::camera::{extrinsics_from_rows, CameraModel, Extrinsics};
use crate::error::{Error, Result};
use crate::stream::StreamType;
use crate::CalibrationConfig;

#[derive(Default)]
struct Calibration {
    intrinsics: HashMap<StreamType, CameraModel>,
    extrinsics: HashMap<(StreamType, StreamType), Extrinsics>,
}

/// Calibration shared between the producer and every consumer.
///
/// Written rarely (startup, recalibration) and read on every alignment or publish
/// cycle, so it sits behind an `RwLock` of its own, independent of the frame cache.
#[derive(Default)]
pub struct CalibrationRegistry {
    params: RwLock<Calibration>,
}

impl CalibrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Calibration> {
        self.params.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Calibration> {
        self.params.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_intrinsics(&self, stream: StreamType, model: CameraModel) {
        debug!("{} intrinsics set to {}", stream, model);
        self.write().intrinsics.insert(stream, model);
    }

    pub fn intrinsics(&self, stream: StreamType) -> Result<CameraModel> {
        self.read()
            .intrinsics
            .get(&stream)
            .copied()
            .ok_or_else(|| Error::Configuration(format!("no intrinsics for {stream}")))
    }

    pub fn has_intrinsics(&self, stream: StreamType) -> bool {
        self.read().intrinsics.contains_key(&stream)
    }

    /// Stores `extrinsics` under `(from, to)` and its inverse under `(to, from)` in one
    /// critical section.
    pub fn set_extrinsics(&self, from: StreamType, to: StreamType, extrinsics: Extrinsics) {
        if from == to && extrinsics != Extrinsics::identity() {
            warn!("non-identity extrinsics from {} to itself", from);
        }
        let mut params = self.write();
        params.extrinsics.insert((to, from), extrinsics.inverse());
        params.extrinsics.insert((from, to), extrinsics);
    }

    /// Transform taking points in `from`'s camera frame into `to`'s camera frame.
    ///
    /// A stream relative to itself is the identity unless set otherwise.
    pub fn extrinsics(&self, from: StreamType, to: StreamType) -> Result<Extrinsics> {
        match self.read().extrinsics.get(&(from, to)) {
            Some(extrinsics) => Ok(*extrinsics),
            None if from == to => Ok(Extrinsics::identity()),
            None => Err(Error::Configuration(format!(
                "no extrinsics from {from} to {to}"
            ))),
        }
    }

    pub fn has_extrinsics(&self, from: StreamType, to: StreamType) -> bool {
        from == to || self.read().extrinsics.contains_key(&(from, to))
    }

    /// Sets identity extrinsics between every pair of `streams`, overwriting what was there.
    pub fn seed_identity(&self, streams: &[StreamType]) {
        let mut params = self.write();
        for from in streams {
            for to in streams {
                params.extrinsics.insert((*from, *to), Extrinsics::identity());
            }
        }
    }

    /// Loads every value in `config`; later extrinsics entries win over earlier ones.
    pub fn apply(&self, config: &CalibrationConfig) {
        for (stream, model) in &config.intrinsics {
            self.set_intrinsics(*stream, *model);
        }
        for entry in &config.extrinsics {
            self.set_extrinsics(
                entry.from,
                entry.to,
                extrinsics_from_rows(&entry.rotation, &entry.translation),
            );
        }
        debug!(
            "applied calibration: {} intrinsics, {} extrinsics",
            config.intrinsics.len(),
            config.extrinsics.len()
        );
    }
}
