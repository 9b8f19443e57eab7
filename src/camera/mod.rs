//! Per-stream camera geometry.

pub mod extrinsics;
pub mod intrinsics;

pub use extrinsics::{
    extrinsics_from_column_major, extrinsics_from_rows, extrinsics_to_column_major, Extrinsics,
};
pub use intrinsics::{CameraModel, DistortionModel};
