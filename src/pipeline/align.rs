//! Depth-to-color registration

use std::time::Instant;

use nalgebra::Point2;
use tracing::instrument;

use crate::camera::{CameraModel, Extrinsics};
use crate::error::{Error, Result};
use crate::image::ImageBuffer;
use crate::stream::StreamType;

fn check_geometry(
    image: &ImageBuffer,
    model: &CameraModel,
    channels: usize,
    scalar_size: usize,
    what: &str,
) -> Result<()> {
    if image.channels() != channels || image.scalar_size() != scalar_size {
        return Err(Error::Format(format!(
            "{what} image must have {channels} channel(s) of {scalar_size} byte(s), got {} of {}",
            image.channels(),
            image.scalar_size()
        )));
    }
    if image.cols() != model.width() as usize || image.rows() != model.height() as usize {
        return Err(Error::Format(format!(
            "{what} image is {}x{}, its intrinsics describe {}x{}",
            image.cols(),
            image.rows(),
            model.width(),
            model.height()
        )));
    }
    Ok(())
}

/// Resamples a u16 millimeter depth image into the color camera.
///
/// Every non-zero depth pixel is back-projected, moved into the color frame with
/// `depth_to_color` and projected onto the color image. When several points land on one
/// color pixel the nearest wins. The result has the color image's size, one u16 channel,
/// and 0 wherever nothing landed.
///
/// `color` only contributes its geometry. Depth already aligned to rectified color is
/// returned as an unmodified copy.
#[instrument(skip_all, fields(depth_stream = %depth_stream))]
pub fn align_depth_to_color(
    color_model: &CameraModel,
    depth_model: &CameraModel,
    depth_to_color: &Extrinsics,
    color: &ImageBuffer,
    depth: &ImageBuffer,
    depth_stream: StreamType,
) -> Result<ImageBuffer> {
    let align_start = Instant::now();

    check_geometry(depth, depth_model, 1, 2, "depth")?;
    check_geometry(color, color_model, 3, 1, "color")?;

    if depth_stream == StreamType::RectifiedColorAlignedDepth {
        return Ok(depth.clone());
    }

    if !depth_model.is_back_projectable() {
        return Err(Error::UnsupportedOperation(format!(
            "cannot back project depth with {}",
            depth_model.distortion_model()
        )));
    }

    let rows = color.rows();
    let cols = color.cols();
    let mut aligned = ImageBuffer::new_typed::<u16>(rows, cols, 1)?;

    {
        let source = depth.view::<u16>(0)?;
        let mut target = aligned.view_mut::<u16>(0)?;

        for (v, u, z_mm) in source.iter() {
            if z_mm == 0 {
                continue;
            }

            let z = f32::from(z_mm) / 1000.0;
            let in_depth = depth_model.back_project(&Point2::new(u as f32, v as f32), z)?;
            let in_color = depth_to_color * in_depth;
            if in_color.z <= 0.0 {
                continue;
            }

            let pixel = color_model.project(&in_color);
            let x = pixel.x.round();
            let y = pixel.y.round();
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            if x < 0.0 || y < 0.0 || x >= cols as f32 || y >= rows as f32 {
                continue;
            }

            let z_out = (in_color.z * 1000.0).round();
            if !(1.0..=f32::from(u16::MAX)).contains(&z_out) {
                continue;
            }
            let z_out = z_out as u16;

            let (row, col) = (y as usize, x as usize);
            let current = target.get(row, col)?;
            if current == 0 || z_out < current {
                target.set(row, col, z_out)?;
            }
        }
    }

    metrics::histogram!("align_time_us").record(align_start.elapsed().as_micros() as f64);
    Ok(aligned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_color_with_wrong_channel_count() {
        let model = CameraModel::new(2, 2, 1.0, 1.0, 1.0, 1.0);
        let depth = ImageBuffer::new_typed::<u16>(2, 2, 1).unwrap();
        let color = ImageBuffer::new_typed::<u8>(2, 2, 4).unwrap();
        let result = align_depth_to_color(
            &model,
            &model,
            &Extrinsics::identity(),
            &color,
            &depth,
            StreamType::Depth,
        );
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn rejects_depth_not_matching_intrinsics() {
        let model = CameraModel::new(2, 2, 1.0, 1.0, 1.0, 1.0);
        let depth = ImageBuffer::new_typed::<u16>(3, 2, 1).unwrap();
        let color = ImageBuffer::new_typed::<u8>(2, 2, 3).unwrap();
        let result = align_depth_to_color(
            &model,
            &model,
            &Extrinsics::identity(),
            &color,
            &depth,
            StreamType::Depth,
        );
        assert!(matches!(result, Err(Error::Format(_))));
    }
}
