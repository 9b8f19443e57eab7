//! Interop with the `image` crate and producer-side pixel conversions.

use std::mem::size_of;

use ::image::{ColorType, DynamicImage, Luma, LumaA, Rgb, Rgba};
use bytemuck::Pod;

use super::ImageBuffer;
use crate::error::{Error, Result};

type External<P, S> = ::image::ImageBuffer<P, Vec<S>>;

fn collect_scalars<T: Pod>(bytes: &[u8]) -> Vec<T> {
    bytes
        .chunks_exact(size_of::<T>())
        .map(bytemuck::pod_read_unaligned)
        .collect()
}

impl ImageBuffer {
    /// Deep-copies `image` into a buffer with the same geometry and pixel layout.
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        let color = image.color();
        Self::from_bytes(
            image.height() as usize,
            image.width() as usize,
            usize::from(color.channel_count()),
            usize::from(color.bytes_per_pixel()),
            image.as_bytes(),
        )
    }

    /// Copies the payload into an `image` crate image of type `target`.
    ///
    /// The target's channel count and bytes per pixel must match this buffer exactly.
    pub fn to_image(&self, target: ColorType) -> Result<DynamicImage> {
        if usize::from(target.channel_count()) != self.channels()
            || usize::from(target.bytes_per_pixel()) != self.element_size()
        {
            return Err(Error::Format(format!(
                "cannot convert {} channel(s) of {} bytes per pixel to {target:?}",
                self.channels(),
                self.element_size()
            )));
        }
        let width = u32::try_from(self.cols())
            .map_err(|_| Error::Format(format!("{} columns do not fit an image", self.cols())))?;
        let height = u32::try_from(self.rows())
            .map_err(|_| Error::Format(format!("{} rows do not fit an image", self.rows())))?;
        let bytes = self.as_bytes();

        let image = match target {
            ColorType::L8 => External::<Luma<u8>, u8>::from_raw(width, height, bytes.to_vec())
                .map(DynamicImage::ImageLuma8),
            ColorType::La8 => External::<LumaA<u8>, u8>::from_raw(width, height, bytes.to_vec())
                .map(DynamicImage::ImageLumaA8),
            ColorType::Rgb8 => External::<Rgb<u8>, u8>::from_raw(width, height, bytes.to_vec())
                .map(DynamicImage::ImageRgb8),
            ColorType::Rgba8 => External::<Rgba<u8>, u8>::from_raw(width, height, bytes.to_vec())
                .map(DynamicImage::ImageRgba8),
            ColorType::L16 => {
                External::<Luma<u16>, u16>::from_raw(width, height, collect_scalars(bytes))
                    .map(DynamicImage::ImageLuma16)
            }
            ColorType::La16 => {
                External::<LumaA<u16>, u16>::from_raw(width, height, collect_scalars(bytes))
                    .map(DynamicImage::ImageLumaA16)
            }
            ColorType::Rgb16 => {
                External::<Rgb<u16>, u16>::from_raw(width, height, collect_scalars(bytes))
                    .map(DynamicImage::ImageRgb16)
            }
            ColorType::Rgba16 => {
                External::<Rgba<u16>, u16>::from_raw(width, height, collect_scalars(bytes))
                    .map(DynamicImage::ImageRgba16)
            }
            ColorType::Rgb32F => {
                External::<Rgb<f32>, f32>::from_raw(width, height, collect_scalars(bytes))
                    .map(DynamicImage::ImageRgb32F)
            }
            ColorType::Rgba32F => {
                External::<Rgba<f32>, f32>::from_raw(width, height, collect_scalars(bytes))
                    .map(DynamicImage::ImageRgba32F)
            }
            other => {
                return Err(Error::Format(format!("unsupported target color type {other:?}")));
            }
        };
        image.ok_or_else(|| Error::Format(format!("payload does not fill a {width}x{height} image")))
    }
}

/// Rescales raw 16-bit depth, in units of `depth_units` meters, to millimeters.
///
/// Values beyond the u16 range saturate.
pub fn scale_depth_to_mm(depth: &mut ImageBuffer, depth_units: f32) -> Result<()> {
    if depth.channels() != 1 {
        return Err(Error::Format(format!(
            "depth must have one channel, got {}",
            depth.channels()
        )));
    }
    let scale = depth_units * 1000.0;
    let mut view = depth.view_mut::<u16>(0)?;
    for row in 0..view.rows() {
        for col in 0..view.cols() {
            let raw = view.get(row, col)?;
            view.set(row, col, (f32::from(raw) * scale).round() as u16)?;
        }
    }
    Ok(())
}

/// Builds a 16-bit infrared image from 8-bit samples, scaling each by 256.
pub fn widen_infrared(rows: usize, cols: usize, samples: &[u8]) -> Result<ImageBuffer> {
    if samples.len() != rows * cols {
        return Err(Error::Format(format!(
            "{} infrared samples for a {rows}x{cols} image",
            samples.len()
        )));
    }
    let mut image = ImageBuffer::new_typed::<u16>(rows, cols, 1)?;
    let mut view = image.view_mut::<u16>(0)?;
    for (index, sample) in samples.iter().enumerate() {
        view.set(index / cols, index % cols, u16::from(*sample) * 256)?;
    }
    Ok(image)
}
