use std::fmt;
use std::mem::size_of;

use bytemuck::Pod;
use bytes::{Bytes, BytesMut};

use super::view::{ChannelView, ChannelViewMut};
use crate::error::{Error, Result};

/// Dense row-major image with interleaved channels, e.g. `RGBRGBRGB...`.
///
/// Geometry is fixed at construction. The payload is a single byte arena of
/// `rows * cols * element_size` bytes; a scalar at `(row, col, channel)` lives at
/// `channel * scalar_size + col * element_size + row * cols * element_size`.
/// Typed access checks that the requested scalar type has exactly `scalar_size`
/// bytes before touching the arena.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    data: BytesMut,
    rows: usize,
    cols: usize,
    channels: usize,
    element_size: usize,
    scalar_size: usize,
}

impl ImageBuffer {
    /// Zero-filled buffer. `element_size` is the number of bytes per pixel.
    pub fn new(rows: usize, cols: usize, channels: usize, element_size: usize) -> Result<Self> {
        let len = Self::payload_len(rows, cols, channels, element_size)?;
        Ok(Self {
            data: BytesMut::zeroed(len),
            rows,
            cols,
            channels,
            element_size,
            scalar_size: element_size / channels,
        })
    }

    /// Buffer holding a copy of `source`, which must be exactly the payload size.
    pub fn from_bytes(
        rows: usize,
        cols: usize,
        channels: usize,
        element_size: usize,
        source: &[u8],
    ) -> Result<Self> {
        let len = Self::payload_len(rows, cols, channels, element_size)?;
        if source.len() != len {
            return Err(Error::Format(format!(
                "source holds {} bytes, {rows}x{cols}x{element_size} needs {len}",
                source.len()
            )));
        }
        Ok(Self {
            data: BytesMut::from(source),
            rows,
            cols,
            channels,
            element_size,
            scalar_size: element_size / channels,
        })
    }

    /// Zero-filled buffer whose scalars are `T`.
    pub fn new_typed<T: Pod>(rows: usize, cols: usize, channels: usize) -> Result<Self> {
        Self::new(rows, cols, channels, size_of::<T>() * channels)
    }

    /// Buffer whose scalars are copied from `source` in row-major, channel-interleaved order.
    pub fn from_slice<T: Pod>(
        rows: usize,
        cols: usize,
        channels: usize,
        source: &[T],
    ) -> Result<Self> {
        Self::from_bytes(
            rows,
            cols,
            channels,
            size_of::<T>() * channels,
            bytemuck::cast_slice(source),
        )
    }

    fn payload_len(rows: usize, cols: usize, channels: usize, element_size: usize) -> Result<usize> {
        if channels == 0 {
            return Err(Error::Format("an image needs at least one channel".into()));
        }
        if element_size == 0 || element_size % channels != 0 {
            return Err(Error::Format(format!(
                "element size {element_size} is not a positive multiple of {channels} channels"
            )));
        }
        rows.checked_mul(cols)
            .and_then(|pixels| pixels.checked_mul(element_size))
            .ok_or_else(|| Error::Format(format!("{rows}x{cols} image overflows")))
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Bytes per pixel.
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Bytes per scalar.
    pub fn scalar_size(&self) -> usize {
        self.scalar_size
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Hands the payload over without copying.
    pub fn into_bytes(self) -> Bytes {
        self.data.freeze()
    }

    /// Byte offset of a scalar. Callers have validated the indices.
    pub(crate) fn offset(&self, row: usize, col: usize, channel: usize) -> usize {
        channel * self.scalar_size + col * self.element_size + row * self.cols * self.element_size
    }

    pub(crate) fn check_channel(&self, channel: usize) -> Result<()> {
        if channel >= self.channels {
            return Err(Error::Index(format!(
                "channel {channel} outside [0, {})",
                self.channels
            )));
        }
        Ok(())
    }

    pub(crate) fn check_pixel(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::Index(format!(
                "pixel ({row}, {col}) outside {}x{}",
                self.rows, self.cols
            )));
        }
        Ok(())
    }

    pub(crate) fn check_scalar<T: Pod>(&self) -> Result<()> {
        if size_of::<T>() != self.scalar_size {
            return Err(Error::Format(format!(
                "scalar size mismatch: buffer has {} bytes per scalar, requested {}",
                self.scalar_size,
                size_of::<T>()
            )));
        }
        Ok(())
    }

    pub(crate) fn read<T: Pod>(&self, offset: usize) -> T {
        bytemuck::pod_read_unaligned(&self.data[offset..offset + size_of::<T>()])
    }

    pub(crate) fn write<T: Pod>(&mut self, offset: usize, value: T) {
        self.data[offset..offset + size_of::<T>()].copy_from_slice(bytemuck::bytes_of(&value));
    }

    /// Scalar at `(row, col, channel)`.
    pub fn at<T: Pod>(&self, row: usize, col: usize, channel: usize) -> Result<T> {
        self.check_pixel(row, col)?;
        self.check_channel(channel)?;
        self.check_scalar::<T>()?;
        Ok(self.read(self.offset(row, col, channel)))
    }

    /// Overwrites the scalar at `(row, col, channel)`.
    pub fn set<T: Pod>(&mut self, row: usize, col: usize, channel: usize, value: T) -> Result<()> {
        self.check_pixel(row, col)?;
        self.check_channel(channel)?;
        self.check_scalar::<T>()?;
        let offset = self.offset(row, col, channel);
        self.write(offset, value);
        Ok(())
    }

    /// Read-only 2D view of one channel.
    pub fn view<T: Pod>(&self, channel: usize) -> Result<ChannelView<'_, T>> {
        self.check_channel(channel)?;
        self.check_scalar::<T>()?;
        Ok(ChannelView::new(self, channel))
    }

    /// Mutable 2D view of one channel.
    pub fn view_mut<T: Pod>(&mut self, channel: usize) -> Result<ChannelViewMut<'_, T>> {
        self.check_channel(channel)?;
        self.check_scalar::<T>()?;
        Ok(ChannelViewMut::new(self, channel))
    }
}

impl fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("channels", &self.channels)
            .field("element_size", &self.element_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_filled_on_construction() {
        let image = ImageBuffer::new(2, 3, 3, 3).unwrap();
        assert_eq!(image.as_bytes().len(), 18);
        assert!(image.as_bytes().iter().all(|b| *b == 0));
        assert_eq!(image.scalar_size(), 1);
    }

    #[test]
    fn offset_is_channel_then_col_then_row() {
        let image = ImageBuffer::new_typed::<u16>(4, 5, 3).unwrap();
        assert_eq!(image.element_size(), 6);
        assert_eq!(image.offset(0, 0, 2), 4);
        assert_eq!(image.offset(0, 1, 0), 6);
        assert_eq!(image.offset(2, 1, 1), 2 + 6 + 2 * 5 * 6);
    }

    #[test]
    fn rejects_element_size_not_multiple_of_channels() {
        assert!(matches!(ImageBuffer::new(1, 1, 3, 4), Err(Error::Format(_))));
        assert!(matches!(ImageBuffer::new(1, 1, 0, 4), Err(Error::Format(_))));
    }

    #[test]
    fn set_then_at_uses_native_byte_order() {
        let mut image = ImageBuffer::new_typed::<u16>(1, 2, 1).unwrap();
        image.set::<u16>(0, 1, 0, 0x1234).unwrap();
        assert_eq!(&image.as_bytes()[2..4], &0x1234u16.to_ne_bytes());
    }
}
