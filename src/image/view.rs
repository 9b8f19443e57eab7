use std::marker::PhantomData;

use bytemuck::Pod;

use super::ImageBuffer;
use crate::error::Result;

/// Strided read-only view over one channel of an [`ImageBuffer`].
///
/// Indexing is `(row, col)`; the scalar type has already been checked against the
/// buffer's scalar size.
pub struct ChannelView<'a, T> {
    image: &'a ImageBuffer,
    channel: usize,
    _scalar: PhantomData<T>,
}

impl<'a, T: Pod> ChannelView<'a, T> {
    pub(crate) fn new(image: &'a ImageBuffer, channel: usize) -> Self {
        Self {
            image,
            channel,
            _scalar: PhantomData,
        }
    }

    pub fn rows(&self) -> usize {
        self.image.rows()
    }

    pub fn cols(&self) -> usize {
        self.image.cols()
    }

    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.image.check_pixel(row, col)?;
        Ok(self.image.read(self.image.offset(row, col, self.channel)))
    }

    /// Row-major walk yielding `(row, col, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        let cols = self.cols();
        (0..self.rows()).flat_map(move |row| {
            (0..cols).map(move |col| {
                (row, col, self.image.read(self.image.offset(row, col, self.channel)))
            })
        })
    }
}

/// Strided mutable view over one channel of an [`ImageBuffer`].
pub struct ChannelViewMut<'a, T> {
    image: &'a mut ImageBuffer,
    channel: usize,
    _scalar: PhantomData<T>,
}

impl<'a, T: Pod> ChannelViewMut<'a, T> {
    pub(crate) fn new(image: &'a mut ImageBuffer, channel: usize) -> Self {
        Self {
            image,
            channel,
            _scalar: PhantomData,
        }
    }

    pub fn rows(&self) -> usize {
        self.image.rows()
    }

    pub fn cols(&self) -> usize {
        self.image.cols()
    }

    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.image.check_pixel(row, col)?;
        Ok(self.image.read(self.image.offset(row, col, self.channel)))
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        self.image.check_pixel(row, col)?;
        let offset = self.image.offset(row, col, self.channel);
        self.image.write(offset, value);
        Ok(())
    }

    /// Writes `value` into every pixel of this channel, leaving other channels alone.
    pub fn fill(&mut self, value: T) {
        for row in 0..self.rows() {
            for col in 0..self.cols() {
                let offset = self.image.offset(row, col, self.channel);
                self.image.write(offset, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn fill_touches_only_its_channel() {
        let mut image = ImageBuffer::new_typed::<u8>(2, 2, 3).unwrap();
        image.view_mut::<u8>(1).unwrap().fill(7);
        for (row, col) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            assert_eq!(image.at::<u8>(row, col, 0).unwrap(), 0);
            assert_eq!(image.at::<u8>(row, col, 1).unwrap(), 7);
            assert_eq!(image.at::<u8>(row, col, 2).unwrap(), 0);
        }
    }

    #[test]
    fn view_rejects_out_of_range_pixel() {
        let image = ImageBuffer::new_typed::<u16>(2, 3, 1).unwrap();
        let view = image.view::<u16>(0).unwrap();
        assert!(matches!(view.get(2, 0), Err(Error::Index(_))));
        assert!(matches!(view.get(0, 3), Err(Error::Index(_))));
    }

    #[test]
    fn iter_is_row_major() {
        let image = ImageBuffer::from_slice::<u16>(2, 2, 1, &[1, 2, 3, 4]).unwrap();
        let values: Vec<_> = image.view::<u16>(0).unwrap().iter().collect();
        assert_eq!(values, vec![(0, 0, 1), (0, 1, 2), (1, 0, 3), (1, 1, 4)]);
    }
}
