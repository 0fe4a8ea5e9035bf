use crate::FrameSizeError;

/// An RGB color.
pub type Rgb = [u8; 3];

/// A raw RGB observation in row-major `height × width × 3` layout.
///
/// This is what an [`Environment`](crate::Environment) hands back from `reset` and `step`.
///
/// # Example
///
/// ```
/// use pgpong_engine::Frame;
///
/// let mut frame = Frame::filled(4, 3, [0, 0, 0]);
/// frame.fill_rect(1, 1, 2, 1, [255, 0, 0]);
/// assert_eq!(frame.pixel(1, 1), [255, 0, 0]);
/// assert_eq!(frame.pixel(2, 1), [255, 0, 0]);
/// assert_eq!(frame.pixel(0, 0), [0, 0, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    height: usize,
    width: usize,
    pixels: Vec<u8>,
}

impl Frame {
    /// Number of color channels per pixel.
    pub const CHANNELS: usize = 3;

    /// Wraps an existing pixel buffer.
    pub fn new(height: usize, width: usize, pixels: Vec<u8>) -> Result<Self, FrameSizeError> {
        let expected = height * width * Self::CHANNELS;
        if pixels.len() != expected {
            return Err(FrameSizeError {
                height,
                width,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            height,
            width,
            pixels,
        })
    }

    /// Creates a frame with every pixel set to `color`.
    #[must_use]
    pub fn filled(height: usize, width: usize, color: Rgb) -> Self {
        let pixels = color
            .iter()
            .copied()
            .cycle()
            .take(height * width * Self::CHANNELS)
            .collect();
        Self {
            height,
            width,
            pixels,
        }
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the raw row-major RGB bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[must_use]
    pub fn pixel(&self, row: usize, col: usize) -> Rgb {
        let i = self.offset(row, col);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    pub fn set_pixel(&mut self, row: usize, col: usize, color: Rgb) {
        let i = self.offset(row, col);
        self.pixels[i..i + Self::CHANNELS].copy_from_slice(&color);
    }

    /// Paints a rectangle, silently clipping the parts outside the frame.
    pub fn fill_rect(&mut self, row: usize, col: usize, height: usize, width: usize, color: Rgb) {
        let row_end = usize::min(row + height, self.height);
        let col_end = usize::min(col + width, self.width);
        for r in row..row_end {
            for c in col..col_end {
                self.set_pixel(r, c, color);
            }
        }
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(row < self.height && col < self.width, "pixel out of bounds");
        (row * self.width + col) * Self::CHANNELS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        let err = Frame::new(2, 2, vec![0; 11]).unwrap_err();
        assert_eq!(err.expected, 12);
        assert_eq!(err.actual, 11);
    }

    #[test]
    fn test_filled_layout() {
        let frame = Frame::filled(2, 3, [1, 2, 3]);
        assert_eq!(frame.pixels().len(), 18);
        assert_eq!(frame.pixel(1, 2), [1, 2, 3]);
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut frame = Frame::filled(3, 3, [0, 0, 0]);
        frame.fill_rect(2, 2, 5, 5, [9, 9, 9]);
        assert_eq!(frame.pixel(2, 2), [9, 9, 9]);
        assert_eq!(frame.pixel(1, 2), [0, 0, 0]);
    }

    #[test]
    fn test_row_major_offsets() {
        let mut frame = Frame::filled(2, 2, [0, 0, 0]);
        frame.set_pixel(0, 1, [7, 8, 9]);
        assert_eq!(&frame.pixels()[3..6], &[7, 8, 9]);
    }
}
