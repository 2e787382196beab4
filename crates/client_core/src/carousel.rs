use thiserror::Error;

/// Horizontal distance, in pixels, a touch has to travel to count as a swipe.
pub const SWIPE_THRESHOLD_PX: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CarouselError {
    #[error("carousel has no images")]
    Empty,
    #[error("image index {index} out of range for {len} images")]
    OutOfRange { index: usize, len: usize },
}

/// Which image of a product carousel is active. Indices wrap in both
/// directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    current: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Result<Self, CarouselError> {
        if len == 0 {
            return Err(CarouselError::Empty);
        }
        Ok(Self { len, current: 0 })
    }

    pub fn image_count(&self) -> usize {
        self.len
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn next(&mut self) -> usize {
        self.current = (self.current + 1) % self.len;
        self.current
    }

    pub fn prev(&mut self) -> usize {
        self.current = (self.current + self.len - 1) % self.len;
        self.current
    }

    /// Jumps to `index`, e.g. when one of the dots is clicked.
    pub fn show(&mut self, index: usize) -> Result<usize, CarouselError> {
        if index >= self.len {
            return Err(CarouselError::OutOfRange {
                index,
                len: self.len,
            });
        }
        self.current = index;
        Ok(self.current)
    }

    /// Moving the finger left shows the next image, right the previous one.
    /// Returns the new index, or `None` when the movement was too short.
    pub fn swipe(&mut self, start_x: f64, end_x: f64) -> Option<usize> {
        let diff = start_x - end_x;
        if diff.abs() <= SWIPE_THRESHOLD_PX {
            return None;
        }
        Some(if diff > 0.0 { self.next() } else { self.prev() })
    }
}
