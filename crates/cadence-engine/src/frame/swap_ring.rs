/// Flip-sequential rotation over a fixed pool of display images.
///
/// Each present hands the current image to the display and makes the next one
/// in order writable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapRing {
    count: u32,
    current: u32,
}

impl SwapRing {
    /// Creates a ring over `count` images, starting at image 0.
    ///
    /// A count of zero is treated as one.
    pub fn new(count: u32) -> Self {
        Self {
            count: count.max(1),
            current: 0,
        }
    }

    pub fn image_count(&self) -> u32 {
        self.count
    }

    /// Index of the image currently writable.
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Moves to the next image after a present and returns its index.
    pub fn advance(&mut self) -> u32 {
        self.current = (self.current + 1) % self.count;
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_through_every_image() {
        let mut ring = SwapRing::new(4);
        let seen: Vec<u32> = (0..8).map(|_| ring.advance()).collect();
        assert_eq!(seen, vec![1, 2, 3, 0, 1, 2, 3, 0]);
    }

    #[test]
    fn zero_count_is_clamped() {
        let mut ring = SwapRing::new(0);
        assert_eq!(ring.image_count(), 1);
        assert_eq!(ring.advance(), 0);
    }
}
