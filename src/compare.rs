//! Before/after view with a draggable split.

use std::sync::Arc;

use crate::buffer::{PixelBuffer, CHANNELS};

pub const DEFAULT_SPLIT_PERCENT: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct ComparisonView {
    original: Arc<PixelBuffer>,
    current: Arc<PixelBuffer>,
    split_percent: f64,
}

impl ComparisonView {
    pub fn new(original: Arc<PixelBuffer>, current: Arc<PixelBuffer>, split_percent: f64) -> Self {
        let mut view = Self {
            original,
            current,
            split_percent: DEFAULT_SPLIT_PERCENT,
        };
        view.set_split_percent(split_percent);
        view
    }

    pub fn original(&self) -> &PixelBuffer {
        &self.original
    }

    pub fn current(&self) -> &PixelBuffer {
        &self.current
    }

    pub fn split_percent(&self) -> f64 {
        self.split_percent
    }

    pub fn set_split_percent(&mut self, percent: f64) {
        self.split_percent = if percent.is_nan() {
            DEFAULT_SPLIT_PERCENT
        } else {
            percent.clamp(0.0, 100.0)
        };
    }

    /// Moves the split to a pointer at `x` over a view `width` units wide.
    pub fn set_split_from_pointer(&mut self, x: f64, width: f64) {
        if width <= 0.0 || !width.is_finite() {
            return;
        }
        self.set_split_percent(x / width * 100.0);
    }

    /// Column index where the original starts showing.
    pub fn split_column(&self) -> u32 {
        let width = f64::from(self.current.width());
        ((self.split_percent / 100.0 * width).round() as u32).min(self.current.width())
    }

    /// Current image left of the split, original to the right. `None` when
    /// the two buffers differ in size (after a crop or rotation).
    pub fn render(&self) -> Option<PixelBuffer> {
        if self.original.dimensions() != self.current.dimensions() {
            return None;
        }
        let (width, height) = self.current.dimensions();
        let split = self.split_column() as usize * CHANNELS;
        let stride = self.current.row_stride();
        let mut pixels = Vec::with_capacity(self.current.pixels().len());
        for y in 0..height as usize {
            let row = y * stride;
            pixels.extend_from_slice(&self.current.pixels()[row..row + split]);
            pixels.extend_from_slice(&self.original.pixels()[row + split..row + stride]);
        }
        PixelBuffer::from_raw(width, height, pixels).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Arc<PixelBuffer>, Arc<PixelBuffer>) {
        (
            Arc::new(PixelBuffer::filled(10, 2, [0, 0, 0, 255])),
            Arc::new(PixelBuffer::filled(10, 2, [255, 255, 255, 255])),
        )
    }

    #[test]
    fn split_is_clamped() {
        let (original, current) = pair();
        let mut view = ComparisonView::new(original, current, 150.0);
        assert_eq!(view.split_percent(), 100.0);
        view.set_split_from_pointer(-20.0, 200.0);
        assert_eq!(view.split_percent(), 0.0);
        view.set_split_from_pointer(50.0, 200.0);
        assert_eq!(view.split_percent(), 25.0);
        view.set_split_from_pointer(50.0, 0.0);
        assert_eq!(view.split_percent(), 25.0);
    }

    #[test]
    fn render_places_current_left_of_split() {
        let (original, current) = pair();
        let view = ComparisonView::new(original, current, 30.0);
        let out = view.render().expect("same size");
        assert_eq!(view.split_column(), 3);
        assert_eq!(out.pixel(2, 1), Some([255, 255, 255, 255]));
        assert_eq!(out.pixel(3, 1), Some([0, 0, 0, 255]));
    }

    #[test]
    fn render_requires_matching_dimensions() {
        let view = ComparisonView::new(
            Arc::new(PixelBuffer::filled(10, 10, [0; 4])),
            Arc::new(PixelBuffer::filled(5, 5, [0; 4])),
            50.0,
        );
        assert!(view.render().is_none());
    }
}
