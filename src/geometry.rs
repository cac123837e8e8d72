//! Shared geometric primitives used by the crop session and geometry ops.

/// Tolerance for `x + width <= 1` style checks on normalized values.
pub const NORMALIZED_EPSILON: f64 = 1e-9;

/// Position in normalized image space, both axes in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamps both axes into `[0, 1]`; NaN collapses to `0`.
    pub fn clamped(x: f64, y: f64) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Resolution-independent rectangle expressed as fractions of the source size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub const FULL: CropRect = CropRect::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two corners; top-left is the per-axis minimum.
    pub fn from_corners(anchor: NormalizedPoint, current: NormalizedPoint) -> Self {
        Self {
            x: anchor.x.min(current.x),
            y: anchor.y.min(current.y),
            width: (anchor.x - current.x).abs(),
            height: (anchor.y - current.y).abs(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Returns a reason string when the rectangle cannot be committed.
    pub fn validate(&self) -> Result<(), &'static str> {
        let values = [self.x, self.y, self.width, self.height];
        if values.iter().any(|value| !value.is_finite()) {
            return Err("crop rectangle has non-finite coordinates");
        }
        if values.iter().any(|value| *value < 0.0 || *value > 1.0) {
            return Err("crop rectangle coordinates must lie in [0, 1]");
        }
        if self.is_degenerate() {
            return Err("crop rectangle has zero width or height");
        }
        if self.x + self.width > 1.0 + NORMALIZED_EPSILON {
            return Err("crop rectangle extends past the right edge");
        }
        if self.y + self.height > 1.0 + NORMALIZED_EPSILON {
            return Err("crop rectangle extends past the bottom edge");
        }
        Ok(())
    }

    /// Integer pixel box for a `width` x `height` source, edges rounded to
    /// the nearest pixel and clamped to the source bounds.
    pub fn to_pixel_rect(&self, width: u32, height: u32) -> PixelRect {
        let left = round_edge(self.x, width);
        let top = round_edge(self.y, height);
        let right = round_edge(self.x + self.width, width).max(left);
        let bottom = round_edge(self.y + self.height, height).max(top);
        PixelRect::new(left, top, right - left, bottom - top)
    }
}

fn round_edge(fraction: f64, extent: u32) -> u32 {
    let value = (fraction * f64::from(extent)).round();
    if value <= 0.0 {
        0
    } else {
        (value as u32).min(extent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_corners_normalizes_drag_direction() {
        let rect = CropRect::from_corners(
            NormalizedPoint::new(0.8, 0.6),
            NormalizedPoint::new(0.2, 0.1),
        );
        assert!((rect.x - 0.2).abs() < 1e-12);
        assert!((rect.y - 0.1).abs() < 1e-12);
        assert!((rect.width - 0.6).abs() < 1e-12);
        assert!((rect.height - 0.5).abs() < 1e-12);
    }

    #[test]
    fn clamped_point_stays_in_unit_square() {
        assert_eq!(
            NormalizedPoint::clamped(-0.5, 1.7),
            NormalizedPoint::new(0.0, 1.0)
        );
        assert_eq!(
            NormalizedPoint::clamped(f64::NAN, 0.25),
            NormalizedPoint::new(0.0, 0.25)
        );
    }

    #[test]
    fn validate_rejects_overflowing_rect() {
        let rect = CropRect::new(0.9, 0.0, 0.2, 0.2);
        assert!(rect.validate().is_err());
        assert!(CropRect::FULL.validate().is_ok());
    }

    #[test]
    fn validate_rejects_degenerate_rect() {
        assert!(CropRect::new(0.3, 0.3, 0.0, 0.2).validate().is_err());
    }

    #[test]
    fn pixel_rect_rounds_edges() {
        let rect = CropRect::new(0.25, 0.25, 0.5, 0.5).to_pixel_rect(400, 400);
        assert_eq!(rect, PixelRect::new(100, 100, 200, 200));

        let tiny = CropRect::new(0.5, 0.5, 0.001, 0.001).to_pixel_rect(100, 100);
        assert!(tiny.is_empty());
    }
}
