use super::map_pixels;
use crate::buffer::PixelBuffer;

/// Fraction of the corner radius that stays untouched.
const CLEAR_RADIUS: f32 = 0.5;

/// Multiply-blends a radial black gradient: clear out to half the corner
/// distance, then ramping linearly to `intensity` alpha at the corners.
pub fn vignette(src: &PixelBuffer, intensity: f32) -> PixelBuffer {
    let intensity = intensity.clamp(0.0, 1.0);
    let cx = src.width() as f32 / 2.0;
    let cy = src.height() as f32 / 2.0;
    let corner = (cx * cx + cy * cy).sqrt().max(f32::EPSILON);

    map_pixels(src, move |x, y, r, g, b, a| {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        let t = ((dx * dx + dy * dy).sqrt() / corner).min(1.0);
        let alpha = gradient_alpha(t, intensity);
        let keep = 1.0 - alpha;
        (r * keep, g * keep, b * keep, a)
    })
}

fn gradient_alpha(t: f32, intensity: f32) -> f32 {
    if t <= CLEAR_RADIUS {
        0.0
    } else {
        intensity * (t - CLEAR_RADIUS) / (1.0 - CLEAR_RADIUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_is_untouched_and_corners_darken() {
        let src = PixelBuffer::filled(101, 101, [200, 200, 200, 255]);
        let out = vignette(&src, 0.5);
        assert_eq!(out.pixel(50, 50), Some([200, 200, 200, 255]));
        let corner = out.pixel(0, 0).expect("corner");
        assert!(corner[0] < 120 && corner[0] > 95, "corner {corner:?}");
        assert_eq!(corner[3], 255);
    }

    #[test]
    fn gradient_ramps_from_half_radius() {
        assert_eq!(gradient_alpha(0.3, 0.8), 0.0);
        assert_eq!(gradient_alpha(0.5, 0.8), 0.0);
        assert!((gradient_alpha(0.75, 0.8) - 0.4).abs() < 1e-6);
        assert!((gradient_alpha(1.0, 0.8) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn zero_intensity_is_identity() {
        let src = PixelBuffer::filled(10, 6, [90, 10, 250, 255]);
        assert_eq!(vignette(&src, 0.0), src);
    }
}
