use super::color::shift_hue;
use super::{map_colors, to_channel};
use crate::buffer::PixelBuffer;

const LUMA_R: f32 = 0.2989;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Each channel becomes the average of R, G and B. Idempotent.
pub fn grayscale(src: &PixelBuffer) -> PixelBuffer {
    map_colors(src, |r, g, b| {
        let avg = (r + g + b) / 3.0;
        (avg, avg, avg)
    })
}

pub fn sepia(src: &PixelBuffer) -> PixelBuffer {
    map_colors(src, |r, g, b| {
        (
            0.393 * r + 0.769 * g + 0.189 * b,
            0.349 * r + 0.686 * g + 0.168 * b,
            0.272 * r + 0.534 * g + 0.131 * b,
        )
    })
}

/// `value` is a percentage; 100 leaves the image unchanged.
pub fn brightness(src: &PixelBuffer, value: f32) -> PixelBuffer {
    let factor = value / 100.0;
    map_colors(src, move |r, g, b| (r * factor, g * factor, b * factor))
}

/// Scales distance from mid-gray by `value / 100 * 2`.
pub fn contrast(src: &PixelBuffer, value: f32) -> PixelBuffer {
    let factor = value / 100.0 * 2.0;
    map_colors(src, move |r, g, b| {
        (
            128.0 + (r - 128.0) * factor,
            128.0 + (g - 128.0) * factor,
            128.0 + (b - 128.0) * factor,
        )
    })
}

/// Interpolates each channel away from (or toward) its luma.
pub fn saturation(src: &PixelBuffer, value: f32) -> PixelBuffer {
    let factor = value / 100.0;
    map_colors(src, move |r, g, b| {
        let luma = LUMA_R * r + LUMA_G * g + LUMA_B * b;
        (
            luma + factor * (r - luma),
            luma + factor * (g - luma),
            luma + factor * (b - luma),
        )
    })
}

pub fn hue_shift(src: &PixelBuffer, degrees: f32) -> PixelBuffer {
    map_colors(src, move |r, g, b| shift_hue(r, g, b, degrees))
}

/// Conditional channel boosts. Each rule sees the 8-bit result of the one
/// before it, so the highlight test reads the already boosted green.
pub fn cross_process(src: &PixelBuffer) -> PixelBuffer {
    map_colors(src, |mut r, mut g, mut b| {
        // shadows
        if r < 120.0 && g < 120.0 {
            b = f32::from(to_channel(b * 1.2));
        }
        // midtones
        if r > 80.0 && r < 180.0 {
            g = f32::from(to_channel(g * 1.2));
        }
        // highlights
        if r > 150.0 && g > 150.0 {
            r = f32::from(to_channel(r * 1.1));
            g = f32::from(to_channel(g * 1.1));
        }
        (r, g, b)
    })
}

const SHARPEN_CONTRAST: f32 = 1.5;
const SHARPEN_BRIGHTNESS: f32 = 1.1;

/// Contrast 1.5 around mid-gray followed by a 10% brightness lift.
pub fn sharpen(src: &PixelBuffer) -> PixelBuffer {
    let contrasted = map_colors(src, |r, g, b| {
        let stretch = |v: f32| (v - 127.5) * SHARPEN_CONTRAST + 127.5;
        (stretch(r), stretch(g), stretch(b))
    });
    map_colors(&contrasted, |r, g, b| {
        (
            r * SHARPEN_BRIGHTNESS,
            g * SHARPEN_BRIGHTNESS,
            b * SHARPEN_BRIGHTNESS,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::gradient;

    fn single(rgba: [u8; 4]) -> PixelBuffer {
        PixelBuffer::filled(1, 1, rgba)
    }

    fn first(buffer: &PixelBuffer) -> [u8; 4] {
        buffer.pixel(0, 0).expect("pixel")
    }

    #[test]
    fn grayscale_is_idempotent() {
        let src = gradient(31, 17);
        let once = grayscale(&src);
        let twice = grayscale(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn grayscale_averages_channels_and_keeps_alpha() {
        assert_eq!(first(&grayscale(&single([30, 60, 90, 77]))), [60, 60, 60, 77]);
    }

    #[test]
    fn sepia_matches_matrix_and_clamps() {
        assert_eq!(first(&sepia(&single([100, 100, 100, 255]))), [135, 120, 94, 255]);
        assert_eq!(first(&sepia(&single([255, 255, 255, 255]))), [255, 255, 239, 255]);
    }

    #[test]
    fn brightness_scales_channels() {
        assert_eq!(first(&brightness(&single([100, 200, 50, 255]), 120.0)), [120, 240, 60, 255]);
        assert_eq!(first(&brightness(&single([100, 200, 50, 255]), 100.0)), [100, 200, 50, 255]);
    }

    #[test]
    fn contrast_uses_doubled_factor() {
        // value 50 -> factor 1.0, identity
        assert_eq!(first(&contrast(&single([10, 128, 250, 255]), 50.0)), [10, 128, 250, 255]);
        // value 100 -> factor 2.0
        assert_eq!(first(&contrast(&single([100, 128, 160, 255]), 100.0)), [72, 128, 192, 255]);
    }

    #[test]
    fn saturation_zero_collapses_to_luma() {
        let out = first(&saturation(&single([200, 100, 50, 255]), 0.0));
        // 0.2989*200 + 0.587*100 + 0.114*50 = 124.18
        assert_eq!(out, [124, 124, 124, 255]);
    }

    #[test]
    fn hue_shift_rotates_primaries() {
        assert_eq!(first(&hue_shift(&single([255, 0, 0, 255]), 240.0)), [0, 0, 255, 255]);
    }

    #[test]
    fn cross_process_boosts_shadow_blue() {
        assert_eq!(first(&cross_process(&single([50, 50, 100, 255]))), [50, 50, 120, 255]);
    }

    #[test]
    fn cross_process_highlight_rule_sees_boosted_green() {
        // g 130 -> 156 after the midtone rule, which then passes the > 150 test.
        let out = first(&cross_process(&single([160, 130, 10, 255])));
        assert_eq!(out, [176, 172, 10, 255]);
    }

    #[test]
    fn sharpen_increases_local_contrast() {
        let src = PixelBuffer::from_raw(2, 1, vec![90, 90, 90, 255, 160, 160, 160, 255])
            .expect("buffer");
        let out = sharpen(&src);
        let dark = out.pixel(0, 0).expect("dark")[0];
        let light = out.pixel(1, 0).expect("light")[0];
        assert!(i32::from(light) - i32::from(dark) > 70);
    }
}
