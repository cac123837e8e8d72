//! Effects built by chaining other filters.

use super::{contrast, map_pixels, saturation, sepia, sharpen, vignette};
use crate::buffer::PixelBuffer;

const VINTAGE_VIGNETTE: f32 = 0.3;
const VINTAGE_NOISE_AMPLITUDE: f32 = 10.0;
const HDR_CONTRAST: f32 = 130.0;
const HDR_SATURATION: f32 = 120.0;
const HDR_VIGNETTE: f32 = 0.2;
const CLARITY_CONTRAST: f32 = 110.0;

/// Sepia, a light vignette, then film grain.
pub fn vintage(src: &PixelBuffer, seed: u32) -> PixelBuffer {
    let toned = vignette(&sepia(src), VINTAGE_VIGNETTE);
    add_uniform_noise(&toned, VINTAGE_NOISE_AMPLITUDE, seed)
}

pub fn hdr(src: &PixelBuffer) -> PixelBuffer {
    let punched = saturation(&contrast(src, HDR_CONTRAST), HDR_SATURATION);
    vignette(&punched, HDR_VIGNETTE)
}

pub fn clarity(src: &PixelBuffer) -> PixelBuffer {
    contrast(&sharpen(src), CLARITY_CONTRAST)
}

/// Adds one uniform value in `[-amplitude, amplitude]` per pixel to R, G and B.
/// The value is a hash of the pixel position and `seed`, so a fixed seed
/// reproduces the same grain.
pub fn add_uniform_noise(src: &PixelBuffer, amplitude: f32, seed: u32) -> PixelBuffer {
    map_pixels(src, move |x, y, r, g, b, a| {
        let n = (hash_unit(x, y, seed) * 2.0 - 1.0) * amplitude;
        (r + n, g + n, b + n, a)
    })
}

#[inline]
fn hash_u32(mut x: u32) -> u32 {
    x = x.wrapping_mul(0x9E37_79B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EB_CA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2_AE35);
    x ^= x >> 16;
    x
}

/// Hash to f32 in [0, 1).
#[inline]
fn hash_unit(x: u32, y: u32, seed: u32) -> f32 {
    let h = hash_u32(x ^ hash_u32(y.wrapping_add(hash_u32(seed))));
    (h >> 8) as f32 / (1_u32 << 24) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::gradient;

    #[test]
    fn noise_stays_within_amplitude() {
        let src = PixelBuffer::filled(32, 32, [128, 128, 128, 255]);
        let out = add_uniform_noise(&src, 10.0, 42);
        for px in out.pixels().chunks_exact(4) {
            assert!((118..=138).contains(&px[0]), "{px:?}");
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
            assert_eq!(px[3], 255);
        }
        assert_ne!(out, src);
    }

    #[test]
    fn vintage_is_reproducible_for_fixed_seed() {
        let src = gradient(20, 20);
        assert_eq!(vintage(&src, 9), vintage(&src, 9));
        assert_ne!(vintage(&src, 9), vintage(&src, 10));
    }

    #[test]
    fn hdr_equals_its_chain() {
        let src = gradient(12, 12);
        let expected = vignette(&saturation(&contrast(&src, 130.0), 120.0), 0.2);
        assert_eq!(hdr(&src), expected);
    }

    #[test]
    fn clarity_equals_sharpen_then_contrast() {
        let src = gradient(12, 12);
        assert_eq!(clarity(&src), contrast(&sharpen(&src), 110.0));
    }
}
