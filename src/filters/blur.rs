use rayon::prelude::*;

use super::{rebuild, to_channel};
use crate::buffer::{PixelBuffer, CHANNELS};

const NOISE_REDUCTION_SIGMA: f32 = 0.5;
const SOFT_FOCUS_SIGMA: f32 = 5.0;
const SOFT_FOCUS_BLUR_OPACITY: f32 = 0.7;

/// Small-radius blur that smooths single-pixel noise.
pub fn noise_reduction(src: &PixelBuffer) -> PixelBuffer {
    gaussian_blur(src, NOISE_REDUCTION_SIGMA)
}

/// Draws a heavily blurred copy over the original at 70% opacity.
pub fn soft_focus(src: &PixelBuffer) -> PixelBuffer {
    let blurred = gaussian_blur(src, SOFT_FOCUS_SIGMA);
    let pixels = src
        .pixels()
        .par_iter()
        .zip(blurred.pixels().par_iter())
        .map(|(&base, &top)| {
            to_channel(
                f32::from(top) * SOFT_FOCUS_BLUR_OPACITY
                    + f32::from(base) * (1.0 - SOFT_FOCUS_BLUR_OPACITY),
            )
        })
        .collect::<Vec<_>>();
    rebuild(src.width(), src.height(), pixels, src)
}

/// Build a 1-D Gaussian kernel truncated at ceil(3*sigma).
fn build_gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil() as usize;
    if radius == 0 {
        return vec![1.0];
    }
    let len = radius * 2 + 1;
    let s2 = 2.0 * sigma * sigma;
    let mut kernel = (0..len)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-x * x / s2).exp()
        })
        .collect::<Vec<_>>();
    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Separable Gaussian blur with edge clamping; `sigma <= 0` returns a copy.
pub fn gaussian_blur(src: &PixelBuffer, sigma: f32) -> PixelBuffer {
    if src.is_empty() || sigma.is_nan() || sigma <= 0.0 {
        return src.clone();
    }
    let w = src.width() as usize;
    let h = src.height() as usize;
    let stride = w * CHANNELS;

    let kernel = build_gaussian_kernel(sigma);
    let radius = kernel.len() / 2;
    let buf_in = src.pixels().iter().map(|&b| f32::from(b)).collect::<Vec<_>>();

    let mut buf_h = vec![0.0_f32; buf_in.len()];
    buf_h
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            let row_start = y * stride;
            for x in 0..w {
                let mut acc = [0.0_f32; CHANNELS];
                for (ki, &kv) in kernel.iter().enumerate() {
                    let sx = (x + ki).saturating_sub(radius).min(w - 1);
                    let idx = row_start + sx * CHANNELS;
                    for (c, slot) in acc.iter_mut().enumerate() {
                        *slot += buf_in[idx + c] * kv;
                    }
                }
                row_out[x * CHANNELS..(x + 1) * CHANNELS].copy_from_slice(&acc);
            }
        });

    let mut dst = vec![0_u8; buf_in.len()];
    dst.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            for x in 0..w {
                let mut acc = [0.0_f32; CHANNELS];
                for (ki, &kv) in kernel.iter().enumerate() {
                    let sy = (y + ki).saturating_sub(radius).min(h - 1);
                    let idx = sy * stride + x * CHANNELS;
                    for (c, slot) in acc.iter_mut().enumerate() {
                        *slot += buf_h[idx + c] * kv;
                    }
                }
                for (c, value) in acc.iter().enumerate() {
                    row_out[x * CHANNELS + c] = to_channel(*value);
                }
            }
        });

    rebuild(src.width(), src.height(), dst, src)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(size: u32) -> PixelBuffer {
        let mut pixels = Vec::new();
        for y in 0..size {
            for x in 0..size {
                let v = if (x + y) % 2 == 0 { 0 } else { 255 };
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        PixelBuffer::from_raw(size, size, pixels).expect("checkerboard")
    }

    #[test]
    fn kernel_is_normalized() {
        let kernel = build_gaussian_kernel(1.5);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(kernel.len(), 11);
    }

    #[test]
    fn blur_keeps_uniform_image_uniform() {
        let src = PixelBuffer::filled(9, 5, [40, 80, 120, 255]);
        assert_eq!(gaussian_blur(&src, 3.0), src);
    }

    #[test]
    fn noise_reduction_softens_checkerboard() {
        let src = checkerboard(8);
        let out = noise_reduction(&src);
        let center = out.pixel(4, 4).expect("pixel")[0];
        assert!(center > 0 && center < 255, "center {center}");
    }

    #[test]
    fn soft_focus_blends_toward_blurred_copy() {
        let src = checkerboard(16);
        let out = soft_focus(&src);
        // A black square ends up near 0.7 * mid-gray.
        let dark = out.pixel(8, 8).expect("pixel")[0];
        assert!((70..=110).contains(&dark), "dark {dark}");
    }

    #[test]
    fn non_positive_sigma_is_identity() {
        let src = checkerboard(4);
        assert_eq!(gaussian_blur(&src, 0.0), src);
        assert_eq!(gaussian_blur(&src, f32::NAN), src);
    }
}
