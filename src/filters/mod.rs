//! Pixel filters. Every filter reads a `PixelBuffer` and returns a new one;
//! the source is never mutated so published history entries stay intact.
//!
//! Per-pixel loops run row-parallel with rayon. Each composite step produces
//! an 8-bit buffer before the next step runs, so intermediate results are
//! rounded and clamped exactly as a single filter's output would be.

mod blur;
pub mod color;
mod composite;
mod overlay;
mod tone;
mod vignette;

use rayon::prelude::*;

use crate::buffer::{PixelBuffer, CHANNELS};

pub use blur::{gaussian_blur, noise_reduction, soft_focus};
pub use composite::{add_uniform_noise, clarity, hdr, vintage};
pub use overlay::{simulated, simulated_hue};
pub use tone::{
    brightness, contrast, cross_process, grayscale, hue_shift, saturation, sepia, sharpen,
};
pub use vignette::vignette;

/// One named visual effect or adjustment with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Grayscale,
    Sepia,
    Vintage,
    Brightness(f32),
    Contrast(f32),
    Saturation(f32),
    HueShift(f32),
    Hdr,
    CrossProcess,
    Sharpen,
    NoiseReduction,
    Clarity,
    SoftFocus,
    Vignette(f32),
    Blur(f32),
    /// Placeholder for identifiers without a defined algorithm.
    Simulated(String),
}

impl Filter {
    /// Applies the filter, drawing a fresh noise seed for filters that use one.
    pub fn apply(&self, src: &PixelBuffer) -> PixelBuffer {
        self.apply_seeded(src, rand::random())
    }

    /// Applies the filter with an explicit noise seed. Only `Vintage` reads it.
    pub fn apply_seeded(&self, src: &PixelBuffer, seed: u32) -> PixelBuffer {
        match self {
            Self::Grayscale => grayscale(src),
            Self::Sepia => sepia(src),
            Self::Vintage => vintage(src, seed),
            Self::Brightness(value) => brightness(src, *value),
            Self::Contrast(value) => contrast(src, *value),
            Self::Saturation(value) => saturation(src, *value),
            Self::HueShift(degrees) => hue_shift(src, *degrees),
            Self::Hdr => hdr(src),
            Self::CrossProcess => cross_process(src),
            Self::Sharpen => sharpen(src),
            Self::NoiseReduction => noise_reduction(src),
            Self::Clarity => clarity(src),
            Self::SoftFocus => soft_focus(src),
            Self::Vignette(intensity) => vignette(src, *intensity),
            Self::Blur(sigma) => gaussian_blur(src, *sigma),
            Self::Simulated(id) => simulated(src, id),
        }
    }

    pub const fn is_simulated(&self) -> bool {
        matches!(self, Self::Simulated(_))
    }
}

/// Row-parallel per-pixel transform. `transform` receives `(x, y, r, g, b, a)`
/// as floats and returns the new channels; results are rounded and clamped.
pub(crate) fn map_pixels<F>(src: &PixelBuffer, transform: F) -> PixelBuffer
where
    F: Fn(u32, u32, f32, f32, f32, f32) -> (f32, f32, f32, f32) + Sync,
{
    let (width, height) = src.dimensions();
    if src.is_empty() {
        return src.clone();
    }

    let stride = src.row_stride();
    let src_raw = src.pixels();
    let mut dst_raw = vec![0_u8; src_raw.len()];

    dst_raw
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            let row_in = &src_raw[y * stride..(y + 1) * stride];
            for x in 0..width as usize {
                let pi = x * CHANNELS;
                let (r, g, b, a) = transform(
                    x as u32,
                    y as u32,
                    f32::from(row_in[pi]),
                    f32::from(row_in[pi + 1]),
                    f32::from(row_in[pi + 2]),
                    f32::from(row_in[pi + 3]),
                );
                row_out[pi] = to_channel(r);
                row_out[pi + 1] = to_channel(g);
                row_out[pi + 2] = to_channel(b);
                row_out[pi + 3] = to_channel(a);
            }
        });

    rebuild(width, height, dst_raw, src)
}

/// Per-pixel transform that ignores pixel position.
pub(crate) fn map_colors<F>(src: &PixelBuffer, transform: F) -> PixelBuffer
where
    F: Fn(f32, f32, f32) -> (f32, f32, f32) + Sync,
{
    map_pixels(src, |_, _, r, g, b, a| {
        let (nr, ng, nb) = transform(r, g, b);
        (nr, ng, nb, a)
    })
}

#[inline]
pub(crate) fn to_channel(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// Wraps freshly computed bytes, falling back to the source on a length bug.
pub(crate) fn rebuild(width: u32, height: u32, pixels: Vec<u8>, fallback: &PixelBuffer) -> PixelBuffer {
    match PixelBuffer::from_raw(width, height, pixels) {
        Ok(buffer) => buffer,
        Err(err) => {
            tracing::error!(%err, "filter produced malformed buffer; keeping source pixels");
            fallback.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::gradient;

    const ALL: &[Filter] = &[
        Filter::Grayscale,
        Filter::Sepia,
        Filter::Vintage,
        Filter::Brightness(120.0),
        Filter::Contrast(120.0),
        Filter::Saturation(150.0),
        Filter::HueShift(180.0),
        Filter::Hdr,
        Filter::CrossProcess,
        Filter::Sharpen,
        Filter::NoiseReduction,
        Filter::Clarity,
        Filter::SoftFocus,
        Filter::Vignette(0.5),
        Filter::Blur(2.0),
    ];

    #[test]
    fn every_filter_preserves_buffer_shape() {
        let src = gradient(23, 11);
        for filter in ALL {
            let out = filter.apply_seeded(&src, 7);
            assert_eq!(out.dimensions(), (23, 11), "{filter:?}");
            assert_eq!(out.pixels().len(), 23 * 11 * 4, "{filter:?}");
        }
        let simulated = Filter::Simulated("pop-art".into()).apply(&src);
        assert_eq!(simulated.pixels().len(), 23 * 11 * 4);
    }

    #[test]
    fn filters_leave_source_untouched() {
        let src = gradient(8, 8);
        let before = src.clone();
        for filter in ALL {
            let _ = filter.apply_seeded(&src, 1);
        }
        assert_eq!(src, before);
    }

    #[test]
    fn empty_buffer_passes_through() {
        let src = PixelBuffer::filled(0, 0, [0; 4]);
        for filter in ALL {
            assert!(filter.apply_seeded(&src, 3).is_empty(), "{filter:?}");
        }
    }

    #[test]
    fn to_channel_rounds_and_clamps() {
        assert_eq!(to_channel(-3.0), 0);
        assert_eq!(to_channel(254.6), 255);
        assert_eq!(to_channel(300.0), 255);
        assert_eq!(to_channel(f32::NAN), 0);
    }
}
