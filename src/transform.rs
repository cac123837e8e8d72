//! Geometry operations: quarter-turn rotation, horizontal flip and crop.
//!
//! Every operation acts on the buffer as currently rasterized. Rotation is
//! driven by the absolute target angle; a flip already baked into the
//! buffer is never re-applied by a later rotation.

use rayon::prelude::*;
use thiserror::Error;

use crate::buffer::{PixelBuffer, CHANNELS};
use crate::filters::{rebuild, to_channel};
use crate::geometry::CropRect;

pub type TransformResult<T> = std::result::Result<T, TransformError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("invalid crop region: {reason}")]
    InvalidRegion { reason: String },
}

/// Cumulative orientation of the session; reset with the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformState {
    rotation_degrees: u16,
    flipped: bool,
}

impl TransformState {
    pub const fn new(rotation_degrees: u16, flipped: bool) -> Self {
        Self {
            rotation_degrees: rotation_degrees % 360 / 90 * 90,
            flipped,
        }
    }

    pub const fn rotation_degrees(&self) -> u16 {
        self.rotation_degrees
    }

    pub const fn flipped(&self) -> bool {
        self.flipped
    }

    pub const fn next_rotation(&self) -> u16 {
        (self.rotation_degrees + 90) % 360
    }
}

/// Rotates to the next quarter turn. The buffer is rotated by the new
/// cumulative angle, not by a 90 degree delta; output dimensions are swapped
/// when the new angle is 90 or 270.
pub fn rotate(src: &PixelBuffer, state: TransformState) -> (PixelBuffer, TransformState) {
    let degrees = state.next_rotation();
    let (width, height) = src.dimensions();
    let (out_w, out_h) = if degrees == 90 || degrees == 270 {
        (height, width)
    } else {
        (width, height)
    };
    let rotated = rotate_about_center(src, f32::from(degrees), out_w, out_h);
    tracing::debug!(degrees, out_w, out_h, "rotated buffer");
    (rotated, TransformState::new(degrees, state.flipped))
}

/// Mirrors the current buffer horizontally and toggles the flip flag; the
/// rotation angle is kept as is.
pub fn flip(src: &PixelBuffer, state: TransformState) -> (PixelBuffer, TransformState) {
    let (width, height) = src.dimensions();
    if src.is_empty() {
        return (src.clone(), TransformState::new(state.rotation_degrees, !state.flipped));
    }
    let stride = src.row_stride();
    let src_raw = src.pixels();
    let mut dst = vec![0_u8; src_raw.len()];
    dst.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            let row_in = &src_raw[y * stride..(y + 1) * stride];
            for (x, px) in row_in.chunks_exact(CHANNELS).enumerate() {
                let mirrored = width as usize - 1 - x;
                row_out[mirrored * CHANNELS..(mirrored + 1) * CHANNELS].copy_from_slice(px);
            }
        });
    let flipped = rebuild(width, height, dst, src);
    (
        flipped,
        TransformState::new(state.rotation_degrees, !state.flipped),
    )
}

/// Copies the pixel box covered by `rect`. Edges are rounded to whole pixels.
pub fn crop(src: &PixelBuffer, rect: CropRect) -> TransformResult<PixelBuffer> {
    rect.validate()
        .map_err(|reason| TransformError::InvalidRegion {
            reason: reason.to_string(),
        })?;
    let (width, height) = src.dimensions();
    let bounds = rect.to_pixel_rect(width, height);
    if bounds.is_empty() {
        return Err(TransformError::InvalidRegion {
            reason: format!(
                "crop box rounds to {}x{} on a {width}x{height} image",
                bounds.width, bounds.height
            ),
        });
    }

    let stride = src.row_stride();
    let row_len = bounds.width as usize * CHANNELS;
    let x_offset = bounds.x as usize * CHANNELS;
    let mut pixels = Vec::with_capacity(row_len * bounds.height as usize);
    for y in bounds.y..bounds.y + bounds.height {
        let start = y as usize * stride + x_offset;
        pixels.extend_from_slice(&src.pixels()[start..start + row_len]);
    }

    PixelBuffer::from_raw(bounds.width, bounds.height, pixels).map_err(|err| {
        TransformError::InvalidRegion {
            reason: err.to_string(),
        }
    })
}

/// Inverse-mapped rotation about the buffer centers with bilinear sampling.
/// Quarter turns use exact sine/cosine so samples land on pixel centers and
/// the result is lossless.
fn rotate_about_center(src: &PixelBuffer, degrees: f32, out_w: u32, out_h: u32) -> PixelBuffer {
    if src.is_empty() || out_w == 0 || out_h == 0 {
        return src.clone();
    }
    let (sin, cos) = exact_sin_cos(degrees);
    let src_w = src.width() as i64;
    let src_h = src.height() as i64;
    let src_cx = src.width() as f32 / 2.0;
    let src_cy = src.height() as f32 / 2.0;
    let dst_cx = out_w as f32 / 2.0;
    let dst_cy = out_h as f32 / 2.0;
    let src_stride = src.row_stride();
    let src_raw = src.pixels();

    let sample = |sx: i64, sy: i64| -> [f32; 4] {
        if sx < 0 || sy < 0 || sx >= src_w || sy >= src_h {
            return [0.0; 4];
        }
        let idx = sy as usize * src_stride + sx as usize * CHANNELS;
        [
            f32::from(src_raw[idx]),
            f32::from(src_raw[idx + 1]),
            f32::from(src_raw[idx + 2]),
            f32::from(src_raw[idx + 3]),
        ]
    };

    let row_bytes = out_w as usize * CHANNELS;
    let mut dst = vec![0_u8; row_bytes * out_h as usize];
    dst.par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(dy, row)| {
            let v = dy as f32 + 0.5 - dst_cy;
            for dx in 0..out_w as usize {
                let u = dx as f32 + 0.5 - dst_cx;
                // inverse of a clockwise rotation in screen space
                let src_x = u * cos + v * sin + src_cx - 0.5;
                let src_y = -u * sin + v * cos + src_cy - 0.5;

                let x0 = src_x.floor();
                let y0 = src_y.floor();
                let fx = src_x - x0;
                let fy = src_y - y0;
                let (x0, y0) = (x0 as i64, y0 as i64);

                let tl = sample(x0, y0);
                let tr = sample(x0 + 1, y0);
                let bl = sample(x0, y0 + 1);
                let br = sample(x0 + 1, y0 + 1);

                let px = dx * CHANNELS;
                for c in 0..CHANNELS {
                    let top = tl[c] + (tr[c] - tl[c]) * fx;
                    let bottom = bl[c] + (br[c] - bl[c]) * fx;
                    row[px + c] = to_channel(top + (bottom - top) * fy);
                }
            }
        });

    rebuild(out_w, out_h, dst, src)
}

fn exact_sin_cos(degrees: f32) -> (f32, f32) {
    let normalized = degrees.rem_euclid(360.0);
    match normalized as u32 {
        0 if normalized == 0.0 => (0.0, 1.0),
        90 if normalized == 90.0 => (1.0, 0.0),
        180 if normalized == 180.0 => (0.0, -1.0),
        270 if normalized == 270.0 => (-1.0, 0.0),
        _ => normalized.to_radians().sin_cos(),
    }
}
