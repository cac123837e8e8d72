//! Placeholder rendering for catalog entries that have no real algorithm.
//! The output is a repeatable hue rotation plus a badge naming the effect, so
//! the change is visible and clearly labeled as simulated.

use font8x8::{UnicodeFonts, BASIC_FONTS};

use super::hue_shift;
use crate::buffer::{PixelBuffer, CHANNELS};

const BADGE_X: u32 = 10;
const BADGE_Y: u32 = 10;
const BADGE_WIDTH: u32 = 200;
const BADGE_HEIGHT: u32 = 30;
const BADGE_OPACITY: f32 = 0.8;
const TEXT_OPACITY: f32 = 0.8;
const TEXT_PADDING: u32 = 5;
const GLYPH_SIZE: u32 = 8;

/// Hue offset derived from the identifier's UTF-16 code units.
pub fn simulated_hue(effect_id: &str) -> u32 {
    effect_id
        .encode_utf16()
        .fold(0_u32, |acc, unit| acc.wrapping_add(u32::from(unit)))
        % 360
}

pub fn simulated(src: &PixelBuffer, effect_id: &str) -> PixelBuffer {
    let mut out = hue_shift(src, simulated_hue(effect_id) as f32);
    draw_badge(&mut out, &format!("{effect_id} (simulated)"));
    out
}

fn draw_badge(buffer: &mut PixelBuffer, label: &str) {
    fill_rect(
        buffer,
        BADGE_X,
        BADGE_Y,
        BADGE_WIDTH,
        BADGE_HEIGHT,
        [255, 255, 255],
        BADGE_OPACITY,
    );

    let chars = label.chars().count() as u32;
    let room = BADGE_WIDTH - 2 * TEXT_PADDING;
    let scale = if chars * GLYPH_SIZE * 2 <= room { 2 } else { 1 };
    let text_y = BADGE_Y + (BADGE_HEIGHT - GLYPH_SIZE * scale) / 2;
    draw_text(buffer, BADGE_X + TEXT_PADDING, text_y, label, scale);
}

fn fill_rect(
    buffer: &mut PixelBuffer,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    rgb: [u8; 3],
    opacity: f32,
) {
    let x_end = x.saturating_add(width).min(buffer.width());
    let y_end = y.saturating_add(height).min(buffer.height());
    for py in y..y_end {
        for px in x..x_end {
            blend(buffer, px, py, rgb, opacity);
        }
    }
}

fn draw_text(buffer: &mut PixelBuffer, x: u32, y: u32, text: &str, scale: u32) {
    let mut cursor_x = x;
    for ch in text.chars() {
        let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
            cursor_x += GLYPH_SIZE * scale;
            continue;
        };
        for (row_idx, row_bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if (row_bits >> col) & 1 == 0 {
                    continue;
                }
                let px = cursor_x + col * scale;
                let py = y + row_idx as u32 * scale;
                fill_rect(buffer, px, py, scale, scale, [0, 0, 0], TEXT_OPACITY);
            }
        }
        cursor_x += GLYPH_SIZE * scale;
    }
}

/// Source-over blend of an RGB color at `opacity`; alpha becomes opaque-ish
/// in the same way a canvas fill would.
fn blend(buffer: &mut PixelBuffer, x: u32, y: u32, rgb: [u8; 3], opacity: f32) {
    if x >= buffer.width() || y >= buffer.height() {
        return;
    }
    let offset = (y as usize * buffer.width() as usize + x as usize) * CHANNELS;
    let pixels = buffer.pixels_mut();
    for c in 0..3 {
        let base = f32::from(pixels[offset + c]);
        let top = f32::from(rgb[c]);
        pixels[offset + c] = super::to_channel(top * opacity + base * (1.0 - opacity));
    }
    let alpha = f32::from(pixels[offset + 3]) / 255.0;
    pixels[offset + 3] = super::to_channel((opacity + alpha * (1.0 - opacity)) * 255.0);
}
