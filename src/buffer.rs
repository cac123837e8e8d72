//! Owned RGBA pixel grid shared by every filter, geometry op and history entry.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CHANNELS: usize = 4;

pub type BufferResult<T> = std::result::Result<T, BufferError>;

#[derive(Debug, Error)]
pub enum BufferError {
    #[error("pixel data length {actual} does not match {width}x{height} RGBA ({expected})")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("image has zero area ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode image as {format:?}: {source}")]
    Encode {
        format: ExportFormat,
        #[source]
        source: image::ImageError,
    },
}

/// Rectangular grid of RGBA samples. `pixels.len() == width * height * 4` always.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> BufferResult<Self> {
        let expected = byte_len(width, height);
        if pixels.len() != expected {
            return Err(BufferError::LengthMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Buffer filled with a single color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(byte_len(width, height));
        for _ in 0..(width as usize * height as usize) {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.into_raw(),
        }
    }

    /// Decode a self-describing image blob (PNG, JPEG, ...).
    pub fn decode(bytes: &[u8]) -> BufferResult<Self> {
        let decoded = image::load_from_memory(bytes).map_err(BufferError::Decode)?;
        let rgba = decoded.into_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(BufferError::EmptyImage { width, height });
        }
        Ok(Self::from_rgba_image(rgba))
    }

    pub fn encode(&self, format: ExportFormat) -> BufferResult<Vec<u8>> {
        let mut bytes = Cursor::new(Vec::new());
        let result = match format {
            // JPEG and BMP writers in `image` reject an alpha channel.
            ExportFormat::Jpeg | ExportFormat::Bmp => {
                let rgb = image::DynamicImage::ImageRgba8(self.rgba_image_unchecked()).to_rgb8();
                rgb.write_to(&mut bytes, format.image_format())
            }
            ExportFormat::Png | ExportFormat::Webp => self
                .rgba_image_unchecked()
                .write_to(&mut bytes, format.image_format()),
        };
        result.map_err(|source| BufferError::Encode { format, source })?;
        Ok(bytes.into_inner())
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let mut out = [0_u8; 4];
        out.copy_from_slice(&self.pixels[offset..offset + CHANNELS]);
        Some(out)
    }

    pub fn row_stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    fn rgba_image_unchecked(&self) -> RgbaImage {
        // Length is validated at construction, so `from_raw` cannot fail here;
        // fall back to an empty image rather than panicking.
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .unwrap_or_else(|| RgbaImage::new(0, 0))
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

pub(crate) fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
    Bmp,
}

impl ExportFormat {
    pub const fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Webp => ImageFormat::WebP,
            Self::Bmp => ImageFormat::Bmp,
        }
    }


    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) fn gradient(width: u32, height: u32) -> PixelBuffer {
    let mut pixels = Vec::with_capacity(byte_len(width, height));
    for y in 0..height {
        for x in 0..width {
            pixels.push(((x * 255) / width.max(1)) as u8);
            pixels.push(((y * 255) / height.max(1)) as u8);
            pixels.push(((x + y) % 256) as u8);
            pixels.push(255);
        }
    }
    PixelBuffer {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_rejects_mismatched_length() {
        let err = PixelBuffer::from_raw(2, 2, vec![0; 15]).expect_err("length must be checked");
        assert!(matches!(
            err,
            BufferError::LengthMismatch {
                expected: 16,
                actual: 15,
                ..
            }
        ));
    }

    #[test]
    fn filled_buffer_has_rgba_length() {
        let buffer = PixelBuffer::filled(3, 5, [1, 2, 3, 4]);
        assert_eq!(buffer.pixels().len(), 3 * 5 * 4);
        assert_eq!(buffer.pixel(2, 4), Some([1, 2, 3, 4]));
        assert_eq!(buffer.pixel(3, 0), None);
    }

    #[test]
    fn png_export_decodes_back_to_same_pixels() {
        let buffer = gradient(17, 9);
        let bytes = buffer.encode(ExportFormat::Png).expect("png encode");
        let decoded = PixelBuffer::decode(&bytes).expect("png decode");
        assert_eq!(decoded, buffer);
    }

    #[test]
    fn decode_reports_garbage_input() {
        let err = PixelBuffer::decode(b"not an image").expect_err("garbage must fail");
        assert!(matches!(err, BufferError::Decode(_)));
    }

    #[test]
    fn jpeg_export_drops_alpha_without_failing() {
        let buffer = PixelBuffer::filled(8, 8, [200, 10, 10, 128]);
        let bytes = buffer.encode(ExportFormat::Jpeg).expect("jpeg encode");
        let decoded = PixelBuffer::decode(&bytes).expect("jpeg decode");
        assert_eq!(decoded.dimensions(), (8, 8));
    }

    #[test]
    fn export_format_names_resolve() {
        assert_eq!(ExportFormat::from_name("JPG"), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::from_name("webp"), Some(ExportFormat::Webp));
        assert_eq!(ExportFormat::from_name("tiff"), None);
    }
}
