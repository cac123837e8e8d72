//! Effect identifiers and their mapping onto filters and geometry ops.

mod catalog;

pub use catalog::{Catalog, EffectCategory, EffectDescriptor};

use crate::filters::Filter;

pub const ROTATE_ID: &str = "rotate";
pub const FLIP_ID: &str = "flip";
pub const CROP_ID: &str = "crop";

/// What a dispatched identifier does.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectKind {
    Filter(Filter),
    Rotate,
    Flip,
    /// Enters an interactive crop session instead of producing pixels.
    Crop,
}

/// Identifier → behavior table. Identifiers not listed here fall back to
/// `Filter::Simulated`.
static REGISTRY: [(&str, EffectKind); 21] = [
    ("black-white", EffectKind::Filter(Filter::Grayscale)),
    ("grayscale", EffectKind::Filter(Filter::Grayscale)),
    ("sepia", EffectKind::Filter(Filter::Sepia)),
    ("vintage", EffectKind::Filter(Filter::Vintage)),
    ("vintage-film", EffectKind::Filter(Filter::Vintage)),
    ("hdr", EffectKind::Filter(Filter::Hdr)),
    ("cross-process", EffectKind::Filter(Filter::CrossProcess)),
    ("brightness", EffectKind::Filter(Filter::Brightness(120.0))),
    ("contrast", EffectKind::Filter(Filter::Contrast(120.0))),
    ("saturation-boost", EffectKind::Filter(Filter::Saturation(150.0))),
    ("color-boost", EffectKind::Filter(Filter::Saturation(150.0))),
    ("desaturation", EffectKind::Filter(Filter::Saturation(50.0))),
    ("hue-shift", EffectKind::Filter(Filter::HueShift(180.0))),
    ("sharpen", EffectKind::Filter(Filter::Sharpen)),
    ("noise-reduction", EffectKind::Filter(Filter::NoiseReduction)),
    ("clarity", EffectKind::Filter(Filter::Clarity)),
    ("vignette", EffectKind::Filter(Filter::Vignette(0.5))),
    ("soft-focus", EffectKind::Filter(Filter::SoftFocus)),
    (ROTATE_ID, EffectKind::Rotate),
    (FLIP_ID, EffectKind::Flip),
    (CROP_ID, EffectKind::Crop),
];

impl EffectKind {
    pub fn resolve(effect_id: &str) -> Self {
        REGISTRY
            .iter()
            .find(|(id, _)| *id == effect_id)
            .map(|(_, kind)| kind.clone())
            .unwrap_or_else(|| Self::Filter(Filter::Simulated(effect_id.to_string())))
    }

    /// Whether the identifier only has the placeholder rendering.
    pub fn is_simulated(&self) -> bool {
        matches!(self, Self::Filter(filter) if filter.is_simulated())
    }
}
