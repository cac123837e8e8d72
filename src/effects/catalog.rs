//! Presentation catalog of effect identifiers. Dispatch only needs the `id`
//! strings; categories and names exist for menus and the CLI listing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectCategory {
    pub name: String,
    pub effects: Vec<EffectDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Catalog {
    categories: Vec<EffectCategory>,
    #[serde(default)]
    quick_effects: Vec<EffectDescriptor>,
}

const BASIC: &[(&str, &str)] = &[
    ("black-white", "Black and White"),
    ("grayscale", "Grayscale"),
    ("sepia", "Sepia"),
    ("vintage", "Vintage"),
    ("vintage-film", "Vintage Film"),
    ("hdr", "HDR"),
    ("cross-process", "Cross Process"),
    ("brightness", "Brightness"),
    ("contrast", "Contrast"),
    ("saturation-boost", "Saturation Boost"),
    ("color-boost", "Color Boost"),
    ("desaturation", "Desaturation"),
    ("hue-shift", "Hue Shift"),
];

const ENHANCE: &[(&str, &str)] = &[
    ("sharpen", "Sharpen"),
    ("noise-reduction", "Noise Reduction"),
    ("clarity", "Clarity"),
    ("vignette", "Vignette"),
    ("soft-focus", "Soft Focus"),
];

const TRANSFORM: &[(&str, &str)] = &[("rotate", "Rotate"), ("flip", "Flip"), ("crop", "Crop")];

const QUICK: &[(&str, &str)] = &[
    ("black-white", "B&W"),
    ("sepia", "Sepia"),
    ("vintage", "Vintage"),
    ("pop-art", "Pop Art"),
    ("rotate", "Rotate"),
    ("crop", "Crop"),
];

fn descriptors(table: &[(&str, &str)]) -> Vec<EffectDescriptor> {
    table
        .iter()
        .map(|(id, name)| EffectDescriptor {
            id: (*id).to_string(),
            name: (*name).to_string(),
        })
        .collect()
}

impl Catalog {
    pub fn new(categories: Vec<EffectCategory>, quick_effects: Vec<EffectDescriptor>) -> Self {
        Self {
            categories,
            quick_effects,
        }
    }

    pub fn builtin() -> Self {
        let category = |name: &str, table: &[(&str, &str)]| EffectCategory {
            name: name.to_string(),
            effects: descriptors(table),
        };
        Self::new(
            vec![
                category("Basic", BASIC),
                category("Enhance", ENHANCE),
                category("Transform", TRANSFORM),
            ],
            descriptors(QUICK),
        )
    }

    pub fn categories(&self) -> &[EffectCategory] {
        &self.categories
    }

    pub fn quick_effects(&self) -> &[EffectDescriptor] {
        &self.quick_effects
    }

    pub fn find(&self, effect_id: &str) -> Option<&EffectDescriptor> {
        self.categories
            .iter()
            .flat_map(|category| category.effects.iter())
            .chain(self.quick_effects.iter())
            .find(|effect| effect.id == effect_id)
    }

    /// Catalog name for `effect_id`, or the identifier with dashes turned
    /// into spaces when it is not listed.
    pub fn display_name(&self, effect_id: &str) -> String {
        self.find(effect_id)
            .map(|effect| effect.name.clone())
            .unwrap_or_else(|| effect_id.replace('-', " "))
    }

    /// Case-insensitive match on name or id. Categories left without any
    /// match are dropped; a blank query returns the whole catalog.
    pub fn search(&self, query: &str) -> Vec<EffectCategory> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.categories.clone();
        }
        self.categories
            .iter()
            .filter_map(|category| {
                let effects: Vec<EffectDescriptor> = category
                    .effects
                    .iter()
                    .filter(|effect| {
                        effect.name.to_lowercase().contains(&needle)
                            || effect.id.to_lowercase().contains(&needle)
                    })
                    .cloned()
                    .collect();
                (!effects.is_empty()).then(|| EffectCategory {
                    name: category.name.clone(),
                    effects,
                })
            })
            .collect()
    }
}
