//! Font selection for text annotations.

use pango::{Style, Weight};

/// Family, weight and style of a text annotation.
///
/// Copied onto every text annotation when it is created so a later config
/// change never restyles existing text. Weight and style are kept as the
/// strings the config file uses; unknown values render as normal.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    pub family: String,
    /// "light", "bold", ... or a CSS-style number from 100 to 900
    pub weight: String,
    /// "normal", "italic" or "oblique"
    pub style: String,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            family: "Sans".to_string(),
            weight: "bold".to_string(),
            style: "normal".to_string(),
        }
    }
}

impl FontDescriptor {
    pub fn new(family: String, weight: String, style: String) -> Self {
        Self {
            family,
            weight,
            style,
        }
    }

    pub fn pango_weight(&self) -> Weight {
        if let Ok(numeric) = self.weight.parse::<u32>() {
            return match numeric {
                0..=149 => Weight::Thin,
                150..=249 => Weight::Ultralight,
                250..=349 => Weight::Light,
                350..=449 => Weight::Normal,
                450..=549 => Weight::Medium,
                550..=649 => Weight::Semibold,
                650..=749 => Weight::Bold,
                750..=849 => Weight::Ultrabold,
                _ => Weight::Heavy,
            };
        }
        match self.weight.to_ascii_lowercase().as_str() {
            "ultralight" => Weight::Ultralight,
            "light" => Weight::Light,
            "bold" => Weight::Bold,
            "ultrabold" => Weight::Ultrabold,
            "heavy" => Weight::Heavy,
            _ => Weight::Normal,
        }
    }

    pub fn pango_style(&self) -> Style {
        match self.style.to_ascii_lowercase().as_str() {
            "italic" => Style::Italic,
            "oblique" => Style::Oblique,
            _ => Style::Normal,
        }
    }

    /// Pango description at `size` points, shared by rendering and measurement.
    pub fn to_pango(&self, size: f64) -> pango::FontDescription {
        let mut desc = pango::FontDescription::new();
        desc.set_family(&self.family);
        desc.set_weight(self.pango_weight());
        desc.set_style(self.pango_style());
        desc.set_size((size.max(1.0) * pango::SCALE as f64).round() as i32);
        desc
    }
}
