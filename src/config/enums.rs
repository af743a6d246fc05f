//! Configuration enum types.

use crate::draw::{Color, color};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Color specification - either a named color or RGB values.
///
/// # Examples
/// ```toml
/// # Named color
/// default_color = "red"
///
/// # Custom RGB color (0-255 per component)
/// default_color = [255, 128, 0]  # Orange
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Named color: red, green, blue, yellow, orange, pink, white, black
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Converts the color specification to a [`Color`].
    ///
    /// Unknown color names fall back to red with a warning.
    pub fn to_color(&self) -> Color {
        match self {
            ColorSpec::Name(name) => color::name_to_color(name).unwrap_or_else(|| {
                warn!("Unknown color '{}', using red", name);
                color::RED
            }),
            ColorSpec::Rgb([r, g, b]) => Color::from_rgb8(*r, *g, *b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_and_rgb_colors_resolve() {
        assert_eq!(ColorSpec::Name("Yellow".into()).to_color(), color::YELLOW);
        assert_eq!(
            ColorSpec::Rgb([211, 78, 78]).to_color(),
            Color::from_rgb8(211, 78, 78)
        );
    }

    #[test]
    fn unknown_name_falls_back_to_red() {
        assert_eq!(ColorSpec::Name("chartreuse".into()).to_color(), color::RED);
    }
}
