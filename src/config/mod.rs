//! Configuration file support for inkshot.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/inkshot/config.toml`. Settings include the initial annotation
//! style, per-tool defaults, interaction tuning, zoom limits and keybindings.
//!
//! If no config file exists, sensible defaults are used automatically. The editor
//! reads a `Config` once at session start and never consults it again.

pub mod enums;
pub mod keybindings;
pub mod types;

pub use enums::ColorSpec;
pub use keybindings::{Action, KeyBinding, KeybindingsConfig};
pub use types::{
    ArrowConfig, DrawingConfig, EditorConfig, EffectsConfig, HighlighterConfig, StepConfig,
    ViewportConfig,
};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// All sections are optional in the TOML file and fall back to their defaults.
///
/// # Example TOML
/// ```toml
/// [drawing]
/// default_color = "red"
/// default_thickness = 3.0
/// default_font_size = 18.0
///
/// [effects]
/// blur_mode = "pixelate"
/// blur_radius = 10.0
///
/// [viewport]
/// max_zoom = 16.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Initial annotation style (color, thickness, font)
    #[serde(default)]
    pub drawing: DrawingConfig,

    /// Arrow appearance settings
    #[serde(default)]
    pub arrow: ArrowConfig,

    /// Highlighter color and width
    #[serde(default)]
    pub highlighter: HighlighterConfig,

    /// Blur and spotlight defaults
    #[serde(default)]
    pub effects: EffectsConfig,

    /// Step badge appearance
    #[serde(default)]
    pub step: StepConfig,

    /// Interaction thresholds and history size
    #[serde(default)]
    pub editor: EditorConfig,

    /// Zoom limits
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// Keyboard shortcuts
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

/// Clamps `value` into `min..=max`, warning when it was out of range.
fn clamp_field(name: &str, value: &mut f64, min: f64, max: f64) {
    if !(min..=max).contains(value) {
        warn!(
            "Invalid {} {:.2}, clamping to {:.1}-{:.1} range",
            name, value, min, max
        );
        // NaN clamps to NaN; fall back to the lower bound instead
        *value = if value.is_nan() {
            min
        } else {
            value.clamp(min, max)
        };
    }
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    pub fn validate_and_clamp(&mut self) {
        clamp_field(
            "default_thickness",
            &mut self.drawing.default_thickness,
            1.0,
            40.0,
        );
        clamp_field(
            "default_font_size",
            &mut self.drawing.default_font_size,
            8.0,
            96.0,
        );
        clamp_field("fill_opacity", &mut self.drawing.fill_opacity, 0.0, 1.0);
        clamp_field("arrow length", &mut self.arrow.length, 5.0, 60.0);
        clamp_field("arrow angle", &mut self.arrow.angle_degrees, 15.0, 60.0);
        clamp_field(
            "highlighter thickness",
            &mut self.highlighter.thickness,
            4.0,
            60.0,
        );
        clamp_field("blur_radius", &mut self.effects.blur_radius, 1.0, 64.0);
        clamp_field(
            "spotlight_darkness",
            &mut self.effects.spotlight_darkness,
            0.0,
            1.0,
        );
        clamp_field("step radius", &mut self.step.radius, 8.0, 48.0);
        clamp_field(
            "min_drag_distance",
            &mut self.editor.min_drag_distance,
            0.0,
            50.0,
        );
        clamp_field("hit_tolerance", &mut self.editor.hit_tolerance, 0.0, 50.0);
        clamp_field("handle_size", &mut self.editor.handle_size, 4.0, 32.0);
        clamp_field("min_zoom", &mut self.viewport.min_zoom, 0.01, 1.0);
        clamp_field("max_zoom", &mut self.viewport.max_zoom, 1.0, 64.0);
        clamp_field("zoom_step", &mut self.viewport.zoom_step, 1.01, 4.0);

        // Validate font weight is reasonable
        let valid_weight = matches!(
            self.drawing.font_weight.to_lowercase().as_str(),
            "normal" | "bold" | "light" | "ultralight" | "heavy" | "ultrabold"
        ) || self
            .drawing
            .font_weight
            .parse::<u32>()
            .is_ok_and(|w| (100..=900).contains(&w));

        if !valid_weight {
            warn!(
                "Invalid font_weight '{}', falling back to 'bold'",
                self.drawing.font_weight
            );
            self.drawing.font_weight = "bold".to_string();
        }

        if !matches!(
            self.drawing.font_style.to_lowercase().as_str(),
            "normal" | "italic" | "oblique"
        ) {
            warn!(
                "Invalid font_style '{}', falling back to 'normal'",
                self.drawing.font_style
            );
            self.drawing.font_style = "normal".to_string();
        }

        if self.drawing.font_family.trim().is_empty() {
            warn!("Empty font_family, falling back to 'Sans'");
            self.drawing.font_family = "Sans".to_string();
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/inkshot/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("inkshot");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Loads and validates the configuration file at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config = Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config.validate_and_clamp();

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Parses a TOML document without validation.
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// JSON schema of the configuration file, for editors and tooling.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::BlurMode;

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.drawing.default_thickness, 3.0);
        assert_eq!(config.drawing.default_font_size, 18.0);
        assert_eq!(config.editor.min_drag_distance, 3.0);
        assert_eq!(config.editor.hit_tolerance, 5.0);
        assert_eq!(config.viewport.min_zoom, 0.1);
        assert_eq!(config.viewport.max_zoom, 8.0);
        assert_eq!(config.effects.blur_mode, BlurMode::Blur);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [effects]
            blur_mode = "pixelate"

            [keybindings]
            undo = ["Ctrl+U"]
            "#,
        )
        .unwrap();
        assert_eq!(config.effects.blur_mode, BlurMode::Pixelate);
        assert_eq!(config.effects.blur_radius, 12.0);
        assert_eq!(config.keybindings.undo, vec!["Ctrl+U".to_string()]);
        assert_eq!(config.keybindings.redo.len(), 2);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut config = Config::from_toml(
            r#"
            [drawing]
            default_thickness = 500.0
            font_weight = "enormous"

            [arrow]
            angle_degrees = 2.0

            [viewport]
            zoom_step = 0.5
            "#,
        )
        .unwrap();
        config.validate_and_clamp();
        assert_eq!(config.drawing.default_thickness, 40.0);
        assert_eq!(config.drawing.font_weight, "bold");
        assert_eq!(config.arrow.angle_degrees, 15.0);
        assert_eq!(config.viewport.zoom_step, 1.01);
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[step]\nradius = 100.0\ncolor = \"blue\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.step.radius, 48.0);
        assert_eq!(config.step.color, ColorSpec::Name("blue".into()));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[drawing\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn schema_lists_sections() {
        let schema = serde_json::to_value(Config::json_schema()).unwrap();
        let properties = schema.get("properties").unwrap();
        for section in ["drawing", "effects", "editor", "viewport", "keybindings"] {
            assert!(properties.get(section).is_some(), "missing {section}");
        }
    }
}
