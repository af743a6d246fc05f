//! Configuration type definitions.

use super::enums::ColorSpec;
use crate::scene::BlurMode;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Drawing-related settings.
///
/// Initial style for new annotations. Users can change these at runtime with
/// keybindings or the properties panel.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DrawingConfig {
    /// Default stroke color - either a named color (red, green, blue, yellow, orange, pink, white, black)
    /// or an RGB array like `[255, 0, 0]` for red
    #[serde(default = "default_color")]
    pub default_color: ColorSpec,

    /// Default stroke width in pixels (valid range: 1.0 - 40.0)
    #[serde(default = "default_thickness")]
    pub default_thickness: f64,

    /// Default font size for text annotations (valid range: 8.0 - 96.0)
    #[serde(default = "default_font_size")]
    pub default_font_size: f64,

    /// Font family name for text rendering (e.g., "Sans", "Monospace", "JetBrains Mono")
    /// Falls back to "Sans" if the specified font is not available
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Font weight (e.g., "normal", "bold", "light", 400, 700)
    #[serde(default = "default_font_weight")]
    pub font_weight: String,

    /// Font style (e.g., "normal", "italic", "oblique")
    #[serde(default = "default_font_style")]
    pub font_style: String,

    /// Opacity of annotation colors (valid range: 0.0 - 1.0)
    #[serde(default = "default_fill_opacity")]
    pub fill_opacity: f64,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            default_thickness: default_thickness(),
            default_font_size: default_font_size(),
            font_family: default_font_family(),
            font_weight: default_font_weight(),
            font_style: default_font_style(),
            fill_opacity: default_fill_opacity(),
        }
    }
}

/// Arrow drawing settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArrowConfig {
    /// Arrowhead length in pixels (valid range: 5.0 - 60.0)
    #[serde(default = "default_arrow_length")]
    pub length: f64,

    /// Arrowhead angle in degrees (valid range: 15.0 - 60.0)
    /// Smaller angles create narrower arrowheads, larger angles create wider ones
    #[serde(default = "default_arrow_angle")]
    pub angle_degrees: f64,
}

impl Default for ArrowConfig {
    fn default() -> Self {
        Self {
            length: default_arrow_length(),
            angle_degrees: default_arrow_angle(),
        }
    }
}

/// Highlighter tool settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HighlighterConfig {
    /// Marker color; multiplied with the image underneath
    #[serde(default = "default_highlighter_color")]
    pub color: ColorSpec,

    /// Marker width in pixels (valid range: 4.0 - 60.0)
    #[serde(default = "default_highlighter_thickness")]
    pub thickness: f64,
}

impl Default for HighlighterConfig {
    fn default() -> Self {
        Self {
            color: default_highlighter_color(),
            thickness: default_highlighter_thickness(),
        }
    }
}

/// Blur and spotlight settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EffectsConfig {
    /// Filter used by new blur regions (blur, pixelate)
    #[serde(default = "default_blur_mode")]
    pub blur_mode: BlurMode,

    /// Blur radius or pixel block size (valid range: 1.0 - 64.0)
    #[serde(default = "default_blur_radius")]
    pub blur_radius: f64,

    /// Alpha of the shade outside a spotlight (valid range: 0.0 - 1.0)
    #[serde(default = "default_spotlight_darkness")]
    pub spotlight_darkness: f64,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            blur_mode: default_blur_mode(),
            blur_radius: default_blur_radius(),
            spotlight_darkness: default_spotlight_darkness(),
        }
    }
}

/// Step badge settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StepConfig {
    /// Badge fill color
    #[serde(default = "default_step_color")]
    pub color: ColorSpec,

    /// Badge radius in pixels (valid range: 8.0 - 48.0)
    #[serde(default = "default_step_radius")]
    pub radius: f64,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            color: default_step_color(),
            radius: default_step_radius(),
        }
    }
}

/// Interaction tuning.
///
/// Distances are in screen pixels and are divided by the zoom factor before
/// being compared with image-space geometry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EditorConfig {
    /// Drags shorter than this never create an annotation
    #[serde(default = "default_min_drag_distance")]
    pub min_drag_distance: f64,

    /// How close the pointer must be to a stroke to hit it
    #[serde(default = "default_hit_tolerance")]
    pub hit_tolerance: f64,

    /// Side length of resize handles
    #[serde(default = "default_handle_size")]
    pub handle_size: f64,

    /// Maximum number of undo steps (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_drag_distance: default_min_drag_distance(),
            hit_tolerance: default_hit_tolerance(),
            handle_size: default_handle_size(),
            history_limit: default_history_limit(),
        }
    }
}

/// Zoom limits and step.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ViewportConfig {
    /// Smallest zoom factor (0.1 = 10%)
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,

    /// Largest zoom factor (8.0 = 800%)
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,

    /// Multiplier applied per zoom step or scroll notch
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            zoom_step: default_zoom_step(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_color() -> ColorSpec {
    ColorSpec::Rgb([255, 80, 80])
}

fn default_thickness() -> f64 {
    3.0
}

fn default_font_size() -> f64 {
    18.0
}

fn default_font_family() -> String {
    "Sans".to_string()
}

fn default_font_weight() -> String {
    "bold".to_string()
}

fn default_font_style() -> String {
    "normal".to_string()
}

fn default_fill_opacity() -> f64 {
    1.0
}

fn default_arrow_length() -> f64 {
    16.0
}

fn default_arrow_angle() -> f64 {
    30.0
}

fn default_highlighter_color() -> ColorSpec {
    ColorSpec::Name("yellow".to_string())
}

fn default_highlighter_thickness() -> f64 {
    20.0
}

fn default_blur_mode() -> BlurMode {
    BlurMode::Blur
}

fn default_blur_radius() -> f64 {
    12.0
}

fn default_spotlight_darkness() -> f64 {
    0.6
}

fn default_step_color() -> ColorSpec {
    ColorSpec::Rgb([211, 78, 78])
}

fn default_step_radius() -> f64 {
    16.0
}

fn default_min_drag_distance() -> f64 {
    3.0
}

fn default_hit_tolerance() -> f64 {
    5.0
}

fn default_handle_size() -> f64 {
    8.0
}

fn default_history_limit() -> usize {
    500
}

fn default_min_zoom() -> f64 {
    0.1
}

fn default_max_zoom() -> f64 {
    8.0
}

fn default_zoom_step() -> f64 {
    1.25
}
