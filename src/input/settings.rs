//! Session-wide inputs derived from the configuration at startup.

use crate::config::Config;
use crate::draw::{Color, FontDescriptor};
use crate::scene::{BlurMode, Style};

/// Interaction tuning, fixed for the lifetime of an editor session.
///
/// Distances are screen pixels; tools divide them by the zoom factor.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSettings {
    pub min_drag_distance: f64,
    pub hit_tolerance: f64,
    pub handle_size: f64,
    pub history_limit: usize,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
}

impl EditorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_drag_distance: config.editor.min_drag_distance,
            hit_tolerance: config.editor.hit_tolerance,
            handle_size: config.editor.handle_size,
            history_limit: config.editor.history_limit,
            min_zoom: config.viewport.min_zoom,
            max_zoom: config.viewport.max_zoom,
            zoom_step: config.viewport.zoom_step,
        }
    }
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Style and payload applied to newly created annotations.
///
/// Starts from the configuration; keybindings and the eyedropper change it at
/// runtime without touching existing annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefaults {
    /// Style of shapes, strokes, text and rulers
    pub style: Style,
    pub font: FontDescriptor,
    pub arrow_length: f64,
    pub arrow_angle: f64,
    /// Style of highlighter strokes
    pub highlighter: Style,
    pub blur_mode: BlurMode,
    pub blur_radius: f64,
    pub spotlight_darkness: f64,
    pub step_color: Color,
    pub step_radius: f64,
}

impl ToolDefaults {
    pub fn from_config(config: &Config) -> Self {
        let drawing = &config.drawing;
        let style = Style {
            stroke: drawing.default_color.to_color(),
            width: drawing.default_thickness,
            fill: None,
            opacity: drawing.fill_opacity,
            font_size: drawing.default_font_size,
        };
        let highlighter = Style {
            stroke: config.highlighter.color.to_color(),
            width: config.highlighter.thickness,
            ..style.clone()
        };
        Self {
            font: FontDescriptor::new(
                drawing.font_family.clone(),
                drawing.font_weight.clone(),
                drawing.font_style.clone(),
            ),
            arrow_length: config.arrow.length,
            arrow_angle: config.arrow.angle_degrees,
            highlighter,
            blur_mode: config.effects.blur_mode,
            blur_radius: config.effects.blur_radius,
            spotlight_darkness: config.effects.spotlight_darkness,
            step_color: config.step.color.to_color(),
            step_radius: config.step.radius,
            style,
        }
    }

    /// Style of a new step badge.
    pub fn step_style(&self) -> Style {
        Style {
            stroke: self.step_color,
            ..self.style.clone()
        }
    }
}

impl Default for ToolDefaults {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
