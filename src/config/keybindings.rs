//! Keybinding configuration types and parsing.
//!
//! Every editor action can be bound to any number of key chords. Bindings are
//! parsed once at session start into a lookup map.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All possible actions that can be bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // Cancellation and editing
    Cancel,
    Undo,
    Redo,
    DeleteSelection,
    SelectAll,

    // Tool selection
    SelectTool,
    RectangleTool,
    EllipseTool,
    ArrowTool,
    FreehandTool,
    HighlighterTool,
    TextTool,
    SpotlightTool,
    BlurTool,
    StepTool,
    EraserTool,
    EyedropperTool,
    RulerTool,

    // Image
    CropToSelection,

    // Viewport
    ZoomIn,
    ZoomOut,
    ResetZoom,
    FitToWindow,

    // Z-order
    BringToFront,
    SendToBack,
    BringForward,
    SendBackward,

    // Style adjustments
    IncreaseThickness,
    DecreaseThickness,
    IncreaseFontSize,
    DecreaseFontSize,
}

/// A single keybinding: a key name with optional modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyBinding {
    /// Parse a keybinding string like "Ctrl+Shift+Z" or "Escape".
    /// Modifiers can appear in any order and spaces around '+' are allowed.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty keybinding string".to_string());
        }

        let normalized = s.replace(" + ", "+").replace("+ ", "+").replace(" +", "+");

        let mut ctrl = false;
        let mut shift = false;
        let mut alt = false;
        let mut key_parts = Vec::new();

        for part in normalized.split('+') {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => ctrl = true,
                "shift" => shift = true,
                "alt" => alt = true,
                _ => key_parts.push(part),
            }
        }

        if key_parts.is_empty() {
            return Err(format!("No key specified in: {}", s));
        }

        // "Ctrl++" splits into ["Ctrl", "", ""]: the empty parts are the '+' key
        let key = if key_parts.iter().all(|p| p.is_empty()) {
            "+".to_string()
        } else {
            key_parts.join("+")
        };

        Ok(Self {
            key: key.to_lowercase(),
            ctrl,
            shift,
            alt,
        })
    }

    /// Check if this keybinding matches the current input state.
    pub fn matches(&self, key: &str, ctrl: bool, shift: bool, alt: bool) -> bool {
        self.key.eq_ignore_ascii_case(key)
            && self.ctrl == ctrl
            && self.shift == shift
            && self.alt == alt
    }
}

/// Configuration for all keybindings.
///
/// Users specify them in config.toml as:
/// ```toml
/// [keybindings]
/// undo = ["Ctrl+Z"]
/// redo = ["Ctrl+Shift+Z", "Ctrl+Y"]
/// rectangle_tool = ["R"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KeybindingsConfig {
    #[serde(default = "default_cancel")]
    pub cancel: Vec<String>,

    #[serde(default = "default_undo")]
    pub undo: Vec<String>,

    #[serde(default = "default_redo")]
    pub redo: Vec<String>,

    #[serde(default = "default_delete_selection")]
    pub delete_selection: Vec<String>,

    #[serde(default = "default_select_all")]
    pub select_all: Vec<String>,

    #[serde(default = "default_select_tool")]
    pub select_tool: Vec<String>,

    #[serde(default = "default_rectangle_tool")]
    pub rectangle_tool: Vec<String>,

    #[serde(default = "default_ellipse_tool")]
    pub ellipse_tool: Vec<String>,

    #[serde(default = "default_arrow_tool")]
    pub arrow_tool: Vec<String>,

    #[serde(default = "default_freehand_tool")]
    pub freehand_tool: Vec<String>,

    #[serde(default = "default_highlighter_tool")]
    pub highlighter_tool: Vec<String>,

    #[serde(default = "default_text_tool")]
    pub text_tool: Vec<String>,

    #[serde(default = "default_spotlight_tool")]
    pub spotlight_tool: Vec<String>,

    #[serde(default = "default_blur_tool")]
    pub blur_tool: Vec<String>,

    #[serde(default = "default_step_tool")]
    pub step_tool: Vec<String>,

    #[serde(default = "default_eraser_tool")]
    pub eraser_tool: Vec<String>,

    #[serde(default = "default_eyedropper_tool")]
    pub eyedropper_tool: Vec<String>,

    #[serde(default = "default_ruler_tool")]
    pub ruler_tool: Vec<String>,

    #[serde(default = "default_crop_to_selection")]
    pub crop_to_selection: Vec<String>,

    #[serde(default = "default_zoom_in")]
    pub zoom_in: Vec<String>,

    #[serde(default = "default_zoom_out")]
    pub zoom_out: Vec<String>,

    #[serde(default = "default_reset_zoom")]
    pub reset_zoom: Vec<String>,

    #[serde(default = "default_fit_to_window")]
    pub fit_to_window: Vec<String>,

    #[serde(default = "default_bring_to_front")]
    pub bring_to_front: Vec<String>,

    #[serde(default = "default_send_to_back")]
    pub send_to_back: Vec<String>,

    #[serde(default = "default_bring_forward")]
    pub bring_forward: Vec<String>,

    #[serde(default = "default_send_backward")]
    pub send_backward: Vec<String>,

    #[serde(default = "default_increase_thickness")]
    pub increase_thickness: Vec<String>,

    #[serde(default = "default_decrease_thickness")]
    pub decrease_thickness: Vec<String>,

    #[serde(default = "default_increase_font_size")]
    pub increase_font_size: Vec<String>,

    #[serde(default = "default_decrease_font_size")]
    pub decrease_font_size: Vec<String>,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            cancel: default_cancel(),
            undo: default_undo(),
            redo: default_redo(),
            delete_selection: default_delete_selection(),
            select_all: default_select_all(),
            select_tool: default_select_tool(),
            rectangle_tool: default_rectangle_tool(),
            ellipse_tool: default_ellipse_tool(),
            arrow_tool: default_arrow_tool(),
            freehand_tool: default_freehand_tool(),
            highlighter_tool: default_highlighter_tool(),
            text_tool: default_text_tool(),
            spotlight_tool: default_spotlight_tool(),
            blur_tool: default_blur_tool(),
            step_tool: default_step_tool(),
            eraser_tool: default_eraser_tool(),
            eyedropper_tool: default_eyedropper_tool(),
            ruler_tool: default_ruler_tool(),
            crop_to_selection: default_crop_to_selection(),
            zoom_in: default_zoom_in(),
            zoom_out: default_zoom_out(),
            reset_zoom: default_reset_zoom(),
            fit_to_window: default_fit_to_window(),
            bring_to_front: default_bring_to_front(),
            send_to_back: default_send_to_back(),
            bring_forward: default_bring_forward(),
            send_backward: default_send_backward(),
            increase_thickness: default_increase_thickness(),
            decrease_thickness: default_decrease_thickness(),
            increase_font_size: default_increase_font_size(),
            decrease_font_size: default_decrease_font_size(),
        }
    }
}

impl KeybindingsConfig {
    /// Builds a lookup map from keybindings to actions.
    /// Returns an error if any keybinding string is invalid or if duplicates are detected.
    pub fn build_action_map(&self) -> Result<HashMap<KeyBinding, Action>, String> {
        let mut map = HashMap::new();

        let groups: [(&[String], Action); 31] = [
            (self.cancel.as_slice(), Action::Cancel),
            (self.undo.as_slice(), Action::Undo),
            (self.redo.as_slice(), Action::Redo),
            (self.delete_selection.as_slice(), Action::DeleteSelection),
            (self.select_all.as_slice(), Action::SelectAll),
            (self.select_tool.as_slice(), Action::SelectTool),
            (self.rectangle_tool.as_slice(), Action::RectangleTool),
            (self.ellipse_tool.as_slice(), Action::EllipseTool),
            (self.arrow_tool.as_slice(), Action::ArrowTool),
            (self.freehand_tool.as_slice(), Action::FreehandTool),
            (self.highlighter_tool.as_slice(), Action::HighlighterTool),
            (self.text_tool.as_slice(), Action::TextTool),
            (self.spotlight_tool.as_slice(), Action::SpotlightTool),
            (self.blur_tool.as_slice(), Action::BlurTool),
            (self.step_tool.as_slice(), Action::StepTool),
            (self.eraser_tool.as_slice(), Action::EraserTool),
            (self.eyedropper_tool.as_slice(), Action::EyedropperTool),
            (self.ruler_tool.as_slice(), Action::RulerTool),
            (self.crop_to_selection.as_slice(), Action::CropToSelection),
            (self.zoom_in.as_slice(), Action::ZoomIn),
            (self.zoom_out.as_slice(), Action::ZoomOut),
            (self.reset_zoom.as_slice(), Action::ResetZoom),
            (self.fit_to_window.as_slice(), Action::FitToWindow),
            (self.bring_to_front.as_slice(), Action::BringToFront),
            (self.send_to_back.as_slice(), Action::SendToBack),
            (self.bring_forward.as_slice(), Action::BringForward),
            (self.send_backward.as_slice(), Action::SendBackward),
            (self.increase_thickness.as_slice(), Action::IncreaseThickness),
            (self.decrease_thickness.as_slice(), Action::DecreaseThickness),
            (self.increase_font_size.as_slice(), Action::IncreaseFontSize),
            (self.decrease_font_size.as_slice(), Action::DecreaseFontSize),
        ];

        for (bindings, action) in groups {
            for binding_str in bindings {
                let binding = KeyBinding::parse(binding_str)?;
                if let Some(existing_action) = map.insert(binding, action) {
                    return Err(format!(
                        "Duplicate keybinding '{}' assigned to both {:?} and {:?}",
                        binding_str, existing_action, action
                    ));
                }
            }
        }

        Ok(map)
    }
}

// =============================================================================
// Default keybinding functions
// =============================================================================

fn default_cancel() -> Vec<String> {
    vec!["Escape".to_string()]
}

fn default_undo() -> Vec<String> {
    vec!["Ctrl+Z".to_string()]
}

fn default_redo() -> Vec<String> {
    vec!["Ctrl+Shift+Z".to_string(), "Ctrl+Y".to_string()]
}

fn default_delete_selection() -> Vec<String> {
    vec!["Delete".to_string(), "Backspace".to_string()]
}

fn default_select_all() -> Vec<String> {
    vec!["Ctrl+A".to_string()]
}

fn default_select_tool() -> Vec<String> {
    vec!["V".to_string()]
}

fn default_rectangle_tool() -> Vec<String> {
    vec!["R".to_string()]
}

fn default_ellipse_tool() -> Vec<String> {
    vec!["E".to_string()]
}

fn default_arrow_tool() -> Vec<String> {
    vec!["A".to_string()]
}

fn default_freehand_tool() -> Vec<String> {
    vec!["P".to_string()]
}

fn default_highlighter_tool() -> Vec<String> {
    vec!["H".to_string()]
}

fn default_text_tool() -> Vec<String> {
    vec!["T".to_string()]
}

fn default_spotlight_tool() -> Vec<String> {
    vec!["S".to_string()]
}

fn default_blur_tool() -> Vec<String> {
    vec!["B".to_string()]
}

fn default_step_tool() -> Vec<String> {
    vec!["N".to_string()]
}

fn default_eraser_tool() -> Vec<String> {
    vec!["X".to_string()]
}

fn default_eyedropper_tool() -> Vec<String> {
    vec!["I".to_string()]
}

fn default_ruler_tool() -> Vec<String> {
    vec!["M".to_string()]
}

fn default_zoom_in() -> Vec<String> {
    vec!["Ctrl+=".to_string(), "Ctrl++".to_string()]
}

fn default_zoom_out() -> Vec<String> {
    vec!["Ctrl+-".to_string()]
}

fn default_reset_zoom() -> Vec<String> {
    vec!["Ctrl+0".to_string()]
}

fn default_fit_to_window() -> Vec<String> {
    vec!["Ctrl+9".to_string()]
}

fn default_crop_to_selection() -> Vec<String> {
    vec!["Ctrl+Shift+X".to_string()]
}

fn default_bring_to_front() -> Vec<String> {
    vec!["Ctrl+Shift+]".to_string()]
}

fn default_send_to_back() -> Vec<String> {
    vec!["Ctrl+Shift+[".to_string()]
}

fn default_bring_forward() -> Vec<String> {
    vec!["Ctrl+]".to_string()]
}

fn default_send_backward() -> Vec<String> {
    vec!["Ctrl+[".to_string()]
}

fn default_increase_thickness() -> Vec<String> {
    vec!["]".to_string()]
}

fn default_decrease_thickness() -> Vec<String> {
    vec!["[".to_string()]
}

fn default_increase_font_size() -> Vec<String> {
    vec!["Ctrl+Shift++".to_string(), "Ctrl+Shift+=".to_string()]
}

fn default_decrease_font_size() -> Vec<String> {
    vec!["Ctrl+Shift+-".to_string(), "Ctrl+Shift+_".to_string()]
}
