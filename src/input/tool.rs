//! Tool selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of editor tools. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Select, move and resize existing annotations
    Select,
    /// Rectangle outline - from corner to corner (Shift: square)
    Rectangle,
    /// Ellipse inscribed in the dragged box (Shift: circle)
    Ellipse,
    /// Arrow with its head at the release point (Shift: 45 degree steps)
    Arrow,
    /// Freehand pen - follows the pointer path
    Freehand,
    /// Translucent marker with axis lock
    Highlighter,
    /// Click to place text, type to edit
    Text,
    /// Darken everything outside the dragged region (Shift: ellipse)
    Spotlight,
    /// Blur or pixelate the dragged region
    Blur,
    /// Click to drop the next numbered badge
    StepCounter,
    /// Click an annotation to delete it
    Eraser,
    /// Click to pick a color from the screenshot
    Eyedropper,
    /// Drag to measure a distance (never stored)
    Ruler,
}

impl ToolKind {
    pub const ALL: [ToolKind; 13] = [
        ToolKind::Select,
        ToolKind::Rectangle,
        ToolKind::Ellipse,
        ToolKind::Arrow,
        ToolKind::Freehand,
        ToolKind::Highlighter,
        ToolKind::Text,
        ToolKind::Spotlight,
        ToolKind::Blur,
        ToolKind::StepCounter,
        ToolKind::Eraser,
        ToolKind::Eyedropper,
        ToolKind::Ruler,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Ellipse => "ellipse",
            ToolKind::Arrow => "arrow",
            ToolKind::Freehand => "freehand",
            ToolKind::Highlighter => "highlighter",
            ToolKind::Text => "text",
            ToolKind::Spotlight => "spotlight",
            ToolKind::Blur => "blur",
            ToolKind::StepCounter => "step_counter",
            ToolKind::Eraser => "eraser",
            ToolKind::Eyedropper => "eyedropper",
            ToolKind::Ruler => "ruler",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
