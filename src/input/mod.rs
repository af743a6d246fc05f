//! Input handling and the tool framework.
//!
//! This module defines the generic key and mouse types the editor receives, the
//! modifier tracker, the session settings derived from the configuration, and
//! the closed set of interactive tools.

pub mod events;
pub mod modifiers;
pub mod settings;
pub mod tool;
pub mod tools;

pub use events::{Key, MouseButton};
pub use modifiers::Modifiers;
pub use settings::{EditorSettings, ToolDefaults};
pub use tool::ToolKind;
pub use tools::{PreviewContext, Tool, ToolContext};
