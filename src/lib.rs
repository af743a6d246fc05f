//! Screenshot annotation editor core.
//!
//! A captured image becomes a [`scene::Scene`]; tools turn pointer and key
//! events into undoable [`history::Command`]s, the [`viewport::Viewport`] maps
//! device pixels to image pixels, and [`draw`] composites and flattens the
//! result. [`Editor`] ties one session together.

pub mod capture;
pub mod config;
pub mod draw;
pub mod editor;
pub mod geometry;
pub mod history;
pub mod input;
pub mod scene;
pub mod script;
pub mod viewport;

pub use capture::{CapturedImage, ExportStatus};
pub use config::Config;
pub use editor::Editor;
