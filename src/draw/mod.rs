//! Rendering primitives and the composition pipeline (Cairo-based).
//!
//! - [`Color`]: RGBA color representation with predefined color constants
//! - [`FontDescriptor`]: Pango font selection for text annotations
//! - [`Raster`]: RGBA image crossing the capture/export boundary
//! - [`render`]: per-annotation drawing, scene composition and flattening
//! - [`effects`]: pixel filters behind the blur/pixelate annotations

pub mod color;
pub mod effects;
pub mod font;
pub mod raster;
pub mod render;

pub use color::Color;
pub use font::FontDescriptor;
pub use raster::Raster;
pub use render::{compose, flatten, render_annotation, render_kind, text_bounds};

use thiserror::Error;

/// Errors from building or reading raster surfaces.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("surface is shared and cannot be accessed: {0}")]
    Borrow(#[from] cairo::BorrowError),

    #[error("PNG stream error: {0}")]
    Png(#[from] cairo::IoError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("raster buffer of {len} bytes does not match {width}x{height} RGBA")]
    InvalidRaster { width: u32, height: u32, len: usize },
}
