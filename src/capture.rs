//! Data crossing the boundary to the capture service and the export writers.
//!
//! Pixel acquisition, encoding, clipboard and file output all live outside the
//! editor; these types are the whole contract.

use crate::draw::Raster;

/// A finished capture handed to [`Editor::new`](crate::Editor::new).
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub raster: Raster,
    /// Screen position of the captured region's top-left corner
    pub origin: (i32, i32),
}

impl CapturedImage {
    pub fn new(raster: Raster, origin: (i32, i32)) -> Self {
        Self { raster, origin }
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }
}

impl From<Raster> for CapturedImage {
    fn from(raster: Raster) -> Self {
        Self::new(raster, (0, 0))
    }
}

/// Outcome of the most recent hand-off to an export writer.
///
/// Purely informational: writers run outside the editor and their result
/// never gates further editing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExportStatus {
    #[default]
    Idle,
    /// Flattened image handed to a writer, result not reported yet
    Pending,
    Done,
    Failed(String),
}

impl ExportStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, ExportStatus::Pending)
    }
}
