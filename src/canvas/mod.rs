//! Drawing surface for handwriting input
//!
//! Pointer events paint straight into a raster as they arrive; there is no
//! stroke list and no undo. A snapshot is exported as a PNG data URL for the
//! grader.

mod raster;
mod snapshot;

pub use raster::{Pen, Point, Raster};
pub use snapshot::{PNG_DATA_URL_PREFIX, data_url_payload, encode_png, png_data_url};

use crate::Result;

/// Default surface width in pixels
pub const DEFAULT_WIDTH: u32 = 380;

/// Default surface height in pixels
pub const DEFAULT_HEIGHT: u32 = 200;

/// Exports shorter than this are treated as an empty canvas
pub const MIN_SNAPSHOT_LEN: usize = 100;

/// Handwriting canvas
#[derive(Debug, Clone)]
pub struct Surface {
    raster: Raster,
    pen: Pen,
    /// Last point of the stroke in progress
    cursor: Option<Point>,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Surface {
    /// Create a blank surface with the default pen
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_pen(width, height, Pen::default())
    }

    #[must_use]
    pub fn with_pen(width: u32, height: u32, pen: Pen) -> Self {
        Self {
            raster: Raster::new(width, height),
            pen,
            cursor: None,
        }
    }

    /// Begin a stroke
    pub fn pointer_down(&mut self, at: Point) {
        self.cursor = Some(at);
    }

    /// Extend the active stroke; ignored when no stroke is active
    pub fn pointer_move(&mut self, to: Point) {
        let Some(from) = self.cursor else {
            return;
        };
        self.raster.stroke_segment(from, to, &self.pen);
        self.cursor = Some(to);
    }

    /// End the active stroke
    pub fn pointer_up(&mut self) {
        self.cursor = None;
    }

    /// Pointer left the surface; same as lifting it
    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }

    /// Whether a stroke is in progress
    #[must_use]
    pub const fn is_drawing(&self) -> bool {
        self.cursor.is_some()
    }

    /// Wipe the raster and drop any stroke in progress
    pub fn clear(&mut self) {
        self.raster.clear();
        self.cursor = None;
    }

    /// Whether nothing has been drawn since the last clear
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.raster.is_blank()
    }

    /// Export a PNG data URL
    ///
    /// A blank surface exports an empty string, which is below
    /// [`MIN_SNAPSHOT_LEN`].
    ///
    /// # Errors
    ///
    /// Returns error if PNG encoding fails
    pub fn export(&self) -> Result<String> {
        if self.is_blank() {
            return Ok(String::new());
        }
        let png = encode_png(&self.raster)?;
        Ok(png_data_url(&png))
    }

    /// Export raw PNG bytes, `None` when blank
    ///
    /// # Errors
    ///
    /// Returns error if PNG encoding fails
    pub fn export_png(&self) -> Result<Option<Vec<u8>>> {
        if self.is_blank() {
            return Ok(None);
        }
        encode_png(&self.raster).map(Some)
    }

    #[must_use]
    pub const fn raster(&self) -> &Raster {
        &self.raster
    }
}
