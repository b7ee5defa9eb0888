//! Background import: raster images and pages of paged documents.
//!
//! Decoding happens outside the editor (file reader, page rasterizer) and
//! may complete late. Each request takes a ticket; only the most recent
//! ticket may install its result.

use crate::raster::RasterError;
use thiserror::Error;

/// Import errors.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Could not read file: {0}")]
    Io(String),
    #[error("Could not decode image: {0}")]
    Raster(#[from] RasterError),
    #[error("Page {page} out of range 1..={count}")]
    PageOutOfRange { page: u32, count: u32 },
    #[error("Document has no pages")]
    NoPages,
    #[error("Page render failed: {0}")]
    Render(String),
}

/// Renders pages of a paged document (e.g. a PDF) to raster bytes.
pub trait PageRenderer {
    /// Number of pages, at least 1 for a usable document.
    fn page_count(&self) -> u32;

    /// Render 1-based `page` to encoded image bytes (PNG, JPEG or WebP).
    fn render_page(&self, page: u32) -> Result<Vec<u8>, ImportError>;
}

/// Handle for one background import request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportTicket {
    generation: u64,
    /// Whether completion starts a new worksheet (clears annotations).
    pub replaces_scene: bool,
}

/// Issues tickets and decides which completion is current.
#[derive(Debug, Default, Clone)]
pub struct ImportTracker {
    generation: u64,
}

impl ImportTracker {
    /// Start a request, superseding every earlier one.
    pub fn begin(&mut self, replaces_scene: bool) -> ImportTicket {
        self.generation += 1;
        ImportTicket {
            generation: self.generation,
            replaces_scene,
        }
    }

    /// Whether `ticket` belongs to the latest request.
    pub fn is_current(&self, ticket: &ImportTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Supersede every outstanding request without starting a new one.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }
}

/// Current page of an open paged document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: u32,
    count: u32,
}

impl PageCursor {
    /// Cursor on page 1 of a `count`-page document.
    pub fn new(count: u32) -> Result<Self, ImportError> {
        if count == 0 {
            return Err(ImportError::NoPages);
        }
        Ok(Self { page: 1, count })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Page after the current one, clamped to the last page.
    pub fn next(&self) -> u32 {
        (self.page + 1).min(self.count)
    }

    /// Page before the current one, clamped to the first page.
    pub fn prev(&self) -> u32 {
        self.page.saturating_sub(1).max(1)
    }

    /// Move to `page`, which must be in range.
    pub fn set(&mut self, page: u32) -> Result<(), ImportError> {
        if page == 0 || page > self.count {
            return Err(ImportError::PageOutOfRange {
                page,
                count: self.count,
            });
        }
        self.page = page;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_ticket_wins() {
        let mut tracker = ImportTracker::default();
        let first = tracker.begin(true);
        let second = tracker.begin(true);
        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));

        tracker.invalidate();
        assert!(!tracker.is_current(&second));
    }

    #[test]
    fn test_page_cursor_clamps() {
        let mut cursor = PageCursor::new(3).unwrap();
        assert_eq!(cursor.prev(), 1);
        assert_eq!(cursor.next(), 2);

        cursor.set(3).unwrap();
        assert_eq!(cursor.next(), 3);
        assert_eq!(cursor.prev(), 2);

        assert!(matches!(cursor.set(4), Err(ImportError::PageOutOfRange { page: 4, count: 3 })));
        assert!(cursor.set(0).is_err());
        assert_eq!(cursor.page(), 3);
    }

    #[test]
    fn test_empty_document_rejected() {
        assert!(matches!(PageCursor::new(0), Err(ImportError::NoPages)));
    }
}
