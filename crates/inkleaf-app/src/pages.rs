//! Paged documents backed by a directory of page images.

use inkleaf_core::shapes::ImageFormat;
use inkleaf_core::{ImportError, PageRenderer};
use std::path::{Path, PathBuf};

/// A paged document whose pages are pre-rendered image files.
///
/// Pages are the directory's PNG, JPEG and WebP files in file name order.
#[derive(Debug, Clone)]
pub struct DirectoryPages {
    pages: Vec<PathBuf>,
}

impl DirectoryPages {
    /// Scan `dir` for page images.
    pub fn open(dir: &Path) -> Result<Self, ImportError> {
        let entries = std::fs::read_dir(dir).map_err(|e| ImportError::Io(e.to_string()))?;
        let mut pages: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .and_then(ImageFormat::from_extension)
                        .is_some()
            })
            .collect();
        pages.sort();
        if pages.is_empty() {
            return Err(ImportError::NoPages);
        }
        log::info!("Opened {} pages from {:?}", pages.len(), dir);
        Ok(Self { pages })
    }
}

impl PageRenderer for DirectoryPages {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn render_page(&self, page: u32) -> Result<Vec<u8>, ImportError> {
        let path = (page as usize)
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .ok_or(ImportError::PageOutOfRange {
                page,
                count: self.page_count(),
            })?;
        std::fs::read(path).map_err(|e| ImportError::Io(format!("{:?}: {}", path, e)))
    }
}
