//! Inkleaf Render Library
//!
//! CPU rasterization of worksheet scenes for library thumbnails and PNG
//! export. Backgrounds are decoded with the `image` crate; output is encoded
//! with `png`.

mod pixmap;
mod rasterizer;

pub use pixmap::{Pixmap, encode_png};
pub use rasterizer::CpuRasterizer;
