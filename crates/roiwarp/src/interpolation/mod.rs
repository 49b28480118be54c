//! Bilinear sampling of image batches through normalized sampling grids.
//!
//! Grid coordinates use the align corners = false convention: `-1` and `1`
//! are the outer edges of the border pixels and pixel centers sit at
//! `(2k + 1) / n - 1`.

mod bilinear;
mod grid_sample;
mod padding;

pub use grid_sample::{grid_sample, grid_sample_backward};
pub use padding::PaddingMode;
