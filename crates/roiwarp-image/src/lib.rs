#![deny(missing_docs)]
//! Image batch types shared by the ROI warping operators.

/// batched image representation.
pub mod batch;

/// Error types for the image module.
pub mod error;

pub use crate::batch::{BatchShape, ImageBatch, ImageDtype, ImageSize};
pub use crate::error::ImageError;
