#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// error types of the warping operators.
pub mod error;

/// sampling grids and coordinate normalization.
pub mod grid;

pub mod interpolation;

/// image level warp pipelines.
pub mod ops;

/// module containing parallelization utilities.
pub mod parallel;

/// warp parameters and aspect modes.
pub mod params;

pub mod points;

/// restoration of warped canvases.
pub mod restore;

/// roi boxes and their reference frames.
pub mod roi;

pub mod warp;

pub use error::WarpError;
pub use interpolation::PaddingMode;
pub use params::{AspectMode, WarpParams};
pub use parallel::ExecutionStrategy;
pub use roi::RoiBox;
