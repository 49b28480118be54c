//! Sampling grids of the ROI tanh and tanh-polar warps.
//!
//! Every builder is pure geometry: it returns a [`SamplingGrid`] that the
//! sampler consumes together with an image batch.
//!
//! - [`forward_tanh`] and [`inverse_tanh`] move between the source image and
//!   the ROI tanh canvas.
//! - [`cartesian_to_polar`] and [`polar_to_cartesian`] move between the tanh
//!   canvas and the tanh-polar canvas.
//! - [`roi_tanh_polar_grid`] and [`roi_tanh_polar_inverse_grid`] move between
//!   the source image and the tanh-polar canvas in a single resampling step.
//!
//! # Examples
//!
//! Building the grid that warps a face box into a 256x256 canvas:
//!
//! ```
//! use roiwarp::params::WarpParams;
//! use roiwarp::roi::RoiBox;
//! use roiwarp::warp::forward_tanh;
//! use roiwarp_image::ImageSize;
//!
//! let rois = [RoiBox::new(120.0, 80.0, 220.0, 200.0)];
//! let grid = forward_tanh(
//!     &rois,
//!     ImageSize { width: 256, height: 256 },
//!     ImageSize { width: 640, height: 480 },
//!     WarpParams::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(grid.width(), 256);
//! ```
//!
//! [`SamplingGrid`]: crate::grid::SamplingGrid

mod combined;
mod polar;
mod tanh;

pub use combined::{roi_tanh_polar_grid, roi_tanh_polar_inverse_grid};
pub use polar::{
    cartesian_to_polar, extend_angular_seam, polar_coords_to_pixel, polar_pixel_to_coords,
    polar_to_cartesian, seam_extended_size, PolarMapper,
};
pub use tanh::{forward_tanh, inverse_tanh, TanhMapper};

use roiwarp_image::ImageSize;

use crate::error::WarpError;
use crate::grid::check_size;
use crate::params::WarpParams;
use crate::roi::RoiBox;

/// Validate the inputs shared by every grid builder.
pub(crate) fn check_inputs(
    rois: &[RoiBox],
    sizes: &[ImageSize],
    params: &WarpParams,
) -> Result<(), WarpError> {
    if rois.is_empty() {
        return Err(WarpError::EmptyBatch);
    }
    params.validate()?;
    sizes.iter().try_for_each(|size| check_size(*size))?;
    rois.iter().try_for_each(RoiBox::validate)
}

/// Rotate a 2d vector by the angle with the given cosine and sine.
#[inline]
pub(crate) fn rotate(v: [f32; 2], cos: f32, sin: f32) -> [f32; 2] {
    [cos * v[0] - sin * v[1], sin * v[0] + cos * v[1]]
}
