use roiwarp_image::{ImageBatch, ImageDtype, ImageSize};

use crate::error::WarpError;
use crate::interpolation::grid_sample;
use crate::params::WarpParams;
use crate::roi::{validate_rois, RoiBox};
use crate::warp::{extend_angular_seam, inverse_tanh, roi_tanh_polar_inverse_grid};

/// Map warped canvases back onto destination images.
///
/// Every destination pixel maps inside the canvas, so the whole image plane
/// receives warped data; resolution far from the box is low since the tanh
/// compresses it into the canvas border. Canvas coordinates the padding mode
/// cannot resolve fall back to zero.
///
/// The restore is lossy for [`AspectMode::Preserve`] tanh canvases: no
/// destination pixel maps into the letterbox band, so its content is
/// discarded.
///
/// # Arguments
///
/// * `warped` - The tanh or tanh-polar canvases with shape (B, H, W, C).
/// * `rois` - The roi boxes used to produce the canvases, one per image.
/// * `dst_size` - The size of the restored images.
/// * `params` - The warp parameters used to produce the canvases.
/// * `is_polar` - Whether `warped` holds tanh-polar canvases.
///
/// # Returns
///
/// The restored batch with shape (B, dst height, dst width, C).
///
/// [`AspectMode::Preserve`]: crate::params::AspectMode::Preserve
pub fn restore<T: ImageDtype>(
    warped: &ImageBatch<T>,
    rois: &[RoiBox],
    dst_size: ImageSize,
    params: WarpParams,
    is_polar: bool,
) -> Result<ImageBatch<T>, WarpError> {
    validate_rois(rois, warped.batch_size())?;

    log::debug!(
        "restore: {} canvases {} -> {}, polar: {}, {:?}",
        warped.batch_size(),
        warped.size(),
        dst_size,
        is_polar,
        params.aspect
    );

    if is_polar {
        let grid = roi_tanh_polar_inverse_grid(rois, dst_size, warped.size(), params)?;
        let extended = extend_angular_seam(warped)?;
        grid_sample(&extended, &grid, params.padding, params.strategy)
    } else {
        let grid = inverse_tanh(rois, dst_size, warped.size(), params)?;
        grid_sample(warped, &grid, params.padding, params.strategy)
    }
}

/// Restore ROI tanh canvases, see [`restore`].
pub fn roi_tanh_restore<T: ImageDtype>(
    warped: &ImageBatch<T>,
    rois: &[RoiBox],
    dst_size: ImageSize,
    params: WarpParams,
) -> Result<ImageBatch<T>, WarpError> {
    restore(warped, rois, dst_size, params, false)
}

/// Restore ROI tanh-polar canvases, see [`restore`].
pub fn roi_tanh_polar_restore<T: ImageDtype>(
    warped: &ImageBatch<T>,
    rois: &[RoiBox],
    dst_size: ImageSize,
    params: WarpParams,
) -> Result<ImageBatch<T>, WarpError> {
    restore(warped, rois, dst_size, params, true)
}
