use roiwarp_image::ImageSize;

use super::check_inputs;
use super::polar::{polar_pixel_to_coords, polar_to_grid, PolarMapper};
use crate::error::WarpError;
use crate::grid::{normalize_coord, SamplingGrid};
use crate::params::WarpParams;
use crate::roi::{RoiBox, RoiFrame};

/// Sampling grid that warps source images directly into tanh-polar canvases.
///
/// The polar point map is composed with the rotated roi frame in closed
/// form, so the source is resampled once instead of going through an
/// intermediate tanh canvas. The grid covers the polar canvas and holds
/// normalized source image coordinates.
///
/// # Arguments
///
/// * `rois` - The roi boxes, one per image.
/// * `polar_size` - The size of the polar canvas.
/// * `src_size` - The size of the source images.
/// * `params` - The warp parameters; the angular offset sets the direction
///   of angle zero.
///
/// # Example
///
/// ```
/// use roiwarp::params::WarpParams;
/// use roiwarp::roi::RoiBox;
/// use roiwarp::warp::roi_tanh_polar_grid;
/// use roiwarp_image::ImageSize;
///
/// let rois = [RoiBox::new(10.0, 10.0, 50.0, 60.0)];
/// let grid = roi_tanh_polar_grid(
///     &rois,
///     ImageSize { width: 32, height: 64 },
///     ImageSize { width: 128, height: 128 },
///     WarpParams::default(),
/// )
/// .unwrap();
///
/// assert_eq!(grid.height(), 64);
/// ```
pub fn roi_tanh_polar_grid(
    rois: &[RoiBox],
    polar_size: ImageSize,
    src_size: ImageSize,
    params: WarpParams,
) -> Result<SamplingGrid, WarpError> {
    check_inputs(rois, &[polar_size, src_size], &params)?;

    let mappers = rois
        .iter()
        .map(|roi| {
            (
                RoiFrame::new(roi, params.wrapped_offset()),
                PolarMapper::new(roi, params.aspect),
            )
        })
        .collect::<Vec<_>>();

    log::trace!(
        "roi_tanh_polar_grid: {} rois, polar {}, source {}",
        rois.len(),
        polar_size,
        src_size
    );

    SamplingGrid::from_fn(rois.len(), polar_size, params.strategy, |b, y, x| {
        let (frame, polar) = &mappers[b];
        let [r, phi] = polar_pixel_to_coords(x as f32, y as f32, polar_size);
        let [sx, sy] = polar.to_local(r, phi);
        let [px, py] = frame.from_local(sx, sy);
        Some([
            normalize_coord(px, src_size.width),
            normalize_coord(py, src_size.height),
        ])
    })
}

/// Sampling grid that restores tanh-polar canvases into destination images.
///
/// The grid covers the destination image and holds normalized coordinates
/// of the seam extended polar canvas, see
/// [`extend_angular_seam`](super::extend_angular_seam).
///
/// # Arguments
///
/// * `rois` - The roi boxes, one per image.
/// * `dst_size` - The size of the restored images.
/// * `polar_size` - The size of the polar canvas, before seam extension.
/// * `params` - The warp parameters used to produce the canvas.
pub fn roi_tanh_polar_inverse_grid(
    rois: &[RoiBox],
    dst_size: ImageSize,
    polar_size: ImageSize,
    params: WarpParams,
) -> Result<SamplingGrid, WarpError> {
    check_inputs(rois, &[dst_size, polar_size], &params)?;

    let mappers = rois
        .iter()
        .map(|roi| {
            (
                RoiFrame::new(roi, params.wrapped_offset()),
                PolarMapper::new(roi, params.aspect),
            )
        })
        .collect::<Vec<_>>();

    log::trace!(
        "roi_tanh_polar_inverse_grid: {} rois, destination {}, polar {}",
        rois.len(),
        dst_size,
        polar_size
    );

    SamplingGrid::from_fn(rois.len(), dst_size, params.strategy, |b, y, x| {
        let (frame, polar) = &mappers[b];
        let [r, phi] = polar.from_local(frame.to_local(x as f32, y as f32));
        Some(polar_to_grid(r, phi, polar_size))
    })
}
