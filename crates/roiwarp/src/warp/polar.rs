use std::f32::consts::TAU;

use roiwarp_image::{BatchShape, ImageBatch, ImageDtype, ImageSize};

use super::{check_inputs, rotate, TanhMapper};
use crate::error::WarpError;
use crate::grid::{normalize_coord, safe_atanh, SamplingGrid};
use crate::params::{AspectMode, WarpParams};
use crate::roi::RoiBox;

/// Point level mapping between ROI-local coordinates and polar coordinates.
///
/// Polar coordinates are a radius `r` in `[0, 1)` and an angle `φ` in
/// `[0, 2π)`. Angle zero points along the local `+x` axis and grows toward
/// local `+y`. The radius is the tanh of the distance to the box center,
/// measured in half box sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarMapper {
    half_size: [f32; 2],
    aspect: AspectMode,
}

impl PolarMapper {
    /// Create the polar mapper of a validated roi box.
    pub fn new(roi: &RoiBox, aspect: AspectMode) -> Self {
        Self {
            half_size: roi.half_size(),
            aspect,
        }
    }

    /// Polar coordinates to ROI-local coordinates.
    #[inline]
    pub fn to_local(&self, r: f32, phi: f32) -> [f32; 2] {
        let t = safe_atanh(r);
        let [hx, hy] = self.half_size;
        let (sin, cos) = phi.sin_cos();
        match self.aspect {
            AspectMode::Distort => [t * hx * cos, t * hy * sin],
            AspectMode::Preserve => {
                // radius of the box inscribed ellipse along the ray
                let rho = hx * hy / (hy * hy * cos * cos + hx * hx * sin * sin).sqrt();
                [t * rho * cos, t * rho * sin]
            }
        }
    }

    /// ROI-local coordinates to polar coordinates `[r, φ]`.
    #[inline]
    pub fn from_local(&self, s: [f32; 2]) -> [f32; 2] {
        let [hx, hy] = self.half_size;
        let (nx, ny) = (s[0] / hx, s[1] / hy);
        let r = nx.hypot(ny).tanh();
        let phi = match self.aspect {
            AspectMode::Distort => ny.atan2(nx),
            AspectMode::Preserve => s[1].atan2(s[0]),
        };
        [r, phi.rem_euclid(TAU)]
    }
}

/// Polar canvas pixel coordinates `(col, row)` to polar coordinates `[r, φ]`.
///
/// Columns sample the radius, `r = col / width`, and rows sample the angle,
/// `φ = 2π row / height`.
#[inline]
pub fn polar_pixel_to_coords(col: f32, row: f32, polar_size: ImageSize) -> [f32; 2] {
    [
        col / polar_size.width as f32,
        TAU * row / polar_size.height as f32,
    ]
}

/// Polar coordinates `[r, φ]` to polar canvas pixel coordinates `(col, row)`.
#[inline]
pub fn polar_coords_to_pixel(r: f32, phi: f32, polar_size: ImageSize) -> [f32; 2] {
    [
        r * polar_size.width as f32,
        phi * polar_size.height as f32 / TAU,
    ]
}

/// The size of a polar canvas after [`extend_angular_seam`].
pub fn seam_extended_size(polar_size: ImageSize) -> ImageSize {
    ImageSize {
        width: polar_size.width,
        height: polar_size.height + 1,
    }
}

/// Append a copy of the first row of every polar canvas after its last row.
///
/// Row `height` then holds angle `2π`, so bilinear sampling between the last
/// angle and angle zero does not fall off the canvas. Grids that read polar
/// canvases are normalized against this extended height.
pub fn extend_angular_seam<T: ImageDtype>(
    polar: &ImageBatch<T>,
) -> Result<ImageBatch<T>, WarpError> {
    let shape = polar.shape();
    let row_len = shape.row_len();
    let ext_size = seam_extended_size(shape.size());
    let ext_shape = BatchShape::from_size(shape.batch, ext_size, shape.channels);

    let mut data = Vec::with_capacity(ext_shape.numel());
    for item in polar.as_slice().chunks_exact(shape.item_len()) {
        data.extend_from_slice(item);
        data.extend_from_slice(&item[..row_len]);
    }

    Ok(ImageBatch::new(ext_shape, data)?)
}

/// Normalized coordinates of polar coordinates on a seam extended canvas.
#[inline]
pub(crate) fn polar_to_grid(r: f32, phi: f32, polar_size: ImageSize) -> [f32; 2] {
    let [col, row] = polar_coords_to_pixel(r, phi, polar_size);
    [
        normalize_coord(col, polar_size.width),
        normalize_coord(row, polar_size.height + 1),
    ]
}

/// Sampling grid that converts ROI tanh canvases into tanh-polar canvases.
///
/// The grid covers the polar canvas and holds normalized tanh canvas
/// coordinates. The angular offset of `params` rotates the polar reference
/// angle relative to the tanh canvas; use zero when both canvases share the
/// same offset.
///
/// # Arguments
///
/// * `rois` - The roi boxes the tanh canvases were made from.
/// * `polar_size` - The size of the polar canvas.
/// * `tanh_size` - The size of the tanh canvas.
/// * `params` - The warp parameters.
pub fn cartesian_to_polar(
    rois: &[RoiBox],
    polar_size: ImageSize,
    tanh_size: ImageSize,
    params: WarpParams,
) -> Result<SamplingGrid, WarpError> {
    check_inputs(rois, &[polar_size, tanh_size], &params)?;

    let (sin, cos) = params.wrapped_offset().sin_cos();
    let mappers = rois
        .iter()
        .map(|roi| {
            (
                PolarMapper::new(roi, params.aspect),
                TanhMapper::new(roi, tanh_size, &params),
            )
        })
        .collect::<Vec<_>>();

    log::trace!(
        "cartesian_to_polar: {} rois, polar {}, tanh {}",
        rois.len(),
        polar_size,
        tanh_size
    );

    SamplingGrid::from_fn(rois.len(), polar_size, params.strategy, |b, y, x| {
        let (polar, tanh) = &mappers[b];
        let [r, phi] = polar_pixel_to_coords(x as f32, y as f32, polar_size);
        let s = rotate(polar.to_local(r, phi), cos, sin);
        Some(tanh.clamp_to_content(tanh.local_to_canvas(s)))
    })
}

/// Sampling grid that converts tanh-polar canvases back into ROI tanh canvases.
///
/// The grid covers the tanh canvas and holds normalized coordinates of the
/// seam extended polar canvas, see [`extend_angular_seam`]. Letterbox pixels
/// of [`AspectMode::Preserve`] tanh canvases are masked and sample to zero.
///
/// # Arguments
///
/// * `rois` - The roi boxes the canvases were made from.
/// * `tanh_size` - The size of the tanh canvas.
/// * `polar_size` - The size of the polar canvas, before seam extension.
/// * `params` - The warp parameters, see [`cartesian_to_polar`].
pub fn polar_to_cartesian(
    rois: &[RoiBox],
    tanh_size: ImageSize,
    polar_size: ImageSize,
    params: WarpParams,
) -> Result<SamplingGrid, WarpError> {
    check_inputs(rois, &[tanh_size, polar_size], &params)?;

    let (sin, cos) = params.wrapped_offset().sin_cos();
    let mappers = rois
        .iter()
        .map(|roi| {
            (
                PolarMapper::new(roi, params.aspect),
                TanhMapper::new(roi, tanh_size, &params),
            )
        })
        .collect::<Vec<_>>();

    log::trace!(
        "polar_to_cartesian: {} rois, tanh {}, polar {}",
        rois.len(),
        tanh_size,
        polar_size
    );

    SamplingGrid::from_fn(rois.len(), tanh_size, params.strategy, |b, y, x| {
        let (polar, tanh) = &mappers[b];
        let u = normalize_coord(x as f32, tanh_size.width);
        let v = normalize_coord(y as f32, tanh_size.height);
        let s = tanh.canvas_to_local([u, v])?;
        let [r, phi] = polar.from_local(rotate(s, cos, -sin));
        Some(polar_to_grid(r, phi, polar_size))
    })
}
