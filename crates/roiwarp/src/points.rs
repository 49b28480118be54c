//! Point transforms between source images and warped canvases.
//!
//! Points are `[x, y]` pixel coordinates with pixel centers at integers, on
//! the source image or on the canvas. They follow the same geometry as the
//! image warps, so a landmark drawn on a source image lands on the matching
//! pixel of its warped canvas.

use roiwarp_image::ImageSize;

use crate::error::WarpError;
use crate::grid::{denormalize_coord, normalize_coord};
use crate::params::WarpParams;
use crate::roi::{RoiBox, RoiFrame};
use crate::warp::{
    check_inputs, polar_coords_to_pixel, polar_pixel_to_coords, PolarMapper, TanhMapper,
};

/// Map source image points onto a ROI tanh canvas.
///
/// # Arguments
///
/// * `points` - The source image points.
/// * `roi` - The roi box of the canvas.
/// * `canvas_size` - The size of the tanh canvas.
/// * `params` - The warp parameters of the canvas.
///
/// # Example
///
/// ```
/// use roiwarp::params::WarpParams;
/// use roiwarp::points::points_to_roi_tanh;
/// use roiwarp::roi::RoiBox;
/// use roiwarp_image::ImageSize;
///
/// let roi = RoiBox::new(0.0, 0.0, 10.0, 10.0);
/// let canvas = ImageSize { width: 32, height: 32 };
/// let points = points_to_roi_tanh(&[[5.0, 5.0]], &roi, canvas, WarpParams::default()).unwrap();
///
/// // the box center lands between the four central canvas pixels
/// assert_eq!(points, vec![[15.5, 15.5]]);
/// ```
pub fn points_to_roi_tanh(
    points: &[[f32; 2]],
    roi: &RoiBox,
    canvas_size: ImageSize,
    params: WarpParams,
) -> Result<Vec<[f32; 2]>, WarpError> {
    check_inputs(std::slice::from_ref(roi), &[canvas_size], &params)?;
    let mapper = TanhMapper::new(roi, canvas_size, &params);

    Ok(points
        .iter()
        .map(|&[x, y]| {
            let [u, v] = mapper.to_canvas(x, y);
            [
                denormalize_coord(u, canvas_size.width),
                denormalize_coord(v, canvas_size.height),
            ]
        })
        .collect())
}

/// Map ROI tanh canvas points back onto the source image.
///
/// Points in the letterbox band of an aspect preserving canvas have no
/// source location and map to `None`.
pub fn roi_tanh_to_points(
    points: &[[f32; 2]],
    roi: &RoiBox,
    canvas_size: ImageSize,
    params: WarpParams,
) -> Result<Vec<Option<[f32; 2]>>, WarpError> {
    check_inputs(std::slice::from_ref(roi), &[canvas_size], &params)?;
    let mapper = TanhMapper::new(roi, canvas_size, &params);

    Ok(points
        .iter()
        .map(|&[x, y]| {
            mapper.to_source(
                normalize_coord(x, canvas_size.width),
                normalize_coord(y, canvas_size.height),
            )
        })
        .collect())
}

/// Map source image points onto a tanh-polar canvas.
///
/// The returned rows lie in `[0, height]`; row `height` is the same angle as
/// row zero.
pub fn points_to_roi_tanh_polar(
    points: &[[f32; 2]],
    roi: &RoiBox,
    polar_size: ImageSize,
    params: WarpParams,
) -> Result<Vec<[f32; 2]>, WarpError> {
    check_inputs(std::slice::from_ref(roi), &[polar_size], &params)?;
    let frame = RoiFrame::new(roi, params.wrapped_offset());
    let polar = PolarMapper::new(roi, params.aspect);

    Ok(points
        .iter()
        .map(|&[x, y]| {
            let [r, phi] = polar.from_local(frame.to_local(x, y));
            polar_coords_to_pixel(r, phi, polar_size)
        })
        .collect())
}

/// Map tanh-polar canvas points back onto the source image.
pub fn roi_tanh_polar_to_points(
    points: &[[f32; 2]],
    roi: &RoiBox,
    polar_size: ImageSize,
    params: WarpParams,
) -> Result<Vec<[f32; 2]>, WarpError> {
    check_inputs(std::slice::from_ref(roi), &[polar_size], &params)?;
    let frame = RoiFrame::new(roi, params.wrapped_offset());
    let polar = PolarMapper::new(roi, params.aspect);

    Ok(points
        .iter()
        .map(|&[col, row]| {
            let [r, phi] = polar_pixel_to_coords(col, row, polar_size);
            let [sx, sy] = polar.to_local(r, phi);
            frame.from_local(sx, sy)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::AspectMode;
    use approx::assert_abs_diff_eq;

    #[test]
    fn tanh_points_roundtrip() -> Result<(), WarpError> {
        let roi = RoiBox::new(20.0, 30.0, 60.0, 50.0);
        let canvas = ImageSize {
            width: 64,
            height: 48,
        };
        let points = [[25.0, 35.0], [40.0, 40.0], [70.0, 20.0]];
        for aspect in [AspectMode::Distort, AspectMode::Preserve] {
            let params = WarpParams::default()
                .with_angular_offset(0.3)
                .with_aspect(aspect);
            let on_canvas = points_to_roi_tanh(&points, &roi, canvas, params)?;
            let back = roi_tanh_to_points(&on_canvas, &roi, canvas, params)?;
            for (p, q) in points.iter().zip(back) {
                let q = q.unwrap_or([f32::NAN; 2]);
                assert_abs_diff_eq!(p[0], q[0], epsilon = 1e-2);
                assert_abs_diff_eq!(p[1], q[1], epsilon = 1e-2);
            }
        }
        Ok(())
    }

    #[test]
    fn letterbox_points_have_no_source() -> Result<(), WarpError> {
        let roi = RoiBox::new(0.0, 0.0, 40.0, 10.0);
        // content keeps columns 8..=23
        let canvas = ImageSize {
            width: 32,
            height: 16,
        };
        let params = WarpParams::default().with_aspect(AspectMode::Preserve);
        let back = roi_tanh_to_points(&[[1.0, 8.0], [16.0, 8.0]], &roi, canvas, params)?;
        assert!(back[0].is_none());
        assert!(back[1].is_some());
        Ok(())
    }

    #[test]
    fn polar_points_roundtrip() -> Result<(), WarpError> {
        let roi = RoiBox::new(-20.0, -10.0, 20.0, 30.0);
        let polar_size = ImageSize {
            width: 32,
            height: 64,
        };
        let points = [[3.0, 4.0], [-15.0, 25.0], [10.0, -30.0]];
        for aspect in [AspectMode::Distort, AspectMode::Preserve] {
            let params = WarpParams::default()
                .with_angular_offset(2.5)
                .with_aspect(aspect);
            let on_canvas = points_to_roi_tanh_polar(&points, &roi, polar_size, params)?;
            for [col, row] in &on_canvas {
                assert!((0.0..32.0).contains(col));
                assert!((0.0..=64.0).contains(row));
            }
            let back = roi_tanh_polar_to_points(&on_canvas, &roi, polar_size, params)?;
            for (p, q) in points.iter().zip(back) {
                assert_abs_diff_eq!(p[0], q[0], epsilon = 1e-2);
                assert_abs_diff_eq!(p[1], q[1], epsilon = 1e-2);
            }
        }
        Ok(())
    }

    #[test]
    fn points_invalid_roi() {
        let canvas = ImageSize {
            width: 8,
            height: 8,
        };
        let res = points_to_roi_tanh(
            &[[0.0, 0.0]],
            &RoiBox::new(10.0, 10.0, 10.0, 20.0),
            canvas,
            WarpParams::default(),
        );
        assert!(matches!(res, Err(WarpError::DegenerateRoi { .. })));
    }
}
