use roiwarp_image::{ImageBatch, ImageDtype, ImageError, ImageSize};

use crate::error::WarpError;
use crate::interpolation::grid_sample;
use crate::params::WarpParams;
use crate::roi::{validate_rois, RoiBox};
use crate::warp::{
    cartesian_to_polar, extend_angular_seam, forward_tanh, polar_to_cartesian,
    roi_tanh_polar_grid,
};

/// Warp the roi of every image into a ROI tanh canvas.
///
/// # Arguments
///
/// * `images` - The source batch with shape (B, H, W, C).
/// * `rois` - The roi boxes, one per image.
/// * `canvas_size` - The size of the tanh canvas.
/// * `params` - The warp parameters.
///
/// # Returns
///
/// The warped batch with shape (B, canvas height, canvas width, C).
///
/// # Example
///
/// ```
/// use roiwarp::ops::roi_tanh_warp;
/// use roiwarp::params::WarpParams;
/// use roiwarp::roi::RoiBox;
/// use roiwarp_image::{BatchShape, ImageBatch, ImageSize};
///
/// let images = ImageBatch::from_size_val(BatchShape::new(1, 48, 64, 3), 128u8).unwrap();
/// let rois = [RoiBox::new(16.0, 8.0, 48.0, 40.0)];
///
/// let warped = roi_tanh_warp(
///     &images,
///     &rois,
///     ImageSize { width: 32, height: 32 },
///     WarpParams::default(),
/// )
/// .unwrap();
///
/// assert_eq!(warped.shape(), BatchShape::new(1, 32, 32, 3));
/// ```
pub fn roi_tanh_warp<T: ImageDtype>(
    images: &ImageBatch<T>,
    rois: &[RoiBox],
    canvas_size: ImageSize,
    params: WarpParams,
) -> Result<ImageBatch<T>, WarpError> {
    validate_rois(rois, images.batch_size())?;

    log::debug!(
        "roi_tanh_warp: {} images {} -> {}, {:?}, {:?}",
        images.batch_size(),
        images.size(),
        canvas_size,
        params.padding,
        params.aspect
    );

    let grid = forward_tanh(rois, canvas_size, images.size(), params)?;
    grid_sample(images, &grid, params.padding, params.strategy)
}

/// Warp the roi of every image directly into a tanh-polar canvas.
///
/// The source is resampled once, see
/// [`roi_tanh_polar_grid`](crate::warp::roi_tanh_polar_grid).
pub fn roi_tanh_polar_warp<T: ImageDtype>(
    images: &ImageBatch<T>,
    rois: &[RoiBox],
    polar_size: ImageSize,
    params: WarpParams,
) -> Result<ImageBatch<T>, WarpError> {
    validate_rois(rois, images.batch_size())?;

    log::debug!(
        "roi_tanh_polar_warp: {} images {} -> {}, {:?}, {:?}",
        images.batch_size(),
        images.size(),
        polar_size,
        params.padding,
        params.aspect
    );

    let grid = roi_tanh_polar_grid(rois, polar_size, images.size(), params)?;
    grid_sample(images, &grid, params.padding, params.strategy)
}

/// Convert ROI tanh canvases into tanh-polar canvases.
///
/// The angular offset of `params` is relative to the offset the tanh
/// canvases were made with; zero keeps the same reference angle.
pub fn roi_tanh_to_roi_tanh_polar<T: ImageDtype>(
    tanh_images: &ImageBatch<T>,
    rois: &[RoiBox],
    polar_size: ImageSize,
    params: WarpParams,
) -> Result<ImageBatch<T>, WarpError> {
    validate_rois(rois, tanh_images.batch_size())?;

    log::debug!(
        "roi_tanh_to_roi_tanh_polar: {} canvases {} -> {}",
        tanh_images.batch_size(),
        tanh_images.size(),
        polar_size
    );

    let grid = cartesian_to_polar(rois, polar_size, tanh_images.size(), params)?;
    grid_sample(tanh_images, &grid, params.padding, params.strategy)
}

/// Convert tanh-polar canvases into ROI tanh canvases.
///
/// The angular offset of `params` is relative, see
/// [`roi_tanh_to_roi_tanh_polar`].
pub fn roi_tanh_polar_to_roi_tanh<T: ImageDtype>(
    polar_images: &ImageBatch<T>,
    rois: &[RoiBox],
    tanh_size: ImageSize,
    params: WarpParams,
) -> Result<ImageBatch<T>, WarpError> {
    validate_rois(rois, polar_images.batch_size())?;

    log::debug!(
        "roi_tanh_polar_to_roi_tanh: {} canvases {} -> {}",
        polar_images.batch_size(),
        polar_images.size(),
        tanh_size
    );

    let grid = polar_to_cartesian(rois, tanh_size, polar_images.size(), params)?;
    let extended = extend_angular_seam(polar_images)?;
    grid_sample(&extended, &grid, params.padding, params.strategy)
}

/// Per pixel absolute difference of two batches of the same shape.
///
/// Useful to compare a two step result with the direct one.
pub fn abs_diff<T: ImageDtype>(
    a: &ImageBatch<T>,
    b: &ImageBatch<T>,
) -> Result<ImageBatch<T>, WarpError> {
    if a.shape() != b.shape() {
        return Err(ImageError::BatchShapeMismatch(
            a.shape().to_string(),
            b.shape().to_string(),
        )
        .into());
    }

    let data = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(&x, &y)| T::from_f32((x.to_f32() - y.to_f32()).abs()))
        .collect();

    Ok(ImageBatch::new(a.shape(), data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::PaddingMode;
    use crate::params::AspectMode;
    use roiwarp_image::BatchShape;

    fn size(width: usize, height: usize) -> ImageSize {
        ImageSize { width, height }
    }

    #[test]
    fn warp_shapes_and_dtype() -> Result<(), WarpError> {
        let images = ImageBatch::from_fn(BatchShape::new(2, 20, 30, 3), |b, y, x, c| {
            (b * 40 + y + x + c) as u16
        })?;
        let rois = [
            RoiBox::new(5.0, 5.0, 15.0, 15.0),
            RoiBox::new(0.0, 2.0, 29.0, 19.0),
        ];
        let params = WarpParams::default();

        let tanh = roi_tanh_warp(&images, &rois, size(12, 10), params)?;
        assert_eq!(tanh.shape(), BatchShape::new(2, 10, 12, 3));

        let polar = roi_tanh_polar_warp(&images, &rois, size(8, 16), params)?;
        assert_eq!(polar.shape(), BatchShape::new(2, 16, 8, 3));

        let polar2 = roi_tanh_to_roi_tanh_polar(&tanh, &rois, size(8, 16), params)?;
        assert_eq!(polar2.shape(), polar.shape());

        let tanh2 = roi_tanh_polar_to_roi_tanh(&polar, &rois, size(12, 10), params)?;
        assert_eq!(tanh2.shape(), tanh.shape());
        Ok(())
    }

    #[test]
    fn warp_batch_mismatch() -> Result<(), WarpError> {
        let images = ImageBatch::from_size_val(BatchShape::new(1, 8, 8, 1), 0u8)?;
        let rois = [RoiBox::new(0.0, 0.0, 4.0, 4.0); 2];
        let res = roi_tanh_warp(&images, &rois, size(4, 4), WarpParams::default());
        assert!(matches!(res, Err(WarpError::BatchSizeMismatch(1, 2))));
        Ok(())
    }

    #[test]
    fn preserve_letterbox_is_zero() -> Result<(), WarpError> {
        let images = ImageBatch::from_size_val(BatchShape::new(1, 32, 32, 1), 200u8)?;
        // tall canvas: the content square keeps the middle half of the rows
        let rois = [RoiBox::new(4.0, 12.0, 28.0, 18.0)];
        let params = WarpParams::default()
            .with_aspect(AspectMode::Preserve)
            .with_padding(PaddingMode::Replicate);
        let warped = roi_tanh_warp(&images, &rois, size(16, 32), params)?;
        for y in 0..32 {
            let value = *warped.get(0, y, 8, 0).unwrap_or(&1);
            let expected = if (8..=23).contains(&y) { 200 } else { 0 };
            assert_eq!(value, expected, "row {y}");
        }
        Ok(())
    }

    #[test]
    fn abs_diff_values() -> Result<(), WarpError> {
        let a = ImageBatch::new(BatchShape::new(1, 1, 3, 1), vec![10u8, 5, 0])?;
        let b = ImageBatch::new(BatchShape::new(1, 1, 3, 1), vec![4u8, 9, 0])?;
        assert_eq!(abs_diff(&a, &b)?.as_slice(), &[6, 4, 0]);

        let c = ImageBatch::new(BatchShape::new(1, 3, 1, 1), vec![0u8; 3])?;
        assert!(matches!(abs_diff(&a, &c), Err(WarpError::Image(_))));
        Ok(())
    }
}
