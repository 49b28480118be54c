use roiwarp_image::{BatchShape, ImageBatch, ImageDtype};

use super::bilinear::BilinearTaps;
use super::PaddingMode;
use crate::error::WarpError;
use crate::grid::SamplingGrid;
use crate::parallel::{self, ExecutionStrategy};

fn check_grid<T>(images: &ImageBatch<T>, grid: &SamplingGrid) -> Result<(), WarpError> {
    if grid.batch_size() != images.batch_size() {
        return Err(WarpError::GridShapeMismatch {
            grid_batch: grid.batch_size(),
            grid_height: grid.height(),
            grid_width: grid.width(),
            batch: images.batch_size(),
            height: images.height(),
            width: images.width(),
        });
    }
    Ok(())
}

/// Sample an image batch at the locations of a sampling grid.
///
/// Each output pixel is the bilinear interpolation of the source image at the
/// normalized coordinate stored in the grid. Masked grid locations are zero.
///
/// # Arguments
///
/// * `images` - The source batch with shape (B, H, W, C).
/// * `grid` - The sampling grid with shape (B, H', W', 2).
/// * `padding` - How samples outside the source image are filled.
/// * `strategy` - The execution strategy.
///
/// # Returns
///
/// A new batch with shape (B, H', W', C) and the dtype of the input.
///
/// # Errors
///
/// * The grid and the images must have the same batch size.
///
/// # Example
///
/// ```
/// use roiwarp::grid::SamplingGrid;
/// use roiwarp::interpolation::{grid_sample, PaddingMode};
/// use roiwarp::parallel::ExecutionStrategy;
/// use roiwarp_image::{BatchShape, ImageBatch};
///
/// let image = ImageBatch::new(BatchShape::new(1, 2, 2, 1), vec![0u8, 10, 20, 30]).unwrap();
/// let grid = SamplingGrid::identity(1, image.size()).unwrap();
///
/// let out = grid_sample(&image, &grid, PaddingMode::Zeros, ExecutionStrategy::Serial).unwrap();
///
/// assert_eq!(out.as_slice(), image.as_slice());
/// ```
pub fn grid_sample<T: ImageDtype>(
    images: &ImageBatch<T>,
    grid: &SamplingGrid,
    padding: PaddingMode,
    strategy: ExecutionStrategy,
) -> Result<ImageBatch<T>, WarpError> {
    check_grid(images, grid)?;

    let src_shape = images.shape();
    let (cols, rows, channels) = (src_shape.width, src_shape.height, src_shape.channels);
    let item_len = src_shape.item_len();
    let src = images.as_slice();

    let dst_shape = BatchShape::from_size(src_shape.batch, grid.size(), channels);
    let mut dst = vec![T::default(); dst_shape.numel()];

    parallel::for_each_row(strategy, &mut dst, dst_shape.row_len(), |row, dst_row| {
        let b = row / dst_shape.height;
        let item = &src[b * item_len..(b + 1) * item_len];
        let coords = grid.row(row);
        let mask = grid.row_mask(row);

        dst_row
            .chunks_exact_mut(channels)
            .enumerate()
            .for_each(|(x, dst_pixel)| {
                if mask.is_some_and(|m| !m[x]) {
                    return;
                }
                let (gx, gy) = (coords[2 * x], coords[2 * x + 1]);
                if let Some(taps) = BilinearTaps::new(gx, gy, cols, rows, channels, padding) {
                    dst_pixel
                        .iter_mut()
                        .enumerate()
                        .for_each(|(c, pixel)| *pixel = T::from_f32(taps.interpolate(item, c)));
                }
            });
    })?;

    Ok(ImageBatch::new(dst_shape, dst)?)
}

/// Backward pass of [`grid_sample`] for `f32` batches.
///
/// Given the gradient of a loss with respect to the sampled output, returns
/// the gradients with respect to the source images and to the grid
/// coordinates. Clamped, zero-filled and masked samples carry no gradient
/// to the grid.
///
/// # Arguments
///
/// * `images` - The source batch used in the forward pass, shape (B, H, W, C).
/// * `grid` - The sampling grid used in the forward pass, shape (B, H', W', 2).
/// * `grad_output` - The gradient of the output, shape (B, H', W', C).
/// * `padding` - The padding mode used in the forward pass.
/// * `strategy` - The execution strategy; parallelism is over batch items.
///
/// # Returns
///
/// A tuple `(grad_images, grad_grid)` shaped like `images` and `grid`.
pub fn grid_sample_backward(
    images: &ImageBatch<f32>,
    grid: &SamplingGrid,
    grad_output: &ImageBatch<f32>,
    padding: PaddingMode,
    strategy: ExecutionStrategy,
) -> Result<(ImageBatch<f32>, SamplingGrid), WarpError> {
    check_grid(images, grid)?;

    let src_shape = images.shape();
    let out_shape = BatchShape::from_size(src_shape.batch, grid.size(), src_shape.channels);
    if grad_output.shape() != out_shape {
        return Err(WarpError::GridShapeMismatch {
            grid_batch: grid.batch_size(),
            grid_height: grid.height(),
            grid_width: grid.width(),
            batch: grad_output.batch_size(),
            height: grad_output.height(),
            width: grad_output.width(),
        });
    }

    let (cols, rows, channels) = (src_shape.width, src_shape.height, src_shape.channels);
    let item_len = src_shape.item_len();
    let out_item_len = out_shape.item_len();
    let grid_item_len = grid.width() * grid.height() * 2;
    let src = images.as_slice();
    let grad_out = grad_output.as_slice();

    let mut grad_images = vec![0.0f32; src_shape.numel()];
    let mut grad_coords = vec![0.0f32; grid.as_slice().len()];

    // every batch item scatters into its own image, so items run in parallel
    parallel::for_each_row_zip(
        strategy,
        &mut grad_images,
        item_len,
        &mut grad_coords,
        grid_item_len,
        |b, grad_item, grad_grid_item| {
            let item = &src[b * item_len..(b + 1) * item_len];
            let grad_out_item = &grad_out[b * out_item_len..(b + 1) * out_item_len];

            for y in 0..grid.height() {
                let row = b * grid.height() + y;
                let coords = grid.row(row);
                let mask = grid.row_mask(row);

                for x in 0..grid.width() {
                    if mask.is_some_and(|m| !m[x]) {
                        continue;
                    }
                    let Some(taps) = BilinearTaps::new(
                        coords[2 * x],
                        coords[2 * x + 1],
                        cols,
                        rows,
                        channels,
                        padding,
                    ) else {
                        continue;
                    };

                    let pixel = (y * grid.width() + x) * channels;
                    let mut grad_xy = [0.0f32; 2];
                    for c in 0..channels {
                        let g = grad_out_item[pixel + c];
                        taps.scatter(grad_item, c, g);
                        let [dx, dy] = taps.grid_gradient(item, c);
                        grad_xy[0] += g * dx;
                        grad_xy[1] += g * dy;
                    }
                    let idx = 2 * (y * grid.width() + x);
                    grad_grid_item[idx..idx + 2].copy_from_slice(&grad_xy);
                }
            }
        },
    )?;

    let grad_images = ImageBatch::new(src_shape, grad_images)?;
    let grad_grid = SamplingGrid::new(
        grid.batch_size(),
        grid.size(),
        grad_coords,
        grid.mask().map(|m| m.to_vec()),
    )?;

    Ok((grad_images, grad_grid))
}
