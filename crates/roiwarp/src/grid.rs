use roiwarp_image::ImageSize;

use crate::error::WarpError;
use crate::parallel::{self, ExecutionStrategy};

/// Half width of the margin kept away from the open `atanh` domain.
pub const ATANH_EPS: f32 = 1e-6;

/// Inverse hyperbolic tangent with the argument clamped to `(-1 + ε, 1 - ε)`.
///
/// This is the only place the warps evaluate `atanh`, so finite inputs can
/// never produce infinite or NaN source coordinates.
///
/// # Example
///
/// ```
/// use roiwarp::grid::safe_atanh;
///
/// assert!(safe_atanh(1.0).is_finite());
/// assert!(safe_atanh(-1.0).is_finite());
/// assert_eq!(safe_atanh(0.0), 0.0);
/// ```
#[inline]
pub fn safe_atanh(x: f32) -> f32 {
    x.clamp(-1.0 + ATANH_EPS, 1.0 - ATANH_EPS).atanh()
}

/// Maps a pixel coordinate to the normalized `[-1, 1]` range.
///
/// Pixel centers sit at integer coordinates and `±1` is the outer edge of
/// the border pixels (align corners = false).
#[inline]
pub fn normalize_coord(k: f32, len: usize) -> f32 {
    (2.0 * k + 1.0) / len as f32 - 1.0
}

/// Inverse of [`normalize_coord`].
#[inline]
pub fn denormalize_coord(g: f32, len: usize) -> f32 {
    ((g + 1.0) * len as f32 - 1.0) * 0.5
}

pub(crate) fn check_size(size: ImageSize) -> Result<(), WarpError> {
    if !size.is_valid() {
        return Err(WarpError::InvalidCanvasSize(size.width, size.height));
    }
    Ok(())
}

/// A batch of sampling grids with shape (batch, height, width, 2).
///
/// Every location holds the normalized `(x, y)` coordinate to read from the
/// sampled image. The optional mask flags locations that have no source at
/// all (the letterbox band of aspect preserving warps); the sampler writes
/// zero there regardless of the padding mode.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplingGrid {
    batch: usize,
    size: ImageSize,
    coords: Vec<f32>,
    mask: Option<Vec<bool>>,
}

impl SamplingGrid {
    /// Create a grid from raw coordinates.
    ///
    /// # Arguments
    ///
    /// * `batch` - The number of grids.
    /// * `size` - The spatial size of each grid.
    /// * `coords` - The interleaved `(x, y)` coordinates, `batch * height * width * 2` values.
    /// * `mask` - Optional validity flags, `batch * height * width` values.
    pub fn new(
        batch: usize,
        size: ImageSize,
        coords: Vec<f32>,
        mask: Option<Vec<bool>>,
    ) -> Result<Self, WarpError> {
        check_size(size)?;
        if batch == 0 {
            return Err(WarpError::EmptyBatch);
        }
        let numel = batch * size.width * size.height;
        if coords.len() != numel * 2 {
            return Err(WarpError::InvalidGridLength(coords.len(), numel * 2));
        }
        if let Some(mask) = mask.as_ref().filter(|m| m.len() != numel) {
            return Err(WarpError::InvalidGridLength(mask.len(), numel));
        }
        Ok(Self {
            batch,
            size,
            coords,
            mask,
        })
    }

    /// Build a grid by evaluating `f(b, y, x)` at every location.
    ///
    /// `None` marks the location as invalid. Rows are evaluated according to
    /// the execution strategy.
    pub fn from_fn<F>(
        batch: usize,
        size: ImageSize,
        strategy: ExecutionStrategy,
        f: F,
    ) -> Result<Self, WarpError>
    where
        F: Fn(usize, usize, usize) -> Option<[f32; 2]> + Send + Sync,
    {
        check_size(size)?;
        let (rows, cols) = (size.height, size.width);
        let mut coords = vec![0.0f32; batch * rows * cols * 2];
        let mut mask = vec![true; batch * rows * cols];

        parallel::for_each_row_zip(
            strategy,
            &mut coords,
            cols * 2,
            &mut mask,
            cols,
            |row, coords_row, mask_row| {
                let (b, y) = (row / rows, row % rows);
                coords_row
                    .chunks_exact_mut(2)
                    .zip(mask_row.iter_mut())
                    .enumerate()
                    .for_each(|(x, (xy, valid))| match f(b, y, x) {
                        Some(g) => xy.copy_from_slice(&g),
                        None => *valid = false,
                    });
            },
        )?;

        let mask = if mask.iter().all(|&v| v) {
            None
        } else {
            Some(mask)
        };

        Self::new(batch, size, coords, mask)
    }

    /// A grid that reads every pixel of an image of the same size.
    pub fn identity(batch: usize, size: ImageSize) -> Result<Self, WarpError> {
        Self::from_fn(batch, size, ExecutionStrategy::Serial, |_, y, x| {
            Some([
                normalize_coord(x as f32, size.width),
                normalize_coord(y as f32, size.height),
            ])
        })
    }

    /// The number of grids in the batch.
    pub fn batch_size(&self) -> usize {
        self.batch
    }

    /// The spatial size of the grids.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The width of the grids.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// The height of the grids.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// The interleaved `(x, y)` coordinates.
    pub fn as_slice(&self) -> &[f32] {
        &self.coords
    }

    /// The validity mask, `None` when every location is valid.
    pub fn mask(&self) -> Option<&[bool]> {
        self.mask.as_deref()
    }

    /// The coordinates of one location, `None` if out of bounds or masked.
    pub fn get(&self, b: usize, y: usize, x: usize) -> Option<[f32; 2]> {
        if b >= self.batch || y >= self.size.height || x >= self.size.width {
            return None;
        }
        let idx = (b * self.size.height + y) * self.size.width + x;
        if self.mask.as_ref().is_some_and(|m| !m[idx]) {
            return None;
        }
        Some([self.coords[2 * idx], self.coords[2 * idx + 1]])
    }

    /// The coordinates of one output row, `width * 2` values.
    pub(crate) fn row(&self, row: usize) -> &[f32] {
        let len = self.size.width * 2;
        &self.coords[row * len..(row + 1) * len]
    }

    /// The validity flags of one output row, if a mask is present.
    pub(crate) fn row_mask(&self, row: usize) -> Option<&[bool]> {
        let len = self.size.width;
        self.mask
            .as_ref()
            .map(|m| &m[row * len..(row + 1) * len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_roundtrip() {
        for len in [1usize, 2, 7, 64] {
            for k in 0..len {
                let g = normalize_coord(k as f32, len);
                assert!(g > -1.0 && g < 1.0);
                assert!((denormalize_coord(g, len) - k as f32).abs() < 1e-4);
            }
        }
        assert_eq!(denormalize_coord(-1.0, 4), -0.5);
        assert_eq!(denormalize_coord(1.0, 4), 3.5);
    }

    #[test]
    fn safe_atanh_is_finite() {
        for x in [-2.0f32, -1.0, -0.999_999_9, 0.5, 1.0, 3.0] {
            assert!(safe_atanh(x).is_finite());
        }
        assert!((safe_atanh(0.5) - 0.5f32.atanh()).abs() < 1e-7);
    }

    #[test]
    fn grid_from_fn_with_mask() -> Result<(), WarpError> {
        let size = ImageSize {
            width: 3,
            height: 2,
        };
        let grid = SamplingGrid::from_fn(2, size, ExecutionStrategy::ParallelRows, |b, y, x| {
            (x != 1).then_some([b as f32, (y * 10 + x) as f32])
        })?;
        assert_eq!(grid.batch_size(), 2);
        assert_eq!(grid.get(1, 1, 2), Some([1.0, 12.0]));
        assert_eq!(grid.get(0, 0, 1), None);
        assert_eq!(grid.mask().map(|m| m.iter().filter(|v| !**v).count()), Some(4));
        Ok(())
    }

    #[test]
    fn grid_without_invalid_has_no_mask() -> Result<(), WarpError> {
        let grid = SamplingGrid::identity(
            1,
            ImageSize {
                width: 4,
                height: 4,
            },
        )?;
        assert!(grid.mask().is_none());
        assert_eq!(grid.get(0, 0, 0), Some([-0.75, -0.75]));
        Ok(())
    }

    #[test]
    fn grid_invalid_sizes() {
        let res = SamplingGrid::new(
            1,
            ImageSize {
                width: 0,
                height: 2,
            },
            vec![],
            None,
        );
        assert!(matches!(res, Err(WarpError::InvalidCanvasSize(0, 2))));

        let res = SamplingGrid::new(
            1,
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0.0; 6],
            None,
        );
        assert!(matches!(res, Err(WarpError::InvalidGridLength(6, 8))));

        let res = SamplingGrid::new(
            1,
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0.0; 8],
            Some(vec![true; 3]),
        );
        assert!(matches!(res, Err(WarpError::InvalidGridLength(3, 4))));

        let res = SamplingGrid::new(
            0,
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![],
            None,
        );
        assert!(matches!(res, Err(WarpError::EmptyBatch)));
    }
}
