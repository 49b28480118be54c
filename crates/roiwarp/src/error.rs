use roiwarp_image::ImageError;

use crate::parallel::ParallelError;

/// Errors returned by the warping operators.
///
/// All of them are deterministic contract violations detected before any
/// output is produced.
#[derive(thiserror::Error, Debug)]
pub enum WarpError {
    /// The roi box has a non-positive width or height, or non-finite coordinates.
    #[error("degenerate roi box ({x1}, {y1}, {x2}, {y2}): width and height must be positive and finite")]
    DegenerateRoi {
        /// Left coordinate.
        x1: f32,
        /// Top coordinate.
        y1: f32,
        /// Right coordinate.
        x2: f32,
        /// Bottom coordinate.
        y2: f32,
    },

    /// A canvas or destination size has a zero dimension.
    #[error("invalid canvas size {0}x{1}: width and height must be positive")]
    InvalidCanvasSize(usize, usize),

    /// The angular offset is not a finite number.
    #[error("invalid angular offset {0}: must be finite")]
    InvalidAngularOffset(f32),

    /// The padding mode name is not recognized.
    #[error("unknown padding mode '{0}', expected one of: zeros, replicate, reflect")]
    UnknownPaddingMode(String),

    /// The aspect mode name is not recognized.
    #[error("unknown aspect mode '{0}', expected one of: distort, preserve")]
    UnknownAspectMode(String),

    /// The execution strategy name is not recognized.
    #[error("unknown execution strategy '{0}', expected one of: serial, parallel, fixed:<n>")]
    UnknownExecutionStrategy(String),

    /// The number of roi boxes does not match the number of images.
    #[error("batch size mismatch: {0} images but {1} roi boxes")]
    BatchSizeMismatch(usize, usize),

    /// No roi box was given.
    #[error("empty batch: at least one roi box is required")]
    EmptyBatch,

    /// A detection has fewer values than the four box corners.
    #[error("detection has {0} values, expected at least 4 (x1, y1, x2, y2)")]
    InvalidDetectionLength(usize),

    /// The raw grid data does not match the grid shape.
    #[error("grid data length ({0}) does not match the expected length ({1})")]
    InvalidGridLength(usize, usize),

    /// The sampling grid does not match the images or the gradient.
    #[error("grid shape [{grid_batch}, {grid_height}, {grid_width}] does not match [{batch}, {height}, {width}]")]
    GridShapeMismatch {
        /// Batch size of the grid.
        grid_batch: usize,
        /// Height of the grid.
        grid_height: usize,
        /// Width of the grid.
        grid_width: usize,
        /// Expected batch size.
        batch: usize,
        /// Expected height.
        height: usize,
        /// Expected width.
        width: usize,
    },

    /// Error from the image batch types.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error from the parallel execution backend.
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}
