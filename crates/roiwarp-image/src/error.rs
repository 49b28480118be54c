/// An error type for the image batch module.
#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    /// Error when the data length does not match the batch shape.
    #[error("Data length ({0}) does not match the batch shape ({1})")]
    InvalidDataLength(usize, usize),

    /// Error when the batch has a zero sized dimension.
    #[error("Invalid batch shape {0}: all dimensions must be positive")]
    InvalidBatchShape(String),

    /// Error when the two batches do not share the same shape.
    #[error("Batch shapes do not match: {0} vs {1}")]
    BatchShapeMismatch(String, String),

    /// Error when the batch index is out of bounds.
    #[error("Batch index ({0}) is out of bounds ({1})")]
    BatchIndexOutOfBounds(usize, usize),

    /// Error when the pixel index is out of bounds.
    #[error("Pixel coordinates ({0}, {1}) are out of bounds ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index ({0}) is out of bounds ({1})")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when the ndarray layout is not compatible with the batch.
    #[error("Invalid ndarray shape")]
    InvalidShape(#[from] ndarray::ShapeError),
}
