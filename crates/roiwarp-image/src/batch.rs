use num_traits::AsPrimitive;

use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image or of a warp canvas in pixels.
///
/// # Examples
///
/// ```
/// use roiwarp_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Returns true if both dimensions are strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// Shape of an image batch laid out as (batch, height, width, channels).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BatchShape {
    /// Number of images in the batch.
    pub batch: usize,
    /// Height of every image in pixels.
    pub height: usize,
    /// Width of every image in pixels.
    pub width: usize,
    /// Number of channels per pixel.
    pub channels: usize,
}

impl BatchShape {
    /// Create a new batch shape.
    pub fn new(batch: usize, height: usize, width: usize, channels: usize) -> Self {
        Self {
            batch,
            height,
            width,
            channels,
        }
    }

    /// Create a batch shape from an image size.
    pub fn from_size(batch: usize, size: ImageSize, channels: usize) -> Self {
        Self::new(batch, size.height, size.width, channels)
    }

    /// The spatial size of the images in the batch.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.batch * self.height * self.width * self.channels
    }

    /// Number of elements of a single image.
    pub fn item_len(&self) -> usize {
        self.height * self.width * self.channels
    }

    /// Number of elements of a single row.
    pub fn row_len(&self) -> usize {
        self.width * self.channels
    }

    fn is_valid(&self) -> bool {
        self.batch > 0 && self.height > 0 && self.width > 0 && self.channels > 0
    }
}

impl std::fmt::Display for BatchShape {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.batch, self.height, self.width, self.channels
        )
    }
}

/// Trait for the pixel data types supported by the warping operators.
///
/// Sampling happens in `f32`; integer types round and saturate on the way back.
pub trait ImageDtype: Copy + Default + Send + Sync + AsPrimitive<f32> + 'static {
    /// Convert a f32 value to the image data type.
    fn from_f32(x: f32) -> Self;

    /// Convert the value to f32.
    #[inline]
    fn to_f32(self) -> f32 {
        self.as_()
    }
}

macro_rules! impl_integer_dtype {
    ($($t:ty),*) => {
        $(
            impl ImageDtype for $t {
                #[inline]
                fn from_f32(x: f32) -> Self {
                    x.round().clamp(<$t>::MIN as f32, <$t>::MAX as f32) as $t
                }
            }
        )*
    };
}

impl_integer_dtype!(u8, u16);

impl ImageDtype for f32 {
    #[inline]
    fn from_f32(x: f32) -> Self {
        x
    }
}

impl ImageDtype for f64 {
    #[inline]
    fn from_f32(x: f32) -> Self {
        x as f64
    }
}

/// A batch of images with the same size and number of channels.
///
/// The pixel data is stored contiguously in row-major order with shape
/// (batch, height, width, channels).
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBatch<T> {
    shape: BatchShape,
    data: Vec<T>,
}

impl<T> ImageBatch<T> {
    /// Create a new batch from pixel data.
    ///
    /// # Arguments
    ///
    /// * `shape` - The shape of the batch.
    /// * `data` - The pixel data in (batch, height, width, channels) order.
    ///
    /// # Errors
    ///
    /// If any dimension is zero or the data length does not match the shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use roiwarp_image::{BatchShape, ImageBatch};
    ///
    /// let batch = ImageBatch::<u8>::new(BatchShape::new(2, 20, 10, 3), vec![0u8; 2 * 20 * 10 * 3]).unwrap();
    ///
    /// assert_eq!(batch.batch_size(), 2);
    /// assert_eq!(batch.width(), 10);
    /// assert_eq!(batch.height(), 20);
    /// assert_eq!(batch.num_channels(), 3);
    /// ```
    pub fn new(shape: BatchShape, data: Vec<T>) -> Result<Self, ImageError> {
        if !shape.is_valid() {
            return Err(ImageError::InvalidBatchShape(shape.to_string()));
        }

        if data.len() != shape.numel() {
            return Err(ImageError::InvalidDataLength(data.len(), shape.numel()));
        }

        Ok(Self { shape, data })
    }

    /// Create a new batch filled with a single value.
    pub fn from_size_val(shape: BatchShape, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        Self::new(shape, vec![val; shape.numel()])
    }

    /// Create a new batch by evaluating `f(b, y, x, c)` for every element.
    pub fn from_fn(
        shape: BatchShape,
        f: impl Fn(usize, usize, usize, usize) -> T,
    ) -> Result<Self, ImageError> {
        let mut data = Vec::with_capacity(shape.numel());
        for b in 0..shape.batch {
            for y in 0..shape.height {
                for x in 0..shape.width {
                    for c in 0..shape.channels {
                        data.push(f(b, y, x, c));
                    }
                }
            }
        }
        Self::new(shape, data)
    }

    /// Stack single images of the same size into a batch.
    ///
    /// Each item holds the (height, width, channels) data of one image.
    pub fn stack(size: ImageSize, channels: usize, items: &[Vec<T>]) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let shape = BatchShape::from_size(items.len(), size, channels);
        let mut data = Vec::with_capacity(shape.numel());
        for item in items {
            if item.len() != shape.item_len() {
                return Err(ImageError::InvalidDataLength(item.len(), shape.item_len()));
            }
            data.extend_from_slice(item);
        }
        Self::new(shape, data)
    }

    /// The shape of the batch.
    pub fn shape(&self) -> BatchShape {
        self.shape
    }

    /// The number of images in the batch.
    pub fn batch_size(&self) -> usize {
        self.shape.batch
    }

    /// The spatial size of the images.
    pub fn size(&self) -> ImageSize {
        self.shape.size()
    }

    /// The width of the images in pixels.
    pub fn width(&self) -> usize {
        self.shape.width
    }

    /// The height of the images in pixels.
    pub fn height(&self) -> usize {
        self.shape.height
    }

    /// The number of channels.
    pub fn num_channels(&self) -> usize {
        self.shape.channels
    }

    /// The raw pixel data.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The raw pixel data, mutable.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the batch and return the raw pixel data.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// The (height, width, channels) data of the `b`-th image.
    pub fn item(&self, b: usize) -> Result<&[T], ImageError> {
        if b >= self.shape.batch {
            return Err(ImageError::BatchIndexOutOfBounds(b, self.shape.batch));
        }
        let len = self.shape.item_len();
        Ok(&self.data[b * len..(b + 1) * len])
    }

    /// Get a reference to an element, or `None` if out of bounds.
    pub fn get(&self, b: usize, y: usize, x: usize, c: usize) -> Option<&T> {
        let s = &self.shape;
        if b >= s.batch || y >= s.height || x >= s.width || c >= s.channels {
            return None;
        }
        self.data
            .get(((b * s.height + y) * s.width + x) * s.channels + c)
    }

    /// Get a pixel value with a descriptive error when out of bounds.
    pub fn get_pixel(&self, b: usize, x: usize, y: usize, c: usize) -> Result<T, ImageError>
    where
        T: Copy,
    {
        if b >= self.shape.batch {
            return Err(ImageError::BatchIndexOutOfBounds(b, self.shape.batch));
        }

        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }

        if c >= self.num_channels() {
            return Err(ImageError::ChannelIndexOutOfBounds(c, self.num_channels()));
        }

        let idx = ((b * self.height() + y) * self.width() + x) * self.num_channels() + c;
        Ok(self.data[idx])
    }

    /// A zero-copy ndarray view with shape (batch, height, width, channels).
    pub fn view(&self) -> Result<ndarray::ArrayView4<'_, T>, ImageError> {
        let s = &self.shape;
        Ok(ndarray::ArrayView4::from_shape(
            (s.batch, s.height, s.width, s.channels),
            &self.data,
        )?)
    }
}

impl<T: ImageDtype> ImageBatch<T> {
    /// Cast the pixel data to another data type.
    ///
    /// Integer targets round to nearest and saturate.
    ///
    /// # Examples
    ///
    /// ```
    /// use roiwarp_image::{BatchShape, ImageBatch};
    ///
    /// let batch = ImageBatch::new(BatchShape::new(1, 1, 2, 1), vec![-3.2f32, 300.6]).unwrap();
    /// let batch_u8 = batch.cast::<u8>();
    ///
    /// assert_eq!(batch_u8.as_slice(), &[0u8, 255]);
    /// ```
    pub fn cast<U: ImageDtype>(&self) -> ImageBatch<U> {
        ImageBatch {
            shape: self.shape,
            data: self.data.iter().map(|&x| U::from_f32(x.to_f32())).collect(),
        }
    }
}

impl<T: Clone> TryFrom<ndarray::Array4<T>> for ImageBatch<T> {
    type Error = ImageError;

    fn try_from(array: ndarray::Array4<T>) -> Result<Self, Self::Error> {
        let (batch, height, width, channels) = array.dim();
        let array = if array.is_standard_layout() {
            array
        } else {
            array.as_standard_layout().into_owned()
        };
        // NOTE: standard layout guarantees the raw vec is in logical order
        let data = array.into_raw_vec();
        Self::new(BatchShape::new(batch, height, width, channels), data)
    }
}
