use crate::error::WarpError;

/// A rectangular region of interest in source pixel units.
///
/// Pixel centers sit at integer coordinates, as reported by most detectors.
///
/// # Example
///
/// ```
/// use roiwarp::roi::RoiBox;
///
/// let roi = RoiBox::new(10.0, 20.0, 50.0, 40.0);
///
/// assert_eq!(roi.width(), 40.0);
/// assert_eq!(roi.center(), [30.0, 30.0]);
/// assert!(roi.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoiBox {
    /// Left coordinate.
    pub x1: f32,
    /// Top coordinate.
    pub y1: f32,
    /// Right coordinate.
    pub x2: f32,
    /// Bottom coordinate.
    pub y2: f32,
}

impl RoiBox {
    /// Create a new roi box from its corners.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a roi box from a detection, using its first four values.
    ///
    /// Detectors usually append a score and landmarks after the box.
    pub fn from_detection(detection: &[f32]) -> Result<Self, WarpError> {
        match detection {
            [x1, y1, x2, y2, ..] => {
                let roi = Self::new(*x1, *y1, *x2, *y2);
                roi.validate()?;
                Ok(roi)
            }
            _ => Err(WarpError::InvalidDetectionLength(detection.len())),
        }
    }

    /// The width of the box.
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// The height of the box.
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// The area of the box.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// The center of the box.
    pub fn center(&self) -> [f32; 2] {
        [(self.x1 + self.x2) * 0.5, (self.y1 + self.y2) * 0.5]
    }

    /// Half of the width and height of the box.
    pub fn half_size(&self) -> [f32; 2] {
        [self.width() * 0.5, self.height() * 0.5]
    }

    /// Check that the box is finite with a positive width and height.
    pub fn validate(&self) -> Result<(), WarpError> {
        let finite = [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|v| v.is_finite());
        // NOTE: written so that NaN extents are rejected as well
        if !(finite && self.x2 > self.x1 && self.y2 > self.y1) {
            return Err(WarpError::DegenerateRoi {
                x1: self.x1,
                y1: self.y1,
                x2: self.x2,
                y2: self.y2,
            });
        }
        Ok(())
    }
}

impl From<[f32; 4]> for RoiBox {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

/// Validate a batch of roi boxes against the number of images.
pub(crate) fn validate_rois(rois: &[RoiBox], batch: usize) -> Result<(), WarpError> {
    if rois.len() != batch {
        return Err(WarpError::BatchSizeMismatch(batch, rois.len()));
    }
    rois.iter().try_for_each(RoiBox::validate)
}

/// The rotated reference frame of a roi box.
///
/// Local coordinates are measured from the box center along the box axes
/// rotated by the angular offset: `s = R(-θ) (p - c)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiFrame {
    center: [f32; 2],
    half_size: [f32; 2],
    cos: f32,
    sin: f32,
}

impl RoiFrame {
    /// Create the frame of a validated roi box rotated by `angle` radians.
    pub fn new(roi: &RoiBox, angle: f32) -> Self {
        Self {
            center: roi.center(),
            half_size: roi.half_size(),
            cos: angle.cos(),
            sin: angle.sin(),
        }
    }

    /// Half of the box width and height.
    pub fn half_size(&self) -> [f32; 2] {
        self.half_size
    }

    /// Source pixel coordinates to local coordinates.
    #[inline]
    pub fn to_local(&self, x: f32, y: f32) -> [f32; 2] {
        let (dx, dy) = (x - self.center[0], y - self.center[1]);
        [
            self.cos * dx + self.sin * dy,
            -self.sin * dx + self.cos * dy,
        ]
    }

    /// Local coordinates to source pixel coordinates.
    #[inline]
    pub fn from_local(&self, sx: f32, sy: f32) -> [f32; 2] {
        [
            self.center[0] + self.cos * sx - self.sin * sy,
            self.center[1] + self.sin * sx + self.cos * sy,
        ]
    }
}
