use crate::error::WarpError;

/// A border type for samples that fall outside the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaddingMode {
    /// Samples outside the image extent are zero.
    ///
    /// Example: ...d c b a | 0 0 0 0...
    #[default]
    Zeros,

    /// Samples are clamped to the nearest valid pixel.
    ///
    /// Example: ...d c b a | a a a a...
    Replicate,

    /// Sample coordinates are mirrored at the image extent.
    ///
    /// Example: ...d c b a | a b c d...
    Reflect,
}

impl std::str::FromStr for PaddingMode {
    type Err = WarpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zeros" | "zero" | "constant" => Ok(Self::Zeros),
            "replicate" | "border" | "edge" => Ok(Self::Replicate),
            "reflect" | "reflection" => Ok(Self::Reflect),
            _ => Err(WarpError::UnknownPaddingMode(s.to_string())),
        }
    }
}

impl PaddingMode {
    /// Maps a normalized coordinate into the sampled range `[-1, 1]`.
    ///
    /// # Returns
    ///
    /// The resolved coordinate and its derivative with respect to `g`, or
    /// `None` when the sample must be zero (also for non-finite input).
    #[inline]
    pub fn resolve(&self, g: f32) -> Option<(f32, f32)> {
        if !g.is_finite() {
            return None;
        }
        match self {
            PaddingMode::Zeros => (-1.0..=1.0).contains(&g).then_some((g, 1.0)),
            PaddingMode::Replicate => {
                if g < -1.0 {
                    Some((-1.0, 0.0))
                } else if g > 1.0 {
                    Some((1.0, 0.0))
                } else {
                    Some((g, 1.0))
                }
            }
            PaddingMode::Reflect => {
                // period of 4 in normalized units, mirrored about -1 and 1
                let t = (g + 1.0).rem_euclid(4.0);
                if t <= 2.0 {
                    Some((t - 1.0, 1.0))
                } else {
                    Some((3.0 - t, -1.0))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PaddingMode;
    use approx::assert_abs_diff_eq;

    #[test]
    fn padding_from_str() {
        assert_eq!("border".parse::<PaddingMode>().ok(), Some(PaddingMode::Replicate));
        assert_eq!("zeros".parse::<PaddingMode>().ok(), Some(PaddingMode::Zeros));
        assert_eq!(
            "Reflection".parse::<PaddingMode>().ok(),
            Some(PaddingMode::Reflect)
        );
        assert!("wrap".parse::<PaddingMode>().is_err());
    }

    #[test]
    fn resolve_zeros() {
        assert_eq!(PaddingMode::Zeros.resolve(0.3), Some((0.3, 1.0)));
        assert_eq!(PaddingMode::Zeros.resolve(1.0), Some((1.0, 1.0)));
        assert_eq!(PaddingMode::Zeros.resolve(1.01), None);
        assert_eq!(PaddingMode::Zeros.resolve(f32::NAN), None);
    }

    #[test]
    fn resolve_replicate() {
        assert_eq!(PaddingMode::Replicate.resolve(-3.0), Some((-1.0, 0.0)));
        assert_eq!(PaddingMode::Replicate.resolve(0.5), Some((0.5, 1.0)));
    }

    #[test]
    fn resolve_reflect() {
        let (g, d) = PaddingMode::Reflect.resolve(1.25).unwrap_or_default();
        assert_abs_diff_eq!(g, 0.75, epsilon = 1e-6);
        assert_eq!(d, -1.0);
        let (g, d) = PaddingMode::Reflect.resolve(-1.25).unwrap_or_default();
        assert_abs_diff_eq!(g, -0.75, epsilon = 1e-6);
        assert_eq!(d, -1.0);
        let (g, d) = PaddingMode::Reflect.resolve(3.5).unwrap_or_default();
        assert_abs_diff_eq!(g, -0.5, epsilon = 1e-6);
        assert_eq!(d, 1.0);
    }
}
