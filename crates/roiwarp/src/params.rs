use std::f64::consts::TAU;

use crate::error::WarpError;
use crate::interpolation::PaddingMode;
use crate::parallel::ExecutionStrategy;

/// How the roi box aspect ratio is handled by the warps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AspectMode {
    /// Scale each axis independently so the box fills the canvas.
    ///
    /// Non-square boxes are stretched; polar radii scale per axis.
    #[default]
    Distort,

    /// Use one shared scale so the box keeps its aspect ratio.
    ///
    /// Non-square cartesian canvases are letterboxed; polar radii become
    /// elliptical.
    Preserve,
}

impl std::str::FromStr for AspectMode {
    type Err = WarpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distort" | "stretch" | "fill" => Ok(Self::Distort),
            "preserve" | "keep" | "keep_aspect_ratio" => Ok(Self::Preserve),
            _ => Err(WarpError::UnknownAspectMode(s.to_string())),
        }
    }
}

/// Parameters shared by all the warp and restore operators.
///
/// # Example
///
/// ```
/// use roiwarp::interpolation::PaddingMode;
/// use roiwarp::params::{AspectMode, WarpParams};
///
/// let params = WarpParams::default()
///     .with_angular_offset(std::f32::consts::FRAC_PI_2)
///     .with_padding(PaddingMode::Replicate)
///     .with_aspect(AspectMode::Preserve);
///
/// assert_eq!(params.padding, PaddingMode::Replicate);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WarpParams {
    /// Rotation of the roi reference frame in radians.
    pub angular_offset: f32,
    /// How samples outside the source image are filled.
    pub padding: PaddingMode,
    /// How the box aspect ratio is handled.
    pub aspect: AspectMode,
    /// The execution backend.
    pub strategy: ExecutionStrategy,
}

impl WarpParams {
    /// Set the angular offset in radians.
    pub fn with_angular_offset(mut self, angular_offset: f32) -> Self {
        self.angular_offset = angular_offset;
        self
    }

    /// Set the padding mode.
    pub fn with_padding(mut self, padding: PaddingMode) -> Self {
        self.padding = padding;
        self
    }

    /// Set the aspect mode.
    pub fn with_aspect(mut self, aspect: AspectMode) -> Self {
        self.aspect = aspect;
        self
    }

    /// Set the execution strategy.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Check that the parameters can be used by the warps.
    pub fn validate(&self) -> Result<(), WarpError> {
        if !self.angular_offset.is_finite() {
            return Err(WarpError::InvalidAngularOffset(self.angular_offset));
        }
        Ok(())
    }

    /// The angular offset wrapped into `[0, 2π)`.
    pub fn wrapped_offset(&self) -> f32 {
        ((self.angular_offset as f64).rem_euclid(TAU) as f32).rem_euclid(std::f32::consts::TAU)
    }
}
