use roiwarp_image::ImageDtype;

use super::PaddingMode;

/// The four taps of a bilinear sample inside one image.
///
/// Offsets index the (height, width, channels) slice of a single image.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BilinearTaps {
    offsets: [usize; 4],
    weights: [f32; 4],
    frac_x: f32,
    frac_y: f32,
    // d(pixel coordinate) / d(normalized grid coordinate), zero when clamped
    scale_x: f32,
    scale_y: f32,
}

impl BilinearTaps {
    /// Resolve the taps for the normalized coordinate `(gx, gy)`.
    ///
    /// Returns `None` when the padding mode zero-fills the sample.
    #[inline]
    pub(crate) fn new(
        gx: f32,
        gy: f32,
        cols: usize,
        rows: usize,
        channels: usize,
        padding: PaddingMode,
    ) -> Option<Self> {
        let (gx, dgx) = padding.resolve(gx)?;
        let (gy, dgy) = padding.resolve(gy)?;

        let (x, clamp_x) = to_pixel(gx, cols);
        let (y, clamp_y) = to_pixel(gy, rows);

        // `x` and `y` are clamped to the valid pixel range, truncation is floor
        let x0 = x as usize;
        let y0 = y as usize;
        let x1 = (x0 + 1).min(cols - 1);
        let y1 = (y0 + 1).min(rows - 1);

        let frac_x = x - x0 as f32;
        let frac_y = y - y0 as f32;

        let weights = [
            (1.0 - frac_x) * (1.0 - frac_y),
            frac_x * (1.0 - frac_y),
            (1.0 - frac_x) * frac_y,
            frac_x * frac_y,
        ];

        let offsets = [
            (y0 * cols + x0) * channels,
            (y0 * cols + x1) * channels,
            (y1 * cols + x0) * channels,
            (y1 * cols + x1) * channels,
        ];

        Some(Self {
            offsets,
            weights,
            frac_x,
            frac_y,
            scale_x: 0.5 * cols as f32 * dgx * clamp_x,
            scale_y: 0.5 * rows as f32 * dgy * clamp_y,
        })
    }

    /// Interpolate channel `c` of `image`.
    #[inline]
    pub(crate) fn interpolate<T: ImageDtype>(&self, image: &[T], c: usize) -> f32 {
        self.offsets
            .iter()
            .zip(self.weights.iter())
            .map(|(&o, &w)| image[o + c].to_f32() * w)
            .sum()
    }

    /// Accumulate `grad` into the image gradient of channel `c`.
    #[inline]
    pub(crate) fn scatter(&self, grad_image: &mut [f32], c: usize, grad: f32) {
        self.offsets
            .iter()
            .zip(self.weights.iter())
            .for_each(|(&o, &w)| grad_image[o + c] += w * grad);
    }

    /// Gradient of channel `c` with respect to the normalized grid coordinate.
    #[inline]
    pub(crate) fn grid_gradient(&self, image: &[f32], c: usize) -> [f32; 2] {
        let [p00, p01, p10, p11] = self.offsets.map(|o| image[o + c]);
        let d_x = (1.0 - self.frac_y) * (p01 - p00) + self.frac_y * (p11 - p10);
        let d_y = (1.0 - self.frac_x) * (p10 - p00) + self.frac_x * (p11 - p01);
        [d_x * self.scale_x, d_y * self.scale_y]
    }
}

/// Normalized coordinate in `[-1, 1]` to a pixel coordinate clamped to the
/// pixel centers, together with the derivative of the clamp.
#[inline]
fn to_pixel(g: f32, len: usize) -> (f32, f32) {
    let p = ((g + 1.0) * len as f32 - 1.0) * 0.5;
    let max = (len - 1) as f32;
    if p < 0.0 {
        (0.0, 0.0)
    } else if p > max {
        (max, 0.0)
    } else {
        (p, 1.0)
    }
}
