use roiwarp_image::ImageSize;

use super::check_inputs;
use crate::error::WarpError;
use crate::grid::{normalize_coord, safe_atanh, SamplingGrid};
use crate::params::{AspectMode, WarpParams};
use crate::roi::{RoiBox, RoiFrame};

/// Point level mapping between source pixels and the ROI tanh canvas.
///
/// Tanh canvas coordinates are normalized canvas coordinates: a canvas pixel
/// center `k` of an axis of length `n` sits at `(2k + 1) / n - 1`. A source
/// point with ROI-local coordinates `(sx, sy)` lands on
/// `(ex · tanh(sx / kx), ey · tanh(sy / ky))`, where `(kx, ky)` is the scale
/// of each axis and `(ex, ey)` the extent of the content region.
///
/// With [`AspectMode::Distort`] the scales are the half size of the box and
/// the content region is the whole canvas. With [`AspectMode::Preserve`] both
/// axes share the larger half size and the content region is the largest
/// centered square of canvas pixels, so the box keeps its shape. The rest of
/// a non-square canvas is letterbox.
///
/// # Example
///
/// ```
/// use roiwarp::params::WarpParams;
/// use roiwarp::roi::RoiBox;
/// use roiwarp::warp::TanhMapper;
/// use roiwarp_image::ImageSize;
///
/// let roi = RoiBox::new(0.0, 0.0, 100.0, 50.0);
/// let canvas = ImageSize { width: 64, height: 64 };
/// let mapper = TanhMapper::new(&roi, canvas, &WarpParams::default());
///
/// // the box center lands on the canvas center
/// assert_eq!(mapper.to_canvas(50.0, 25.0), [0.0, 0.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TanhMapper {
    frame: RoiFrame,
    scale: [f32; 2],
    extent: [f32; 2],
    limit: [f32; 2],
}

impl TanhMapper {
    /// Create the mapper of a validated roi box and a canvas size.
    pub fn new(roi: &RoiBox, canvas_size: ImageSize, params: &WarpParams) -> Self {
        let frame = RoiFrame::new(roi, params.wrapped_offset());
        let [hx, hy] = roi.half_size();

        let (scale, extent, limit) = match params.aspect {
            AspectMode::Distort => ([hx, hy], [1.0, 1.0], [1.0, 1.0]),
            AspectMode::Preserve => {
                let extent = letterbox_extent(canvas_size);
                let limit = [
                    content_limit(extent[0], canvas_size.width),
                    content_limit(extent[1], canvas_size.height),
                ];
                ([hx.max(hy); 2], extent, limit)
            }
        };

        Self {
            frame,
            scale,
            extent,
            limit,
        }
    }

    /// The rotated reference frame of the box.
    pub fn frame(&self) -> &RoiFrame {
        &self.frame
    }

    /// The half extent `(ex, ey)` of the content region in normalized units.
    pub fn content_extent(&self) -> [f32; 2] {
        self.extent
    }

    /// ROI-local coordinates to tanh canvas coordinates.
    #[inline]
    pub fn local_to_canvas(&self, s: [f32; 2]) -> [f32; 2] {
        [
            self.extent[0] * (s[0] / self.scale[0]).tanh(),
            self.extent[1] * (s[1] / self.scale[1]).tanh(),
        ]
    }

    /// Tanh canvas coordinates to ROI-local coordinates.
    ///
    /// Returns `None` for coordinates in the letterbox band.
    #[inline]
    pub fn canvas_to_local(&self, c: [f32; 2]) -> Option<[f32; 2]> {
        if c[0].abs() > self.extent[0] || c[1].abs() > self.extent[1] {
            return None;
        }
        Some([
            self.scale[0] * safe_atanh(c[0] / self.extent[0]),
            self.scale[1] * safe_atanh(c[1] / self.extent[1]),
        ])
    }

    /// Source pixel coordinates to tanh canvas coordinates.
    #[inline]
    pub fn to_canvas(&self, x: f32, y: f32) -> [f32; 2] {
        self.local_to_canvas(self.frame.to_local(x, y))
    }

    /// Tanh canvas coordinates to source pixel coordinates.
    ///
    /// Returns `None` for coordinates in the letterbox band.
    #[inline]
    pub fn to_source(&self, u: f32, v: f32) -> Option<[f32; 2]> {
        let [sx, sy] = self.canvas_to_local([u, v])?;
        Some(self.frame.from_local(sx, sy))
    }

    /// Clamp canvas coordinates to the outermost content pixel centers.
    ///
    /// Grids that read from a letterboxed canvas use this so that bilinear
    /// taps never reach into the band.
    #[inline]
    pub fn clamp_to_content(&self, c: [f32; 2]) -> [f32; 2] {
        [
            c[0].clamp(-self.limit[0], self.limit[0]),
            c[1].clamp(-self.limit[1], self.limit[1]),
        ]
    }
}

/// The content extent of an aspect preserving canvas.
///
/// The content spans as many canvas pixels across as it does down,
/// `ex · width == ey · height`.
fn letterbox_extent(canvas_size: ImageSize) -> [f32; 2] {
    let (width, height) = (canvas_size.width as f32, canvas_size.height as f32);
    if width >= height {
        [height / width, 1.0]
    } else {
        [1.0, width / height]
    }
}

/// The normalized coordinate of the outermost pixel center inside `extent`.
fn content_limit(extent: f32, len: usize) -> f32 {
    if extent >= 1.0 {
        return 1.0;
    }
    let last = (((extent + 1.0) * len as f32 - 1.0) * 0.5).floor();
    normalize_coord(last, len).max(0.0)
}

/// Sampling grid that warps source images into ROI tanh canvases.
///
/// The grid covers the canvas and holds normalized source image
/// coordinates, one grid per roi box. Each canvas pixel is mapped back to
/// the source with the inverse point map of [`TanhMapper`]. Letterbox pixels
/// of [`AspectMode::Preserve`] canvases are masked and sample to zero.
///
/// # Arguments
///
/// * `rois` - The roi boxes, one per image.
/// * `canvas_size` - The size of the tanh canvas.
/// * `src_size` - The size of the source images.
/// * `params` - The warp parameters.
///
/// # Errors
///
/// * Any roi box is degenerate, a size is zero or the angular offset is not finite.
pub fn forward_tanh(
    rois: &[RoiBox],
    canvas_size: ImageSize,
    src_size: ImageSize,
    params: WarpParams,
) -> Result<SamplingGrid, WarpError> {
    check_inputs(rois, &[canvas_size, src_size], &params)?;

    let mappers = rois
        .iter()
        .map(|roi| TanhMapper::new(roi, canvas_size, &params))
        .collect::<Vec<_>>();

    log::trace!(
        "forward_tanh: {} rois, canvas {}, source {}",
        rois.len(),
        canvas_size,
        src_size
    );

    SamplingGrid::from_fn(rois.len(), canvas_size, params.strategy, |b, y, x| {
        let u = normalize_coord(x as f32, canvas_size.width);
        let v = normalize_coord(y as f32, canvas_size.height);
        let [px, py] = mappers[b].to_source(u, v)?;
        Some([
            normalize_coord(px, src_size.width),
            normalize_coord(py, src_size.height),
        ])
    })
}

/// Sampling grid that restores ROI tanh canvases into destination images.
///
/// The grid covers the destination image and holds normalized tanh canvas
/// coordinates. Every destination pixel maps inside the canvas since `tanh`
/// never reaches `±1`. For [`AspectMode::Preserve`] canvases the coordinates
/// are clamped to the content region, so the letterbox band never reaches
/// the result.
///
/// # Arguments
///
/// * `rois` - The roi boxes, one per image.
/// * `dst_size` - The size of the restored images.
/// * `canvas_size` - The size of the tanh canvas.
/// * `params` - The warp parameters used to produce the canvas.
pub fn inverse_tanh(
    rois: &[RoiBox],
    dst_size: ImageSize,
    canvas_size: ImageSize,
    params: WarpParams,
) -> Result<SamplingGrid, WarpError> {
    check_inputs(rois, &[dst_size, canvas_size], &params)?;

    let mappers = rois
        .iter()
        .map(|roi| TanhMapper::new(roi, canvas_size, &params))
        .collect::<Vec<_>>();

    log::trace!(
        "inverse_tanh: {} rois, destination {}, canvas {}",
        rois.len(),
        dst_size,
        canvas_size
    );

    SamplingGrid::from_fn(rois.len(), dst_size, params.strategy, |b, y, x| {
        let mapper = &mappers[b];
        Some(mapper.clamp_to_content(mapper.to_canvas(x as f32, y as f32)))
    })
}
