use rand::{rngs::StdRng, Rng, SeedableRng};

use roiwarp::grid::denormalize_coord;
use roiwarp::params::{AspectMode, WarpParams};
use roiwarp::points::{
    points_to_roi_tanh, points_to_roi_tanh_polar, roi_tanh_polar_to_points, roi_tanh_to_points,
};
use roiwarp::roi::RoiBox;
use roiwarp::warp::{forward_tanh, roi_tanh_polar_grid};
use roiwarp::WarpError;
use roiwarp_image::ImageSize;

fn random_points(rng: &mut StdRng, n: usize, size: ImageSize) -> Vec<[f32; 2]> {
    (0..n)
        .map(|_| {
            [
                rng.random_range(0.0..size.width as f32),
                rng.random_range(0.0..size.height as f32),
            ]
        })
        .collect()
}

#[test]
fn point_maps_are_mutual_inverses() -> Result<(), WarpError> {
    let mut rng = StdRng::seed_from_u64(7);
    let src_size = ImageSize {
        width: 200,
        height: 160,
    };
    let canvas = ImageSize {
        width: 128,
        height: 96,
    };
    let roi = RoiBox::new(60.0, 40.0, 140.0, 130.0);
    let points = random_points(&mut rng, 256, src_size);

    for aspect in [AspectMode::Distort, AspectMode::Preserve] {
        let params = WarpParams::default()
            .with_angular_offset(rng.random_range(-3.0..3.0))
            .with_aspect(aspect);

        let on_canvas = points_to_roi_tanh(&points, &roi, canvas, params)?;
        let back = roi_tanh_to_points(&on_canvas, &roi, canvas, params)?;
        for (p, q) in points.iter().zip(back) {
            let Some(q) = q else {
                panic!("{aspect:?}: point {p:?} lost in the letterbox band");
            };
            // far points are squeezed into the canvas border
            let dist = (p[0] - 100.0).hypot(p[1] - 85.0);
            if dist < 100.0 {
                assert!((p[0] - q[0]).abs() < 0.05, "{aspect:?}: {p:?} vs {q:?}");
                assert!((p[1] - q[1]).abs() < 0.05, "{aspect:?}: {p:?} vs {q:?}");
            }
        }

        let on_polar = points_to_roi_tanh_polar(&points, &roi, canvas, params)?;
        let back = roi_tanh_polar_to_points(&on_polar, &roi, canvas, params)?;
        for (p, q) in points.iter().zip(back) {
            let dist = (p[0] - 100.0).hypot(p[1] - 85.0);
            if dist < 100.0 {
                assert!((p[0] - q[0]).abs() < 0.05, "{aspect:?}: {p:?} vs {q:?}");
                assert!((p[1] - q[1]).abs() < 0.05, "{aspect:?}: {p:?} vs {q:?}");
            }
        }
    }
    Ok(())
}

#[test]
fn points_agree_with_warp_grids() -> Result<(), WarpError> {
    let src_size = ImageSize {
        width: 120,
        height: 90,
    };
    let canvas = ImageSize {
        width: 40,
        height: 30,
    };
    let rois = [RoiBox::new(30.0, 20.0, 80.0, 75.0)];
    let params = WarpParams::default().with_angular_offset(0.45);

    // the canvas pixel a warp grid reads a source point for is where that point lands
    let grid = forward_tanh(&rois, canvas, src_size, params)?;
    for (y, x) in [(0, 0), (4, 17), (15, 20), (29, 39)] {
        let [gx, gy] = grid.get(0, y, x).unwrap_or([f32::NAN; 2]);
        let p = [
            denormalize_coord(gx, src_size.width),
            denormalize_coord(gy, src_size.height),
        ];
        let q = points_to_roi_tanh(&[p], &rois[0], canvas, params)?;
        assert!((q[0][0] - x as f32).abs() < 1e-2, "{q:?} vs ({x}, {y})");
        assert!((q[0][1] - y as f32).abs() < 1e-2, "{q:?} vs ({x}, {y})");
    }

    let grid = roi_tanh_polar_grid(&rois, canvas, src_size, params)?;
    for (y, x) in [(1, 1), (7, 12), (22, 30), (29, 39)] {
        let [gx, gy] = grid.get(0, y, x).unwrap_or([f32::NAN; 2]);
        let p = [
            denormalize_coord(gx, src_size.width),
            denormalize_coord(gy, src_size.height),
        ];
        let q = points_to_roi_tanh_polar(&[p], &rois[0], canvas, params)?;
        assert!((q[0][0] - x as f32).abs() < 1e-2, "{q:?} vs ({x}, {y})");
        assert!((q[0][1] - y as f32).abs() < 1e-2, "{q:?} vs ({x}, {y})");
    }
    Ok(())
}
