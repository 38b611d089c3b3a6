//! Gradient filters and edge extraction on depth grids.
//!
//! Depth discontinuities are located with a 3×3 Sobel operator on a depth
//! map that has been normalised to `[0, 1]` over its valid pixels. Border
//! pixels are handled by clamping coordinates into the grid. Pixels whose
//! 3×3 neighbourhood touches a pixel without measurement never produce an
//! edge, so the outline of the validity mask is not mistaken for a depth
//! boundary.

use crate::grid::{DepthMap, EdgeMap, Grid};

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Sum of the positive Sobel weights; dividing by it maps a unit step to 0.5.
pub const SOBEL_NORMALIZATION: f32 = 8.0;

const TAN_22_5_DEG: f32 = 0.414_213_56;

/// Per-pixel gradient buffers.
#[derive(Debug, Clone)]
pub struct Gradients {
    /// Horizontal derivative.
    pub gx: Grid<f32>,
    /// Vertical derivative.
    pub gy: Grid<f32>,
    /// `sqrt(gx^2 + gy^2)`.
    pub magnitude: Grid<f32>,
}

/// Rescales the valid pixels of `depth` to `[0, 1]`.
///
/// Pixels without measurement stay at `0.0`. A map whose valid pixels all
/// share one value (or that has no valid pixel) becomes all zeros.
pub fn normalize_depth(depth: &DepthMap) -> Grid<f32> {
    let Some((lo, hi)) = depth.valid_range() else {
        return Grid::zeros(depth.width(), depth.height());
    };
    let range = hi - lo;
    if range <= f32::EPSILON {
        return Grid::zeros(depth.width(), depth.height());
    }
    depth.map(|&value| {
        if value != 0.0 {
            (value - lo) / range
        } else {
            0.0
        }
    })
}

/// Sobel gradients with border clamping.
///
/// The magnitude is divided by [`SOBEL_NORMALIZATION`]; the raw derivatives
/// are left unscaled.
pub fn sobel_gradients(image: &Grid<f32>) -> Gradients {
    let (w, h) = image.shape();
    let mut gx = Grid::zeros(w, h);
    let mut gy = Grid::zeros(w, h);
    let mut magnitude = Grid::zeros(w, h);

    if w == 0 || h == 0 {
        return Gradients { gx, gy, magnitude };
    }

    for y in 0..h {
        let y_idx = [y.saturating_sub(1), y, (y + 1).min(h - 1)];
        let rows = [image.row(y_idx[0]), image.row(y_idx[1]), image.row(y_idx[2])];
        for x in 0..w {
            let x_idx = [x.saturating_sub(1), x, (x + 1).min(w - 1)];

            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            for (ky, row) in rows.iter().enumerate() {
                for (kx, &xx) in x_idx.iter().enumerate() {
                    sum_x += row[xx] * SOBEL_KERNEL_X[ky][kx];
                    sum_y += row[xx] * SOBEL_KERNEL_Y[ky][kx];
                }
            }

            gx.set(x, y, sum_x);
            gy.set(x, y, sum_y);
            magnitude.set(x, y, sum_x.hypot(sum_y) / SOBEL_NORMALIZATION);
        }
    }

    Gradients { gx, gy, magnitude }
}

/// Marks pixels whose clamped 3×3 neighbourhood lies entirely on valid depth.
pub fn interior_valid_mask(depth: &DepthMap) -> EdgeMap {
    let (w, h) = depth.shape();
    Grid::from_fn(w, h, |x, y| {
        let ys = [y.saturating_sub(1), y, (y + 1).min(h - 1)];
        let xs = [x.saturating_sub(1), x, (x + 1).min(w - 1)];
        ys.iter()
            .all(|&yy| xs.iter().all(|&xx| depth.get(xx, yy) != 0.0))
    })
}

/// Keeps only pixels that are strict maxima along the quantised gradient
/// direction (0°, 45°, 90°, 135°).
///
/// The outermost one-pixel frame is never kept.
pub fn non_maximum_suppression(gradients: &Gradients, candidates: &EdgeMap) -> EdgeMap {
    let (w, h) = gradients.magnitude.shape();
    let mut thinned = EdgeMap::empty(w, h);
    if w < 3 || h < 3 {
        return thinned;
    }

    let mag = &gradients.magnitude;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            if !candidates.get(x, y) {
                continue;
            }
            let gx = gradients.gx.get(x, y);
            let gy = gradients.gy.get(x, y);
            let abs_gx = gx.abs();
            let abs_gy = gy.abs();
            let same_sign = (gx >= 0.0 && gy >= 0.0) || (gx <= 0.0 && gy <= 0.0);

            let (n1, n2) = if abs_gx >= abs_gy {
                if abs_gy <= abs_gx * TAN_22_5_DEG {
                    (mag.get(x - 1, y), mag.get(x + 1, y))
                } else if same_sign {
                    (mag.get(x - 1, y - 1), mag.get(x + 1, y + 1))
                } else {
                    (mag.get(x + 1, y - 1), mag.get(x - 1, y + 1))
                }
            } else if abs_gx <= abs_gy * TAN_22_5_DEG {
                (mag.get(x, y - 1), mag.get(x, y + 1))
            } else if same_sign {
                (mag.get(x - 1, y - 1), mag.get(x + 1, y + 1))
            } else {
                (mag.get(x + 1, y - 1), mag.get(x - 1, y + 1))
            };

            let m = mag.get(x, y);
            // Ties along a plateau keep the first pixel only.
            if m > n1 && m >= n2 {
                thinned.set(x, y, true);
            }
        }
    }

    thinned
}

/// Extracts depth-discontinuity edges from a (masked) depth map.
///
/// A pixel is an edge iff its normalised Sobel magnitude exceeds
/// `threshold` and its neighbourhood is fully valid. With `thin` set, the
/// result is additionally thinned by [`non_maximum_suppression`].
pub fn extract_depth_edges(depth: &DepthMap, threshold: f32, thin: bool) -> EdgeMap {
    let normalized = normalize_depth(depth);
    let gradients = sobel_gradients(&normalized);
    let interior = interior_valid_mask(depth);

    let candidates = Grid::from_fn(depth.width(), depth.height(), |x, y| {
        interior.get(x, y) && gradients.magnitude.get(x, y) > threshold
    });

    let edges = if thin {
        non_maximum_suppression(&gradients, &candidates)
    } else {
        candidates
    };

    log::debug!(
        "extracted {} edge pixels from {}x{} depth map (threshold {threshold}, thin {thin})",
        edges.count(),
        depth.width(),
        depth.height()
    );
    edges
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::*;

    use super::*;

    /// Vertical step: columns `< split` at `near`, the rest at `far`.
    fn step_depth(width: usize, height: usize, split: usize, near: f32, far: f32) -> DepthMap {
        Grid::from_fn(width, height, |x, _| if x < split { near } else { far })
    }

    #[test]
    fn normalize_depth_maps_valid_range_to_unit_interval() {
        let depth = DepthMap::new(4, 1, vec![2.0, 0.0, 4.0, 3.0]).unwrap();
        let normalized = normalize_depth(&depth);
        assert_eq!(normalized.as_slice(), &[0.0, 0.0, 1.0, 0.5]);
    }

    #[test]
    fn normalize_depth_of_flat_map_is_zero() {
        let depth = DepthMap::filled(3, 3, 5.0);
        let normalized = normalize_depth(&depth);
        assert!(normalized.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn sobel_unit_step_has_half_magnitude() {
        let image = step_depth(6, 5, 3, 0.0, 1.0);
        let gradients = sobel_gradients(&image);

        assert_relative_eq!(gradients.magnitude.get(2, 2), 0.5);
        assert_relative_eq!(gradients.magnitude.get(3, 2), 0.5);
        assert_relative_eq!(gradients.magnitude.get(0, 2), 0.0);
        assert_relative_eq!(gradients.magnitude.get(5, 2), 0.0);
        assert!(gradients.gx.get(2, 2) > 0.0);
        assert_relative_eq!(gradients.gy.get(2, 2), 0.0);
    }

    #[test]
    fn sobel_handles_empty_grid() {
        let gradients = sobel_gradients(&Grid::zeros(0, 0));
        assert!(gradients.magnitude.is_empty());
    }

    #[rstest]
    #[case(false, 2)]
    #[case(true, 1)]
    fn step_produces_edge_columns(#[case] thin: bool, #[case] expected_columns: usize) {
        let depth = step_depth(8, 6, 4, 1.0, 3.0);
        let edges = extract_depth_edges(&depth, 0.1, thin);

        let columns: Vec<usize> = (0..8).filter(|&x| edges.get(x, 3)).collect();
        assert_eq!(columns.len(), expected_columns);
        assert!(columns.iter().all(|&x| x == 3 || x == 4));
    }

    #[test]
    fn flat_depth_has_no_edges() {
        let depth = DepthMap::filled(5, 5, 2.0);
        assert_eq!(extract_depth_edges(&depth, 0.1, false).count(), 0);
    }

    #[test]
    fn mask_outline_is_not_an_edge() {
        // Valid square in the middle of an invalid frame, constant depth.
        let depth = Grid::from_fn(7, 7, |x, y| {
            if (2..5).contains(&x) && (2..5).contains(&y) {
                4.0
            } else {
                0.0
            }
        });
        assert_eq!(extract_depth_edges(&depth, 0.1, false).count(), 0);
    }

    #[test]
    fn small_step_stays_below_threshold() {
        // Normalised step of 1.0 gives 0.5; a threshold above that rejects it.
        let depth = step_depth(6, 4, 3, 1.0, 2.0);
        assert_eq!(extract_depth_edges(&depth, 0.6, false).count(), 0);
    }
}
