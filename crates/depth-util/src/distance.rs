//! Exact Euclidean distance transform.
//!
//! Implements the separable lower-envelope algorithm of Felzenszwalb and
//! Huttenlocher: a 1D squared-distance transform along every column followed
//! by one along every row. The result equals
//! `scipy.ndimage.distance_transform_edt(~edges)`, i.e. for every pixel the
//! Euclidean distance to the nearest `true` pixel of the input.

use crate::grid::{DistanceMap, EdgeMap, Grid};

/// Stand-in for "no feature in this line"; large enough that any real
/// squared distance wins, small enough that differences stay finite.
const UNREACHABLE: f64 = 1e30;

/// Scratch buffers for the 1D transform, sized for the longest line.
struct Envelope {
    vertices: Vec<usize>,
    boundaries: Vec<f64>,
    input: Vec<f64>,
    output: Vec<f64>,
}

impl Envelope {
    fn with_capacity(len: usize) -> Self {
        Self {
            vertices: vec![0; len],
            boundaries: vec![0.0; len + 1],
            input: vec![0.0; len],
            output: vec![0.0; len],
        }
    }

    /// Squared-distance transform of `self.input[..n]` into `self.output[..n]`.
    fn transform(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let f = &self.input[..n];
        let v = &mut self.vertices;
        let z = &mut self.boundaries;

        let mut k = 0;
        v[0] = 0;
        z[0] = f64::NEG_INFINITY;
        z[1] = f64::INFINITY;

        for q in 1..n {
            let qf = q as f64;
            let mut s;
            loop {
                let p = v[k];
                let pf = p as f64;
                s = ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * (qf - pf));
                if s <= z[k] {
                    // z[0] is -inf, so this never underflows.
                    k -= 1;
                } else {
                    break;
                }
            }
            k += 1;
            v[k] = q;
            z[k] = s;
            z[k + 1] = f64::INFINITY;
        }

        k = 0;
        for q in 0..n {
            let qf = q as f64;
            while z[k + 1] < qf {
                k += 1;
            }
            let d = qf - v[k] as f64;
            self.output[q] = d.mul_add(d, f[v[k]]);
        }
    }
}

/// Euclidean distance from every pixel to the nearest `true` pixel of `features`.
///
/// Feature pixels get `0.0`. If `features` contains no `true` pixel at all,
/// every distance is `f32::INFINITY`.
pub fn euclidean_distance_transform(features: &EdgeMap) -> DistanceMap {
    let (w, h) = features.shape();
    if features.count() == 0 {
        return Grid::filled(w, h, f32::INFINITY);
    }

    let mut squared = vec![0.0f64; w * h];
    let mut envelope = Envelope::with_capacity(w.max(h));

    for x in 0..w {
        for y in 0..h {
            envelope.input[y] = if features.get(x, y) { 0.0 } else { UNREACHABLE };
        }
        envelope.transform(h);
        for y in 0..h {
            squared[y * w + x] = envelope.output[y];
        }
    }

    for y in 0..h {
        let row = &mut squared[y * w..(y + 1) * w];
        envelope.input[..w].copy_from_slice(row);
        envelope.transform(w);
        row.copy_from_slice(&envelope.output[..w]);
    }

    Grid::from_fn(w, h, |x, y| squared[y * w + x].sqrt() as f32)
}

/// Distance transform with every value clamped to `max_distance`.
pub fn truncated_distance_transform(features: &EdgeMap, max_distance: f32) -> DistanceMap {
    euclidean_distance_transform(features).map(|&d| d.min(max_distance))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::*;

    use super::*;

    fn brute_force(features: &EdgeMap) -> DistanceMap {
        let points: Vec<_> = features.edge_pixels().collect();
        Grid::from_fn(features.width(), features.height(), |x, y| {
            points
                .iter()
                .map(|&(px, py)| {
                    let dx = x as f32 - px as f32;
                    let dy = y as f32 - py as f32;
                    dx.hypot(dy)
                })
                .fold(f32::INFINITY, f32::min)
        })
    }

    /// Deterministic scatter of feature pixels.
    fn scattered(width: usize, height: usize, stride: usize) -> EdgeMap {
        Grid::from_fn(width, height, |x, y| (x * 7 + y * 13) % stride == 0)
    }

    #[test]
    fn single_point_distances() {
        let mut features = EdgeMap::empty(5, 5);
        features.set(2, 2, true);
        let distances = euclidean_distance_transform(&features);

        assert_relative_eq!(distances.get(2, 2), 0.0);
        assert_relative_eq!(distances.get(2, 1), 1.0);
        assert_relative_eq!(distances.get(1, 1), 2.0f32.sqrt());
        assert_relative_eq!(distances.get(0, 0), 8.0f32.sqrt());
        assert_relative_eq!(distances.get(4, 2), 2.0);
    }

    #[rstest]
    #[case(1, 1, 1)]
    #[case(9, 4, 5)]
    #[case(4, 11, 7)]
    #[case(16, 16, 23)]
    #[case(13, 8, 41)]
    fn matches_brute_force(#[case] width: usize, #[case] height: usize, #[case] stride: usize) {
        let features = scattered(width, height, stride);
        if features.count() == 0 {
            return;
        }
        let fast = euclidean_distance_transform(&features);
        let slow = brute_force(&features);
        for (a, b) in fast.as_slice().iter().zip(slow.as_slice()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-4);
        }
    }

    #[test]
    fn empty_features_are_infinitely_far() {
        let distances = euclidean_distance_transform(&EdgeMap::empty(4, 3));
        assert!(distances.as_slice().iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn all_features_are_at_zero_distance() {
        let distances = euclidean_distance_transform(&EdgeMap::filled(3, 3, true));
        assert!(distances.as_slice().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn truncation_caps_distances() {
        let mut features = EdgeMap::empty(30, 1);
        features.set(0, 0, true);
        let distances = truncated_distance_transform(&features, 10.0);
        assert_relative_eq!(distances.get(5, 0), 5.0);
        assert_relative_eq!(distances.get(29, 0), 10.0);

        let empty = truncated_distance_transform(&EdgeMap::empty(3, 3), 10.0);
        assert!(empty.as_slice().iter().all(|&d| d == 10.0));
    }
}
