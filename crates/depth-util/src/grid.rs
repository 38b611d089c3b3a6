//! Row-major 2D grids used for depth maps, edge maps and distance fields.
//!
//! A [`Grid`] owns a flat buffer of `width * height` cells laid out row by
//! row. [`DepthMap`] stores metric depth where `0.0` marks a pixel without
//! ground truth, [`EdgeMap`] stores boolean edge membership and
//! [`DistanceMap`] stores per-pixel distances in pixel units.

use crate::error::{GridError, GridResult};

/// Row-major 2D grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

/// Dense depth in metres, `0.0` = no measurement.
pub type DepthMap = Grid<f32>;

/// Binary edge membership.
pub type EdgeMap = Grid<bool>;

/// Distance in pixels to the nearest feature pixel.
pub type DistanceMap = Grid<f32>;

impl<T> Grid<T> {
    /// Wraps a row-major buffer, checking that it holds `width * height` cells.
    pub fn new(width: usize, height: usize, data: Vec<T>) -> GridResult<Self> {
        let expected = width * height;
        if data.len() != expected {
            return Err(GridError::DataLengthMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    pub const fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether `other` has the same width and height.
    pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.shape() == other.shape()
    }

    /// Flat row-major view.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    #[inline]
    pub const fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Row `y` as a slice.
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.width;
        &mut self.data[start..start + self.width]
    }

    /// Cell-wise conversion into a grid of the same shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T: Copy> Grid<T> {
    /// Grid of the given shape with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }
}

impl Grid<f32> {
    pub fn zeros(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0.0)
    }

    /// Zeroes every cell where `reference` holds no measurement.
    ///
    /// This is the validity mask `reference != 0` applied to a prediction.
    ///
    /// # Panics
    ///
    /// Panics if the shapes differ.
    pub fn masked_by(&self, reference: &DepthMap) -> DepthMap {
        assert!(
            self.same_shape(reference),
            "mask shape {:?} does not match grid shape {:?}",
            reference.shape(),
            self.shape()
        );
        let data = self
            .data
            .iter()
            .zip(&reference.data)
            .map(|(&value, &r)| if r != 0.0 { value } else { 0.0 })
            .collect();
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Raises every cell to at least `floor`.
    pub fn clamped_min(&self, floor: f32) -> DepthMap {
        self.map(|&value| value.max(floor))
    }

    /// Number of cells holding a measurement.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|&&value| value != 0.0).count()
    }

    /// Minimum and maximum over cells holding a measurement.
    pub fn valid_range(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .copied()
            .filter(|&value| value != 0.0 && value.is_finite())
            .fold(None, |acc, value| match acc {
                None => Some((value, value)),
                Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
            })
    }
}

impl Grid<bool> {
    pub fn empty(width: usize, height: usize) -> Self {
        Self::filled(width, height, false)
    }

    /// Number of edge pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&edge| edge).count()
    }

    /// Iterates `(x, y)` of every edge pixel in row-major order.
    pub fn edge_pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &edge)| edge)
            .map(move |(idx, _)| (idx % width, idx / width))
    }
}
