//! # Depth evaluation utilities
//!
//! Host-side building blocks shared by the depth metrics:
//!
//! - [`Grid`], [`DepthMap`], [`EdgeMap`]: row-major value grids
//! - [`filters`]: Sobel gradients and depth-edge extraction
//! - [`distance`]: exact Euclidean distance transform
//! - [`GridImage`]: PNG loading and saving of depth and edge maps
//! - Burn tensor conversions (`DepthMap::from_tensor`, `EdgeMap::to_tensor`, ...)

pub mod distance;
pub mod error;
pub mod filters;
pub mod grid;
pub mod image;
mod tensor;

pub use distance::{euclidean_distance_transform, truncated_distance_transform};
pub use error::{GridError, GridResult};
pub use filters::{extract_depth_edges, normalize_depth, sobel_gradients, Gradients};
pub use grid::{DepthMap, DistanceMap, EdgeMap, Grid};
pub use image::GridImage;
