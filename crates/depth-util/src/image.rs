//! PNG encoding of depth and edge grids.
//!
//! Depth maps are stored as single-channel 8-bit or 16-bit images whose raw
//! value times a `depth_scale` gives metres (a value of 0 keeps meaning "no
//! measurement"). Edge maps are single-channel images where any non-zero
//! value marks an edge.

use std::path::Path;

use image::{DynamicImage, ImageBuffer, Luma};

use crate::{
    error::{GridError, GridResult},
    grid::{DepthMap, EdgeMap, Grid},
};

/// Image loading and saving for evaluation grids.
pub struct GridImage;

impl GridImage {
    /// Loads a depth map, scaling raw pixel values by `depth_scale`.
    pub fn load_depth<P: AsRef<Path>>(path: P, depth_scale: f32) -> GridResult<DepthMap> {
        let img = Self::open(path.as_ref())?;
        let (width, height, raw) = Self::luma_values(img, path.as_ref())?;
        Grid::new(
            width,
            height,
            raw.into_iter().map(|v| v * depth_scale).collect(),
        )
    }

    /// Loads an edge map; any non-zero pixel is an edge.
    pub fn load_edges<P: AsRef<Path>>(path: P) -> GridResult<EdgeMap> {
        let img = Self::open(path.as_ref())?;
        let (width, height, raw) = Self::luma_values(img, path.as_ref())?;
        Grid::new(width, height, raw.into_iter().map(|v| v != 0.0).collect())
    }

    /// Saves an edge map as an 8-bit mask (255 = edge).
    pub fn save_edges<P: AsRef<Path>>(edges: &EdgeMap, path: P) -> GridResult<()> {
        let (width, height) = Self::image_dims(edges.width(), edges.height())?;
        let buf: Vec<u8> = edges
            .as_slice()
            .iter()
            .map(|&edge| if edge { u8::MAX } else { 0 })
            .collect();
        let img = ImageBuffer::<Luma<u8>, _>::from_raw(width, height, buf).ok_or(
            GridError::DimensionOverflow {
                width: edges.width(),
                height: edges.height(),
            },
        )?;
        Self::save(DynamicImage::ImageLuma8(img), path.as_ref())
    }

    /// Saves a depth map as a 16-bit image, dividing by `depth_scale` and
    /// saturating to the `u16` range.
    pub fn save_depth<P: AsRef<Path>>(
        depth: &DepthMap,
        path: P,
        depth_scale: f32,
    ) -> GridResult<()> {
        let (width, height) = Self::image_dims(depth.width(), depth.height())?;
        let buf: Vec<u16> = depth
            .as_slice()
            .iter()
            .map(|&d| (d / depth_scale).round().clamp(0.0, f32::from(u16::MAX)) as u16)
            .collect();
        let img = ImageBuffer::<Luma<u16>, _>::from_raw(width, height, buf).ok_or(
            GridError::DimensionOverflow {
                width: depth.width(),
                height: depth.height(),
            },
        )?;
        Self::save(DynamicImage::ImageLuma16(img), path.as_ref())
    }

    fn open(path: &Path) -> GridResult<DynamicImage> {
        image::open(path).map_err(|source| GridError::ImageLoadError {
            path: path.display().to_string(),
            source,
        })
    }

    fn save(img: DynamicImage, path: &Path) -> GridResult<()> {
        img.save(path).map_err(|source| GridError::ImageSaveError {
            path: path.display().to_string(),
            source,
        })
    }

    /// Raw single-channel values without any range rescaling.
    fn luma_values(img: DynamicImage, path: &Path) -> GridResult<(usize, usize, Vec<f32>)> {
        let width = img.width() as usize;
        let height = img.height() as usize;
        let values = match img {
            DynamicImage::ImageLuma8(buf) => buf.into_raw().into_iter().map(f32::from).collect(),
            DynamicImage::ImageLuma16(buf) => buf.into_raw().into_iter().map(f32::from).collect(),
            other => {
                return Err(GridError::UnsupportedPixelFormat {
                    path: path.display().to_string(),
                    format: format!("{:?}", other.color()),
                })
            }
        };
        Ok((width, height, values))
    }

    fn image_dims(width: usize, height: usize) -> GridResult<(u32, u32)> {
        match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) => Ok((w, h)),
            _ => Err(GridError::DimensionOverflow { width, height }),
        }
    }
}
