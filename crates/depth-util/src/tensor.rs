//! Conversions between Burn tensors and evaluation grids.
//!
//! Model outputs arrive as `[height, width]` or `[batch, 1, height, width]`
//! tensors on whatever backend ran inference. Grids are always materialised
//! on the host as `f32`.

use burn::tensor::{backend::Backend, Tensor, TensorData};

use crate::{
    error::{GridError, GridResult},
    grid::{DepthMap, Grid},
};

fn tensor_values<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> GridResult<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|err| GridError::TensorConversionError {
            reason: format!("{err:?}"),
        })
}

impl Grid<f32> {
    /// Reads a `[height, width]` tensor into a depth map.
    pub fn from_tensor<B: Backend>(tensor: Tensor<B, 2>) -> GridResult<Self> {
        let [height, width] = tensor.dims();
        Self::new(width, height, tensor_values(tensor)?)
    }

    /// Splits a `[batch, 1, height, width]` tensor into one grid per item.
    pub fn batch_from_tensor<B: Backend>(tensor: Tensor<B, 4>) -> GridResult<Vec<Self>> {
        let [batch, channels, height, width] = tensor.dims();
        if channels != 1 {
            return Err(GridError::TensorConversionError {
                reason: format!("expected a single channel, got {channels}"),
            });
        }
        let values = tensor_values(tensor)?;
        let plane = height * width;
        (0..batch)
            .map(|b| Self::new(width, height, values[b * plane..(b + 1) * plane].to_vec()))
            .collect()
    }

    /// Copies the grid into a `[height, width]` tensor.
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        let data = TensorData::new(self.as_slice().to_vec(), [self.height(), self.width()]);
        Tensor::from_data(data, device)
    }
}

impl Grid<bool> {
    /// Reads a `[height, width]` mask tensor; values above 0.5 are edges.
    pub fn from_tensor<B: Backend>(tensor: Tensor<B, 2>) -> GridResult<Self> {
        let depth = DepthMap::from_tensor(tensor)?;
        Ok(depth.map(|&v| v > 0.5))
    }

    /// Splits a `[batch, 1, height, width]` mask tensor into one edge map per item.
    pub fn batch_from_tensor<B: Backend>(tensor: Tensor<B, 4>) -> GridResult<Vec<Self>> {
        Ok(DepthMap::batch_from_tensor(tensor)?
            .iter()
            .map(|depth| depth.map(|&v| v > 0.5))
            .collect())
    }

    /// `1.0` for edges, `0.0` elsewhere.
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        let values: Vec<f32> = self
            .as_slice()
            .iter()
            .map(|&edge| if edge { 1.0 } else { 0.0 })
            .collect();
        let data = TensorData::new(values, [self.height(), self.width()]);
        Tensor::from_data(data, device)
    }
}
