use burn::data::dataset::Dataset;
use ndarray::{Array2, Array4, Axis};
use std::sync::Arc;

use crate::data::error::DataError;
use crate::data::labels::class_of;

/// One window in block layout with its one-hot target.
#[derive(Debug, Clone, PartialEq)]
pub struct HarSample {
    /// Row-major (steps, length, channels) values
    pub blocks: Vec<f32>,
    pub shape:  [usize; 3],
    pub target: Vec<f32>,
}

impl HarSample {
    pub fn class(&self) -> usize {
        class_of(ndarray::ArrayView1::from(&self.target[..]))
    }
}

/// Block tensor and one-hot labels of a split behind `Arc`, so
/// repeated experiments can hand a fresh copy to every DataLoader.
#[derive(Debug, Clone)]
pub struct HarDataset {
    x: Arc<Array4<f32>>,
    y: Arc<Array2<f32>>,
}

impl HarDataset {
    pub fn new(x: Array4<f32>, y: Array2<f32>) -> Result<Self, DataError> {
        if x.dim().0 != y.dim().0 {
            return Err(DataError::Shape {
                reason: format!("{} windows but {} label rows", x.dim().0, y.dim().0),
            });
        }
        Ok(Self { x: Arc::new(x), y: Arc::new(y) })
    }

    /// (steps, length, channels) of every sample
    pub fn block_shape(&self) -> [usize; 3] {
        let (_, s, l, c) = self.x.dim();
        [s, l, c]
    }

    pub fn num_classes(&self) -> usize {
        self.y.dim().1
    }
}

impl Dataset<HarSample> for HarDataset {
    fn get(&self, index: usize) -> Option<HarSample> {
        if index >= self.len() {
            return None;
        }
        Some(HarSample {
            blocks: self.x.index_axis(Axis(0), index).iter().copied().collect(),
            shape:  self.block_shape(),
            target: self.y.row(index).to_vec(),
        })
    }

    fn len(&self) -> usize {
        self.x.dim().0
    }
}
