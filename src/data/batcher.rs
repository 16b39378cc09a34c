// ============================================================
// Layer 4 - HAR Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<HarSample>
// into device tensors.
//
// How batching works here:
//   Input:  N samples, each a flat (steps * length * channels) Vec
//   Output: HarBatch with
//             inputs  [N, steps, length, channels]
//             targets [N, num_classes]   one-hot
//             classes [N]                class index per sample
//
//   All samples of a split share one block shape, so the flat
//   values of every sample are concatenated and reshaped once.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::HarSample;

#[derive(Debug, Clone)]
pub struct HarBatch<B: Backend> {
    /// [batch, steps, length, channels]
    pub inputs: Tensor<B, 4>,

    /// One-hot targets [batch, num_classes]
    pub targets: Tensor<B, 2>,

    /// Target class indices [batch], used for accuracy
    pub classes: Tensor<B, 1, Int>,
}

/// Holds the target device so tensors are created on the
/// correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct HarBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> HarBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<HarSample, HarBatch<B>> for HarBatcher<B> {
    fn batch(&self, items: Vec<HarSample>) -> HarBatch<B> {
        let batch_size                 = items.len();
        let [steps, length, channels]  = items[0].shape;
        let num_classes                = items[0].target.len();

        let inputs_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.blocks.iter().copied())
            .collect();

        let targets_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.target.iter().copied())
            .collect();

        let classes: Vec<i32> = items
            .iter()
            .map(|s| s.class() as i32)
            .collect();

        let inputs = Tensor::<B, 1>::from_floats(inputs_flat.as_slice(), &self.device)
            .reshape([batch_size, steps, length, channels]);

        let targets = Tensor::<B, 1>::from_floats(targets_flat.as_slice(), &self.device)
            .reshape([batch_size, num_classes]);

        let classes = Tensor::<B, 1, Int>::from_ints(classes.as_slice(), &self.device);

        HarBatch { inputs, targets, classes }
    }
}
