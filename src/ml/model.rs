use burn::{
    nn::{
        conv::{Conv1d, Conv1dConfig},
        pool::{MaxPool1d, MaxPool1dConfig},
        Dropout, DropoutConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig,
    },
    prelude::*,
    tensor::activation::{log_softmax, relu},
};

use crate::domain::topology::{Activation, LayerKind, Topology, TopologyError};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally - do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct CnnLstmConfig {
    pub n_length:      usize,
    pub n_features:    usize,
    pub conv_filters:  Vec<usize>,
    pub conv_kernels:  Vec<usize>,
    pub block_dropout: f64,
    pub pool_size:     usize,
    pub lstm_units:    usize,
    pub head_dropout:  f64,
    pub dense_units:   Vec<usize>,
    pub num_classes:   usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Convs,
    Pool,
    Flatten,
    Recurrent,
    HeadDropout,
    Dense,
}

impl CnnLstmConfig {
    /// Compile a declarative topology for blocks of `n_length` steps
    /// by `n_features` channels.
    ///
    /// Accepted shape: per-block Conv1d (relu)*, optional per-block
    /// Dropout, optional per-block MaxPool1d, per-block Flatten, Lstm,
    /// optional Dropout, Dense (relu)*, Dense (softmax).
    pub fn from_topology(
        topology:   &Topology,
        n_length:   usize,
        n_features: usize,
    ) -> Result<Self, TopologyError> {
        topology.output_shapes(n_length, n_features)?;

        let mut conv_filters  = Vec::new();
        let mut conv_kernels  = Vec::new();
        let mut block_dropout = 0.0;
        let mut pool_size     = 1;
        let mut lstm_units    = None;
        let mut head_dropout  = 0.0;
        let mut dense         = Vec::new();
        let mut stage         = Stage::Convs;

        for (index, spec) in topology.layers.iter().enumerate() {
            let unsupported = |reason: &str| TopologyError::Unsupported {
                index,
                layer:  spec.to_string(),
                reason: reason.to_string(),
            };

            stage = match (&spec.kind, stage) {
                (LayerKind::Conv1d { filters, kernel_size, activation }, Stage::Convs) => {
                    if *activation != Activation::Relu {
                        return Err(unsupported("convolutions must use relu"));
                    }
                    conv_filters.push(*filters);
                    conv_kernels.push(*kernel_size);
                    Stage::Convs
                }
                (LayerKind::Dropout { rate }, Stage::Convs) if spec.per_block => {
                    block_dropout = *rate;
                    Stage::Pool
                }
                (LayerKind::MaxPool1d { pool_size: p }, Stage::Convs | Stage::Pool) => {
                    pool_size = *p;
                    Stage::Flatten
                }
                (LayerKind::Flatten, Stage::Convs | Stage::Pool | Stage::Flatten) => Stage::Recurrent,
                (LayerKind::Lstm { units }, Stage::Recurrent) => {
                    lstm_units = Some(*units);
                    Stage::HeadDropout
                }
                (LayerKind::Dropout { rate }, Stage::HeadDropout) => {
                    head_dropout = *rate;
                    Stage::Dense
                }
                (LayerKind::Dense { units, activation }, Stage::HeadDropout | Stage::Dense) => {
                    dense.push((index, spec, *units, *activation));
                    Stage::Dense
                }
                _ => return Err(unsupported("layer order not supported by the CNN-LSTM builder")),
            };
        }

        let lstm_units = lstm_units.ok_or(TopologyError::Empty)?;
        let (out_index, out_spec, num_classes, out_activation) =
            dense.pop().ok_or(TopologyError::Empty)?;
        if out_activation != Activation::Softmax {
            return Err(TopologyError::Unsupported {
                index:  out_index,
                layer:  out_spec.to_string(),
                reason: "output layer must use softmax".to_string(),
            });
        }

        let mut dense_units = Vec::with_capacity(dense.len());
        for (index, spec, units, activation) in dense {
            if activation != Activation::Relu {
                return Err(TopologyError::Unsupported {
                    index,
                    layer:  spec.to_string(),
                    reason: "hidden dense layers must use relu".to_string(),
                });
            }
            dense_units.push(units);
        }

        Ok(Self::new(
            n_length, n_features, conv_filters, conv_kernels, block_dropout,
            pool_size, lstm_units, head_dropout, dense_units, num_classes,
        ))
    }

    /// Length of one block after the convolutions and pooling.
    pub fn pooled_length(&self) -> usize {
        let shrink: usize = self.conv_kernels.iter().map(|k| k - 1).sum();
        (self.n_length - shrink) / self.pool_size
    }

    /// Size of the flattened feature vector of one block.
    pub fn block_features(&self) -> usize {
        let channels = self.conv_filters.last().copied().unwrap_or(self.n_features);
        self.pooled_length() * channels
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> CnnLstmModel<B> {
        let mut channels = self.n_features;
        let block_convs: Vec<Conv1d<B>> = self.conv_filters
            .iter()
            .zip(&self.conv_kernels)
            .map(|(&filters, &kernel)| {
                let conv = Conv1dConfig::new(channels, filters, kernel).init(device);
                channels = filters;
                conv
            })
            .collect();

        let block_dropout = DropoutConfig::new(self.block_dropout).init();
        let block_pool    = MaxPool1dConfig::new(self.pool_size)
            .with_stride(self.pool_size)
            .init();
        let lstm          = LstmConfig::new(self.block_features(), self.lstm_units, true).init(device);
        let head_dropout  = DropoutConfig::new(self.head_dropout).init();

        let mut width = self.lstm_units;
        let hidden: Vec<Linear<B>> = self.dense_units
            .iter()
            .map(|&units| {
                let layer = LinearConfig::new(width, units).init(device);
                width = units;
                layer
            })
            .collect();
        let output = LinearConfig::new(width, self.num_classes).init(device);

        CnnLstmModel { block_convs, block_dropout, block_pool, lstm, head_dropout, hidden, output }
    }
}

#[derive(Module, Debug)]
pub struct CnnLstmModel<B: Backend> {
    pub block_convs:   Vec<Conv1d<B>>,
    pub block_dropout: Dropout,
    pub block_pool:    MaxPool1d,
    pub lstm:          Lstm<B>,
    pub head_dropout:  Dropout,
    pub hidden:        Vec<Linear<B>>,
    pub output:        Linear<B>,
}

impl<B: Backend> CnnLstmModel<B> {
    /// inputs: [batch, steps, length, channels] → logits: [batch, num_classes]
    pub fn forward(&self, inputs: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch, steps, length, channels] = inputs.dims();

        // Fold the blocks into the batch so every block goes through
        // the same convolution weights. Conv1d wants [N, channels, length].
        let mut x = inputs
            .reshape([batch * steps, length, channels])
            .swap_dims(1, 2);
        for conv in &self.block_convs {
            x = relu(conv.forward(x));
        }
        let x = self.block_dropout.forward(x);
        let x = self.block_pool.forward(x);

        // Flatten each block step-major, then unfold the blocks back
        // into a sequence for the LSTM: [batch, steps, features].
        let [_, filters, pooled] = x.dims();
        let x = x.swap_dims(1, 2).reshape([batch, steps, pooled * filters]);

        let (_, state) = self.lstm.forward(x, None);
        let mut x = self.head_dropout.forward(state.hidden);

        for layer in &self.hidden {
            x = relu(layer.forward(x));
        }
        self.output.forward(x)
    }

    pub fn forward_loss(
        &self,
        inputs:  Tensor<B, 4>,
        targets: Tensor<B, 2>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(inputs);
        let loss   = categorical_cross_entropy(logits.clone(), targets);
        (loss, logits)
    }
}

/// Mean over the batch of `-sum(target * log(softmax(logits)))`.
pub fn categorical_cross_entropy<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
    log_softmax(logits, 1)
        .mul(targets)
        .sum_dim(1)
        .mean()
        .neg()
}
