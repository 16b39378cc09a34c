// ============================================================
// Layer 3 - Network Topology
// ============================================================
// The CNN-LSTM network written down as an ordered list of layer
// specifications. Nothing here knows about Burn: the ML layer
// compiles a Topology into a model config (see ml/model.rs).
//
// Layers flagged `per_block` are applied to every block of a
// window independently with shared weights (what Keras calls
// TimeDistributed). The default network:
//
//   per-block  Conv1d(64, k=3, relu)   (32, 9)  -> (30, 64)
//   per-block  Conv1d(64, k=3, relu)   (30, 64) -> (28, 64)
//   per-block  Dropout(0.5)
//   per-block  MaxPool1d(2)            (28, 64) -> (14, 64)
//   per-block  Flatten                 (14, 64) -> 896
//   Lstm(100)                          steps x 896 -> 100
//   Dropout(0.5)
//   Dense(100, relu)
//   Dense(6, softmax)
//
// Reference: Rust Book §6 (Enums and Pattern Matching)

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Relu,
    Softmax,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerKind {
    Conv1d    { filters: usize, kernel_size: usize, activation: Activation },
    Dropout   { rate: f64 },
    MaxPool1d { pool_size: usize },
    Flatten,
    /// Recurrent layer keeping only its final hidden state
    Lstm      { units: usize },
    Dense     { units: usize, activation: Activation },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub kind:      LayerKind,
    pub per_block: bool,
}

impl LayerSpec {
    pub fn new(kind: LayerKind) -> Self {
        Self { kind, per_block: false }
    }

    pub fn per_block(kind: LayerKind) -> Self {
        Self { kind, per_block: true }
    }
}

impl fmt::Display for LayerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = match &self.kind {
            LayerKind::Conv1d { filters, kernel_size, activation } => {
                format!("Conv1d(filters={filters}, kernel={kernel_size}, {activation:?})")
            }
            LayerKind::Dropout { rate }        => format!("Dropout({rate})"),
            LayerKind::MaxPool1d { pool_size } => format!("MaxPool1d({pool_size})"),
            LayerKind::Flatten                 => "Flatten".to_string(),
            LayerKind::Lstm { units }          => format!("Lstm({units})"),
            LayerKind::Dense { units, activation } => format!("Dense({units}, {activation:?})"),
        };
        if self.per_block {
            write!(f, "PerBlock({inner})")
        } else {
            f.write_str(&inner)
        }
    }
}

/// Output shape of a layer, excluding the batch dimension and,
/// for per-block shapes, the block (step) dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    /// `(steps, length, channels)`
    Blocks        { length: usize, channels: usize },
    /// `(steps, features)`
    BlockFeatures { features: usize },
    /// `(features)`
    Features      { features: usize },
}

impl fmt::Display for OutputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputShape::Blocks { length, channels } => write!(f, "(None, None, {length}, {channels})"),
            OutputShape::BlockFeatures { features }  => write!(f, "(None, None, {features})"),
            OutputShape::Features { features }       => write!(f, "(None, {features})"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TopologyError {
    #[error("topology has no layers")]
    Empty,

    #[error("layer {index} ({layer}) cannot consume input of shape {input}")]
    Misplaced { index: usize, layer: String, input: OutputShape },

    #[error("layer {index} ({layer}) is degenerate: {reason}")]
    Degenerate { index: usize, layer: String, reason: String },

    #[error("topology must end in a dense layer, last output is {output}")]
    Incomplete { output: OutputShape },

    #[error("layer {index} ({layer}) is not supported by the model builder: {reason}")]
    Unsupported { index: usize, layer: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub layers: Vec<LayerSpec>,
}

impl Topology {
    pub fn new(layers: Vec<LayerSpec>) -> Self {
        Self { layers }
    }

    /// The fixed CNN-LSTM network for `num_classes` outputs.
    pub fn cnn_lstm(num_classes: usize) -> Self {
        use LayerKind::*;
        Self::new(vec![
            LayerSpec::per_block(Conv1d { filters: 64, kernel_size: 3, activation: Activation::Relu }),
            LayerSpec::per_block(Conv1d { filters: 64, kernel_size: 3, activation: Activation::Relu }),
            LayerSpec::per_block(Dropout { rate: 0.5 }),
            LayerSpec::per_block(MaxPool1d { pool_size: 2 }),
            LayerSpec::per_block(Flatten),
            LayerSpec::new(Lstm { units: 100 }),
            LayerSpec::new(Dropout { rate: 0.5 }),
            LayerSpec::new(Dense { units: 100, activation: Activation::Relu }),
            LayerSpec::new(Dense { units: num_classes, activation: Activation::Softmax }),
        ])
    }

    /// Shape after every layer for blocks of `n_length` steps by
    /// `n_features` channels. Fails on any layer that cannot accept
    /// the shape produced by its predecessor.
    pub fn output_shapes(
        &self,
        n_length:   usize,
        n_features: usize,
    ) -> Result<Vec<OutputShape>, TopologyError> {
        if self.layers.is_empty() {
            return Err(TopologyError::Empty);
        }

        let mut shape  = OutputShape::Blocks { length: n_length, channels: n_features };
        let mut shapes = Vec::with_capacity(self.layers.len());

        for (index, spec) in self.layers.iter().enumerate() {
            let degenerate = |reason: String| TopologyError::Degenerate {
                index, layer: spec.to_string(), reason,
            };

            shape = match (spec.per_block, &spec.kind, shape) {
                (true, LayerKind::Conv1d { filters, kernel_size, .. }, OutputShape::Blocks { length, .. }) => {
                    if *filters == 0 || *kernel_size == 0 {
                        return Err(degenerate("filters and kernel size must be positive".into()));
                    }
                    if *kernel_size > length {
                        return Err(degenerate(format!("kernel {kernel_size} exceeds block length {length}")));
                    }
                    OutputShape::Blocks { length: length - kernel_size + 1, channels: *filters }
                }
                (true, LayerKind::MaxPool1d { pool_size }, OutputShape::Blocks { length, channels }) => {
                    if *pool_size == 0 || *pool_size > length {
                        return Err(degenerate(format!("pool {pool_size} invalid for block length {length}")));
                    }
                    OutputShape::Blocks { length: length / pool_size, channels }
                }
                (true, LayerKind::Flatten, OutputShape::Blocks { length, channels }) => {
                    OutputShape::BlockFeatures { features: length * channels }
                }
                (true, LayerKind::Dropout { rate }, s @ (OutputShape::Blocks { .. } | OutputShape::BlockFeatures { .. }))
                | (false, LayerKind::Dropout { rate }, s @ OutputShape::Features { .. }) => {
                    if !(0.0..1.0).contains(rate) {
                        return Err(degenerate(format!("rate {rate} outside [0, 1)")));
                    }
                    s
                }
                (false, LayerKind::Lstm { units }, OutputShape::BlockFeatures { .. }) => {
                    if *units == 0 {
                        return Err(degenerate("units must be positive".into()));
                    }
                    OutputShape::Features { features: *units }
                }
                (false, LayerKind::Dense { units, .. }, OutputShape::Features { .. }) => {
                    if *units == 0 {
                        return Err(degenerate("units must be positive".into()));
                    }
                    OutputShape::Features { features: *units }
                }
                (_, _, input) => {
                    return Err(TopologyError::Misplaced { index, layer: spec.to_string(), input });
                }
            };
            shapes.push(shape);
        }

        match self.layers.last().map(|l| &l.kind) {
            Some(LayerKind::Dense { .. }) => Ok(shapes),
            _ => Err(TopologyError::Incomplete { output: shape }),
        }
    }

    /// Keras-style one line per layer summary.
    pub fn summary(&self, n_length: usize, n_features: usize) -> Result<String, TopologyError> {
        let shapes = self.output_shapes(n_length, n_features)?;
        let lines: Vec<String> = self.layers
            .iter()
            .zip(shapes)
            .enumerate()
            .map(|(i, (layer, shape))| format!("{:>2}  {:<50} {}", i + 1, layer.to_string(), shape))
            .collect();
        Ok(lines.join("\n"))
    }
}
