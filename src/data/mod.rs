// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything from raw text files on disk to device-ready
// tensor batches.
//
//   channel .txt files + y_<split>.txt
//       │
//       ▼
//   loader         → parse tables, stack 9 channels: (N, 128, 9)
//       │
//       ▼
//   labels         → zero-offset + one-hot:          (N, 6)
//       │
//       ▼
//   blocks         → split windows into blocks:      (N, 4, 32, 9)
//       │
//       ▼
//   HarDataset     → implements Burn's Dataset trait
//       │
//       ▼
//   HarBatcher     → stacks samples into tensor batches
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            ndarray crate documentation

/// Error taxonomy of the data pipeline
pub mod error;

/// Whitespace-delimited table loading and channel stacking
pub mod loader;

/// One-hot label encoding and class statistics
pub mod labels;

/// Window to block reshaping
pub mod blocks;

/// Implements Burn's Dataset trait for block samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

#[cfg(test)]
pub mod fixtures;
