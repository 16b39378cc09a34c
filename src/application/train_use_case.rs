// ============================================================
// Layer 2 - TrainUseCase
// ============================================================
// Orchestrates the full experiment in order:
//
//   Step 1: Load and encode both splits    (Layer 4 - data)
//   Step 2: Reshape windows into blocks    (Layer 4 - data)
//   Step 3: Build Burn datasets            (Layer 4 - data)
//   Step 4: Compile the network topology   (Layer 3 + 5)
//   Step 5: Prepare metrics output         (Layer 6 - infra)
//   Step 6: Fit + evaluate, once per run   (Layer 5 - ml)
//   Step 7: Summarise accuracy over runs   (Layer 6 - infra)
//
// Reference: Burn Book §5 (Training)

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{blocks::to_blocks, dataset::HarDataset, loader::load_dataset};
use crate::domain::{layout::DatasetLayout, topology::Topology};
use crate::infra::metrics::{AccuracySummary, MetricsLogger, RunMetrics};
use crate::ml::{
    model::CnnLstmConfig,
    trainer::{run_training, ComputeBackend, FitConfig},
};

// ─── Experiment Configuration ────────────────────────────────────────────────
// Everything a run depends on. Serialisable so the exact
// configuration can be written next to the metrics it produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub layout:        DatasetLayout,
    /// Blocks per window
    pub n_steps:       usize,
    /// Time steps per block
    pub n_length:      usize,
    pub epochs:        usize,
    pub batch_size:    usize,
    pub learning_rate: f64,
    /// Base seed; run `r` uses `seed + r`. Drawn at random when absent.
    pub seed:          Option<u64>,
    pub repeats:       usize,
    pub backend:       ComputeBackend,
    pub metrics_dir:   Option<PathBuf>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            layout:        DatasetLayout::default(),
            n_steps:       4,
            n_length:      32,
            epochs:        10,
            batch_size:    32,
            learning_rate: 1e-3,
            seed:          None,
            repeats:       1,
            backend:       ComputeBackend::Wgpu,
            metrics_dir:   None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExperimentReport {
    pub runs:    Vec<RunMetrics>,
    pub summary: AccuracySummary,
}

pub struct TrainUseCase {
    config: ExperimentConfig,
}

impl TrainUseCase {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    /// Execute the full pipeline end to end
    pub fn execute(&self) -> Result<ExperimentReport> {
        let cfg = &self.config;
        ensure!(cfg.repeats >= 1, "repeats must be at least 1");
        ensure!(cfg.batch_size >= 1, "batch size must be at least 1");

        // ── Step 1: Load both splits ─────────────────────────────────────────
        let data = load_dataset(&cfg.layout).with_context(|| {
            format!("Cannot load dataset under '{}'", cfg.layout.root.display())
        })?;

        // ── Step 2: Windows → blocks ──────────────────────────────────────────
        // (N, 128, 9) → (N, 4, 32, 9)
        let train_x = to_blocks(&data.train.x, cfg.n_steps, cfg.n_length)
            .context("Cannot split training windows into blocks")?;
        let test_x  = to_blocks(&data.test.x, cfg.n_steps, cfg.n_length)
            .context("Cannot split test windows into blocks")?;
        println!("blocked trainX {:?} testX {:?}", train_x.shape(), test_x.shape());

        // ── Step 3: Burn datasets ─────────────────────────────────────────────
        let num_classes = data.num_classes();
        let (_, n_features) = data.window_shape();
        let train = HarDataset::new(train_x, data.train.y)?;
        let test  = HarDataset::new(test_x, data.test.y)?;

        // ── Step 4: Topology → model config ───────────────────────────────────
        let topology  = Topology::cnn_lstm(num_classes);
        let model_cfg = CnnLstmConfig::from_topology(&topology, cfg.n_length, n_features)
            .context("Invalid network topology")?;
        tracing::info!("Network:\n{}", topology.summary(cfg.n_length, n_features)?);

        // ── Step 5: Metrics output ────────────────────────────────────────────
        let base_seed = cfg.seed.unwrap_or_else(rand::random);
        let metrics   = match &cfg.metrics_dir {
            Some(dir) => {
                let logger = MetricsLogger::new(dir.clone())?;
                let mut resolved = cfg.clone();
                resolved.seed = Some(base_seed);
                logger.save_config(&resolved)?;
                Some(logger)
            }
            None => None,
        };

        // ── Step 6: Independent runs ──────────────────────────────────────────
        let mut runs = Vec::with_capacity(cfg.repeats);
        for r in 0..cfg.repeats {
            let run  = r + 1;
            let seed = base_seed.wrapping_add(r as u64);
            tracing::info!("Run {}/{} with seed {}", run, cfg.repeats, seed);

            let fit = FitConfig::new()
                .with_epochs(cfg.epochs)
                .with_batch_size(cfg.batch_size)
                .with_learning_rate(cfg.learning_rate)
                .with_seed(seed);

            let report = run_training(
                cfg.backend,
                &model_cfg,
                &fit,
                train.clone(),
                test.clone(),
                run,
                metrics.as_ref(),
            )?;

            if let Some(last) = report.epochs.last() {
                tracing::info!(
                    "Run {} final epoch: loss={:.4}, accuracy={:.4}",
                    run, last.train_loss, last.train_accuracy,
                );
            }
            println!("Test accuracy: {}", report.test.accuracy);

            let m = RunMetrics {
                run,
                seed,
                test_loss:     report.test.loss,
                test_accuracy: report.test.accuracy,
            };
            if let Some(logger) = &metrics {
                logger.log_run(&m)?;
            }
            runs.push(m);
        }

        // ── Step 7: Summary ───────────────────────────────────────────────────
        let scores: Vec<f64> = runs.iter().map(|m| m.test_accuracy).collect();
        let summary = AccuracySummary::from_scores(&scores)
            .context("No runs were executed")?;
        if cfg.repeats > 1 {
            println!("{summary}");
        }

        Ok(ExperimentReport { runs, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::error::DataError;
    use crate::data::fixtures::write_dataset;

    fn config(root: &std::path::Path) -> ExperimentConfig {
        ExperimentConfig {
            layout:     DatasetLayout::new(root),
            epochs:     1,
            batch_size: 4,
            seed:       Some(11),
            backend:    ComputeBackend::NdArray,
            ..ExperimentConfig::default()
        }
    }

    #[test]
    fn test_execute_end_to_end_on_cpu() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), 128, &[1, 2, 3, 4, 5, 6], &[1, 2, 6]);

        let mut cfg = config(dir.path());
        cfg.repeats     = 2;
        cfg.metrics_dir = Some(dir.path().join("metrics"));

        let report = TrainUseCase::new(cfg).execute().unwrap();
        assert_eq!(report.runs.len(), 2);
        assert_eq!(report.runs[0].seed, 11);
        assert_eq!(report.runs[1].seed, 12);
        assert_eq!(report.summary.runs, 2);
        assert!((0.0..=1.0).contains(&report.summary.mean));

        let saved = std::fs::read_to_string(dir.path().join("metrics/run_config.json")).unwrap();
        assert!(saved.contains("\"seed\": 11"));
        let eval = std::fs::read_to_string(dir.path().join("metrics/evaluation.csv")).unwrap();
        assert_eq!(eval.lines().count(), 3);
    }

    #[test]
    fn test_block_shape_must_cover_window() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), 100, &[1, 2], &[3]);

        let err = TrainUseCase::new(config(dir.path())).execute().unwrap_err();
        assert!(matches!(err.downcast_ref::<DataError>(), Some(DataError::Shape { .. })));
    }

    #[test]
    fn test_missing_dataset_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let err = TrainUseCase::new(config(dir.path())).execute().unwrap_err();
        assert!(matches!(err.downcast_ref::<DataError>(), Some(DataError::FileNotFound { .. })));
    }

    #[test]
    fn test_zero_repeats_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.repeats = 0;
        assert!(TrainUseCase::new(cfg).execute().is_err());
    }
}
