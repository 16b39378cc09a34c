// ============================================================
// Layer 6 - Metrics Logger
// ============================================================
// Records training metrics to CSV files so learning curves can
// be plotted after a run.
//
// Files written into the metrics directory:
//   epochs.csv       one row per (run, epoch)
//   evaluation.csv   one row per run with the test-set result
//   run_config.json  the resolved experiment configuration
//
// Example epochs.csv:
//   run,epoch,train_loss,train_accuracy
//   1,1,1.204513,0.512100
//   1,2,0.611020,0.771300
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Experiment repeat, starting at 1
    pub run: usize,

    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Sample-weighted mean categorical cross-entropy over the epoch
    pub train_loss: f64,

    /// Fraction of training windows classified correctly during the epoch
    pub train_accuracy: f64,
}

impl EpochMetrics {
    pub fn new(run: usize, epoch: usize, train_loss: f64, train_accuracy: f64) -> Self {
        Self { run, epoch, train_loss, train_accuracy }
    }
}

/// Test-set result of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub run:           usize,
    pub seed:          u64,
    pub test_loss:     f64,
    pub test_accuracy: f64,
}

pub struct MetricsLogger {
    epochs_csv:     PathBuf,
    evaluation_csv: PathBuf,
    dir:            PathBuf,
}

impl MetricsLogger {
    /// Create the directory and write CSV headers for files that
    /// don't exist yet, so repeated runs append to the same log.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;

        let epochs_csv     = dir.join("epochs.csv");
        let evaluation_csv = dir.join("evaluation.csv");
        write_header(&epochs_csv, "run,epoch,train_loss,train_accuracy")?;
        write_header(&evaluation_csv, "run,seed,test_loss,test_accuracy")?;

        Ok(Self { epochs_csv, evaluation_csv, dir })
    }

    pub fn log_epoch(&self, m: &EpochMetrics) -> Result<()> {
        append_row(
            &self.epochs_csv,
            &format!("{},{},{:.6},{:.6}", m.run, m.epoch, m.train_loss, m.train_accuracy),
        )?;
        tracing::debug!(
            "Logged run {} epoch {}: loss={:.4}, accuracy={:.4}",
            m.run, m.epoch, m.train_loss, m.train_accuracy,
        );
        Ok(())
    }

    pub fn log_run(&self, m: &RunMetrics) -> Result<()> {
        append_row(
            &self.evaluation_csv,
            &format!("{},{},{:.6},{:.6}", m.run, m.seed, m.test_loss, m.test_accuracy),
        )
    }

    /// Snapshot of the configuration a run was started with.
    pub fn save_config<T: Serialize>(&self, cfg: &T) -> Result<()> {
        let path = self.dir.join("run_config.json");
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved run config to '{}'", path.display());
        Ok(())
    }
}

fn write_header(path: &Path, header: &str) -> Result<()> {
    if !path.exists() {
        let mut f = fs::File::create(path)
            .with_context(|| format!("Cannot create '{}'", path.display()))?;
        writeln!(f, "{header}")?;
        tracing::debug!("Created metrics CSV: '{}'", path.display());
    }
    Ok(())
}

fn append_row(path: &Path, row: &str) -> Result<()> {
    let mut f = OpenOptions::new()
        .append(true)
        .open(path)
        .with_context(|| format!("Cannot open '{}'", path.display()))?;
    writeln!(f, "{row}")?;
    Ok(())
}

/// Mean and population standard deviation of test accuracies
/// across repeated runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccuracySummary {
    pub runs: usize,
    pub mean: f64,
    pub std:  f64,
}

impl AccuracySummary {
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        let scores = Array1::from(scores.to_vec());
        let mean   = scores.mean()?;
        Some(Self { runs: scores.len(), mean, std: scores.std(0.0) })
    }
}

impl fmt::Display for AccuracySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Accuracy: {:.3}% (+/-{:.3})", self.mean * 100.0, self.std * 100.0)
    }
}
