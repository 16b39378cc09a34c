// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `inspect`, and all
// their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::train_use_case::ExperimentConfig;
use crate::domain::layout::DatasetLayout;
use crate::ml::trainer::ComputeBackend;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit the CNN-LSTM on the training split and report test accuracy
    Train(TrainArgs),

    /// Print split shapes and the per-class window distribution
    Inspect(InspectArgs),
}

/// Where the dataset lives on disk.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Directory that contains the dataset directory
    #[arg(long, default_value = ".")]
    pub data_root: PathBuf,

    /// Name of the dataset directory under --data-root
    #[arg(long, default_value = "UCI_HAR_Dataset")]
    pub dataset_dir: String,
}

impl From<DataArgs> for DatasetLayout {
    fn from(a: DataArgs) -> Self {
        DatasetLayout::new(a.data_root).with_dataset_dir(a.dataset_dir)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendArg {
    /// GPU through WebGPU
    Wgpu,
    /// CPU
    Ndarray,
}

impl From<BackendArg> for ComputeBackend {
    fn from(b: BackendArg) -> Self {
        match b {
            BackendArg::Wgpu    => ComputeBackend::Wgpu,
            BackendArg::Ndarray => ComputeBackend::NdArray,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Number of full passes through the training split
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Windows per gradient step
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Blocks each 128-step window is split into
    #[arg(long, default_value_t = 4)]
    pub n_steps: usize,

    /// Time steps per block; n_steps * n_length must equal the window length
    #[arg(long, default_value_t = 32)]
    pub n_length: usize,

    /// Base random seed; drawn at random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Independent fit + evaluate runs, summarised as mean and std
    #[arg(long, default_value_t = 1)]
    pub repeats: usize,

    #[arg(long, value_enum, default_value_t = BackendArg::Wgpu)]
    pub backend: BackendArg,

    /// Write epochs.csv, evaluation.csv and run_config.json here
    #[arg(long)]
    pub metrics_dir: Option<PathBuf>,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for ExperimentConfig {
    fn from(a: TrainArgs) -> Self {
        ExperimentConfig {
            layout:        a.data.into(),
            n_steps:       a.n_steps,
            n_length:      a.n_length,
            epochs:        a.epochs,
            batch_size:    a.batch_size,
            learning_rate: a.lr,
            seed:          a.seed,
            repeats:       a.repeats,
            backend:       a.backend.into(),
            metrics_dir:   a.metrics_dir,
        }
    }
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults() {
        let cli = Cli::try_parse_from(["har-cnn-lstm", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: ExperimentConfig = args.into();

        assert_eq!(cfg.epochs, 10);
        assert_eq!(cfg.batch_size, 32);
        assert_eq!(cfg.learning_rate, 1e-3);
        assert_eq!((cfg.n_steps, cfg.n_length), (4, 32));
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.repeats, 1);
        assert_eq!(cfg.backend, ComputeBackend::Wgpu);
        assert_eq!(cfg.layout.dataset_dir, "UCI_HAR_Dataset");
    }

    #[test]
    fn test_train_flags() {
        let cli = Cli::try_parse_from([
            "har-cnn-lstm", "train",
            "--data-root", "/data", "--dataset-dir", "har",
            "--epochs", "3", "--seed", "9", "--repeats", "5", "--backend", "ndarray",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: ExperimentConfig = args.into();

        assert_eq!(cfg.layout.root, PathBuf::from("/data"));
        assert_eq!(cfg.layout.dataset_dir, "har");
        assert_eq!(cfg.epochs, 3);
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.repeats, 5);
        assert_eq!(cfg.backend, ComputeBackend::NdArray);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(Cli::try_parse_from(["har-cnn-lstm", "train", "--backend", "cuda"]).is_err());
    }
}
