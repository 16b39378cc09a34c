// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`   - fit and evaluate the CNN-LSTM classifier
//   2. `inspect` - print dataset shapes and class balance
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InspectArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "har-cnn-lstm",
    version = "0.1.0",
    about = "Classify UCI HAR inertial windows into six activities with a CNN-LSTM."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to its use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Inspect(args) => run_inspect(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on dataset under: {}", args.data.data_root.display());

    let report = TrainUseCase::new(args.into()).execute()?;
    for m in &report.runs {
        tracing::info!("Run {} (seed {}): test accuracy {:.4}", m.run, m.seed, m.test_accuracy);
    }
    tracing::info!("Training complete: {} run(s), mean accuracy {:.4}", report.summary.runs, report.summary.mean);
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    let report = InspectUseCase::new(args.data.into()).execute()?;
    for split in [&report.train, &report.test] {
        println!("\n{} {:?}", split.split, split.shape);
        for c in &split.distribution {
            println!("  Class={} ({}), total={}, percentage={:.3}", c.class + 1, c.name, c.count, c.percent);
        }
    }
    Ok(())
}
