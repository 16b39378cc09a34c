// ============================================================
// Layer 5 - Training Loop
// ============================================================
// Fit + evaluate using Burn's DataLoader and Adam.
//
//   - Training runs on Autodiff<B> so gradients are tracked
//   - model.valid() returns the model on the inner backend with
//     dropout disabled; evaluation batches use that backend too
//   - argmax(1) returns [batch, 1] so we flatten before .equal()
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{ensure, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice, Autodiff, NdArray, Wgpu},
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::data::{batcher::HarBatcher, dataset::HarDataset};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{categorical_cross_entropy, CnnLstmConfig, CnnLstmModel};

#[derive(Config, Debug)]
pub struct FitConfig {
    #[config(default = 10)]
    pub epochs:        usize,
    #[config(default = 32)]
    pub batch_size:    usize,
    #[config(default = 1e-3)]
    pub learning_rate: f64,
    #[config(default = 42)]
    pub seed:          u64,
    #[config(default = 1)]
    pub num_workers:   usize,
}

/// Which Burn backend executes the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComputeBackend {
    Wgpu,
    NdArray,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvalReport {
    pub loss:     f64,
    pub accuracy: f64,
    pub samples:  usize,
}

#[derive(Debug, Clone)]
pub struct FitReport {
    pub epochs: Vec<EpochMetrics>,
    pub test:   EvalReport,
}

/// Fit on `train` and evaluate on `test` with the chosen backend.
pub fn run_training(
    backend:   ComputeBackend,
    model_cfg: &CnnLstmConfig,
    fit:       &FitConfig,
    train:     HarDataset,
    test:      HarDataset,
    run:       usize,
    metrics:   Option<&MetricsLogger>,
) -> Result<FitReport> {
    match backend {
        ComputeBackend::Wgpu => {
            let device = WgpuDevice::default();
            tracing::info!("Using WGPU device: {:?}", device);
            fit_and_evaluate::<Autodiff<Wgpu>>(model_cfg, fit, train, test, device, run, metrics)
        }
        ComputeBackend::NdArray => {
            let device = NdArrayDevice::Cpu;
            tracing::info!("Using NdArray device: {:?}", device);
            fit_and_evaluate::<Autodiff<NdArray>>(model_cfg, fit, train, test, device, run, metrics)
        }
    }
}

pub fn fit_and_evaluate<B: AutodiffBackend>(
    model_cfg: &CnnLstmConfig,
    fit:       &FitConfig,
    train:     HarDataset,
    test:      HarDataset,
    device:    B::Device,
    run:       usize,
    metrics:   Option<&MetricsLogger>,
) -> Result<FitReport> {
    ensure!(
        train.num_classes() == model_cfg.num_classes && test.num_classes() == model_cfg.num_classes,
        "label width (train {}, test {}) does not match the {} model outputs",
        train.num_classes(), test.num_classes(), model_cfg.num_classes,
    );
    B::seed(fit.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: CnnLstmModel<B> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: {} conv layers, lstm={}, classes={}",
        model_cfg.conv_filters.len(), model_cfg.lstm_units, model_cfg.num_classes,
    );

    // ── Adam optimiser (Keras defaults) ───────────────────────────────────────
    let mut optim = AdamConfig::new()
        .with_epsilon(1e-7)
        .init::<B, CnnLstmModel<B>>();

    // ── Training data loader ──────────────────────────────────────────────────
    let train_loader = DataLoaderBuilder::new(HarBatcher::<B>::new(device.clone()))
        .batch_size(fit.batch_size)
        .shuffle(fit.seed)
        .num_workers(fit.num_workers)
        .build(train);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    let mut history = Vec::with_capacity(fit.epochs);
    for epoch in 1..=fit.epochs {
        let mut loss_sum = 0.0f64;
        let mut correct  = 0usize;
        let mut seen     = 0usize;

        for batch in train_loader.iter() {
            let n = batch.classes.dims()[0];
            let (loss, logits) = model.forward_loss(batch.inputs, batch.targets);

            loss_sum += loss.clone().into_scalar().elem::<f64>() * n as f64;
            correct  += count_correct(logits, batch.classes);
            seen     += n;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(fit.learning_rate, model, grads);
        }

        let m = EpochMetrics::new(run, epoch, mean_or_nan(loss_sum, seen), ratio(correct, seen));
        println!(
            "Epoch {:>3}/{} | loss={:.4} | accuracy={:.4}",
            epoch, fit.epochs, m.train_loss, m.train_accuracy,
        );
        if let Some(logger) = metrics {
            logger.log_epoch(&m)?;
        }
        history.push(m);
    }

    // ── Evaluation (dropout disabled) ─────────────────────────────────────────
    let model_valid = model.valid();
    let test_report = evaluate::<B::InnerBackend>(&model_valid, test, fit.batch_size, &device);
    tracing::info!(
        "Evaluated {} test windows: loss={:.4}, accuracy={:.4}",
        test_report.samples, test_report.loss, test_report.accuracy,
    );

    Ok(FitReport { epochs: history, test: test_report })
}

/// Forward pass only over `dataset`, in order, `batch_size` windows at a time.
pub fn evaluate<B: Backend>(
    model:      &CnnLstmModel<B>,
    dataset:    HarDataset,
    batch_size: usize,
    device:     &B::Device,
) -> EvalReport {
    let loader = DataLoaderBuilder::new(HarBatcher::<B>::new(device.clone()))
        .batch_size(batch_size)
        .build(dataset);

    let mut loss_sum = 0.0f64;
    let mut correct  = 0usize;
    let mut samples  = 0usize;

    for batch in loader.iter() {
        let n      = batch.classes.dims()[0];
        let logits = model.forward(batch.inputs);

        loss_sum += categorical_cross_entropy(logits.clone(), batch.targets)
            .into_scalar()
            .elem::<f64>() * n as f64;
        correct  += count_correct(logits, batch.classes);
        samples  += n;
    }

    EvalReport { loss: mean_or_nan(loss_sum, samples), accuracy: ratio(correct, samples), samples }
}

/// Number of rows whose arg-max logit is the target class.
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, classes: Tensor<B, 1, Int>) -> usize {
    let predicted = logits.argmax(1).flatten::<1>(0, 1);
    predicted
        .equal(classes)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}

fn mean_or_nan(sum: f64, n: usize) -> f64 {
    if n > 0 { sum / n as f64 } else { f64::NAN }
}

fn ratio(correct: usize, n: usize) -> f64 {
    if n > 0 { correct as f64 / n as f64 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::topology::Topology;
    use ndarray::{Array2, Array4};

    type TestBackend = NdArray;
    type TestAutodiffBackend = Autodiff<NdArray>;

    fn synthetic(n: usize) -> HarDataset {
        let x = Array4::from_shape_fn((n, 4, 32, 9), |(i, s, l, c)| {
            ((i + 1) as f32 * 0.1) * ((s * 32 + l) as f32 * 0.05 + c as f32).sin()
        });
        let mut y = Array2::zeros((n, 6));
        for i in 0..n {
            y[[i, i % 6]] = 1.0;
        }
        HarDataset::new(x, y).unwrap()
    }

    fn model_cfg() -> CnnLstmConfig {
        CnnLstmConfig::from_topology(&Topology::cnn_lstm(6), 32, 9).unwrap()
    }

    #[test]
    fn test_count_correct() {
        let device  = Default::default();
        let logits  = Tensor::<TestBackend, 2>::from_floats(
            [[0.1, 0.9, 0.0], [0.8, 0.1, 0.1], [0.2, 0.3, 0.5]],
            &device,
        );
        let classes = Tensor::<TestBackend, 1, Int>::from_ints([1, 2, 2], &device);
        assert_eq!(count_correct(logits, classes), 2);
    }

    #[test]
    fn test_evaluate_covers_every_sample() {
        let device = Default::default();
        let model  = model_cfg().init::<TestBackend>(&device);
        let report = evaluate(&model, synthetic(10), 4, &device);

        assert_eq!(report.samples, 10);
        assert!((0.0..=1.0).contains(&report.accuracy));
        assert!(report.loss.is_finite());
    }

    #[test]
    fn test_fit_and_evaluate_smoke() {
        let fit = FitConfig::new()
            .with_epochs(2)
            .with_batch_size(4)
            .with_seed(3);

        let report = fit_and_evaluate::<TestAutodiffBackend>(
            &model_cfg(),
            &fit,
            synthetic(8),
            synthetic(5),
            Default::default(),
            1,
            None,
        )
        .unwrap();

        assert_eq!(report.epochs.len(), 2);
        assert_eq!(report.epochs[1].epoch, 2);
        assert!(report.epochs.iter().all(|m| m.train_loss.is_finite()));
        assert_eq!(report.test.samples, 5);
        assert!((0.0..=1.0).contains(&report.test.accuracy));
    }

    #[test]
    fn test_fit_logs_every_epoch() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        let fit    = FitConfig::new().with_epochs(1).with_batch_size(8);

        fit_and_evaluate::<TestAutodiffBackend>(
            &model_cfg(), &fit, synthetic(6), synthetic(2), Default::default(), 3, Some(&logger),
        )
        .unwrap();

        let csv = std::fs::read_to_string(dir.path().join("epochs.csv")).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.lines().nth(1).unwrap().starts_with("3,1,"));
    }

    #[test]
    fn test_label_width_must_match_model() {
        let cfg = CnnLstmConfig::from_topology(&Topology::cnn_lstm(4), 32, 9).unwrap();
        let err = fit_and_evaluate::<TestAutodiffBackend>(
            &cfg, &FitConfig::new(), synthetic(4), synthetic(2), Default::default(), 1, None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_empty_ratios() {
        assert!(mean_or_nan(0.0, 0).is_nan());
        assert_eq!(ratio(0, 0), 0.0);
        assert_eq!(ratio(3, 4), 0.75);
    }
}
