// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop for one run using Burn's DataLoader
// and Adam.
//
//   instances ─► split_validation ─► training part ─► DataLoader
//                                   │                 (shuffled,
//                                   │                  run seed)
//                                   └► held-out tail ─► evaluate
//
// Key Burn insight:
//   - Training uses an AutodiffBackend (Autodiff<Wgpu>) for gradients
//   - model.valid() returns the model on the inner backend with
//     dropout disabled; evaluation runs there
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{ensure, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::WarrantBatcher, dataset::WarrantDataset, splitter::split_validation};
use crate::domain::instance::PaddedInstance;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::inferencer::evaluate;
use crate::ml::model::WarrantModel;

pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Seed the backend's parameter initialisation and dropout masks.
pub fn seed_backend<B: Backend>(device: &B::Device, seed: u64) {
    B::seed(device, seed);
}

// ── Adam optimiser ────────────────────────────────────────────────────────────
// m = β1*m + (1-β1)*g        (mean)
// v = β2*v + (1-β2)*g²       (variance)
// θ = θ - lr * m / (√v + ε)  (update)
//
// ε = 1e-8 rather than Burn's 1e-5 default.
pub fn optimizer_config() -> AdamConfig {
    AdamConfig::new().with_epsilon(1e-8)
}

/// Fit `model` on `instances` for `cfg.epochs` epochs.
/// `run` only labels the printed / logged metrics.
pub fn fit<B: AutodiffBackend>(
    mut model: WarrantModel<B>,
    cfg:       &TrainConfig,
    instances: Vec<PaddedInstance>,
    run:       usize,
    seed:      u64,
    metrics:   Option<&MetricsLogger>,
    device:    &B::Device,
) -> Result<WarrantModel<B>> {
    let (train_rows, val_rows) = split_validation(instances, cfg.validation_split);
    ensure!(
        !train_rows.is_empty(),
        "No training instances left after holding out {} for validation",
        cfg.validation_split
    );
    tracing::info!(
        "Run {}: {} training, {} validation instances",
        run, train_rows.len(), val_rows.len()
    );

    let mut optim = optimizer_config().init();

    let train_loader = DataLoaderBuilder::new(WarrantBatcher::new())
        .batch_size(cfg.batch_size)
        .shuffle(seed)
        .num_workers(1)
        .build(WarrantDataset::new(train_rows));

    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut loss_sum = 0.0f64;
        let mut correct  = 0usize;
        let mut seen     = 0usize;

        for batch in train_loader.iter() {
            let size   = batch.labels.dims()[0];
            let labels = batch.labels.clone();
            let (loss, logits) = model.forward_loss(batch);

            // logit > 0 ⇔ p(label 1) > 0.5
            let hits: i64 = logits
                .greater_elem(0.0)
                .int()
                .equal(labels)
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();

            loss_sum += loss.clone().into_scalar().elem::<f64>() * size as f64;
            correct  += hits as usize;
            seen     += size;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.learning_rate, model, grads);
        }

        // ── Validation phase ──────────────────────────────────────────────────
        let validation = evaluate(&model.valid(), &val_rows, cfg.batch_size, device)?;

        let m = EpochMetrics {
            run,
            epoch,
            train_loss: if seen > 0 { loss_sum / seen as f64 } else { f64::NAN },
            train_acc:  if seen > 0 { correct as f64 / seen as f64 } else { 0.0 },
            val_loss:   validation.loss,
            val_acc:    validation.accuracy,
        };

        println!(
            "Run {} epoch {:>3}/{} | loss={:.4} | acc={:.3} | val_loss={:.4} | val_acc={:.3}",
            run, epoch, cfg.epochs, m.train_loss, m.train_acc, m.val_loss, m.val_acc,
        );

        if let Some(logger) = metrics {
            logger.log(&m)?;
        }
    }

    tracing::info!("Run {} training complete", run);
    Ok(model)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::with_model_stack;
    use crate::ml::model::WarrantModelConfig;

    type TestBackend = burn::backend::Autodiff<burn::backend::NdArray>;

    fn instance(n: u32) -> PaddedInstance {
        PaddedInstance {
            id:          format!("id{n}"),
            warrant0:    vec![0, 3 + n % 4, 4],
            warrant1:    vec![0, 5, 3 + n % 5],
            label:       (n % 2) as u8,
            reason:      vec![0, 0, 6],
            claim:       vec![7, 8, 9],
            debate_meta: vec![0, 0, 9],
        }
    }

    fn small_config() -> TrainConfig {
        TrainConfig {
            epochs:           2,
            batch_size:       4,
            validation_split: 0.25,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_fit_runs_and_logs_every_epoch() {
        with_model_stack(|| {
            let dir    = tempfile::tempdir().unwrap();
            let device = Default::default();
            let logger = MetricsLogger::new(dir.path()).unwrap();
            let model  = WarrantModelConfig::new(10, 4)
                .with_lstm_size(4)
                .init::<TestBackend>(&device);

            let rows = (0..12).map(instance).collect();
            fit(model, &small_config(), rows, 0, 7, Some(&logger), &device).unwrap();

            let csv = std::fs::read_to_string(logger.csv_path()).unwrap();
            assert_eq!(csv.lines().count(), 1 + 2);
        });
    }

    #[test]
    fn test_adam_epsilon() {
        let json = serde_json::to_value(optimizer_config()).unwrap();
        let eps  = json["epsilon"].as_f64().unwrap();
        assert!((eps - 1e-8).abs() < 1e-12);
    }

    #[test]
    fn test_fit_rejects_a_split_that_leaves_nothing() {
        with_model_stack(|| {
            let device = Default::default();
            let model  = WarrantModelConfig::new(10, 4)
                .with_lstm_size(4)
                .init::<TestBackend>(&device);
            let cfg = TrainConfig { validation_split: 1.0, ..small_config() };

            assert!(fit(model, &cfg, vec![instance(1)], 0, 7, None, &device).is_err());
        });
    }
}
