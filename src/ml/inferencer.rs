// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Runs a trained model over padded instances in input order and
// turns the scores into labels.
//
//   instances ─► chunks of batch_size ─► WarrantBatcher
//             ─► forward_probabilities ─► [p(label 1)] per row
//             ─► predicted_labels ─► accuracy against gold
//
// Prediction does not go through the shuffling DataLoader: the
// output rows must line up with the input rows.

use anyhow::{anyhow, ensure, Result};
use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::batcher::{WarrantBatch, WarrantBatcher};
use crate::domain::instance::{PaddedInstance, WarrantLabel};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::WarrantModel;

pub type InferBackend = burn::backend::Wgpu;

/// Label per row of scores: argmax when a row holds one score per
/// class, otherwise the single score is p(label 1) thresholded at 0.5.
pub fn predicted_labels(probabilities: &[Vec<f32>]) -> Vec<WarrantLabel> {
    probabilities
        .iter()
        .map(|row| {
            if row.len() > 1 {
                let mut best = 0;
                for (i, p) in row.iter().enumerate() {
                    if *p > row[best] {
                        best = i;
                    }
                }
                best as WarrantLabel
            } else {
                WarrantLabel::from(row.first().is_some_and(|p| *p > 0.5))
            }
        })
        .collect()
}

/// Fraction of positions where gold and predicted agree; 0 when empty.
pub fn accuracy(gold: &[WarrantLabel], predicted: &[WarrantLabel]) -> Result<f64> {
    ensure!(
        gold.len() == predicted.len(),
        "Cannot compare {} gold labels with {} predictions",
        gold.len(),
        predicted.len()
    );
    if gold.is_empty() {
        return Ok(0.0);
    }
    let hits = gold.iter().zip(predicted).filter(|(g, p)| g == p).count();
    Ok(hits as f64 / gold.len() as f64)
}

fn to_floats<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read tensor data: {e:?}"))
}

/// p(label 1) for every instance, one single-value row each, in input order.
pub fn predict_probabilities<B: Backend>(
    model:      &WarrantModel<B>,
    instances:  &[PaddedInstance],
    batch_size: usize,
    device:     &B::Device,
) -> Result<Vec<Vec<f32>>> {
    let batcher = WarrantBatcher::new();
    let mut probabilities = Vec::with_capacity(instances.len());

    for chunk in instances.chunks(batch_size.max(1)) {
        let batch: WarrantBatch<B> = batcher.batch(chunk.to_vec(), device);
        let scores = to_floats(model.forward_probabilities(batch))?;
        probabilities.extend(scores.into_iter().map(|p| vec![p]));
    }
    Ok(probabilities)
}

/// Loss and accuracy over a labelled set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Mean binary cross-entropy per instance (NaN for an empty set)
    pub loss:     f64,
    pub accuracy: f64,
}

pub fn evaluate<B: Backend>(
    model:      &WarrantModel<B>,
    instances:  &[PaddedInstance],
    batch_size: usize,
    device:     &B::Device,
) -> Result<Evaluation> {
    if instances.is_empty() {
        return Ok(Evaluation { loss: f64::NAN, accuracy: 0.0 });
    }

    let batcher  = WarrantBatcher::new();
    let mut loss = 0.0f64;
    let mut predicted = Vec::with_capacity(instances.len());

    for chunk in instances.chunks(batch_size.max(1)) {
        let batch: WarrantBatch<B> = batcher.batch(chunk.to_vec(), device);
        let (batch_loss, logits) = model.forward_loss(batch);
        loss += batch_loss.into_scalar().elem::<f64>() * chunk.len() as f64;

        let rows: Vec<Vec<f32>> = to_floats(burn::tensor::activation::sigmoid(logits))?
            .into_iter()
            .map(|p| vec![p])
            .collect();
        predicted.extend(predicted_labels(&rows));
    }

    let gold: Vec<WarrantLabel> = instances.iter().map(|i| i.label).collect();
    Ok(Evaluation {
        loss:     loss / instances.len() as f64,
        accuracy: accuracy(&gold, &predicted)?,
    })
}

/// A model ready for prediction, with the batch size it was trained with.
pub struct Inferencer<B: Backend = InferBackend> {
    model:      WarrantModel<B>,
    batch_size: usize,
    device:     B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(model: WarrantModel<B>, batch_size: usize, device: B::Device) -> Self {
        Self { model, batch_size, device }
    }

    /// Rebuild the architecture from model_config.json and load the
    /// weights of the given run.
    pub fn from_checkpoint(ckpt: &CheckpointManager, run: usize, device: B::Device) -> Result<Self> {
        let model_cfg  = ckpt.load_model_config()?;
        let batch_size = ckpt.load_train_config()?.batch_size;
        let model      = ckpt.load_model(model_cfg.init::<B>(&device), run, &device)?;
        tracing::info!("Model of run {} loaded from checkpoint", run);
        Ok(Self::new(model, batch_size, device))
    }

    pub fn probabilities(&self, instances: &[PaddedInstance]) -> Result<Vec<Vec<f32>>> {
        predict_probabilities(&self.model, instances, self.batch_size, &self.device)
    }

    pub fn predict(&self, instances: &[PaddedInstance]) -> Result<Vec<WarrantLabel>> {
        Ok(predicted_labels(&self.probabilities(instances)?))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::with_model_stack;
    use crate::application::train_use_case::TrainConfig;
    use crate::ml::model::WarrantModelConfig;

    type TestBackend = burn::backend::NdArray;

    fn instance(id: &str, label: WarrantLabel) -> PaddedInstance {
        PaddedInstance {
            id:          id.into(),
            warrant0:    vec![0, 3, 4],
            warrant1:    vec![0, 5, 6],
            label,
            reason:      vec![3, 3, 3],
            claim:       vec![0, 0, 7],
            debate_meta: vec![0, 8, 9],
        }
    }

    #[test]
    fn test_threshold_for_single_scores() {
        let probs = vec![vec![0.2], vec![0.5], vec![0.51], vec![0.99]];
        assert_eq!(predicted_labels(&probs), vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_argmax_for_score_pairs() {
        let probs = vec![vec![0.7, 0.3], vec![0.1, 0.9]];
        assert_eq!(predicted_labels(&probs), vec![0, 1]);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[1, 0, 1, 1], &[1, 1, 1, 0]).unwrap(), 0.5);
        assert_eq!(accuracy(&[], &[]).unwrap(), 0.0);
        assert!(accuracy(&[1, 0], &[1]).is_err());
    }

    #[test]
    fn test_probabilities_keep_input_order_across_batches() {
        with_model_stack(|| {
            let device = Default::default();
            let model  = WarrantModelConfig::new(10, 4).with_lstm_size(4).init::<TestBackend>(&device);
            let rows: Vec<PaddedInstance> = (0..5).map(|i| instance(&i.to_string(), 0)).collect();

            let batched = predict_probabilities(&model, &rows, 2, &device).unwrap();
            let single  = predict_probabilities(&model, &rows, 5, &device).unwrap();
            assert_eq!(batched.len(), 5);
            for (a, b) in batched.iter().zip(&single) {
                assert!((a[0] - b[0]).abs() < 1e-5);
            }
        });
    }

    #[test]
    fn test_evaluate_empty_set() {
        with_model_stack(|| {
            let device = Default::default();
            let model  = WarrantModelConfig::new(10, 4).with_lstm_size(4).init::<TestBackend>(&device);
            let eval   = evaluate(&model, &[], 4, &device).unwrap();
            assert!(eval.loss.is_nan());
            assert_eq!(eval.accuracy, 0.0);
        });
    }

    #[test]
    fn test_inferencer_from_checkpoint() {
        with_model_stack(|| {
            let dir    = tempfile::tempdir().unwrap();
            let ckpt   = CheckpointManager::new(dir.path()).unwrap();
            let device = Default::default();

            let cfg = WarrantModelConfig::new(10, 4).with_lstm_size(4);
            ckpt.save_model_config(&cfg).unwrap();
            ckpt.save_train_config(&TrainConfig { batch_size: 2, ..TrainConfig::default() }).unwrap();
            ckpt.save_model(&cfg.init::<TestBackend>(&device), 0).unwrap();

            let inferencer = Inferencer::<TestBackend>::from_checkpoint(&ckpt, 0, device).unwrap();
            let labels     = inferencer.predict(&[instance("x", 1), instance("y", 0), instance("z", 1)]).unwrap();
            assert_eq!(labels.len(), 3);
            assert!(labels.iter().all(|l| *l <= 1));
        });
    }
}
