// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Applies the model of one training run to a corpus file:
//
//   Step 1: Load train_config.json          (Layer 6 - infra)
//           → cache file, padding, nb_words
//   Step 2: Rebuild the vocabulary           (Layer 6 - infra)
//   Step 3: Load + pad the input corpus      (Layer 4 - data)
//   Step 4: Load model_config + weights      (Layer 5 - ml)
//   Step 5: Predict, score against the gold labels in the file,
//           write "id<TAB>label" lines
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::prelude::*;
use std::{io::Write, path::PathBuf};

use crate::domain::instance::WarrantLabel;
use crate::infra::{
    checkpoint::CheckpointManager,
    embeddings_cache::load_vocabulary_and_embeddings,
    io::create_writer,
};
use crate::ml::inferencer::{accuracy, InferBackend, Inferencer};

pub struct PredictUseCase {
    checkpoint_dir: PathBuf,
    input:          PathBuf,
    run:            usize,
    /// Overrides the cache file recorded at training time
    cache_file:     Option<PathBuf>,
    /// None → stdout
    output:         Option<PathBuf>,
}

/// Predictions for one input file, in file order.
#[derive(Debug, Clone)]
pub struct Predictions {
    pub ids:      Vec<String>,
    pub labels:   Vec<WarrantLabel>,
    pub accuracy: f64,
}

impl PredictUseCase {
    pub fn new(
        checkpoint_dir: impl Into<PathBuf>,
        input:          impl Into<PathBuf>,
        run:            usize,
        cache_file:     Option<PathBuf>,
        output:         Option<PathBuf>,
    ) -> Self {
        Self {
            checkpoint_dir: checkpoint_dir.into(),
            input:          input.into(),
            run,
            cache_file,
            output,
        }
    }

    pub fn execute(&self) -> Result<Predictions> {
        let device      = burn::backend::wgpu::WgpuDevice::default();
        let predictions = self.predict_on::<InferBackend>(device)?;

        let mut out: Box<dyn Write> = match &self.output {
            Some(path) => create_writer(path)?,
            None       => Box::new(std::io::stdout().lock()),
        };
        for (id, label) in predictions.ids.iter().zip(&predictions.labels) {
            writeln!(out, "{id}\t{label}")?;
        }
        out.flush().context("Cannot write predictions")?;

        if let Some(path) = &self.output {
            tracing::info!("Predictions written to '{}'", path.display());
        }
        println!("Accuracy: {:.3}", predictions.accuracy);
        Ok(predictions)
    }

    pub fn predict_on<B: Backend>(&self, device: B::Device) -> Result<Predictions> {
        let ckpt = CheckpointManager::new(&self.checkpoint_dir)?;
        let cfg  = ckpt.load_train_config()?;

        let cache = self.cache_file.as_ref().unwrap_or(&cfg.cache_file);
        let (vocabulary, _) = load_vocabulary_and_embeddings(cache, cfg.seed)?;

        let instances  = cfg.load_padded(&self.input, &vocabulary)?;
        let inferencer = Inferencer::<B>::from_checkpoint(&ckpt, self.run, device)?;
        let labels     = inferencer.predict(&instances)?;

        let gold: Vec<WarrantLabel> = instances.iter().map(|i| i.label).collect();
        Ok(Predictions {
            accuracy: accuracy(&gold, &labels)?,
            ids:      instances.into_iter().map(|i| i.id).collect(),
            labels,
        })
    }
}
