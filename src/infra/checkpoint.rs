// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights with Burn's named MessagePack
// recorder, gzip compressed and at full f32 precision so that a
// reloaded run predicts exactly what it scored during training.
//
// Every training run produces its own model, so weights are
// stored per run next to the two configs needed to rebuild it:
//
//   checkpoints/
//     model_config.json     ← WarrantModelConfig (architecture)
//     train_config.json     ← TrainConfig (data + optimiser)
//     model_run_1.mpk.gz    ← weights of run 1
//     model_run_2.mpk.gz    ← weights of run 2
//     ...
//     metrics.csv           ← see infra::metrics
//
// Loading weights fails if the architecture in model_config.json
// does not match the saved record.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{anyhow, Context, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{WarrantModel, WarrantModelConfig};

const MODEL_CONFIG: &str = "model_config.json";
const TRAIN_CONFIG: &str = "train_config.json";

type WeightsRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn model_path(&self, run: usize) -> PathBuf {
        // the recorder adds the .mpk.gz extension
        self.dir.join(format!("model_run_{run}"))
    }

    /// Write the weights of one run to {dir}/model_run_{run}.mpk.gz
    pub fn save_model<B: Backend>(&self, model: &WarrantModel<B>, run: usize) -> Result<()> {
        let path = self.model_path(run);
        WeightsRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        tracing::debug!("Saved checkpoint: run {}", run);
        Ok(())
    }

    /// Restore the weights of one run into a freshly initialised model.
    pub fn load_model<B: Backend>(
        &self,
        model:  WarrantModel<B>,
        run:    usize,
        device: &B::Device,
    ) -> Result<WarrantModel<B>> {
        let path = self.model_path(run);
        tracing::info!("Loading checkpoint of run {}", run);

        let record = WeightsRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    pub fn save_model_config(&self, cfg: &WarrantModelConfig) -> Result<()> {
        let path = self.dir.join(MODEL_CONFIG);
        cfg.save(&path)
            .with_context(|| format!("Cannot write model config to '{}'", path.display()))?;
        tracing::debug!("Saved model config to '{}'", path.display());
        Ok(())
    }

    pub fn load_model_config(&self) -> Result<WarrantModelConfig> {
        let path = self.dir.join(MODEL_CONFIG);
        WarrantModelConfig::load(&path).map_err(|e| {
            anyhow!(
                "Cannot read model config from '{}': {:?}. Make sure you have run 'train' before 'predict'.",
                path.display(),
                e
            )
        })
    }

    pub fn save_train_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(TRAIN_CONFIG);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// The prediction side needs max_len, nb_words and the cache path
    /// the model was trained with.
    pub fn load_train_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(TRAIN_CONFIG);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure you have run 'train' before 'predict'.",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed training config '{}'", path.display()))
    }
}
