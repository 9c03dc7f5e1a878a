// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full experiment in order:
//
//   Step 1: Load vocabulary + embeddings cache   (Layer 6 - infra)
//   Step 2: Load train / dev / test corpora      (Layer 4 - data)
//   Step 3: Pad every sequence to max_len        (Layer 4 - data)
//   Step 4: Save configs for prediction          (Layer 6 - infra)
//   Step 5: For each run:
//             seed → build model → fit → save weights
//             → predict dev / test → accuracies  (Layer 5 - ml)
//   Step 6: Print the report over all runs
//
// Repeated runs with different seeds show how much of the
// result is randomness.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{Context, Result};
use burn::{module::AutodiffModule, tensor::backend::AutodiffBackend};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashSet},
    fs,
    path::{Path, PathBuf},
};

use crate::data::{
    encoder::{pad_instances, PadSide, PaddingConfig},
    loader::{lines_with_ids, TsvCorpus},
};
use crate::domain::{
    instance::{PaddedInstance, WarrantLabel},
    traits::InstanceSource,
    vocabulary::Vocabulary,
};
use crate::infra::{
    checkpoint::CheckpointManager,
    embeddings_cache::load_vocabulary_and_embeddings,
    metrics::MetricsLogger,
};
use crate::ml::{
    inferencer::{accuracy, Inferencer},
    model::{Architecture, WarrantModelConfig},
    trainer::{fit, seed_backend, TrainBackend},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Serialisable so it can be saved next to the checkpoints and
// reloaded by `predict`, which needs the same cache, padding and
// vocabulary limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub cache_file:       PathBuf,
    pub train_file:       PathBuf,
    pub dev_file:         PathBuf,
    pub test_file:        PathBuf,
    pub checkpoint_dir:   PathBuf,
    pub max_len:          usize,
    pub padding:          PadSide,
    pub truncating:       PadSide,
    /// Keep only the N most frequent words; the rest become OOV
    pub nb_words:         Option<usize>,
    pub batch_size:       usize,
    pub epochs:           usize,
    pub learning_rate:    f64,
    /// Tail fraction of the training file held out each epoch
    pub validation_split: f64,
    pub runs:             usize,
    /// Run i (starting at 1) is seeded with seed + i
    pub seed:             u64,
    pub lstm_size:        usize,
    pub dropout:          f64,
    pub architecture:     Architecture,
    pub rich_context:     bool,
    /// Optional JSON file receiving the full report
    pub report:           Option<PathBuf>,
    /// Print the misclassified dev lines of the last run
    pub show_errors:      bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            cache_file:       PathBuf::from("embeddings_cache_file_word2vec.bin.gz"),
            train_file:       PathBuf::from("data/train-w-swap.tsv"),
            dev_file:         PathBuf::from("data/dev.tsv"),
            test_file:        PathBuf::from("data/test.tsv"),
            checkpoint_dir:   PathBuf::from("checkpoints"),
            max_len:          100,
            padding:          PadSide::Pre,
            truncating:       PadSide::Pre,
            nb_words:         None,
            batch_size:       32,
            epochs:           5,
            learning_rate:    1e-3,
            validation_split: 0.1,
            runs:             3,
            seed:             12345,
            lstm_size:        64,
            dropout:          0.9,
            architecture:     Architecture::IntraWarrant,
            rich_context:     true,
            report:           None,
            show_errors:      false,
        }
    }
}

impl TrainConfig {
    pub fn padding_config(&self) -> PaddingConfig {
        PaddingConfig { max_len: self.max_len, padding: self.padding, truncating: self.truncating }
    }

    pub fn model_config(&self, vocab_size: usize, embedding_dim: usize) -> WarrantModelConfig {
        WarrantModelConfig::new(vocab_size, embedding_dim)
            .with_lstm_size(self.lstm_size)
            .with_dropout(self.dropout)
            .with_architecture(self.architecture)
            .with_rich_context(self.rich_context)
    }

    /// Load a corpus file and pad it with this config's settings.
    pub fn load_padded(&self, path: &Path, vocabulary: &Vocabulary) -> Result<Vec<PaddedInstance>> {
        let instances = TsvCorpus::new(path, self.nb_words).load_instances(vocabulary)?;
        Ok(pad_instances(&instances, &self.padding_config()))
    }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// Everything one run produced on dev and test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run:                   usize,
    pub seed:                  u64,
    pub acc_dev:               f64,
    pub acc_test:              f64,
    pub ids_dev:               Vec<String>,
    pub gold_labels_dev:       Vec<WarrantLabel>,
    pub predicted_labels_dev:  Vec<WarrantLabel>,
    pub ids_test:              Vec<String>,
    pub gold_labels_test:      Vec<WarrantLabel>,
    pub predicted_labels_test: Vec<WarrantLabel>,
}

impl RunReport {
    /// (correctly, incorrectly) classified dev ids
    pub fn dev_outcome(&self) -> (BTreeSet<String>, BTreeSet<String>) {
        let mut good  = BTreeSet::new();
        let mut wrong = BTreeSet::new();
        for ((gold, predicted), id) in self
            .gold_labels_dev
            .iter()
            .zip(&self.predicted_labels_dev)
            .zip(&self.ids_dev)
        {
            if gold == predicted {
                good.insert(id.clone());
            } else {
                wrong.insert(id.clone());
            }
        }
        (good, wrong)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainReport {
    pub runs: Vec<RunReport>,
}

impl TrainReport {
    /// Accuracy rows first, then per run the good / wrong dev ids.
    pub fn render(&self) -> String {
        let join = |ids: BTreeSet<String>| ids.into_iter().collect::<Vec<_>>().join(", ");

        let mut out = String::from("Acc dev\n");
        for r in &self.runs {
            out.push_str(&format!("{:.3}\t", r.acc_dev));
        }
        out.push_str("\nAcc test\n");
        for r in &self.runs {
            out.push_str(&format!("{:.3}\t", r.acc_test));
        }
        out.push_str("\nInstances correct\n");
        for r in &self.runs {
            let (good, wrong) = r.dev_outcome();
            out.push_str(&format!("Good_ids\t{{{}}}\n", join(good)));
            out.push_str(&format!("Wrong_ids\t{{{}}}\n", join(wrong)));
        }
        out
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run the experiment on the GPU backend and print the report.
    pub fn execute(&self) -> Result<TrainReport> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);

        let report = self.execute_on::<TrainBackend>(&device)?;
        print!("{}", report.render());

        if let Some(path) = &self.config.report {
            let json = serde_json::to_string_pretty(&report)?;
            fs::write(path, json)
                .with_context(|| format!("Cannot write report to '{}'", path.display()))?;
            tracing::info!("Report written to '{}'", path.display());
        }

        if self.config.show_errors {
            if let Some(last) = report.runs.last() {
                let (_, wrong) = last.dev_outcome();
                let ids: HashSet<String> = wrong.into_iter().collect();
                for line in lines_with_ids(&self.config.dev_file, &ids)? {
                    println!("{line}");
                }
            }
        }

        Ok(report)
    }

    /// The whole pipeline on any autodiff backend.
    pub fn execute_on<B: AutodiffBackend>(&self, device: &B::Device) -> Result<TrainReport> {
        let cfg = &self.config;

        // ── Step 1: Vocabulary and embedding table ────────────────────────────
        let (vocabulary, table) = load_vocabulary_and_embeddings(&cfg.cache_file, cfg.seed)?;
        tracing::info!(
            "Vocabulary of {} words, embeddings of dimension {}",
            vocabulary.word_count(),
            table.dimension()
        );

        // ── Step 2 + 3: Load and pad the three corpora ────────────────────────
        tracing::info!("Loading data...");
        let train = cfg.load_padded(&cfg.train_file, &vocabulary)?;
        let dev   = cfg.load_padded(&cfg.dev_file, &vocabulary)?;
        let test  = cfg.load_padded(&cfg.test_file, &vocabulary)?;
        tracing::info!("{} train, {} dev, {} test instances", train.len(), dev.len(), test.len());

        // ── Step 4: Save configs for prediction ───────────────────────────────
        let model_cfg = cfg.model_config(table.len(), table.dimension());
        let ckpt      = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt.save_model_config(&model_cfg)?;
        ckpt.save_train_config(cfg)?;
        let metrics = MetricsLogger::new(ckpt.dir())?;

        // ── Step 5: Runs ──────────────────────────────────────────────────────
        let mut report = TrainReport::default();
        for run in 1..=cfg.runs {
            let seed = cfg.seed + run as u64;
            println!("Run: {run}");
            seed_backend::<B>(device, seed);

            let model = model_cfg.init_with_embeddings::<B>(&table, device);
            let model = fit(model, cfg, train.clone(), run, seed, Some(&metrics), device)?;
            ckpt.save_model(&model, run)?;

            let inferencer = Inferencer::new(model.valid(), cfg.batch_size, device.clone());
            let predicted_dev  = inferencer.predict(&dev)?;
            let predicted_test = inferencer.predict(&test)?;

            let gold_dev:  Vec<WarrantLabel> = dev.iter().map(|i| i.label).collect();
            let gold_test: Vec<WarrantLabel> = test.iter().map(|i| i.label).collect();
            let acc_dev  = accuracy(&gold_dev, &predicted_dev)?;
            let acc_test = accuracy(&gold_test, &predicted_test)?;
            println!("Dev accuracy: {acc_dev}");
            println!("Test accuracy: {acc_test}");

            report.runs.push(RunReport {
                run,
                seed,
                acc_dev,
                acc_test,
                ids_dev:               dev.iter().map(|i| i.id.clone()).collect(),
                gold_labels_dev:       gold_dev,
                predicted_labels_dev:  predicted_dev,
                ids_test:              test.iter().map(|i| i.id.clone()).collect(),
                gold_labels_test:      gold_test,
                predicted_labels_test: predicted_test,
            });
        }

        tracing::info!("Metrics written to '{}'", metrics.csv_path().display());
        Ok(report)
    }
}
