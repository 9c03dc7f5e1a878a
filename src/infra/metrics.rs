// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch of
// each run, so learning curves of repeated runs can be compared.
//
// Example CSV output:
//   run,epoch,train_loss,train_acc,val_loss,val_acc
//   1,1,0.693100,0.502000,0.692400,0.511000
//   1,2,0.688700,0.534000,0.690100,0.529000
//   ...
//   2,1,0.693300,0.498000,0.692900,0.505000
//
// A held-out validation part may be empty (validation_split 0),
// in which case val_loss is NaN and val_acc is 0.
//
// Each `train` invocation starts the file over, so the run numbers
// in it always belong to the latest experiment.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

const HEADER: &str = "run,epoch,train_loss,train_acc,val_loss,val_acc";

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Run index (starts at 1)
    pub run: usize,

    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average binary cross-entropy over the training batches
    pub train_loss: f64,

    /// Fraction of training instances classified correctly
    pub train_acc: f64,

    /// Average binary cross-entropy on the held-out part
    pub val_loss: f64,

    /// Fraction of held-out instances classified correctly
    pub val_acc: f64,
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Starts a fresh CSV holding only the header, replacing the
    /// metrics of any earlier experiment in the same directory.
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create directory '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "{HEADER}")?;
        tracing::debug!("Started metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{},{:.6},{:.6},{:.6},{:.6}",
            m.run, m.epoch, m.train_loss, m.train_acc, m.val_loss, m.val_acc,
        )?;

        tracing::debug!(
            "Logged run {} epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.run, m.epoch, m.train_loss, m.val_loss,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(run: usize, epoch: usize, val_loss: f64) -> EpochMetrics {
        EpochMetrics { run, epoch, train_loss: 0.69, train_acc: 0.5, val_loss, val_acc: 0.5 }
    }

    #[test]
    fn test_rows_are_appended_under_one_header() {
        let dir = tempfile::tempdir().unwrap();

        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&metrics(1, 1, 0.7)).unwrap();
        logger.log(&metrics(2, 1, 0.65)).unwrap();

        let text  = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert!(lines[1].starts_with("1,1,"));
        assert!(lines[2].starts_with("2,1,"));
    }

    #[test]
    fn test_a_new_experiment_starts_the_file_over() {
        let dir = tempfile::tempdir().unwrap();

        let first = MetricsLogger::new(dir.path()).unwrap();
        first.log(&metrics(1, 1, 0.7)).unwrap();
        first.log(&metrics(1, 2, 0.6)).unwrap();

        let second = MetricsLogger::new(dir.path()).unwrap();
        second.log(&metrics(1, 1, 0.5)).unwrap();

        let text  = fs::read_to_string(second.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![HEADER, "1,1,0.690000,0.500000,0.500000,0.500000"]);
    }
}
