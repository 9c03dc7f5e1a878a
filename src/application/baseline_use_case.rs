// ============================================================
// Layer 2 — BaselineUseCase
// ============================================================
// The chance level the trained classifier has to beat: every
// instance gets a coin-flip label. Runs are numbered and seeded
// exactly like `train` (run i uses seed + i), and the report has
// the same layout, so the two outputs line up column by column.
//
// No vocabulary, embeddings or model are involved; only the ids
// and gold labels of the dev and test files are read.
//
// Reference: Rust Book §8 (Collections)

use anyhow::{Context, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::{RunReport, TrainReport};
use crate::data::loader::read_gold_labels;
use crate::domain::instance::WarrantLabel;
use crate::ml::inferencer::accuracy;

/// `count` labels drawn uniformly from {0, 1}.
pub fn coin_flip_labels(count: usize, rng: &mut StdRng) -> Vec<WarrantLabel> {
    (0..count).map(|_| rng.gen_range(0..=1)).collect()
}

pub struct BaselineUseCase {
    dev_file:  PathBuf,
    test_file: PathBuf,
    runs:      usize,
    seed:      u64,
    report:    Option<PathBuf>,
}

impl BaselineUseCase {
    pub fn new(
        dev_file:  impl Into<PathBuf>,
        test_file: impl Into<PathBuf>,
        runs:      usize,
        seed:      u64,
        report:    Option<PathBuf>,
    ) -> Self {
        Self { dev_file: dev_file.into(), test_file: test_file.into(), runs, seed, report }
    }

    /// Print the report and optionally save it as JSON.
    pub fn execute(&self) -> Result<TrainReport> {
        let report = self.evaluate()?;
        print!("{}", report.render());

        if let Some(path) = &self.report {
            let json = serde_json::to_string_pretty(&report)?;
            fs::write(path, json)
                .with_context(|| format!("Cannot write report to '{}'", path.display()))?;
            tracing::info!("Report written to '{}'", path.display());
        }
        Ok(report)
    }

    pub fn evaluate(&self) -> Result<TrainReport> {
        let (ids_dev, gold_dev): (Vec<String>, Vec<WarrantLabel>) =
            read_gold_labels(&self.dev_file)?.into_iter().unzip();
        let (ids_test, gold_test): (Vec<String>, Vec<WarrantLabel>) =
            read_gold_labels(&self.test_file)?.into_iter().unzip();
        tracing::info!("Random baseline on {} dev, {} test instances", ids_dev.len(), ids_test.len());

        let mut report = TrainReport::default();
        for run in 1..=self.runs {
            let seed    = self.seed + run as u64;
            let mut rng = StdRng::seed_from_u64(seed);

            let predicted_dev  = coin_flip_labels(gold_dev.len(), &mut rng);
            let predicted_test = coin_flip_labels(gold_test.len(), &mut rng);

            report.runs.push(RunReport {
                run,
                seed,
                acc_dev:               accuracy(&gold_dev, &predicted_dev)?,
                acc_test:              accuracy(&gold_test, &predicted_test)?,
                ids_dev:               ids_dev.clone(),
                gold_labels_dev:       gold_dev.clone(),
                predicted_labels_dev:  predicted_dev,
                ids_test:              ids_test.clone(),
                gold_labels_test:      gold_test.clone(),
                predicted_labels_test: predicted_test,
            });
        }
        Ok(report)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "#id\twarrant0\twarrant1\tcorrectLabelW0orW1\treason\tclaim\tdebateTitle\tdebateInfo";

    fn corpus(dir: &std::path::Path, name: &str, rows: usize) -> PathBuf {
        let mut text = format!("{HEADER}\n");
        for i in 0..rows {
            text.push_str(&format!("{name}{i}\tyes\tno\t{}\tsafety\tban guns\ttitle\tinfo\n", i % 2));
        }
        let path = dir.join(format!("{name}.tsv"));
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_coin_flips_are_binary_and_seeded() {
        let a = coin_flip_labels(200, &mut StdRng::seed_from_u64(5));
        let b = coin_flip_labels(200, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
        assert!(a.iter().all(|l| *l <= 1));
        // both labels show up in 200 fair flips
        assert!(a.contains(&0) && a.contains(&1));
    }

    #[test]
    fn test_runs_are_seeded_like_training() {
        let dir  = tempfile::tempdir().unwrap();
        let dev  = corpus(dir.path(), "dev", 40);
        let test = corpus(dir.path(), "test", 30);

        let report = BaselineUseCase::new(&dev, &test, 2, 100, None).evaluate().unwrap();
        assert_eq!(report.runs.len(), 2);
        assert_eq!(report.runs[0].seed, 101);
        assert_eq!(report.runs[1].seed, 102);
        assert_eq!(report.runs[0].ids_dev[3], "dev3");
        assert_eq!(report.runs[0].predicted_labels_test.len(), 30);
        for run in &report.runs {
            assert!((0.0..=1.0).contains(&run.acc_dev));
            assert!((0.0..=1.0).contains(&run.acc_test));
        }

        let again = BaselineUseCase::new(&dev, &test, 2, 100, None).evaluate().unwrap();
        assert_eq!(again.runs[1].predicted_labels_dev, report.runs[1].predicted_labels_dev);
    }

    #[test]
    fn test_report_is_written_as_json() {
        let dir  = tempfile::tempdir().unwrap();
        let dev  = corpus(dir.path(), "dev", 4);
        let test = corpus(dir.path(), "test", 4);
        let json = dir.path().join("baseline.json");

        BaselineUseCase::new(&dev, &test, 1, 12345, Some(json.clone())).execute().unwrap();
        let saved: TrainReport = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(saved.runs.len(), 1);
    }
}
