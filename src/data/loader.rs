// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Reads the tab-separated argument corpus.
//
// Line format (8 fields, first line of the file is a header):
//
//   #id  warrant0  warrant1  correctLabelW0orW1  reason  claim  debateTitle  debateInfo
//
// Each text field is tokenised and mapped to vocabulary
// indices; debate title and info are joined into one sequence.
// A line that breaks the format stops the whole load: a
// silently skipped row would shift every reported accuracy.
//
// Reference: Rust Book §9 (Error Handling)

use anyhow::{bail, ensure, Context, Result};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use crate::data::encoder::string_to_indices;
use crate::domain::instance::{Instance, WarrantLabel};
use crate::domain::traits::InstanceSource;
use crate::domain::vocabulary::Vocabulary;
use crate::infra::io::read_lines;

/// Number of tab-separated fields per corpus line
pub const FIELD_COUNT: usize = 8;

/// One corpus file on disk.
pub struct TsvCorpus {
    path:     PathBuf,
    /// Indices at or above this cap are encoded as OOV
    nb_words: Option<usize>,
}

impl TsvCorpus {
    pub fn new(path: impl Into<PathBuf>, nb_words: Option<usize>) -> Self {
        Self { path: path.into(), nb_words }
    }
}

impl InstanceSource for TsvCorpus {
    fn load_instances(&self, vocabulary: &Vocabulary) -> Result<Vec<Instance>> {
        ensure!(!vocabulary.is_empty(), "vocabulary is empty");

        let lines = read_lines(&self.path)?;
        let mut instances = Vec::with_capacity(lines.len().saturating_sub(1));

        // skip(1): the header line
        for (n, line) in lines.iter().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let instance = parse_instance(line, vocabulary, self.nb_words)
                .with_context(|| format!("{}:{}", self.path.display(), n + 1))?;
            instances.push(instance);
        }

        tracing::info!("Loaded {} instances from '{}'", instances.len(), self.path.display());
        Ok(instances)
    }
}

/// Parse and encode one corpus line.
pub fn parse_instance(line: &str, vocabulary: &Vocabulary, nb_words: Option<usize>) -> Result<Instance> {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
    if fields.len() != FIELD_COUNT {
        bail!("expected {} tab-separated fields, found {}", FIELD_COUNT, fields.len());
    }

    let encode = |text: &str| string_to_indices(text, vocabulary, nb_words);

    let id       = fields[0].to_string();
    let warrant0 = encode(fields[1]);
    let warrant1 = encode(fields[2]);
    let label    = parse_label(fields[3])?;
    let reason   = encode(fields[4]);
    let claim    = encode(fields[5]);

    let mut debate_meta = encode(fields[6]);
    debate_meta.extend(encode(fields[7]));

    ensure!(!id.is_empty(),          "empty instance id");
    ensure!(!warrant0.is_empty(),    "instance '{}': warrant0 has no tokens", id);
    ensure!(!warrant1.is_empty(),    "instance '{}': warrant1 has no tokens", id);
    ensure!(!reason.is_empty(),      "instance '{}': reason has no tokens", id);
    ensure!(!claim.is_empty(),       "instance '{}': claim has no tokens", id);
    ensure!(!debate_meta.is_empty(), "instance '{}': debate title and info have no tokens", id);

    Ok(Instance { id, warrant0, warrant1, label, reason, claim, debate_meta })
}

fn parse_label(field: &str) -> Result<WarrantLabel> {
    match field.trim() {
        "0" => Ok(0),
        "1" => Ok(1),
        other => bail!("correct-label field must be 0 or 1, found '{}'", other),
    }
}

/// (id, correct label) of every line, header excluded. The text
/// fields are not tokenised, so no vocabulary is needed.
pub fn read_gold_labels(path: &Path) -> Result<Vec<(String, WarrantLabel)>> {
    let mut gold = Vec::new();
    for (n, line) in read_lines(path)?.iter().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        ensure!(
            fields.len() == FIELD_COUNT,
            "{}:{}: expected {} tab-separated fields, found {}",
            path.display(), n + 1, FIELD_COUNT, fields.len()
        );
        let label = parse_label(fields[3]).with_context(|| format!("{}:{}", path.display(), n + 1))?;
        gold.push((fields[0].to_string(), label));
    }
    Ok(gold)
}

/// Return the raw lines (header excluded) whose id is in `ids`,
/// in file order. Used to print misclassified instances.
pub fn lines_with_ids(path: &Path, ids: &HashSet<String>) -> Result<Vec<String>> {
    Ok(read_lines(path)?
        .into_iter()
        .skip(1)
        .filter(|line| {
            line.split('\t')
                .next()
                .map(|id| ids.contains(id))
                .unwrap_or(false)
        })
        .collect())
}
