// ============================================================
// Layer 6 — Embeddings Cache
// ============================================================
// Loading a multi-GB pretrained embedding file for every
// experiment would take minutes, so the vectors the corpus
// needs are extracted once and cached:
//
//   corpus dirs ──► word frequencies ─┐
//                                      ├──► cache file (.bin.gz)
//   embeddings file ──► vectors for ──┘
//                       corpus words
//
// Cache file layout: gzip( bincode( EmbeddingsCache ) ), i.e.
// the pair (word → frequency, word → vector).
//
// At experiment time the cache is turned into the Vocabulary
// and the EmbeddingTable (see domain::vocabulary).

use anyhow::{bail, Context, Result};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter},
    path::{Path, PathBuf},
};

use crate::data::loader::FIELD_COUNT;
use crate::data::tokenizer::tokenize;
use crate::domain::vocabulary::{EmbeddingTable, Vocabulary, WordFrequencies, WordVectors};
use crate::infra::embeddings_file::{extract_vectors, EmbeddingsFormat};
use crate::infra::io::open_reader;

/// Corpus fields whose text goes into the vocabulary: everything
/// except the id (0) and the label (3).
const TEXT_FIELDS: [usize; 6] = [1, 2, 4, 5, 6, 7];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingsCache {
    pub frequencies: WordFrequencies,
    pub vectors:     WordVectors,
}

impl EmbeddingsCache {
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Cannot create cache file '{}'", path.display()))?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());

        bincode::serialize_into(&mut encoder, self)
            .with_context(|| format!("Cannot serialise cache to '{}'", path.display()))?;
        encoder
            .finish()
            .with_context(|| format!("Cannot finish writing '{}'", path.display()))?;

        tracing::info!("Saved to '{}'", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        tracing::info!("Loading cached vocabulary and embeddings...");
        let file = File::open(path)
            .with_context(|| format!(
                "Cannot open cache file '{}'. Run 'build-cache' first.",
                path.display()
            ))?;
        let cache: Self = bincode::deserialize_from(GzDecoder::new(BufReader::new(file)))
            .with_context(|| format!("Cannot deserialise cache file '{}'", path.display()))?;

        tracing::info!(
            "Cached vocabulary ({} words) and embeddings ({} vectors) loaded from '{}'",
            cache.frequencies.len(),
            cache.vectors.len(),
            path.display()
        );
        Ok(cache)
    }

    /// Build the index mappings. `seed` fixes the random start/OOV vectors.
    pub fn to_vocabulary_and_embeddings(&self, seed: u64) -> Result<(Vocabulary, EmbeddingTable)> {
        let vocabulary = Vocabulary::from_frequencies(&self.frequencies);
        let mut rng    = StdRng::seed_from_u64(seed);
        let table      = EmbeddingTable::build(&vocabulary, &self.vectors, &mut rng)?;
        Ok((vocabulary, table))
    }
}

/// Load a cache file and build (Vocabulary, EmbeddingTable) from it.
pub fn load_vocabulary_and_embeddings(path: &Path, seed: u64) -> Result<(Vocabulary, EmbeddingTable)> {
    EmbeddingsCache::load(path)?.to_vocabulary_and_embeddings(seed)
}

// ─── Frequency counting ──────────────────────────────────────────────────────

fn is_corpus_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("csv") | Some("tsv") | Some("gz")
    )
}

/// All corpus files directly inside the given directories, sorted.
pub fn list_input_files(dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for dir in dirs {
        for entry in fs::read_dir(dir)
            .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && is_corpus_file(&path) {
                files.push(path);
            } else {
                tracing::debug!("Ignoring '{}'", path.display());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Count token frequencies over the text fields of every line.
pub fn count_frequencies(files: &[PathBuf]) -> Result<WordFrequencies> {
    let mut frequencies = WordFrequencies::new();

    for path in files {
        let reader = open_reader(path)?;
        for (n, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Cannot read '{}'", path.display()))?;
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < FIELD_COUNT {
                bail!(
                    "{}:{}: expected {} tab-separated fields, found {}",
                    path.display(), n + 1, FIELD_COUNT, fields.len()
                );
            }

            let text = TEXT_FIELDS
                .iter()
                .map(|&i| fields[i])
                .collect::<Vec<_>>()
                .join(" ");

            for word in tokenize(&text) {
                *frequencies.entry(word).or_insert(0) += 1;
            }
        }
        tracing::debug!("Counted '{}'", path.display());
    }

    Ok(frequencies)
}

/// Build the cache from corpus directories and a pretrained embeddings file.
pub fn prepare_cache(
    input_dirs: &[PathBuf],
    output:     &Path,
    embeddings: &Path,
    format:     EmbeddingsFormat,
) -> Result<EmbeddingsCache> {
    let files = list_input_files(input_dirs)?;
    tracing::info!("Corpus files: {:?}", files);

    let frequencies = count_frequencies(&files)?;
    tracing::info!("{} vocabulary size loaded", frequencies.len());

    let vectors = extract_vectors(embeddings, format, |w| frequencies.contains_key(w))?;
    tracing::info!("{} words with embeddings found", vectors.len());

    let cache = EmbeddingsCache { frequencies, vectors };
    cache.save(output)?;
    Ok(cache)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    const ROW: &str = "1\tguns kill\tguns protect\t1\tsafety first\tban guns\tGun laws\tShould we ban guns";

    #[test]
    fn test_counts_only_text_fields() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.tsv");
        fs::write(&path, format!("{ROW}\n")).unwrap();

        let freqs = count_frequencies(&[path]).unwrap();
        assert_eq!(freqs["guns"], 4);
        assert_eq!(freqs["ban"], 2);
        // id "1" and label "1" are not counted
        assert!(!freqs.contains_key("1"));
    }

    #[test]
    fn test_short_line_fails() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.tsv");
        fs::write(&path, "1\tonly\tfour\tfields\n").unwrap();
        assert!(count_frequencies(&[path]).is_err());
    }

    #[test]
    fn test_list_input_files_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.tsv", "a.csv", "c.tsv.gz", "notes.md"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let files = list_input_files(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.tsv", "c.tsv.gz"]);
    }

    #[test]
    fn test_prepare_cache_then_load_mappings() {
        let dir    = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("corpus");
        fs::create_dir(&corpus).unwrap();
        fs::write(corpus.join("train.tsv"), format!("{ROW}\n")).unwrap();

        let glove = dir.path().join("glove.txt");
        fs::write(&glove, "guns 1 0\nban 0 1\nunrelated 5 5\n").unwrap();

        let out   = dir.path().join("cache.bin.gz");
        let built = prepare_cache(&[corpus], &out, &glove, EmbeddingsFormat::Glove).unwrap();
        assert_eq!(built.vectors.len(), 2);

        let loaded = EmbeddingsCache::load(&out).unwrap();
        assert_eq!(loaded, built);

        let (vocab, table) = load_vocabulary_and_embeddings(&out, 3).unwrap();
        // "guns" is the most frequent word
        assert_eq!(vocab.index_of("guns"), Some(3));
        assert_eq!(table.row(3).unwrap(), &[1.0, 0.0]);
        assert_eq!(table.len(), vocab.len());
    }

    #[test]
    fn test_missing_cache_mentions_build_cache() {
        let err = EmbeddingsCache::load(Path::new("/nonexistent/cache.bin.gz")).unwrap_err();
        assert!(err.to_string().contains("build-cache"));
    }
}
