// ============================================================
// Layer 3 — Vocabulary and Embedding Table
// ============================================================
// Two lookups drive the whole pipeline:
//
//   Vocabulary      word  → index
//   EmbeddingTable  index → vector
//
// Index layout:
//   0  padding            (all-zero vector)
//   1  start of sequence  (random vector, drawn once)
//   2  out-of-vocabulary  (random vector, drawn once)
//   3… corpus words, most frequent first
//
// A corpus word that has no pretrained vector keeps its own
// index but shares the OOV vector.

use anyhow::{bail, Result};
use rand::Rng;
use std::collections::{BTreeMap, HashMap};

/// Corpus word → number of occurrences
pub type WordFrequencies = BTreeMap<String, u64>;

/// Word → pretrained embedding vector
pub type WordVectors = BTreeMap<String, Vec<f32>>;

pub const PADDING_INDEX: u32 = 0;
pub const START_INDEX:   u32 = 1;
pub const OOV_INDEX:     u32 = 2;

/// Number of reserved indices before the first corpus word
pub const INDEX_OFFSET: usize = 3;

/// Half-width of the uniform range the start/OOV vectors are drawn from
const RANDOM_VECTOR_SCALE: f32 = 0.1;

// ─── Vocabulary ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct Vocabulary {
    word_to_index: HashMap<String, u32>,
    /// Corpus words in index order; `words[i]` has index `i + INDEX_OFFSET`
    words:         Vec<String>,
}

impl Vocabulary {
    /// Assign indices by descending frequency. Equal frequencies are
    /// ordered by the word itself so the mapping is reproducible.
    pub fn from_frequencies(frequencies: &WordFrequencies) -> Self {
        let mut ranked: Vec<(&String, u64)> = frequencies
            .iter()
            .map(|(w, &c)| (w, c))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let words: Vec<String> = ranked.into_iter().map(|(w, _)| w.clone()).collect();
        let word_to_index = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), (i + INDEX_OFFSET) as u32))
            .collect();

        Self { word_to_index, words }
    }

    pub fn index_of(&self, word: &str) -> Option<u32> {
        self.word_to_index.get(word).copied()
    }

    /// Corpus words in index order (reserved slots excluded)
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Number of distinct corpus words
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Total number of indices, reserved slots included.
    /// This is the row count of the matching EmbeddingTable.
    pub fn len(&self) -> usize {
        self.words.len() + INDEX_OFFSET
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

// ─── EmbeddingTable ──────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    dimension: usize,
    rows:      Vec<Vec<f32>>,
}

impl EmbeddingTable {
    /// Build one row per vocabulary index.
    ///
    /// The dimension is taken from the pretrained vectors, so an empty
    /// `vectors` map is rejected.
    pub fn build<R: Rng + ?Sized>(
        vocabulary: &Vocabulary,
        vectors:    &WordVectors,
        rng:        &mut R,
    ) -> Result<Self> {
        let dimension = match vectors.values().next() {
            Some(v) => v.len(),
            None    => bail!("no pretrained embeddings available; cannot infer the embedding dimension"),
        };

        let padding           = vec![0.0f32; dimension];
        let start_of_sequence = random_vector(dimension, rng);
        let oov               = random_vector(dimension, rng);

        let mut rows = Vec::with_capacity(vocabulary.len());
        rows.push(padding);
        rows.push(start_of_sequence);
        rows.push(oov.clone());

        let mut missing = 0usize;
        for word in vocabulary.words() {
            match vectors.get(word) {
                Some(v) if v.len() == dimension => rows.push(v.clone()),
                Some(v) => bail!(
                    "embedding for '{}' has dimension {}, expected {}",
                    word, v.len(), dimension
                ),
                None => {
                    missing += 1;
                    rows.push(oov.clone());
                }
            }
        }

        tracing::debug!(
            "Embedding table: {} rows x {} dims ({} words fall back to the OOV vector)",
            rows.len(), dimension, missing
        );

        Ok(Self { dimension, rows })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of rows (equals `Vocabulary::len`)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: u32) -> Option<&[f32]> {
        self.rows.get(index as usize).map(Vec::as_slice)
    }

    /// Row-major copy of the whole table, shape `[len, dimension]`
    pub fn to_flat(&self) -> Vec<f32> {
        self.rows.iter().flatten().copied().collect()
    }
}

fn random_vector<R: Rng + ?Sized>(dimension: usize, rng: &mut R) -> Vec<f32> {
    (0..dimension)
        .map(|_| 2.0 * RANDOM_VECTOR_SCALE * rng.gen::<f32>() - RANDOM_VECTOR_SCALE)
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn freqs(pairs: &[(&str, u64)]) -> WordFrequencies {
        pairs.iter().map(|(w, c)| (w.to_string(), *c)).collect()
    }

    #[test]
    fn test_indices_follow_descending_frequency() {
        let vocab = Vocabulary::from_frequencies(&freqs(&[("rare", 1), ("common", 9), ("mid", 4)]));
        assert_eq!(vocab.index_of("common"), Some(3));
        assert_eq!(vocab.index_of("mid"),    Some(4));
        assert_eq!(vocab.index_of("rare"),   Some(5));
        assert_eq!(vocab.index_of("absent"), None);
    }

    #[test]
    fn test_indices_are_a_bijection_starting_at_offset() {
        let vocab = Vocabulary::from_frequencies(&freqs(&[
            ("a", 3), ("b", 3), ("c", 1), ("d", 7), ("e", 2),
        ]));
        let mut seen: Vec<u32> = vocab.words().iter().filter_map(|w| vocab.index_of(w)).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![3, 4, 5, 6, 7]);
        assert_eq!(vocab.len(), 8);

        // frequency never increases along the index order
        let f = freqs(&[("a", 3), ("b", 3), ("c", 1), ("d", 7), ("e", 2)]);
        let counts: Vec<u64> = vocab.words().iter().map(|w| f[w]).collect();
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_ties_are_broken_by_word() {
        let vocab = Vocabulary::from_frequencies(&freqs(&[("zebra", 2), ("apple", 2)]));
        assert_eq!(vocab.index_of("apple"), Some(3));
        assert_eq!(vocab.index_of("zebra"), Some(4));
    }

    #[test]
    fn test_embedding_rows_for_reserved_and_missing_words() {
        let vocab = Vocabulary::from_frequencies(&freqs(&[("known", 5), ("unknown", 1)]));
        let mut vectors = WordVectors::new();
        vectors.insert("known".to_string(), vec![1.0, 2.0, 3.0]);

        let mut rng   = StdRng::seed_from_u64(7);
        let table     = EmbeddingTable::build(&vocab, &vectors, &mut rng).unwrap();

        assert_eq!(table.dimension(), 3);
        assert_eq!(table.len(), vocab.len());
        assert_eq!(table.row(PADDING_INDEX).unwrap(), &[0.0, 0.0, 0.0]);
        assert_eq!(table.row(3).unwrap(), &[1.0, 2.0, 3.0]);
        // the word without a pretrained vector shares the OOV row
        assert_eq!(table.row(4).unwrap(), table.row(OOV_INDEX).unwrap());
        assert_ne!(table.row(START_INDEX).unwrap(), table.row(OOV_INDEX).unwrap());
        for v in table.row(OOV_INDEX).unwrap() {
            assert!((-0.1..0.1).contains(v));
        }
        assert_eq!(table.to_flat().len(), table.len() * 3);
    }

    #[test]
    fn test_empty_vectors_are_rejected() {
        let vocab  = Vocabulary::from_frequencies(&freqs(&[("word", 1)]));
        let mut rng = StdRng::seed_from_u64(1);
        assert!(EmbeddingTable::build(&vocab, &WordVectors::new(), &mut rng).is_err());
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let vocab = Vocabulary::from_frequencies(&freqs(&[("a", 2), ("b", 1)]));
        let mut vectors = WordVectors::new();
        vectors.insert("a".to_string(), vec![0.5, 0.5]);
        vectors.insert("b".to_string(), vec![0.5]);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(EmbeddingTable::build(&vocab, &vectors, &mut rng).is_err());
    }
}
