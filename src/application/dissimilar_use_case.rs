// ============================================================
// Layer 2 — DissimilarUseCase
// ============================================================
// Corpus-creation helper: pairs every reason with the reason
// that says the most different thing under the same stance.
//
//   input:  stance <TAB> reasonId <TAB> gist   (one per line)
//   output: reasonId <TAB> reasonId
//
// Per stance:
//   > 1 reason  → partner = reason of minimal cosine similarity
//                 (sentence vector = mean word embedding)
//   = 1 reason  → partner = random reason of a random other
//                 stance (seeded, so reruns give the same file)
//
// Reference: Rust Book §8 (Collections)

use anyhow::{bail, ensure, Context, Result};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::{
    collections::{BTreeMap, HashMap},
    io::Write,
    path::PathBuf,
};

use crate::data::tokenizer::tokenize;
use crate::domain::{traits::SentenceEncoder, vocabulary::WordVectors};
use crate::infra::{
    embeddings_cache::EmbeddingsCache,
    io::{create_writer, read_lines},
};

/// Seed of the random fallback pairing
pub const PAIRING_SEED: u64 = 1234;

/// stance → (reasonId → gist)
pub type StanceReasons = BTreeMap<String, BTreeMap<String, String>>;

// ─── Sentence vectors ────────────────────────────────────────────────────────

/// Sentence vector = mean of the vectors of its known words.
pub struct MeanEmbeddingEncoder {
    vectors:   WordVectors,
    dimension: usize,
}

impl MeanEmbeddingEncoder {
    pub fn new(vectors: WordVectors) -> Result<Self> {
        let dimension = match vectors.values().next() {
            Some(v) => v.len(),
            None    => bail!("No word vectors to build sentence vectors from"),
        };
        Ok(Self { vectors, dimension })
    }
}

impl SentenceEncoder for MeanEmbeddingEncoder {
    fn encode(&self, text: &str) -> Vec<f32> {
        let mut sum   = vec![0.0f32; self.dimension];
        let mut known = 0usize;
        for token in tokenize(text) {
            if let Some(vector) = self.vectors.get(&token) {
                for (s, v) in sum.iter_mut().zip(vector) {
                    *s += v;
                }
                known += 1;
            }
        }
        if known > 0 {
            sum.iter_mut().for_each(|s| *s /= known as f32);
        }
        sum
    }
}

/// Cosine of the angle between a and b; 0 when either is all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32    = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

// ─── Pairing ─────────────────────────────────────────────────────────────────

/// Group "stance<TAB>reasonId<TAB>gist" lines by stance.
pub fn parse_reasons(lines: &[String]) -> Result<StanceReasons> {
    let mut stances = StanceReasons::new();
    for (n, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        ensure!(
            fields.len() >= 3,
            "line {}: expected stance, reasonId and gist, found {} fields",
            n + 1,
            fields.len()
        );
        stances
            .entry(fields[0].to_string())
            .or_default()
            .insert(fields[1].to_string(), fields[2].to_string());
    }
    Ok(stances)
}

/// Each reason paired with its least similar sibling (ties → lowest id).
pub fn most_dissimilar<E: SentenceEncoder>(
    reasons: &BTreeMap<String, String>,
    encoder: &E,
) -> BTreeMap<String, String> {
    let vectors: Vec<(&String, Vec<f32>)> = reasons
        .iter()
        .map(|(id, gist)| (id, encoder.encode(gist)))
        .collect();

    let mut pairs = BTreeMap::new();
    for (i, (id, vector)) in vectors.iter().enumerate() {
        let mut best: Option<(&String, f32)> = None;
        for (j, (other, other_vector)) in vectors.iter().enumerate() {
            if i == j {
                continue;
            }
            let similarity = cosine_similarity(vector, other_vector);
            if best.map_or(true, |(_, s)| similarity < s) {
                best = Some((other, similarity));
            }
        }
        if let Some((other, similarity)) = best {
            tracing::debug!("{} ↔ {} similarity {:.4}", id, other, similarity);
            pairs.insert((*id).clone(), other.clone());
        }
    }
    pairs
}

/// Reasons of `stance` paired with a random reason of another stance.
pub fn random_pairs(
    stance:  &str,
    reasons: &BTreeMap<String, String>,
    all:     &StanceReasons,
    rng:     &mut StdRng,
) -> Result<BTreeMap<String, String>> {
    let others: Vec<&String> = all.keys().filter(|s| s.as_str() != stance).collect();
    let mut pairs = BTreeMap::new();

    for id in reasons.keys() {
        let Some(other_stance) = others.choose(rng) else {
            bail!("Stance '{}' has a single reason and there is no other stance to pair it with", stance);
        };
        let candidates: Vec<&String> = all[*other_stance].keys().collect();
        if let Some(partner) = candidates.choose(rng) {
            pairs.insert(id.clone(), (*partner).clone());
        }
    }
    Ok(pairs)
}

pub fn dissimilar_pairs<E: SentenceEncoder>(
    stances: &StanceReasons,
    encoder: &E,
    seed:    u64,
) -> Result<BTreeMap<String, String>> {
    let mut rng   = StdRng::seed_from_u64(seed);
    let mut pairs = BTreeMap::new();

    for (stance, reasons) in stances {
        if reasons.len() > 1 {
            pairs.extend(most_dissimilar(reasons, encoder));
        } else {
            pairs.extend(random_pairs(stance, reasons, stances, &mut rng)?);
        }
    }
    Ok(pairs)
}

// ─── DissimilarUseCase ────────────────────────────────────────────────────────
pub struct DissimilarUseCase {
    input:      PathBuf,
    output:     PathBuf,
    cache_file: PathBuf,
}

impl DissimilarUseCase {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, cache_file: impl Into<PathBuf>) -> Self {
        Self { input: input.into(), output: output.into(), cache_file: cache_file.into() }
    }

    pub fn execute(&self) -> Result<BTreeMap<String, String>> {
        let stances = parse_reasons(&read_lines(&self.input)?)
            .with_context(|| format!("Malformed reasons file '{}'", self.input.display()))?;
        tracing::info!("{} stances", stances.len());

        let mut sizes: HashMap<usize, usize> = HashMap::new();
        for reasons in stances.values() {
            *sizes.entry(reasons.len()).or_insert(0) += 1;
        }
        tracing::info!("Stances per reason count: {:?}", sizes);

        let encoder = MeanEmbeddingEncoder::new(EmbeddingsCache::load(&self.cache_file)?.vectors)?;
        let pairs   = dissimilar_pairs(&stances, &encoder, PAIRING_SEED)?;

        let mut out = create_writer(&self.output)?;
        for (id, partner) in &pairs {
            writeln!(out, "{id}\t{partner}")?;
        }
        out.flush()
            .with_context(|| format!("Cannot write '{}'", self.output.display()))?;

        tracing::info!("Saved to '{}'", self.output.display());
        Ok(pairs)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vocabulary::WordFrequencies;
    use std::fs;

    fn encoder() -> MeanEmbeddingEncoder {
        let vectors: WordVectors = [
            ("guns".to_string(),  vec![1.0, 0.0]),
            ("kill".to_string(),  vec![1.0, 0.2]),
            ("peace".to_string(), vec![0.0, 1.0]),
            ("love".to_string(),  vec![-0.2, 1.0]),
        ]
        .into_iter()
        .collect();
        MeanEmbeddingEncoder::new(vectors).unwrap()
    }

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_mean_of_known_words() {
        let v = encoder().encode("guns peace unknownword");
        assert_eq!(v, vec![0.5, 0.5]);
        assert_eq!(encoder().encode("nothing known"), vec![0.0, 0.0]);
    }

    #[test]
    fn test_cosine() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_parse_reasons_groups_by_stance() {
        let stances = parse_reasons(&lines("pro\tr1\tguns kill\npro\tr2\tpeace\ncon\tr3\tlove\n")).unwrap();
        assert_eq!(stances.len(), 2);
        assert_eq!(stances["pro"].len(), 2);
        assert!(parse_reasons(&lines("pro\tr1\n")).is_err());
    }

    #[test]
    fn test_pairs_least_similar_within_stance() {
        let stances = parse_reasons(&lines(
            "pro\tr1\tguns kill\npro\tr2\tguns\npro\tr3\tpeace love\n",
        ))
        .unwrap();
        let pairs = dissimilar_pairs(&stances, &encoder(), PAIRING_SEED).unwrap();
        assert_eq!(pairs["r1"], "r3");
        assert_eq!(pairs["r2"], "r3");
        // only r2 points away from r3
        assert_eq!(pairs["r3"], "r2");
    }

    #[test]
    fn test_single_reason_gets_a_partner_from_another_stance() {
        let stances = parse_reasons(&lines("pro\tr1\tguns\npro\tr2\tpeace\ncon\tr9\tlove\n")).unwrap();
        let pairs   = dissimilar_pairs(&stances, &encoder(), PAIRING_SEED).unwrap();
        assert!(["r1", "r2"].contains(&pairs["r9"].as_str()));

        let again = dissimilar_pairs(&stances, &encoder(), PAIRING_SEED).unwrap();
        assert_eq!(pairs, again);
    }

    #[test]
    fn test_lonely_stance_without_others_fails() {
        let stances = parse_reasons(&lines("pro\tr1\tguns\n")).unwrap();
        assert!(dissimilar_pairs(&stances, &encoder(), PAIRING_SEED).is_err());
    }

    #[test]
    fn test_execute_writes_pairs() {
        let dir   = tempfile::tempdir().unwrap();
        let input = dir.path().join("reasons.tsv");
        let out   = dir.path().join("pairs.tsv");
        let cache = dir.path().join("cache.bin.gz");
        fs::write(&input, "pro\tr1\tguns kill\npro\tr2\tpeace love\n").unwrap();
        EmbeddingsCache { frequencies: WordFrequencies::new(), vectors: encoder().vectors }
            .save(&cache)
            .unwrap();

        DissimilarUseCase::new(&input, &out, &cache).execute().unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "r1\tr2\nr2\tr1\n");
    }
}
