// ============================================================
// Layer 4 — Sequence Encoder
// ============================================================
// Turns text into the fixed-length integer sequences the model
// consumes, in two pure steps:
//
//   1. string_to_indices  text → tokens → vocabulary indices
//                         (unknown words become OOV = 2)
//   2. pad_sequence       any length → exactly max_len
//
// Padding defaults to the usual deep-learning convention:
// zeros go on the LEFT and over-long sequences lose their
// FIRST tokens, so the end of every text stays next to the
// final recurrent step.
//
//   max_len = 5, seq = [7, 8, 9]            → [0, 0, 7, 8, 9]
//   max_len = 3, seq = [4, 5, 6, 7, 8]      → [6, 7, 8]

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::data::tokenizer::tokenize;
use crate::domain::instance::{Instance, PaddedInstance};
use crate::domain::vocabulary::{Vocabulary, OOV_INDEX, PADDING_INDEX};

/// Tokenize `text` and map each token to its vocabulary index.
///
/// Words missing from the vocabulary map to OOV. When `nb_words`
/// is given, every index at or above it is treated as OOV too,
/// which caps the effective vocabulary to the most frequent words.
pub fn string_to_indices(text: &str, vocabulary: &Vocabulary, nb_words: Option<usize>) -> Vec<u32> {
    tokenize(text)
        .iter()
        .map(|word| vocabulary.index_of(word).unwrap_or(OOV_INDEX))
        .map(|index| match nb_words {
            Some(cap) if index as usize >= cap => OOV_INDEX,
            _ => index,
        })
        .collect()
}

/// Which end of a sequence padding is added to, or tokens are cut from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PadSide {
    Pre,
    Post,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaddingConfig {
    pub max_len:    usize,
    pub padding:    PadSide,
    pub truncating: PadSide,
}

impl PaddingConfig {
    pub fn new(max_len: usize) -> Self {
        Self { max_len, padding: PadSide::Pre, truncating: PadSide::Pre }
    }
}

/// Pad or truncate `seq` to exactly `config.max_len` items.
pub fn pad_sequence(seq: &[u32], config: &PaddingConfig) -> Vec<u32> {
    let max_len = config.max_len;

    // ── Truncate ─────────────────────────────────────────────────────────────
    let kept: &[u32] = if seq.len() > max_len {
        match config.truncating {
            PadSide::Pre  => &seq[seq.len() - max_len..],
            PadSide::Post => &seq[..max_len],
        }
    } else {
        seq
    };

    // ── Pad ──────────────────────────────────────────────────────────────────
    let fill = max_len - kept.len();
    let mut out = Vec::with_capacity(max_len);
    match config.padding {
        PadSide::Pre => {
            out.resize(fill, PADDING_INDEX);
            out.extend_from_slice(kept);
        }
        PadSide::Post => {
            out.extend_from_slice(kept);
            out.resize(max_len, PADDING_INDEX);
        }
    }
    out
}

/// Pad all five sequences of an instance with the same config.
pub fn pad_instance(instance: &Instance, config: &PaddingConfig) -> PaddedInstance {
    PaddedInstance {
        id:          instance.id.clone(),
        warrant0:    pad_sequence(&instance.warrant0, config),
        warrant1:    pad_sequence(&instance.warrant1, config),
        label:       instance.label,
        reason:      pad_sequence(&instance.reason, config),
        claim:       pad_sequence(&instance.claim, config),
        debate_meta: pad_sequence(&instance.debate_meta, config),
    }
}

pub fn pad_instances(instances: &[Instance], config: &PaddingConfig) -> Vec<PaddedInstance> {
    instances.iter().map(|i| pad_instance(i, config)).collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vocabulary::WordFrequencies;

    fn vocab() -> Vocabulary {
        let freqs: WordFrequencies = [("the", 10u64), ("claim", 5), ("is", 4), ("true", 1)]
            .iter()
            .map(|(w, c)| (w.to_string(), *c))
            .collect();
        Vocabulary::from_frequencies(&freqs)
    }

    #[test]
    fn test_known_words_map_to_their_indices() {
        assert_eq!(string_to_indices("the claim is true", &vocab(), None), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_unknown_words_become_oov() {
        assert_eq!(string_to_indices("the moon", &vocab(), None), vec![3, OOV_INDEX]);
    }

    #[test]
    fn test_nb_words_caps_the_vocabulary() {
        // index 5 ("is") and 6 ("true") are at or above the cap of 5
        assert_eq!(
            string_to_indices("the claim is true", &vocab(), Some(5)),
            vec![3, 4, OOV_INDEX, OOV_INDEX]
        );
    }

    #[test]
    fn test_pre_padding_and_pre_truncation_by_default() {
        let cfg = PaddingConfig::new(5);
        assert_eq!(pad_sequence(&[7, 8, 9], &cfg), vec![0, 0, 7, 8, 9]);

        let cfg = PaddingConfig::new(3);
        assert_eq!(pad_sequence(&[4, 5, 6, 7, 8], &cfg), vec![6, 7, 8]);
    }

    #[test]
    fn test_post_padding_and_post_truncation() {
        let cfg = PaddingConfig { max_len: 4, padding: PadSide::Post, truncating: PadSide::Post };
        assert_eq!(pad_sequence(&[1, 2], &cfg), vec![1, 2, 0, 0]);
        assert_eq!(pad_sequence(&[1, 2, 3, 4, 5, 6], &cfg), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_padded_length_is_always_max_len() {
        for max_len in [1usize, 2, 7, 50] {
            for len in 0..60usize {
                let seq: Vec<u32> = (0..len as u32).collect();
                for padding in [PadSide::Pre, PadSide::Post] {
                    for truncating in [PadSide::Pre, PadSide::Post] {
                        let cfg = PaddingConfig { max_len, padding, truncating };
                        assert_eq!(pad_sequence(&seq, &cfg).len(), max_len);
                    }
                }
            }
        }
    }

    #[test]
    fn test_pad_instance_pads_every_field() {
        let inst = Instance {
            id:          "1".into(),
            warrant0:    vec![3],
            warrant1:    vec![4, 5],
            label:       1,
            reason:      vec![3, 3, 3],
            claim:       vec![6],
            debate_meta: vec![3, 4, 5, 6, 3, 4],
        };
        let padded = pad_instance(&inst, &PaddingConfig::new(4));
        assert_eq!(padded.seq_len(), 4);
        assert_eq!(padded.warrant1, vec![0, 0, 4, 5]);
        assert_eq!(padded.debate_meta, vec![5, 6, 3, 4]);
        assert_eq!(padded.label, 1);
    }
}
