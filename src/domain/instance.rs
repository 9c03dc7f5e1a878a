// ============================================================
// Layer 3 — Argument Instances
// ============================================================
// One row of the corpus: a claim, the reason given for it, and
// two candidate warrants of which exactly one is correct.
//
// Every text field has already been tokenised and mapped to
// vocabulary indices by the time an Instance exists.

use serde::{Deserialize, Serialize};

/// Which of the two warrants is the correct one.
pub type WarrantLabel = u8;

/// A single instance with variable-length index sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id:          String,
    pub warrant0:    Vec<u32>,
    pub warrant1:    Vec<u32>,
    /// 0 → warrant0 is correct, 1 → warrant1 is correct
    pub label:       WarrantLabel,
    pub reason:      Vec<u32>,
    pub claim:       Vec<u32>,
    /// Debate title tokens followed by debate info tokens
    pub debate_meta: Vec<u32>,
}

/// The same instance after every sequence has been padded or
/// truncated to one fixed length. This is what the model sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddedInstance {
    pub id:          String,
    pub warrant0:    Vec<u32>,
    pub warrant1:    Vec<u32>,
    pub label:       WarrantLabel,
    pub reason:      Vec<u32>,
    pub claim:       Vec<u32>,
    pub debate_meta: Vec<u32>,
}

impl PaddedInstance {
    /// Length shared by all five sequences
    pub fn seq_len(&self) -> usize {
        self.warrant0.len()
    }
}
