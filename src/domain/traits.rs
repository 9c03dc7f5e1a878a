// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer only talks to these traits, so a
// different corpus format or a different sentence encoder can
// be dropped in without touching the use cases.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::instance::Instance;
use crate::domain::vocabulary::Vocabulary;

// ─── InstanceSource ──────────────────────────────────────────────────────────
/// Anything that can produce encoded argument instances.
///
/// Implementations:
///   - TsvCorpus → one tab-separated corpus file (plain or gzipped)
pub trait InstanceSource {
    /// Load every instance, mapping words through `vocabulary`.
    fn load_instances(&self, vocabulary: &Vocabulary) -> Result<Vec<Instance>>;
}

// ─── SentenceEncoder ─────────────────────────────────────────────────────────
/// Turns a piece of text into a fixed-length vector so two texts
/// can be compared.
///
/// Implementations:
///   - MeanEmbeddingEncoder → average of the word vectors
pub trait SentenceEncoder {
    fn encode(&self, text: &str) -> Vec<f32>;
}
