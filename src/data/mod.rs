// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw corpus text to tensor batches:
//
//   corpus .tsv / .tsv.gz
//       │
//       ▼
//   loader      → splits lines into fields, validates them
//       │
//       ▼
//   tokenizer   → casual word tokens, ASCII-folded
//       │
//       ▼
//   encoder     → vocabulary indices (OOV-aware), then padding
//       │
//       ▼
//   splitter    → training / held-out validation rows
//       │
//       ▼
//   dataset     → Burn Dataset over padded instances
//       │
//       ▼
//   batcher     → five [batch, max_len] Int tensors + labels
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads and validates tab-separated corpus files
pub mod loader;

/// Casual text tokenizer shared by vocabulary building and encoding
pub mod tokenizer;

/// Text → index sequences, and fixed-length padding
pub mod encoder;

/// Implements Burn's Dataset trait for padded instances
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Holds out the tail of the training data for validation
pub mod splitter;
