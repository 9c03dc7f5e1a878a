// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles the file-level concerns shared by the other layers:
//
//   io.rs               — Plain / gzipped file readers and writers
//                         (corpus files, embedding files, outputs)
//
//   embeddings_file.rs  — Pretrained word-vector files
//                         GloVe text, word2vec text and word2vec
//                         binary; extracts the corpus words only
//
//   embeddings_cache.rs — The prepared (frequencies, vectors) cache
//                         Built once by 'build-cache', loaded by
//                         every experiment to produce the
//                         Vocabulary and EmbeddingTable
//
//   checkpoint.rs       — Saving and loading model weights per run
//                         with Burn's gzipped MessagePack recorder, plus the
//                         model and training configs as JSON
//
//   metrics.rs          — Per-epoch metrics appended to a CSV file
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Gzip-aware file reading and writing
pub mod io;

/// Pretrained embedding file readers
pub mod embeddings_file;

/// Vocabulary + embeddings cache
pub mod embeddings_cache;

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
