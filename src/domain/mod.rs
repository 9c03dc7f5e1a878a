// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that define what the pipeline works on:
//
//   instance.rs   — one argument (claim, reason, two warrants)
//                   as token-index sequences, raw and padded
//   vocabulary.rs — word → index mapping with the reserved
//                   padding / start / OOV slots, and the
//                   index → embedding-vector table built from it
//   traits.rs     — seams the application layer programs against
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

pub mod instance;

pub mod vocabulary;

pub mod traits;
