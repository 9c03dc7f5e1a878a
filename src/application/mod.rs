// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// goal per command:
//
//   train_use_case      — repeated training runs on the corpus,
//                         dev / test accuracy report
//   predict_use_case    — apply a saved run to a corpus file
//   baseline_use_case   — seeded coin-flip labels, the chance
//                         level in the same report layout
//   dissimilar_use_case — pair reasons with their least similar
//                         sibling (corpus creation helper)
//
// Rules for this layer:
//   - No ML math or model code here
//   - Only workflow coordination and result reporting
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// Prediction with a trained checkpoint
pub mod predict_use_case;

// Random baseline
pub mod baseline_use_case;

// Dissimilar reason pairing
pub mod dissimilar_use_case;
