// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// The neural part of the pipeline:
//
//   attention.rs  — LSTM with context-steered attention pooling,
//                   plus masked max pooling over time
//
//   model.rs      — The warrant classifier: BiLSTM encoders for
//                   reason / claim / debate, one attention LSTM
//                   per warrant, a small dense head on their sum
//
//   trainer.rs    — The training loop of one run
//                   forward pass, binary cross-entropy, backward
//                   pass, Adam step, per-epoch validation
//
//   inferencer.rs — Ordered prediction, label decisions, accuracy
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Attention LSTM and masked pooling
pub mod attention;

/// Warrant classifier architecture
pub mod model;

/// Training loop with validation and metrics
pub mod trainer;

/// Prediction, label decisions and accuracy
pub mod inferencer;

/// Runs a test body on a thread with a 64 MiB stack. Unoptimised
/// builds of the LSTM forward and backward passes overflow the
/// 2 MiB default of the test harness threads.
#[cfg(test)]
pub(crate) fn with_model_stack<F>(test: F)
where
    F: FnOnce() + Send + 'static,
{
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(test)
        .expect("spawn test thread");
    if let Err(panic) = handle.join() {
        std::panic::resume_unwind(panic);
    }
}
