// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Holds out the LAST `fraction` of the training samples for
// validation during fitting. No shuffle happens first: the split
// is reproducible and always the same rows are held out, no
// matter which run seed is in use.
//
//   100 samples, fraction = 0.1 → train = [0..90], val = [90..100]

/// Split `samples` into (train, validation), the validation part
/// taken from the end.
pub fn split_validation<T>(mut samples: Vec<T>, fraction: f64) -> (Vec<T>, Vec<T>) {
    let total    = samples.len();
    let fraction = fraction.clamp(0.0, 1.0);

    // floor on the training side, the remainder is validation
    let split_at = ((total as f64) * (1.0 - fraction)).floor() as usize;
    let split_at = split_at.min(total);

    let val = samples.split_off(split_at);

    tracing::debug!(
        "Validation split: {} training, {} validation",
        samples.len(),
        val.len(),
    );

    (samples, val)
}
