// ============================================================
// Layer 4 — Warrant Batcher
// ============================================================
// Implements Burn's Batcher trait: stacks N padded instances
// into one tensor per model input.
//
//   Input:  Vec of N PaddedInstances, each sequence of length S
//   Output: WarrantBatch with five [N, S] Int tensors plus the
//           gold labels as an [N, 1] Int tensor
//
// All sequences are already padded to the same length, so a
// batch is just a flatten + reshape per field.
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::domain::instance::PaddedInstance;

/// A batch of instances ready for the forward pass.
#[derive(Debug, Clone)]
pub struct WarrantBatch<B: Backend> {
    /// [batch, seq_len]
    pub warrant0: Tensor<B, 2, Int>,
    /// [batch, seq_len]
    pub warrant1: Tensor<B, 2, Int>,
    /// [batch, seq_len]
    pub reason:   Tensor<B, 2, Int>,
    /// [batch, seq_len]
    pub claim:    Tensor<B, 2, Int>,
    /// [batch, seq_len]
    pub debate:   Tensor<B, 2, Int>,
    /// [batch, 1], 0 or 1
    pub labels:   Tensor<B, 2, Int>,
}

#[derive(Clone, Debug, Default)]
pub struct WarrantBatcher;

impl WarrantBatcher {
    pub fn new() -> Self {
        Self
    }
}

/// Flatten equally long rows and reshape to [rows, seq_len].
fn stack<'a, B: Backend>(
    rows:    impl Iterator<Item = &'a [u32]>,
    count:   usize,
    seq_len: usize,
    device:  &B::Device,
) -> Tensor<B, 2, Int> {
    let flat: Vec<i32> = rows.flat_map(|r| r.iter().map(|&x| x as i32)).collect();
    Tensor::<B, 1, Int>::from_ints(flat.as_slice(), device).reshape([count, seq_len])
}

impl<B: Backend> Batcher<B, PaddedInstance, WarrantBatch<B>> for WarrantBatcher {
    fn batch(&self, items: Vec<PaddedInstance>, device: &B::Device) -> WarrantBatch<B> {
        let count   = items.len();
        let seq_len = items.first().map(PaddedInstance::seq_len).unwrap_or(0);

        let warrant0 = stack::<B>(items.iter().map(|i| i.warrant0.as_slice()),    count, seq_len, device);
        let warrant1 = stack::<B>(items.iter().map(|i| i.warrant1.as_slice()),    count, seq_len, device);
        let reason   = stack::<B>(items.iter().map(|i| i.reason.as_slice()),      count, seq_len, device);
        let claim    = stack::<B>(items.iter().map(|i| i.claim.as_slice()),       count, seq_len, device);
        let debate   = stack::<B>(items.iter().map(|i| i.debate_meta.as_slice()), count, seq_len, device);

        let labels: Vec<i32> = items.iter().map(|i| i.label as i32).collect();
        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), device).reshape([count, 1]);

        WarrantBatch { warrant0, warrant1, reason, claim, debate, labels }
    }
}
