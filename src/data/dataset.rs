// ============================================================
// Layer 4 — Warrant Dataset
// ============================================================
// Implements Burn's Dataset trait over padded instances held
// in memory; the DataLoader reads items by index from here and
// hands them to the WarrantBatcher.
//
// Reference: Burn Book §4 (Dataset)

use burn::data::dataset::Dataset;

use crate::domain::instance::PaddedInstance;

pub struct WarrantDataset {
    instances: Vec<PaddedInstance>,
}

impl WarrantDataset {
    pub fn new(instances: Vec<PaddedInstance>) -> Self {
        Self { instances }
    }
}

impl Dataset<PaddedInstance> for WarrantDataset {
    fn get(&self, index: usize) -> Option<PaddedInstance> {
        self.instances.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.instances.len()
    }
}
