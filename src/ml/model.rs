// ============================================================
// Layer 5 — Warrant Classifier
// ============================================================
// Given a reason, a claim, the debate title + info and two
// candidate warrants, score how likely warrant1 is the correct
// one (label 1) rather than warrant0 (label 0).
//
//   reason ─► BiLSTM ─► max ─┐
//   claim  ─► BiLSTM ─► max ─┤
//   debate ─► BiLSTM ─► max ─┤ (rich context only)
//                            ▼
//                        context ──┬───────────────┐
//                                  ▼               ▼
//   warrant0 ─► [BiLSTM] ─► AttentionLSTM   AttentionLSTM ◄─ [BiLSTM] ◄─ warrant1
//                                  │               │
//                                  └──── sum ──────┘
//                                         ▼
//                       dropout → dense(h/2, relu) → dense(1)
//                                         ▼
//                                 logit of label 1
//
// Architectures:
//   attention      warrants go straight from the embedding into
//                  their attention LSTM; context = reason, claim
//                  (+ debate)
//   intra-warrant  each warrant first gets its own BiLSTM and the
//                  context of warrant i also includes the pooled
//                  other warrant; context = reason, claim,
//                  other warrant (+ debate)
//
// All five inputs share one embedding table initialised from
// the pretrained vectors. Every "max" is a max over time that
// skips padding positions (index 0).
//
// Reference: Habernal et al. (2018) The Argument Reasoning
//            Comprehension Task, SemEval-2018 Task 12
//            Burn Book §3 (Building Blocks)

use burn::{
    module::Param,
    nn::{
        loss::BinaryCrossEntropyLossConfig,
        BiLstm, BiLstmConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::{activation::{relu, sigmoid}, TensorData},
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::data::batcher::WarrantBatch;
use crate::domain::vocabulary::{EmbeddingTable, PADDING_INDEX};
use crate::ml::attention::{masked_max, AttentionLstm, AttentionLstmConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Architecture {
    Attention,
    IntraWarrant,
}

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
#[derive(Config, Debug)]
pub struct WarrantModelConfig {
    /// Rows of the embedding table (words + padding/start/OOV)
    pub vocab_size:    usize,
    pub embedding_dim: usize,
    #[config(default = 64)]
    pub lstm_size:     usize,
    #[config(default = 0.9)]
    pub dropout:       f64,
    #[config(default = "Architecture::IntraWarrant")]
    pub architecture:  Architecture,
    /// Feed the debate title + info into the attention context
    #[config(default = true)]
    pub rich_context:  bool,
}

impl WarrantModelConfig {
    /// Randomly initialised model; the shape matches a checkpoint of
    /// the same config, so this is also the target of `load_record`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> WarrantModel<B> {
        let hidden   = self.lstm_size;
        let bilstm   = || BiLstmConfig::new(self.embedding_dim, hidden, true).init::<B>(device);
        let intra    = self.architecture == Architecture::IntraWarrant;

        // every pooled BiLSTM block is 2 × hidden wide
        let blocks    = 2 + usize::from(intra) + usize::from(self.rich_context);
        let d_context = blocks * 2 * hidden;
        let d_input   = if intra { 2 * hidden } else { self.embedding_dim };
        let attention = AttentionLstmConfig::new(d_input, hidden, d_context);
        let d_dense   = (hidden / 2).max(1);

        WarrantModel {
            embedding:        EmbeddingConfig::new(self.vocab_size, self.embedding_dim).init(device),
            reason_encoder:   bilstm(),
            claim_encoder:    bilstm(),
            debate_encoder:   self.rich_context.then(bilstm),
            warrant0_encoder: intra.then(bilstm),
            warrant1_encoder: intra.then(bilstm),
            attention0:       attention.init(device),
            attention1:       attention.init(device),
            dropout:          DropoutConfig::new(self.dropout).init(),
            dense:            LinearConfig::new(hidden, d_dense).init(device),
            output:           LinearConfig::new(d_dense, 1).init(device),
        }
    }

    /// Model whose embedding rows are the given table.
    pub fn init_with_embeddings<B: Backend>(
        &self,
        table:  &EmbeddingTable,
        device: &B::Device,
    ) -> WarrantModel<B> {
        let mut model = self.init(device);
        let weights = Tensor::<B, 2>::from_data(
            TensorData::new(table.to_flat(), [table.len(), table.dimension()]),
            device,
        );
        model.embedding.weight = Param::from_tensor(weights);
        model
    }
}

#[derive(Module, Debug)]
pub struct WarrantModel<B: Backend> {
    embedding:        Embedding<B>,
    reason_encoder:   BiLstm<B>,
    claim_encoder:    BiLstm<B>,
    debate_encoder:   Option<BiLstm<B>>,
    warrant0_encoder: Option<BiLstm<B>>,
    warrant1_encoder: Option<BiLstm<B>>,
    attention0:       AttentionLstm<B>,
    attention1:       AttentionLstm<B>,
    dropout:          Dropout,
    dense:            Linear<B>,
    output:           Linear<B>,
}

impl<B: Backend> WarrantModel<B> {
    /// [vocab_size, embedding_dim]
    pub fn embedding_weights(&self) -> Tensor<B, 2> {
        self.embedding.weight.val()
    }

    fn embed(&self, ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        self.embedding.forward(ids)
    }

    fn encode(&self, encoder: &BiLstm<B>, ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        encoder.forward(self.embed(ids), None).0
    }

    /// Returns the logit of label 1, shape [batch, 1].
    pub fn forward(&self, batch: WarrantBatch<B>) -> Tensor<B, 2> {
        let WarrantBatch { warrant0, warrant1, reason, claim, debate, .. } = batch;

        let pad = |ids: &Tensor<B, 2, Int>| ids.clone().equal_elem(PADDING_INDEX as i64);
        let (pad_w0, pad_w1) = (pad(&warrant0), pad(&warrant1));

        let reason_pooled = masked_max(self.encode(&self.reason_encoder, reason.clone()), pad(&reason));
        let claim_pooled  = masked_max(self.encode(&self.claim_encoder, claim.clone()), pad(&claim));
        let debate_pooled = self
            .debate_encoder
            .as_ref()
            .map(|encoder| masked_max(self.encode(encoder, debate.clone()), pad(&debate)));

        let context = |other: Option<Tensor<B, 2>>| {
            let mut parts = vec![reason_pooled.clone(), claim_pooled.clone()];
            parts.extend(other);
            parts.extend(debate_pooled.clone());
            Tensor::cat(parts, 1)
        };

        let (attended0, attended1) = match (&self.warrant0_encoder, &self.warrant1_encoder) {
            (Some(encoder0), Some(encoder1)) => {
                let states0 = self.encode(encoder0, warrant0);
                let states1 = self.encode(encoder1, warrant1);
                let context0 = context(Some(masked_max(states1.clone(), pad_w1.clone())));
                let context1 = context(Some(masked_max(states0.clone(), pad_w0.clone())));
                (
                    self.attention0.forward(states0, pad_w0, context0),
                    self.attention1.forward(states1, pad_w1, context1),
                )
            }
            _ => {
                let shared = context(None);
                (
                    self.attention0.forward(self.embed(warrant0), pad_w0, shared.clone()),
                    self.attention1.forward(self.embed(warrant1), pad_w1, shared),
                )
            }
        };

        let x = self.dropout.forward(attended0 + attended1);
        let x = relu(self.dense.forward(x));
        self.output.forward(x)
    }

    /// Binary cross-entropy on the logits; returns (loss, logits).
    pub fn forward_loss(&self, batch: WarrantBatch<B>) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let labels = batch.labels.clone();
        let logits = self.forward(batch);
        let loss   = BinaryCrossEntropyLossConfig::new()
            .with_logits(true)
            .init(&logits.device())
            .forward(logits.clone(), labels);
        (loss, logits)
    }

    /// Probability of label 1, shape [batch, 1].
    pub fn forward_probabilities(&self, batch: WarrantBatch<B>) -> Tensor<B, 2> {
        sigmoid(self.forward(batch))
    }
}
