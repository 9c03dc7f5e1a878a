// ============================================================
// Layer 5 — Attention LSTM
// ============================================================
// An LSTM whose per-step outputs are pooled by additive
// attention, where the attention is steered by an external
// context vector (here: what the reason and claim say).
//
//   h_t     = LSTM(x)_t                       [batch, seq, hidden]
//   m_t     = tanh(U·h_t + W·context)         [batch, seq, hidden]
//   score_t = w·m_t                           [batch, seq]
//   α       = softmax(score) over real tokens [batch, seq]
//   out     = Σ_t α_t · h_t                   [batch, hidden]
//
// Padding positions get a score of -1e9 before the softmax so
// they receive (numerically) zero weight.
//
// Reference: Tan et al. (2016) Improved Representation Learning
//            for Question Answer Matching

use burn::{
    nn::{Linear, LinearConfig, Lstm, LstmConfig},
    prelude::*,
    tensor::activation::softmax,
};

/// Score given to padding steps before the softmax / max-pool
pub const MASKED_SCORE: f64 = -1.0e9;

#[derive(Config, Debug)]
pub struct AttentionLstmConfig {
    /// Width of each input step
    pub d_input:   usize,
    /// LSTM hidden size, also the output width
    pub d_hidden:  usize,
    /// Width of the steering context vector
    pub d_context: usize,
}

impl AttentionLstmConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> AttentionLstm<B> {
        AttentionLstm {
            lstm:               LstmConfig::new(self.d_input, self.d_hidden, true).init(device),
            state_projection:   LinearConfig::new(self.d_hidden, self.d_hidden).init(device),
            context_projection: LinearConfig::new(self.d_context, self.d_hidden)
                .with_bias(false)
                .init(device),
            score:              LinearConfig::new(self.d_hidden, 1).with_bias(false).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct AttentionLstm<B: Backend> {
    lstm:               Lstm<B>,
    state_projection:   Linear<B>,
    context_projection: Linear<B>,
    score:              Linear<B>,
}

impl<B: Backend> AttentionLstm<B> {
    /// input: [batch, seq, d_input], padding: [batch, seq] (true = pad),
    /// context: [batch, d_context] → [batch, d_hidden]
    pub fn forward(
        &self,
        input:   Tensor<B, 3>,
        padding: Tensor<B, 2, Bool>,
        context: Tensor<B, 2>,
    ) -> Tensor<B, 2> {
        let (states, _) = self.lstm.forward(input, None);
        let [batch, seq, hidden] = states.dims();

        let steering = self
            .context_projection
            .forward(context)
            .reshape([batch, 1, hidden])
            .expand([batch, seq, hidden]);
        let mixed = (self.state_projection.forward(states.clone()) + steering).tanh();

        let scores  = self.score.forward(mixed).reshape([batch, seq]);
        let weights = softmax(scores.mask_fill(padding, MASKED_SCORE), 1);

        (states * weights.reshape([batch, seq, 1]).expand([batch, seq, hidden]))
            .sum_dim(1)
            .reshape([batch, hidden])
    }
}

/// Max over time, ignoring padding: [batch, seq, d] → [batch, d]
pub fn masked_max<B: Backend>(states: Tensor<B, 3>, padding: Tensor<B, 2, Bool>) -> Tensor<B, 2> {
    let [batch, seq, width] = states.dims();
    let mask = padding.reshape([batch, seq, 1]).expand([batch, seq, width]);
    states
        .mask_fill(mask, MASKED_SCORE)
        .max_dim(1)
        .reshape([batch, width])
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::with_model_stack;
    use burn::tensor::TensorData;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_output_shape() {
        with_model_stack(|| {
            let device = Default::default();
            let layer  = AttentionLstmConfig::new(4, 3, 6).init::<TestBackend>(&device);

            let input   = Tensor::<TestBackend, 3>::ones([2, 5, 4], &device);
            let padding = Tensor::<TestBackend, 2, Int>::from_ints([[0, 0, 1, 1, 1], [1, 1, 1, 1, 1]], &device)
                .equal_elem(0);
            let context = Tensor::<TestBackend, 2>::zeros([2, 6], &device);

            assert_eq!(layer.forward(input, padding, context).dims(), [2, 3]);
        });
    }

    #[test]
    fn test_masked_max_ignores_padding() {
        let device = Default::default();
        let states = Tensor::<TestBackend, 3>::from_data(
            TensorData::new(vec![9.0f32, 9.0, 1.0, 2.0, 3.0, -1.0], [1, 3, 2]),
            &device,
        );
        // first step is padding; its 9.0 values must not win
        let padding = Tensor::<TestBackend, 2, Int>::from_ints([[0, 5, 6]], &device).equal_elem(0);

        let pooled: Vec<f32> = masked_max(states, padding).into_data().convert::<f32>().to_vec().unwrap();
        assert_eq!(pooled, vec![3.0, 2.0]);
    }
}
