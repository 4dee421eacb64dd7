use crate::network::network::Network;

/// Plain stochastic gradient descent.
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies one update to every layer from its accumulated gradients,
    /// scaled by `1 / batch_size` to average over the mini-batch. The
    /// accumulators are left intact; the training loop resets them with
    /// `zero_grad()` before the next batch.
    pub fn step(&self, network: &mut Network, batch_size: usize) {
        let grad_scale = 1.0 / batch_size as f64;
        for layer in network.layers_mut() {
            layer.apply_update(self.learning_rate, grad_scale);
        }
    }
}
