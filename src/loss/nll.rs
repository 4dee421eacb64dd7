/// Negative log-likelihood loss for use with a log-softmax output layer.
pub struct NllLoss;

impl NllLoss {
    /// Computes the scalar loss:
    ///   L = -sum(target[i] * log_probs[i])
    ///
    /// `log_probs` — log-probabilities from the network, shape [n_classes]
    /// `target`    — one-hot (or soft) target distribution, shape [n_classes]
    pub fn loss(log_probs: &[f64], target: &[f64]) -> f64 {
        log_probs
            .iter()
            .zip(target.iter())
            .map(|(lp, t)| -t * lp)
            .sum()
    }

    /// Gradient of the combined log-softmax + NLL with respect to the
    /// pre-softmax logits:
    ///   ∂L/∂z_i = exp(log_probs[i]) - target[i]
    ///
    /// This is the initial delta fed into the backward pass. The log-softmax
    /// activation's own derivative step is identity so the combined gradient
    /// is not double-applied.
    pub fn derivative(log_probs: &[f64], target: &[f64]) -> Vec<f64> {
        log_probs
            .iter()
            .zip(target.iter())
            .map(|(lp, t)| lp.exp() - t)
            .collect()
    }
}

/// One-hot encodes a class index into a vector of `n_classes` elements.
pub fn one_hot(class: usize, n_classes: usize) -> Vec<f64> {
    assert!(class < n_classes, "class index out of range");
    let mut v = vec![0.0; n_classes];
    v[class] = 1.0;
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_picks_out_the_target_log_probability() {
        // Uniform over 4 classes: log_probs are all ln(1/4).
        let lp = vec![(0.25f64).ln(); 4];
        let target = one_hot(2, 4);
        assert!((NllLoss::loss(&lp, &target) - (4.0f64).ln()).abs() < 1e-12);
    }

    #[test]
    fn derivative_is_probability_minus_target() {
        let lp = vec![(0.5f64).ln(), (0.25f64).ln(), (0.25f64).ln()];
        let target = one_hot(0, 3);
        let d = NllLoss::derivative(&lp, &target);
        assert!((d[0] - (0.5 - 1.0)).abs() < 1e-12);
        assert!((d[1] - 0.25).abs() < 1e-12);
        assert!((d[2] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn derivative_sums_to_zero_for_one_hot_targets() {
        let lp = vec![(0.7f64).ln(), (0.2f64).ln(), (0.1f64).ln()];
        let d = NllLoss::derivative(&lp, &one_hot(1, 3));
        assert!(d.iter().sum::<f64>().abs() < 1e-12);
    }
}
