use crate::math::matrix::Matrix;

/// Activation applied after a layer's linear transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Rectified linear unit, applied element-wise after hidden layers.
    ReLU,
    /// Log-softmax is a vector-valued activation applied at the layer level
    /// (not element-wise) on the output layer, so that `exp` of the result
    /// sums to 1 across the output dimension.
    LogSoftmax,
}

impl Activation {
    /// Applies the activation to a `1 x n` pre-activation row.
    pub fn apply(&self, z: &Matrix) -> Matrix {
        match self {
            Activation::ReLU => z.map(|x| if x > 0.0 { x } else { 0.0 }),
            Activation::LogSoftmax => log_softmax(z),
        }
    }

    /// Element-wise derivative evaluated at the pre-activation value.
    ///
    /// For `LogSoftmax` the output layer is paired with negative
    /// log-likelihood and the combined gradient `exp(log_probs) - target` is
    /// already produced by `NllLoss::derivative()`. Returning `1.0` here lets
    /// the backward pass use that delta unchanged without double-applying
    /// the Jacobian.
    pub fn derivative(&self, z: f64) -> f64 {
        match self {
            Activation::ReLU => {
                if z > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::LogSoftmax => 1.0,
        }
    }
}

/// Numerically stable log-softmax over a `1 x n` row.
///
/// Subtracts the row maximum before exponentiating so that no intermediate
/// overflows; the result satisfies `sum(exp(out)) == 1` up to rounding.
fn log_softmax(z: &Matrix) -> Matrix {
    let max = z
        .values()
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);
    let log_sum_exp = z
        .values()
        .iter()
        .map(|&x| (x - max).exp())
        .sum::<f64>()
        .ln()
        + max;
    z.map(|x| x - log_sum_exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_zeroes_negatives_only() {
        let z = Matrix::row(&[-1.0, 0.0, 2.5]);
        let a = Activation::ReLU.apply(&z);
        assert_eq!(a.values(), &[0.0, 0.0, 2.5]);
        assert_eq!(Activation::ReLU.derivative(-1.0), 0.0);
        assert_eq!(Activation::ReLU.derivative(2.5), 1.0);
    }

    #[test]
    fn log_softmax_exponentiates_to_a_distribution() {
        let z = Matrix::row(&[1.0, 2.0, 3.0]);
        let out = Activation::LogSoftmax.apply(&z);
        let total: f64 = out.values().iter().map(|x| x.exp()).sum();
        assert!((total - 1.0).abs() < 1e-12);
        // Larger logits keep larger log-probabilities.
        assert!(out.at(0, 2) > out.at(0, 1) && out.at(0, 1) > out.at(0, 0));
    }

    #[test]
    fn log_softmax_survives_large_logits() {
        let z = Matrix::row(&[1000.0, 1000.0]);
        let out = Activation::LogSoftmax.apply(&z);
        let total: f64 = out.values().iter().map(|x| x.exp()).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }
}
