use crate::layers::activation::Activation;
use crate::math::matrix::Matrix;

/// A fully connected layer: weights `(out_features, in_features)`, a bias
/// row `(1, out_features)`, and an activation applied after the linear
/// transform.
///
/// Each parameter owns an explicit gradient accumulator. `backward()` adds
/// into the accumulators; they keep growing across calls until the training
/// loop resets them with `zero_grad()`.
#[derive(Debug)]
pub struct Linear {
    pub in_features: usize,
    pub out_features: usize,
    pub weights: Matrix,
    pub bias: Matrix,
    pub activation: Activation,
    grad_weights: Matrix,
    grad_bias: Matrix,
    // Cached by forward() for the backward pass.
    input: Matrix,
    pre_activation: Matrix,
}

impl Linear {
    pub fn new(in_features: usize, out_features: usize, activation: Activation) -> Linear {
        Linear {
            in_features,
            out_features,
            weights: Matrix::he(out_features, in_features),
            bias: Matrix::zeros(1, out_features),
            activation,
            grad_weights: Matrix::zeros(out_features, in_features),
            grad_bias: Matrix::zeros(1, out_features),
            input: Matrix::zeros(1, in_features),
            pre_activation: Matrix::zeros(1, out_features),
        }
    }

    /// Forward pass for one `1 x in_features` row; caches the input and the
    /// pre-activation `z = x Wᵀ + b` for backprop.
    pub fn forward(&mut self, input: &Matrix) -> Matrix {
        let z = &(input * &self.weights.transpose()) + &self.bias;
        let a = self.activation.apply(&z);
        self.input = input.clone();
        self.pre_activation = z;
        a
    }

    /// Backward pass. `delta` is ∂L/∂a for this layer (error in activation
    /// space, `1 x out_features`). Accumulates parameter gradients and
    /// returns ∂L/∂input (`1 x in_features`).
    pub fn backward(&mut self, delta: &Matrix) -> Matrix {
        // δ = (∂L/∂a) ⊙ σ'(z); for the log-softmax head σ' is identity
        // because the loss derivative already carries the combined gradient.
        let act_derivative = self.pre_activation.map(|z| self.activation.derivative(z));
        let layer_delta = delta.hadamard(&act_derivative);

        // ∂L/∂W = δᵀ x  →  (out, 1) * (1, in) = (out, in)
        self.grad_weights.add_assign(&(&layer_delta.transpose() * &self.input));
        self.grad_bias.add_assign(&layer_delta);

        // ∂L/∂x = δ W  →  (1, out) * (out, in) = (1, in)
        &layer_delta * &self.weights
    }

    /// Resets both gradient accumulators to zero.
    pub fn zero_grad(&mut self) {
        self.grad_weights.fill_zero();
        self.grad_bias.fill_zero();
    }

    /// Subtracts the accumulated gradients scaled by `lr` and `grad_scale`
    /// (the optimizer passes `1 / batch_size` to average over the batch).
    pub fn apply_update(&mut self, lr: f64, grad_scale: f64) {
        let step = lr * grad_scale;
        self.weights = &self.weights - &self.grad_weights.scale(step);
        self.bias = &self.bias - &self.grad_bias.scale(step);
    }

    pub fn weight_shape(&self) -> (usize, usize) {
        self.weights.shape()
    }

    pub fn bias_shape(&self) -> (usize, usize) {
        self.bias.shape()
    }

    /// Overwrites the parameter values. Shapes must already have been
    /// validated by the caller.
    pub(crate) fn set_parameters(&mut self, weights: Matrix, bias: Matrix) {
        debug_assert_eq!(weights.shape(), self.weights.shape());
        debug_assert_eq!(bias.shape(), self.bias.shape());
        self.weights = weights;
        self.bias = bias;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_layer() -> Linear {
        let mut layer = Linear::new(2, 2, Activation::ReLU);
        layer.set_parameters(
            Matrix::from_parts(2, 2, vec![1.0, 0.0, 0.0, -1.0]),
            Matrix::row(&[0.5, 0.5]),
        );
        layer
    }

    #[test]
    fn forward_applies_weights_bias_and_relu() {
        let mut layer = fixed_layer();
        let out = layer.forward(&Matrix::row(&[2.0, 3.0]));
        // z = [2*1 + 0.5, 3*(-1) + 0.5] = [2.5, -2.5]; ReLU clamps the second.
        assert_eq!(out.values(), &[2.5, 0.0]);
    }

    #[test]
    fn backward_accumulates_until_reset() {
        let mut layer = fixed_layer();
        let input = Matrix::row(&[2.0, 3.0]);
        layer.forward(&input);
        layer.backward(&Matrix::row(&[1.0, 1.0]));
        layer.forward(&input);
        let d_input = layer.backward(&Matrix::row(&[1.0, 1.0]));

        // Second unit's z is negative, so its delta is gated to zero and
        // only the first weight row propagates back.
        assert_eq!(d_input.values(), &[1.0, 0.0]);

        // Two identical backward calls doubled the accumulator; a step with
        // grad_scale 0.5 must therefore equal a single-sample step.
        layer.apply_update(0.1, 0.5);
        assert!((layer.weights.at(0, 0) - (1.0 - 0.1 * 2.0)).abs() < 1e-12);
        assert!((layer.weights.at(0, 1) - (0.0 - 0.1 * 3.0)).abs() < 1e-12);
        // Gated unit received no gradient.
        assert_eq!(layer.weights.at(1, 0), 0.0);

        layer.zero_grad();
        layer.apply_update(0.1, 1.0);
        // No accumulated gradient, no movement.
        assert!((layer.weights.at(0, 0) - (1.0 - 0.1 * 2.0)).abs() < 1e-12);
    }
}
