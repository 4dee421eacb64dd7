use crate::error::{Error, Result};
use crate::layers::{Activation, Dropout, Linear};
use crate::math::matrix::Matrix;
use crate::network::descriptor::NetworkDescriptor;

/// Whether forward passes run with dropout active.
///
/// Held as explicit instance state on the network and toggled with
/// [`Network::set_mode`]; never ambient configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Train,
    Eval,
}

/// A feed-forward classifier: one ReLU+dropout block per hidden width and a
/// final linear layer with a log-softmax head.
///
/// Parameters are owned exclusively by the network and mutated in place by
/// the training loop; a checkpoint externalizes them verbatim.
#[derive(Debug)]
pub struct Network {
    descriptor: NetworkDescriptor,
    hidden: Vec<Linear>,
    dropouts: Vec<Dropout>,
    output: Linear,
    mode: Mode,
}

impl Network {
    /// Builds an untrained network from a validated descriptor. Weights are
    /// He-initialized, biases start at zero, mode starts as `Eval`.
    ///
    /// `dropout_p` is the drop probability applied after every hidden
    /// activation during training; pass `0.0` to disable dropout.
    pub fn new(descriptor: NetworkDescriptor, dropout_p: f64) -> Network {
        let dims = descriptor.layer_dims();
        let (output_dims, hidden_dims) = dims.split_last().expect("descriptor has >= 1 layer");

        let hidden: Vec<Linear> = hidden_dims
            .iter()
            .map(|&(fan_in, width)| Linear::new(fan_in, width, Activation::ReLU))
            .collect();
        let dropouts = (0..hidden.len()).map(|_| Dropout::new(dropout_p)).collect();
        let output = Linear::new(output_dims.0, output_dims.1, Activation::LogSoftmax);

        Network {
            descriptor,
            hidden,
            dropouts,
            output,
            mode: Mode::Eval,
        }
    }

    pub fn descriptor(&self) -> &NetworkDescriptor {
        &self.descriptor
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Maps an input vector of length `input_size` to a log-probability
    /// vector of length `output_size`; `exp` of the result sums to 1.
    ///
    /// # Panics
    /// Panics if `input.len() != input_size` (precondition violation).
    pub fn forward(&mut self, input: &[f64]) -> Vec<f64> {
        assert_eq!(
            input.len(),
            self.descriptor.input_size,
            "input length must equal input_size"
        );
        let training = self.mode == Mode::Train;

        let mut current = Matrix::row(input);
        for (layer, dropout) in self.hidden.iter_mut().zip(self.dropouts.iter_mut()) {
            let activated = layer.forward(&current);
            current = dropout.forward(&activated, training);
        }
        self.output.forward(&current).to_row_vec()
    }

    /// Backward pass for the most recent `forward()` call. `loss_delta` is
    /// the loss gradient with respect to the output layer's pre-softmax
    /// logits (`NllLoss::derivative`). Gradients accumulate into each
    /// layer until `zero_grad()`.
    pub fn backward(&mut self, loss_delta: &[f64]) {
        let mut delta = self.output.backward(&Matrix::row(loss_delta));
        for (layer, dropout) in self
            .hidden
            .iter_mut()
            .zip(self.dropouts.iter())
            .rev()
        {
            delta = layer.backward(&dropout.backward(&delta));
        }
    }

    /// Resets every parameter's gradient accumulator.
    pub fn zero_grad(&mut self) {
        for layer in self.layers_mut() {
            layer.zero_grad();
        }
    }

    /// All linear layers in forward order, hidden first, output last.
    pub fn layers(&self) -> impl Iterator<Item = &Linear> {
        self.hidden.iter().chain(std::iter::once(&self.output))
    }

    pub fn layers_mut(&mut self) -> impl Iterator<Item = &mut Linear> {
        self.hidden.iter_mut().chain(std::iter::once(&mut self.output))
    }

    /// Per-layer `(weights, bias)` shapes in forward order. Reconstructs the
    /// descriptor's width chain exactly.
    pub fn parameter_shapes(&self) -> Vec<((usize, usize), (usize, usize))> {
        self.layers()
            .map(|layer| (layer.weight_shape(), layer.bias_shape()))
            .collect()
    }

    /// Index of the most probable class for `input` under the current mode.
    pub fn predict(&mut self, input: &[f64]) -> usize {
        argmax(&self.forward(input))
    }

    /// Overwrites every layer's parameters with `params`, given in forward
    /// order as `(weights, bias)` pairs.
    ///
    /// Every shape is validated before anything is written, so a mismatch
    /// leaves the network untouched. The first offending layer is reported.
    pub fn load_parameters(&mut self, params: Vec<(Matrix, Matrix)>) -> Result<()> {
        let expected: Vec<_> = self.parameter_shapes();
        if params.len() != expected.len() {
            return Err(Error::LayerCountMismatch {
                expected: expected.len(),
                actual: params.len(),
            });
        }
        for (layer_idx, ((weights, bias), (want_w, want_b))) in
            params.iter().zip(expected.iter()).enumerate()
        {
            if weights.shape() != *want_w {
                return Err(shape_mismatch(layer_idx, "weights", *want_w, weights.shape()));
            }
            if bias.shape() != *want_b {
                return Err(shape_mismatch(layer_idx, "bias", *want_b, bias.shape()));
            }
        }
        for (layer, (weights, bias)) in self.layers_mut().zip(params.into_iter()) {
            layer.set_parameters(weights, bias);
        }
        Ok(())
    }
}

fn shape_mismatch(
    layer: usize,
    tensor: &'static str,
    expected: (usize, usize),
    actual: (usize, usize),
) -> Error {
    Error::ShapeMismatch {
        layer,
        tensor,
        expected_rows: expected.0,
        expected_cols: expected.1,
        actual_rows: actual.0,
        actual_cols: actual.1,
    }
}

/// Index of the maximum element in a slice.
pub(crate) fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
