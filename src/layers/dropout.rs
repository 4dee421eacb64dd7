use rand::Rng;

use crate::math::matrix::Matrix;

/// Inverted dropout applied after each hidden activation.
///
/// In training mode each element is independently zeroed with probability
/// `p` and survivors are rescaled by `1 / (1 - p)`, so the expected
/// activation is unchanged and no rescaling is needed at evaluation time.
/// In evaluation mode the layer is a pass-through.
#[derive(Debug)]
pub struct Dropout {
    pub p: f64,
    // Scaled keep-mask from the last training-mode forward; backward
    // multiplies deltas by it so gradients only flow through survivors.
    mask: Matrix,
}

impl Dropout {
    /// `p` is the drop probability. `p == 1.0` would zero every activation,
    /// so the valid range is `[0, 1)`.
    pub fn new(p: f64) -> Dropout {
        assert!((0.0..1.0).contains(&p), "dropout probability must be in [0, 1)");
        Dropout {
            p,
            mask: Matrix::zeros(0, 0),
        }
    }

    pub fn forward(&mut self, input: &Matrix, training: bool) -> Matrix {
        if !training {
            // Invalidate any mask left over from a previous training-mode
            // pass; backward after an evaluation forward must not gate.
            self.mask = Matrix::zeros(0, 0);
            return input.clone();
        }
        let keep_scale = 1.0 / (1.0 - self.p);
        let mut rng = rand::thread_rng();
        // With p == 0 the mask is all ones and training matches evaluation.
        let mut mask = Matrix::zeros(input.rows, input.cols);
        for i in 0..input.rows {
            for j in 0..input.cols {
                let keep = rng.gen::<f64>() >= self.p;
                mask.set(i, j, if keep { keep_scale } else { 0.0 });
            }
        }
        self.mask = mask;
        input.hadamard(&self.mask)
    }

    /// Routes deltas through the same mask the last training-mode forward
    /// pass used. When no mask is live — the last forward ran in evaluation
    /// mode, or no forward has happened yet — this is a pass-through,
    /// mirroring the evaluation-mode forward.
    pub fn backward(&self, delta: &Matrix) -> Matrix {
        if self.mask.rows == 0 {
            return delta.clone();
        }
        delta.hadamard(&self.mask)
    }
}
