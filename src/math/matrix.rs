use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

/// Dense row-major matrix of `f64`.
///
/// Activations travel through the network as `1 x n` row matrices; weights
/// are stored `(out_features, in_features)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Builds a `1 x n` row matrix from a slice.
    pub fn row(values: &[f64]) -> Matrix {
        Matrix {
            rows: 1,
            cols: values.len(),
            data: values.to_vec(),
        }
    }

    pub fn from_parts(rows: usize, cols: usize, data: Vec<f64>) -> Matrix {
        assert_eq!(rows * cols, data.len(), "data length must equal rows * cols");
        Matrix { rows, cols, data }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    /// Both uniforms are drawn on (0, 1] to avoid log(0).
    fn sample_standard_normal(rng: &mut ThreadRng) -> f64 {
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// He initialization: samples from N(0, sqrt(2 / fan_in)).
    ///
    /// Suited to ReLU layers; the variance 2/fan_in accounts for ReLU
    /// zeroing half of its inputs on average. `cols` is the fan-in.
    pub fn he(rows: usize, cols: usize) -> Matrix {
        let mut rng = rand::thread_rng();
        let std_dev = (2.0 / cols as f64).sqrt();
        let data = (0..rows * cols)
            .map(|_| Matrix::sample_standard_normal(&mut rng) * std_dev)
            .collect();
        Matrix { rows, cols, data }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn at(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.cols + j] = value;
    }

    /// Flat view of the underlying storage, row-major.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Clones the single row of a `1 x n` matrix into a plain vector.
    pub fn to_row_vec(&self) -> Vec<f64> {
        debug_assert_eq!(self.rows, 1, "to_row_vec expects a row matrix");
        self.data.clone()
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                res.set(j, i, self.at(i, j));
            }
        }
        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(self.shape(), rhs.shape(), "hadamard requires equal shapes");
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(rhs.data.iter())
                .map(|(x, y)| x * y)
                .collect(),
        }
    }

    /// Adds `rhs` into `self` in place. Used by gradient accumulators.
    pub fn add_assign(&mut self, rhs: &Matrix) {
        assert_eq!(self.shape(), rhs.shape(), "add_assign requires equal shapes");
        for (a, b) in self.data.iter_mut().zip(rhs.data.iter()) {
            *a += b;
        }
    }

    /// Resets every element to zero, keeping the shape.
    pub fn fill_zero(&mut self) {
        self.data.fill(0.0);
    }
}

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: &Matrix) -> Matrix {
        assert_eq!(self.shape(), rhs.shape(), "matrix addition requires equal shapes");
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(rhs.data.iter())
                .map(|(x, y)| x + y)
                .collect(),
        }
    }
}

impl Sub for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: &Matrix) -> Matrix {
        assert_eq!(self.shape(), rhs.shape(), "matrix subtraction requires equal shapes");
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(rhs.data.iter())
                .map(|(x, y)| x - y)
                .collect(),
        }
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: &Matrix) -> Matrix {
        assert_eq!(
            self.cols, rhs.rows,
            "matrix product requires lhs.cols == rhs.rows"
        );
        let mut res = Matrix::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let lhs_ik = self.at(i, k);
                for j in 0..rhs.cols {
                    let v = res.at(i, j) + lhs_ik * rhs.at(k, j);
                    res.set(i, j, v);
                }
            }
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_matches_hand_computation() {
        let a = Matrix::from_parts(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = Matrix::from_parts(3, 2, vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        let c = &a * &b;
        assert_eq!(c.shape(), (2, 2));
        assert_eq!(c.values(), &[58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn transpose_swaps_shape_and_entries() {
        let a = Matrix::from_parts(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let t = a.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.at(2, 1), 6.0);
        assert_eq!(t.at(0, 1), 4.0);
    }

    #[test]
    fn hadamard_and_scale() {
        let a = Matrix::row(&[1.0, -2.0, 3.0]);
        let b = Matrix::row(&[2.0, 2.0, 2.0]);
        assert_eq!(a.hadamard(&b).values(), &[2.0, -4.0, 6.0]);
        assert_eq!(a.scale(0.5).values(), &[0.5, -1.0, 1.5]);
    }

    #[test]
    fn accumulate_and_reset() {
        let mut acc = Matrix::zeros(1, 3);
        acc.add_assign(&Matrix::row(&[1.0, 1.0, 1.0]));
        acc.add_assign(&Matrix::row(&[0.5, -1.0, 2.0]));
        assert_eq!(acc.values(), &[1.5, 0.0, 3.0]);
        acc.fill_zero();
        assert_eq!(acc.values(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn he_init_has_requested_shape() {
        let w = Matrix::he(4, 9);
        assert_eq!(w.shape(), (4, 9));
        assert!(w.values().iter().all(|v| v.is_finite()));
    }
}
