//! Checkpointing: externalizes a network's architecture descriptor together
//! with its learned parameters as one JSON record, and restores a network
//! from such a record.
//!
//! Architecture compatibility is a precondition of load. A stored parameter
//! whose shape disagrees with the descriptor-implied shape fails the whole
//! load with [`Error::ShapeMismatch`]; nothing is truncated, padded, or
//! partially applied. The format carries no version tag and no checksum, so
//! an exact architecture match is required.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::network::descriptor::NetworkDescriptor;
use crate::network::network::Network;

/// One layer's learned values, in descriptor order: a weight matrix of
/// shape `(out_features, in_features)` and a `1 x out_features` bias row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerParams {
    pub weights: Matrix,
    pub bias: Matrix,
}

/// The persisted record: everything needed to rebuild an equivalent network
/// and overwrite its parameters with the trained values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub descriptor: NetworkDescriptor,
    pub layers: Vec<LayerParams>,
}

impl Checkpoint {
    /// Captures the network's descriptor and a verbatim copy of its
    /// parameters, hidden layers first, output layer last.
    pub fn from_network(network: &Network) -> Checkpoint {
        Checkpoint {
            descriptor: network.descriptor().clone(),
            layers: network
                .layers()
                .map(|layer| LayerParams {
                    weights: layer.weights.clone(),
                    bias: layer.bias.clone(),
                })
                .collect(),
        }
    }

    /// Writes the checkpoint to `path` as a single pretty-printed JSON unit.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Reads a checkpoint previously written by [`Checkpoint::save`].
    pub fn read(path: impl AsRef<Path>) -> Result<Checkpoint> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// The stored `(weights, bias)` pairs in forward order, for feeding
    /// into [`Network::load_parameters`].
    pub fn parameter_pairs(&self) -> Vec<(Matrix, Matrix)> {
        self.layers
            .iter()
            .map(|lp| (lp.weights.clone(), lp.bias.clone()))
            .collect()
    }

    /// Builds a fresh network from the stored descriptor and overwrites its
    /// parameters with the stored values. Dropout is a training
    /// hyperparameter, not architecture, so the restored network has it
    /// disabled; callers resuming training pass the parameters into a
    /// network of their own via [`Network::load_parameters`].
    ///
    /// Fails with `ShapeMismatch` if the stored parameters do not match the
    /// shapes the descriptor implies.
    pub fn restore(&self) -> Result<Network> {
        let mut network = Network::new(self.descriptor.clone(), 0.0);
        network.load_parameters(self.parameter_pairs())?;
        Ok(network)
    }
}

/// Captures `network` and writes it to `path` in one step.
pub fn save(network: &Network, path: impl AsRef<Path>) -> Result<()> {
    Checkpoint::from_network(network).save(path)
}

/// Reads the checkpoint at `path` and restores a network from it.
pub fn load(path: impl AsRef<Path>) -> Result<Network> {
    Checkpoint::read(path)?.restore()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// Unique temp path per test so parallel tests never collide.
    fn temp_path(stem: &str) -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("fcnet-{stem}-{}-{n}.json", std::process::id()))
    }

    fn mnist_sized_network() -> Network {
        let descriptor = NetworkDescriptor::new(784, 10, vec![128, 64]).unwrap();
        Network::new(descriptor, 0.2)
    }

    #[test]
    fn save_then_load_preserves_forward_output() {
        let mut original = mnist_sized_network();
        let input: Vec<f64> = (0..784).map(|i| ((i * 31) % 17) as f64 / 17.0).collect();
        let expected = original.forward(&input);

        let path = temp_path("roundtrip");
        save(&original, &path).unwrap();
        let mut restored = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(restored.descriptor().hidden_sizes, vec![128, 64]);
        let actual = restored.forward(&input);
        assert_eq!(actual.len(), 10);
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-9, "diverged: {a} vs {e}");
        }
    }

    #[test]
    fn loading_into_a_different_architecture_fails() {
        let donor = mnist_sized_network();
        let checkpoint = Checkpoint::from_network(&donor);

        let other = NetworkDescriptor::new(784, 10, vec![400, 200, 100]).unwrap();
        let mut target = Network::new(other, 0.0);
        let err = target.load_parameters(checkpoint.parameter_pairs()).unwrap_err();
        // Layer counts differ before any shape is compared.
        assert!(matches!(err, Error::LayerCountMismatch { expected: 4, actual: 3 }));

        let same_depth = NetworkDescriptor::new(784, 10, vec![512, 256]).unwrap();
        let mut target = Network::new(same_depth, 0.0);
        let err = target.load_parameters(checkpoint.parameter_pairs()).unwrap_err();
        match err {
            Error::ShapeMismatch { layer, tensor, expected_rows, actual_rows, .. } => {
                assert_eq!(layer, 0);
                assert_eq!(tensor, "weights");
                assert_eq!(expected_rows, 512);
                assert_eq!(actual_rows, 128);
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn tampered_blob_fails_restore() {
        let mut checkpoint = Checkpoint::from_network(&mnist_sized_network());
        // Descriptor claims [128, 64] but the first layer's stored weights
        // are swapped for a smaller matrix.
        checkpoint.layers[0].weights = Matrix::zeros(100, 784);
        let err = checkpoint.restore().unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { layer: 0, .. }));
    }

    #[test]
    fn blob_is_written_as_one_json_record() {
        let network = mnist_sized_network();
        let path = temp_path("record");
        save(&network, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["descriptor"]["input_size"], 784);
        assert_eq!(value["descriptor"]["output_size"], 10);
        assert_eq!(value["descriptor"]["hidden_sizes"][0], 128);
        assert_eq!(value["layers"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn missing_file_surfaces_as_io_error() {
        let err = load(temp_path("does-not-exist")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
