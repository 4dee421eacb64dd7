use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A flat description of a feed-forward architecture.
///
/// Layer widths chain `input_size → hidden_sizes[0] → … → output_size`;
/// `hidden_sizes` may be empty, in which case the network is a single
/// linear layer with a log-softmax head.
///
/// Stored verbatim inside every checkpoint so an equivalent (untrained)
/// network can be rebuilt before its parameters are overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    pub input_size: usize,
    pub output_size: usize,
    pub hidden_sizes: Vec<usize>,
}

impl NetworkDescriptor {
    /// Validates that every layer width is positive. A zero width is a
    /// construction-time precondition violation with no recovery.
    pub fn new(input_size: usize, output_size: usize, hidden_sizes: Vec<usize>) -> Result<Self> {
        if input_size == 0 {
            return Err(Error::InvalidDescriptor("input_size must be positive".into()));
        }
        if output_size == 0 {
            return Err(Error::InvalidDescriptor("output_size must be positive".into()));
        }
        if let Some(pos) = hidden_sizes.iter().position(|&w| w == 0) {
            return Err(Error::InvalidDescriptor(format!(
                "hidden_sizes[{pos}] must be positive"
            )));
        }
        Ok(NetworkDescriptor {
            input_size,
            output_size,
            hidden_sizes,
        })
    }

    /// `(in_features, out_features)` for every linear layer, in forward
    /// order, chaining input through the hidden widths to the output.
    pub fn layer_dims(&self) -> Vec<(usize, usize)> {
        let widths: Vec<usize> = std::iter::once(self.input_size)
            .chain(self.hidden_sizes.iter().copied())
            .chain(std::iter::once(self.output_size))
            .collect();
        widths.windows(2).map(|pair| (pair[0], pair[1])).collect()
    }

    /// Number of linear layers implied by this descriptor.
    pub fn num_layers(&self) -> usize {
        self.hidden_sizes.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chains_widths_in_forward_order() {
        let d = NetworkDescriptor::new(784, 10, vec![128, 64]).unwrap();
        assert_eq!(d.layer_dims(), vec![(784, 128), (128, 64), (64, 10)]);
        assert_eq!(d.num_layers(), 3);
    }

    #[test]
    fn no_hidden_layers_is_a_single_linear() {
        let d = NetworkDescriptor::new(4, 2, vec![]).unwrap();
        assert_eq!(d.layer_dims(), vec![(4, 2)]);
        assert_eq!(d.num_layers(), 1);
    }

    #[test]
    fn rejects_zero_widths() {
        assert!(NetworkDescriptor::new(0, 2, vec![]).is_err());
        assert!(NetworkDescriptor::new(4, 0, vec![]).is_err());
        let err = NetworkDescriptor::new(4, 2, vec![3, 0, 5]).unwrap_err();
        assert!(err.to_string().contains("hidden_sizes[1]"));
    }
}
