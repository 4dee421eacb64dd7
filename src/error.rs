use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All failure modes surfaced by fcnet.
///
/// Construction and load failures are fatal to the operation that raised
/// them; nothing is retried and nothing is partially applied.
#[derive(Error, Debug)]
pub enum Error {
    /// A descriptor names a layer of width zero.
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// A checkpoint's stored parameters disagree with the shapes implied by
    /// the network being loaded into. Reported for the first offending layer.
    #[error(
        "shape mismatch at layer {layer} ({tensor}): \
         expected {expected_rows}x{expected_cols}, found {actual_rows}x{actual_cols}"
    )]
    ShapeMismatch {
        /// Zero-based index of the offending layer, in forward order.
        layer: usize,
        /// Which tensor mismatched: `"weights"` or `"bias"`.
        tensor: &'static str,
        expected_rows: usize,
        expected_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    /// A checkpoint stores a different number of layers than the target
    /// network has. Detected before any per-layer shape comparison.
    #[error("layer count mismatch: expected {expected} layers of parameters, found {actual}")]
    LayerCountMismatch { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("checkpoint encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
