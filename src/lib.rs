pub mod checkpoint;
pub mod error;
pub mod layers;
pub mod loss;
pub mod math;
pub mod network;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use checkpoint::Checkpoint;
pub use error::{Error, Result};
pub use layers::{Activation, Dropout, Linear};
pub use loss::{one_hot, NllLoss};
pub use math::matrix::Matrix;
pub use network::{Mode, Network, NetworkDescriptor};
pub use optim::sgd::Sgd;
pub use train::{train_loop, EpochStats, TrainConfig};
