pub mod descriptor;
pub mod network;

pub use descriptor::NetworkDescriptor;
pub use network::{Mode, Network};
