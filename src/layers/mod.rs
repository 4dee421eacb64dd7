pub mod activation;
pub mod dropout;
pub mod linear;

pub use activation::Activation;
pub use dropout::Dropout;
pub use linear::Linear;
