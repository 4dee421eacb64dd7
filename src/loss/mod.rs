pub mod nll;

pub use nll::{one_hot, NllLoss};
