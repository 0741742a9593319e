pub mod engine;
pub mod execution;

pub use execution::{Identity, Seed, NAMESPACE};
