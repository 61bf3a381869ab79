pub mod config;
pub mod error;

pub use config::{PoolKind, ReduceConfig, Threshold};
pub use error::*;
