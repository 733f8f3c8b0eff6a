pub mod analysis;
pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod storage;

pub use error::{HealthError, Result};
