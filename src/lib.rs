pub mod config;
pub mod error;
pub mod eval;
pub mod matrix;

pub use config::Config;
pub use error::{EmbevalError, Result};
pub use eval::metrics::recall;
pub use matrix::FeatureMatrix;
