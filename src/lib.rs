pub mod backtest;
pub mod cli;
pub mod config;
pub mod error;
pub mod interval;
pub mod model;
pub mod pattern;
pub mod runner;
pub mod source;

pub use error::{AppError, ProjectionError};
pub use pattern::{build_projections, ProjectionParams};
