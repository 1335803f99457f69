pub mod cli;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod http;
pub mod loader;
pub mod logging;

pub use dataset::{Dataset, Transaction};
pub use engine::{compute, respond, Metric, MetricOptions, MetricResponse};
pub use error::{DashboardError, Result};
