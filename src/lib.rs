pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod infra;
pub mod logging;
pub mod pipeline;

pub use config::Config;
pub use domain::{MergedShipment, NormalizedOrderRow};
pub use error::{PackerError, Result};
pub use pipeline::{BatchReport, Pipeline};
