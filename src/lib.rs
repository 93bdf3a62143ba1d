pub mod config;
pub mod core;
pub mod domain;
pub mod ui;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{cli::LocalStorage, CliConfig};

pub use crate::core::{engine::LoadEngine, pipeline::SpreadsheetPipeline};
pub use crate::domain::model::{Measurement, MeasurementTable};
pub use crate::utils::error::{AdvisorError, Result};
