pub mod engine;
pub mod pipeline;
pub mod recommend;

pub use crate::domain::model::{ColumnSpec, Measurement, MeasurementTable, Record, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
