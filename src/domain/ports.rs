use crate::domain::model::{ColumnSpec, MeasurementTable, Record, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn sheet_name(&self) -> &str;
    /// Zero-based index of the header row; rows above it are ignored.
    fn header_row(&self) -> usize;
    fn columns(&self) -> &ColumnSpec;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Record>>;
    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<MeasurementTable>;
}
