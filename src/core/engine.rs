use crate::core::Pipeline;
use crate::domain::model::MeasurementTable;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Runs the three pipeline stages once at startup and hands back the
/// immutable table every later query works from.
pub struct LoadEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> LoadEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<MeasurementTable> {
        tracing::info!("Loading blowdown test data...");

        let raw = self.pipeline.extract().await?;
        tracing::info!("Extracted {} raw rows", raw.len());
        self.monitor.log_stats("Extract");

        let cleaned = self.pipeline.transform(raw).await?;
        tracing::info!(
            "Transformed into {} measurements ({} dropped)",
            cleaned.measurements.len(),
            cleaned.dropped_total()
        );
        self.monitor.log_stats("Transform");

        let table = self.pipeline.load(cleaned).await?;
        tracing::info!(
            "Loaded {} measurements, {} volume types",
            table.len(),
            table.volume_types().len()
        );
        self.monitor.log_stats("Load");

        Ok(table)
    }
}
