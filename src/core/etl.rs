use crate::core::{Pipeline, UploadReport};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<UploadReport> {
        tracing::info!("🚀 Starting ETL process");

        // Extract
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} records", raw_data.len());
        self.monitor.log_phase("Extract", raw_data.len());

        // Transform
        let transformed = self.pipeline.transform(raw_data).await?;
        let summary = &transformed.summary;
        tracing::info!(
            "🔄 Transformed {} records ({} on sale, {} without matching price range)",
            summary.total,
            summary.discounted,
            summary.unmatched_prices
        );
        if !summary.unmatchable_labels.is_empty() {
            tracing::warn!(
                "⚠️ Price ranges ignored for matching: {:?}",
                summary.unmatchable_labels
            );
        }
        self.monitor.log_phase("Transform", summary.total);

        // Load
        let report = self.pipeline.load(transformed).await?;
        if report.dry_run {
            tracing::info!("📝 Dry run, nothing uploaded to '{}'", report.index_name);
        } else {
            tracing::info!(
                "📤 Uploaded {} objects to '{}' in {} batch(es)",
                report.objects_uploaded,
                report.index_name,
                report.batches
            );
        }
        self.monitor.log_phase("Load", report.objects_uploaded);
        self.monitor.log_final_stats();

        Ok(report)
    }
}
