use crate::core::discount::DiscountRule;
use crate::core::{
    ConfigProvider, Pipeline, ProductRecord, Record, SearchIndex, Storage, TransformResult,
    UploadReport,
};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::is_remote_source;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// 讀取商品目錄、套用折扣並上傳到搜尋索引的 Pipeline
pub struct SalePipeline<S: Storage, C: ConfigProvider, I: SearchIndex> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) index: I,
    pub(crate) client: Client,
}

impl<S: Storage, C: ConfigProvider, I: SearchIndex> SalePipeline<S, C, I> {
    pub fn new(storage: S, config: C, index: I) -> Self {
        Self {
            storage,
            config,
            index,
            client: Client::new(),
        }
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("Making API request to: {}", url);

        let mut request = self.client.get(url);
        if let Some(timeout) = self.config.request_timeout_seconds() {
            request = request.timeout(Duration::from_secs(timeout));
        }

        let response = request.send().await?.error_for_status()?;
        tracing::debug!("API response status: {}", response.status());
        Ok(response.bytes().await?.to_vec())
    }
}

/// 商品檔案必須是物件陣列
pub fn parse_records(document: Value) -> Result<Vec<Record>> {
    let Value::Array(items) = document else {
        return Err(EtlError::ProcessingError {
            message: "product document must be a JSON array".to_string(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(data) => Ok(Record { data }),
            _ => Err(EtlError::MalformedRecord {
                index,
                field: "<record>".to_string(),
                reason: "must be a JSON object".to_string(),
            }),
        })
        .collect()
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, I: SearchIndex> Pipeline for SalePipeline<S, C, I> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let source = self.config.source();
        tracing::info!("📂 Loading products from: {}", source);

        let bytes = if is_remote_source(source) {
            self.fetch_remote(source).await?
        } else {
            self.storage.read_file(source).await?
        };

        let document: Value = serde_json::from_slice(&bytes)?;
        parse_records(document)
    }

    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
        let rule = DiscountRule::new(
            self.config.discount_factor(),
            self.config.category_keyword(),
        )?;
        tracing::debug!(
            "Applying {:.0}% discount to categories matching '{}'",
            rule.discount_factor() * 100.0,
            rule.category_keyword()
        );

        // 任何一筆資料不完整就整批中止，不產生部分輸出
        let products = data
            .into_iter()
            .enumerate()
            .map(|(index, record)| ProductRecord::try_from_record(index, record))
            .collect::<Result<Vec<_>>>()?;

        let (records, summary) = rule.apply(products);
        Ok(TransformResult { records, summary })
    }

    async fn load(&self, result: TransformResult) -> Result<UploadReport> {
        let snapshot_path = match self.config.snapshot_file() {
            Some(path) => {
                let json = serde_json::to_vec_pretty(&result.records)?;
                self.storage.write_file(path, &json).await?;
                tracing::info!(
                    "💾 Snapshot of {} records written to {}",
                    result.records.len(),
                    path
                );
                Some(path.to_string())
            }
            None => None,
        };

        if self.config.dry_run() {
            return Ok(UploadReport::dry_run(self.config.index_name(), snapshot_path));
        }

        let mut report = self.index.save_objects(&result.records).await?;
        report.snapshot_path = snapshot_path;
        Ok(report)
    }
}
