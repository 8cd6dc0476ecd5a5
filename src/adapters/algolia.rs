//! Algolia-compatible search index client.
//!
//! Records are sent with the REST batch endpoint
//! (`POST /1/indexes/{index}/batch`). With `auto_generate_object_id` they are
//! `addObject` operations, which lets the index assign an `objectID` to records
//! that do not carry one; otherwise every record is an `updateObject` keyed by
//! its own `objectID`.

use crate::core::{SearchIndex, TransformedRecord, UploadReport};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BATCH_SIZE: usize = 1000;

const APPLICATION_ID_HEADER: &str = "X-Algolia-Application-Id";
const API_KEY_HEADER: &str = "X-Algolia-API-Key";

#[derive(Debug, Clone)]
pub struct AlgoliaSettings {
    pub app_id: String,
    pub api_key: String,
    pub index_name: String,
    /// 預設為 `https://{app_id}.algolia.net`
    pub host: Option<String>,
    pub batch_size: usize,
    pub auto_generate_object_id: bool,
    pub timeout_seconds: Option<u64>,
}

impl AlgoliaSettings {
    pub fn new(app_id: &str, api_key: &str, index_name: &str) -> Self {
        Self {
            app_id: app_id.to_string(),
            api_key: api_key.to_string(),
            index_name: index_name.to_string(),
            host: None,
            batch_size: DEFAULT_BATCH_SIZE,
            auto_generate_object_id: true,
            timeout_seconds: None,
        }
    }

    /// dry run 用的佔位設定，client 不會真的送出請求
    pub fn dry_run(index_name: &str) -> Self {
        let index_name = match index_name.trim() {
            "" => "dry-run",
            _ => index_name,
        };
        Self::new("dry-run", "dry-run", index_name)
    }

    pub fn host(&self) -> String {
        self.host
            .clone()
            .unwrap_or_else(|| format!("https://{}.algolia.net", self.app_id))
    }
}

impl Validate for AlgoliaSettings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("app_id", &self.app_id)?;
        validate_non_empty_string("api_key", &self.api_key)?;
        validate_non_empty_string("index_name", &self.index_name)?;
        validate_positive_number("batch_size", self.batch_size, 1)?;
        validate_url("host", &self.host())
    }
}

pub fn batch_url(host: &str, index_name: &str) -> Result<Url> {
    let mut url = Url::parse(host).map_err(|e| EtlError::InvalidConfigValueError {
        field: "host".to_string(),
        value: host.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;

    url.path_segments_mut()
        .map_err(|_| EtlError::InvalidConfigValueError {
            field: "host".to_string(),
            value: host.to_string(),
            reason: "URL cannot be used as a base".to_string(),
        })?
        .pop_if_empty()
        .extend(["1", "indexes", index_name, "batch"]);

    Ok(url)
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    requests: Vec<BatchOperation<'a>>,
}

#[derive(Serialize)]
struct BatchOperation<'a> {
    action: &'static str,
    body: &'a TransformedRecord,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(rename = "taskID")]
    task_id: u64,
    #[serde(rename = "objectIDs", default)]
    object_ids: Vec<String>,
}

pub struct AlgoliaIndex {
    settings: AlgoliaSettings,
    batch_url: Url,
    client: Client,
}

impl AlgoliaIndex {
    pub fn new(settings: AlgoliaSettings) -> Result<Self> {
        settings.validate()?;
        let batch_url = batch_url(&settings.host(), &settings.index_name)?;

        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        Ok(Self {
            settings,
            batch_url,
            client: builder.build()?,
        })
    }

    pub fn settings(&self) -> &AlgoliaSettings {
        &self.settings
    }

    fn ensure_object_ids(&self, objects: &[TransformedRecord]) -> Result<()> {
        if self.settings.auto_generate_object_id {
            return Ok(());
        }
        match objects.iter().position(|o| o.object_id().is_none()) {
            Some(index) => Err(EtlError::ValidationError {
                message: format!(
                    "record #{} has no objectID and auto-generation is disabled",
                    index
                ),
            }),
            None => Ok(()),
        }
    }

    fn batch_action(&self) -> &'static str {
        if self.settings.auto_generate_object_id {
            "addObject"
        } else {
            "updateObject"
        }
    }

    async fn send_batch(&self, chunk: &[TransformedRecord]) -> Result<BatchResponse> {
        let action = self.batch_action();
        let request = BatchRequest {
            requests: chunk
                .iter()
                .map(|body| BatchOperation { action, body })
                .collect(),
        };

        let response = self
            .client
            .post(self.batch_url.clone())
            .header(APPLICATION_ID_HEADER, &self.settings.app_id)
            .header(API_KEY_HEADER, &self.settings.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Batch response status: {}", status);

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EtlError::UploadError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl SearchIndex for AlgoliaIndex {
    async fn save_objects(&self, objects: &[TransformedRecord]) -> Result<UploadReport> {
        self.ensure_object_ids(objects)?;

        let mut report = UploadReport {
            index_name: self.settings.index_name.clone(),
            objects_uploaded: 0,
            batches: 0,
            task_ids: Vec::new(),
            object_ids: Vec::new(),
            dry_run: false,
            snapshot_path: None,
            finished_at: Utc::now(),
        };

        let total_batches = objects.len().div_ceil(self.settings.batch_size);
        for (batch_index, chunk) in objects.chunks(self.settings.batch_size).enumerate() {
            tracing::info!(
                "📤 Sending batch {}/{} ({} objects) to '{}'",
                batch_index + 1,
                total_batches,
                chunk.len(),
                self.settings.index_name
            );

            let response = self.send_batch(chunk).await?;
            tracing::debug!("Batch accepted as task {}", response.task_id);

            report.objects_uploaded += chunk.len();
            report.batches += 1;
            report.task_ids.push(response.task_id);
            report.object_ids.extend(response.object_ids);
        }

        report.finished_at = Utc::now();
        Ok(report)
    }
}
