use crate::domain::model::{Record, TransformResult, TransformedRecord, UploadReport};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// 商品檔案路徑或 http(s) URL
    fn source(&self) -> &str;
    fn discount_factor(&self) -> f64;
    fn category_keyword(&self) -> &str;
    fn snapshot_file(&self) -> Option<&str>;
    fn dry_run(&self) -> bool;
    fn index_name(&self) -> &str;
    fn request_timeout_seconds(&self) -> Option<u64> {
        None
    }
}

/// 搜尋索引上傳端；負責分批、傳輸與 objectID 產生
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn save_objects(&self, objects: &[TransformedRecord]) -> Result<UploadReport>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Record>>;
    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<UploadReport>;
}
