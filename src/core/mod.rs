pub mod discount;
pub mod etl;
pub mod price_range;

pub use crate::domain::model::{
    ProductRecord, Record, TransformResult, TransformSummary, TransformedRecord, UploadReport,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, SearchIndex, Storage};
pub use crate::utils::error::Result;
