pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use crate::adapters::{AlgoliaIndex, AlgoliaSettings, LocalStorage};
pub use crate::app::pipelines::SalePipeline;
pub use crate::core::discount::{category_contains, transform, DiscountRule};
pub use crate::core::etl::EtlEngine;
pub use crate::domain::model::{ProductRecord, TransformedRecord, UploadReport};
pub use crate::utils::error::{EtlError, Result};
