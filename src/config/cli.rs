use crate::adapters::algolia::{AlgoliaSettings, DEFAULT_BATCH_SIZE};
use crate::core::discount::{DEFAULT_CATEGORY_KEYWORD, DEFAULT_DISCOUNT_FACTOR};
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_required_field, validate_source, Validate,
};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "catalog-sale-etl")]
#[command(about = "Discount camera products, re-bucket their price ranges and upload them to a search index")]
pub struct CliConfig {
    /// Product file (relative to --base-dir) or http(s) URL
    #[arg(long, default_value = "products.json")]
    pub input: String,

    #[arg(long, default_value = ".")]
    pub base_dir: String,

    #[arg(long, env = "ALGOLIA_APP_ID")]
    pub app_id: Option<String>,

    #[arg(long, env = "ALGOLIA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "ALGOLIA_INDEX")]
    pub index_name: Option<String>,

    /// Override the index host, defaults to https://{app_id}.algolia.net
    #[arg(long, env = "ALGOLIA_HOST")]
    pub host: Option<String>,

    #[arg(long, default_value_t = DEFAULT_DISCOUNT_FACTOR)]
    pub discount_factor: f64,

    #[arg(long, default_value = DEFAULT_CATEGORY_KEYWORD)]
    pub category_keyword: String,

    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Fail instead of letting the index generate missing objectIDs
    #[arg(long)]
    pub no_auto_object_id: bool,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Write the transformed catalog to this file (relative to --base-dir)
    #[arg(long)]
    pub snapshot: Option<String>,

    /// Transform only, skip the upload
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

impl CliConfig {
    pub fn index_settings(&self) -> Result<AlgoliaSettings> {
        let app_id = validate_required_field("app_id", &self.app_id)?;
        let api_key = validate_required_field("api_key", &self.api_key)?;
        let index_name = validate_required_field("index_name", &self.index_name)?;

        Ok(AlgoliaSettings {
            host: self.host.clone(),
            batch_size: self.batch_size,
            auto_generate_object_id: !self.no_auto_object_id,
            timeout_seconds: self.timeout_seconds,
            ..AlgoliaSettings::new(app_id, api_key, index_name)
        })
    }

    /// dry run 不需要憑證，索引名稱空白時用佔位名稱
    pub fn dry_run_settings(&self) -> AlgoliaSettings {
        AlgoliaSettings::dry_run(self.index_name.as_deref().unwrap_or_default())
    }
}

impl ConfigProvider for CliConfig {
    fn source(&self) -> &str {
        &self.input
    }

    fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    fn category_keyword(&self) -> &str {
        &self.category_keyword
    }

    fn snapshot_file(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }

    fn index_name(&self) -> &str {
        self.index_name.as_deref().unwrap_or_default()
    }

    fn request_timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_source("input", &self.input)?;
        validate_path("base_dir", &self.base_dir)?;
        validate_range("discount_factor", self.discount_factor, 0.0, 1.0)?;
        validate_non_empty_string("category_keyword", &self.category_keyword)?;
        validate_positive_number("batch_size", self.batch_size, 1)?;
        if let Some(snapshot) = &self.snapshot {
            validate_path("snapshot", snapshot)?;
        }

        // dry run 不需要索引憑證
        if !self.dry_run {
            self.index_settings()?.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::algolia::AlgoliaIndex;
    use crate::utils::error::EtlError;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["catalog-sale-etl"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--app-id", "APP", "--api-key", "KEY", "--index-name", "products"]);

        assert_eq!(config.input, "products.json");
        assert_eq!(config.discount_factor, 0.2);
        assert_eq!(config.category_keyword, "camera");
        assert_eq!(config.batch_size, 1000);
        assert!(config.validate().is_ok());

        let settings = config.index_settings().unwrap();
        assert!(settings.auto_generate_object_id);
        assert_eq!(settings.host(), "https://APP.algolia.net");
    }

    #[test]
    fn test_dry_run_does_not_need_credentials() {
        let config = parse(&["--dry-run", "--app-id", "", "--snapshot", "sale.json"]);
        assert!(config.validate().is_ok());
        assert_eq!(config.snapshot_file(), Some("sale.json"));
    }

    #[test]
    fn test_dry_run_with_blank_index_name_still_builds_client() {
        let config = parse(&["--dry-run", "--index-name", ""]);
        assert!(config.validate().is_ok());

        let settings = config.dry_run_settings();
        assert_eq!(settings.index_name, "dry-run");
        assert!(AlgoliaIndex::new(settings).is_ok());
    }

    #[test]
    fn test_upload_requires_credentials() {
        let config = parse(&["--app-id", "APP", "--index-name", "products", "--api-key", ""]);
        assert!(config.validate().is_err());

        let mut config = config;
        config.api_key = None;
        assert!(matches!(
            config.validate(),
            Err(EtlError::MissingConfigError { field }) if field == "api_key"
        ));
    }

    #[test]
    fn test_invalid_discount_factor() {
        let config = parse(&["--dry-run", "--discount-factor", "1.5"]);
        assert!(config.validate().is_err());
    }
}
