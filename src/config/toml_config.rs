use crate::adapters::algolia::{AlgoliaSettings, DEFAULT_BATCH_SIZE};
use crate::core::discount::{DEFAULT_CATEGORY_KEYWORD, DEFAULT_DISCOUNT_FACTOR};
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_source, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub discount: DiscountConfig,
    pub index: IndexConfig,
    #[serde(default)]
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// 商品檔案路徑或 http(s) URL
    pub input: String,
    pub base_dir: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountConfig {
    #[serde(default = "default_discount_factor")]
    pub factor: f64,
    #[serde(default = "default_category_keyword")]
    pub category_keyword: String,
}

impl Default for DiscountConfig {
    fn default() -> Self {
        Self {
            factor: DEFAULT_DISCOUNT_FACTOR,
            category_keyword: DEFAULT_CATEGORY_KEYWORD.to_string(),
        }
    }
}

fn default_discount_factor() -> f64 {
    DEFAULT_DISCOUNT_FACTOR
}

fn default_category_keyword() -> String {
    DEFAULT_CATEGORY_KEYWORD.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    pub app_id: String,
    pub api_key: String,
    pub index_name: String,
    pub host: Option<String>,
    pub batch_size: Option<usize>,
    pub auto_generate_object_id: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadConfig {
    pub snapshot: Option<String>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    /// "compact" 或 "json"
    pub log_format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ALGOLIA_API_KEY})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn base_dir(&self) -> &str {
        self.source.base_dir.as_deref().unwrap_or(".")
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .is_some_and(|format| format.eq_ignore_ascii_case("json"))
    }

    pub fn index_settings(&self) -> AlgoliaSettings {
        AlgoliaSettings {
            host: self.index.host.clone(),
            batch_size: self.index.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
            auto_generate_object_id: self.index.auto_generate_object_id.unwrap_or(true),
            timeout_seconds: self.source.timeout_seconds,
            ..AlgoliaSettings::new(&self.index.app_id, &self.index.api_key, &self.index.index_name)
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_source("source.input", &self.source.input)?;
        validate_path("source.base_dir", self.base_dir())?;
        validate_range("discount.factor", self.discount.factor, 0.0, 1.0)?;
        validate_non_empty_string("discount.category_keyword", &self.discount.category_keyword)?;

        if let Some(snapshot) = &self.load.snapshot {
            validate_path("load.snapshot", snapshot)?;
        }

        if let Some(format) = self.monitoring.as_ref().and_then(|m| m.log_format.as_deref()) {
            if !["compact", "json"].contains(&format) {
                return Err(EtlError::InvalidConfigValueError {
                    field: "monitoring.log_format".to_string(),
                    value: format.to_string(),
                    reason: "Valid formats: compact, json".to_string(),
                });
            }
        }

        if !self.dry_run() {
            // 未解析的 ${VAR} 代表環境變數沒設定
            for (field, value) in [
                ("index.app_id", &self.index.app_id),
                ("index.api_key", &self.index.api_key),
                ("index.index_name", &self.index.index_name),
            ] {
                if ENV_PLACEHOLDER.is_match(value) {
                    return Err(EtlError::MissingConfigError {
                        field: format!("{} ({})", field, value),
                    });
                }
            }
            self.index_settings().validate()?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn source(&self) -> &str {
        &self.source.input
    }

    fn discount_factor(&self) -> f64 {
        self.discount.factor
    }

    fn category_keyword(&self) -> &str {
        &self.discount.category_keyword
    }

    fn snapshot_file(&self) -> Option<&str> {
        self.load.snapshot.as_deref()
    }

    fn dry_run(&self) -> bool {
        self.load.dry_run.unwrap_or(false)
    }

    fn index_name(&self) -> &str {
        &self.index.index_name
    }

    fn request_timeout_seconds(&self) -> Option<u64> {
        self.source.timeout_seconds
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorCategory;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[pipeline]
name = "spring-camera-sale"

[source]
input = "data/products.json"

[index]
app_id = "APP"
api_key = "KEY"
index_name = "products"
"#;

    #[test]
    fn test_parse_basic_toml_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.pipeline.name, "spring-camera-sale");
        assert_eq!(config.source(), "data/products.json");
        assert_eq!(config.base_dir(), ".");
        assert_eq!(config.discount_factor(), 0.2);
        assert_eq!(config.category_keyword(), "camera");
        assert!(!config.dry_run());
        assert!(!config.monitoring_enabled());
        assert_eq!(config.index_settings().batch_size, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CATALOG_SALE_TEST_API_KEY", "from-env");

        let toml_content = r#"
[pipeline]
name = "env"

[source]
input = "products.json"

[discount]
factor = 0.3
category_keyword = "lens"

[index]
app_id = "APP"
api_key = "${CATALOG_SALE_TEST_API_KEY}"
index_name = "products"
batch_size = 250
auto_generate_object_id = false
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.index.api_key, "from-env");
        assert_eq!(config.discount_factor(), 0.3);
        assert_eq!(config.category_keyword(), "lens");

        let settings = config.index_settings();
        assert_eq!(settings.batch_size, 250);
        assert!(!settings.auto_generate_object_id);

        std::env::remove_var("CATALOG_SALE_TEST_API_KEY");
    }

    #[test]
    fn test_unresolved_credentials_fail_validation() {
        let toml_content = r#"
[pipeline]
name = "missing-env"

[source]
input = "products.json"

[index]
app_id = "APP"
api_key = "${CATALOG_SALE_TEST_UNSET_VARIABLE}"
index_name = "products"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(EtlError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_dry_run_skips_credential_checks() {
        let toml_content = r#"
[pipeline]
name = "preview"

[source]
input = "products.json"

[index]
app_id = "${CATALOG_SALE_TEST_UNSET_VARIABLE}"
api_key = ""
index_name = "products"

[load]
snapshot = "out/preview.json"
dry_run = true

[monitoring]
enabled = true
log_format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.json_logs());
        assert!(config.monitoring_enabled());
        assert_eq!(config.snapshot_file(), Some("out/preview.json"));
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let bad_factor = BASIC.replace("[index]", "[discount]\nfactor = 2.0\n\n[index]");
        let config = TomlConfig::from_toml_str(&bad_factor).unwrap();
        assert!(config.validate().is_err());

        let bad_host = format!("{}host = \"not a url\"\n", BASIC);
        let config = TomlConfig::from_toml_str(&bad_host).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let err = TomlConfig::from_toml_str("[pipeline]\nname = \"x\"\n").unwrap_err();
        assert!(matches!(err, EtlError::ConfigError { .. }));
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_invalid_toml_syntax_is_config_error() {
        let err = TomlConfig::from_toml_str("[pipeline\nname = ").unwrap_err();
        match err {
            EtlError::ConfigError { message } => {
                assert!(message.starts_with("TOML parsing error"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "spring-camera-sale");
    }
}
