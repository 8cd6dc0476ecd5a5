use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Malformed record #{index}: field '{field}' {reason}")]
    MalformedRecord {
        index: usize,
        field: String,
        reason: String,
    },

    #[error("Search index upload failed (HTTP {status}): {message}")]
    UploadError { status: u16, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Io,
    Configuration,
    Data,
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::IoError(_) => ErrorCategory::Io,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. }
            | EtlError::ValidationError { .. }
            | EtlError::MalformedRecord { .. } => ErrorCategory::Data,
            EtlError::UploadError { .. } => ErrorCategory::Upload,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路與上傳失敗可以直接重跑
            EtlError::ApiError(_) => ErrorSeverity::Medium,
            EtlError::UploadError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            EtlError::UploadError { .. } => ErrorSeverity::High,
            EtlError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::ApiError(_) => {
                "Check network connectivity and that the source/index host is reachable".to_string()
            }
            EtlError::IoError(_) => "Check that the input file exists and is readable".to_string(),
            EtlError::SerializationError(_) => {
                "Make sure the product file is a valid JSON array".to_string()
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => {
                "Review the command line flags or the TOML configuration file".to_string()
            }
            EtlError::MissingConfigError { field } => {
                format!("Provide '{}' via flag, environment variable or config file", field)
            }
            EtlError::ProcessingError { .. } | EtlError::ValidationError { .. } => {
                "Inspect the product data for unexpected content".to_string()
            }
            EtlError::MalformedRecord { index, field, .. } => format!(
                "Fix field '{}' of record #{} in the product file and re-run",
                field, index
            ),
            EtlError::UploadError { status, .. } => match status {
                401 | 403 => "Verify the application id and that the API key has write access"
                    .to_string(),
                404 => "Verify the index name and host".to_string(),
                _ => "The transformed catalog is still valid, re-run the upload".to_string(),
            },
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ApiError(_) => format!("Could not reach the remote service: {}", self),
            EtlError::MalformedRecord { index, field, reason } => {
                format!("Product #{} is malformed: '{}' {}", index, field, reason)
            }
            EtlError::UploadError { status, .. } => {
                format!("The search index rejected the upload (HTTP {})", status)
            }
            _ => self.to_string(),
        }
    }

    /// 依錯誤嚴重程度決定 process exit code
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
