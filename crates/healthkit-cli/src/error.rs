use thiserror::Error;

/// Main error type for healthkit-cli
#[derive(Error, Debug)]
pub enum HealthError {
    #[error("Archive parse error: {0}")]
    Parse(String),

    #[error("Archive has no <{0}> entries")]
    MissingCollection(&'static str),

    #[error("Invalid {field} value '{value}'. Expected format {expected}")]
    DateParse {
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid date format: {0}. Expected YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, HealthError>;

impl HealthError {
    /// Create an archive parse error from a message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a date parse error for a field
    pub fn date_parse(field: impl Into<String>, value: impl Into<String>, expected: &'static str) -> Self {
        Self::DateParse {
            field: field.into(),
            value: value.into(),
            expected,
        }
    }

    /// Create a configuration error from a message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a storage error from a message
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an invalid parameter error from a message
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

/// Render an error for the terminal, adding a hint where one helps.
pub fn format_user_error(err: &HealthError) -> String {
    match err {
        HealthError::MissingCollection(_) | HealthError::Parse(_) | HealthError::Xml(_) => {
            format!("{}\nHint: pass the export.xml found inside the Health app export archive", err)
        }
        HealthError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
            format!("{}\nHint: check the input path", err)
        }
        HealthError::Config(_) => {
            format!("{}\nHint: run 'healthkit config show' to see the effective settings", err)
        }
        _ => err.to_string(),
    }
}
