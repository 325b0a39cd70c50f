use thiserror::Error;

/// Why a single document produced no record. Never escapes the worker.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no html content")]
    MissingInput,
    #[error("extraction failed: {0}")]
    Failed(String),
}

/// One record rejected inside an unordered bulk insert.
#[derive(Debug, Clone)]
pub struct WriteFailure {
    pub index: usize,
    pub company_id: String,
    pub duplicate_key: bool,
    pub message: String,
}

impl std::fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} ({}): {}", self.index, self.company_id, self.message)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bulk write rejected {} record(s), first {}", .0.len(), first_failure(.0))]
    BulkWrite(Vec<WriteFailure>),
}

impl StoreError {
    /// True when every rejected record in a bulk write was a duplicate key.
    pub fn is_duplicate_only(&self) -> bool {
        matches!(self, StoreError::BulkWrite(failures) if failures.iter().all(|f| f.duplicate_key))
    }
}

fn first_failure(failures: &[WriteFailure]) -> String {
    failures.first().map(ToString::to_string).unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}
