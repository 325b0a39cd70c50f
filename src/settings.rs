use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use config::{Config, Environment, File};
use regex::Regex;
use serde::Deserialize;

use crate::error::SettingsError;

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,63}$").unwrap());

/// Job settings, read once at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input_db: PathBuf,
    pub output_db: PathBuf,
    pub input_table: String,
    pub output_table: String,
    /// Records per page read from the input store.
    pub read_batch_size: usize,
    /// Records per unordered insert.
    pub insert_batch_size: usize,
    pub workers: usize,
    /// Records handed to a worker at a time. Has no effect on results.
    pub chunk_size: usize,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            input_db: PathBuf::from("data/company_scrape.sqlite"),
            output_db: PathBuf::from("data/company_scrape.sqlite"),
            input_table: "input_companies".to_string(),
            output_table: "scraped_companies".to_string(),
            read_batch_size: 2000,
            insert_batch_size: 500,
            workers: 8,
            chunk_size: 50,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Defaults, then the optional file, then `ETL_*` environment variables.
    pub fn load(file: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_from(file, Environment::with_prefix("ETL").try_parsing(true))
    }

    fn load_from(file: Option<&Path>, env: Environment) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }
        let settings: Settings = builder.add_source(env).build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let sizes = [
            ("read_batch_size", self.read_batch_size),
            ("insert_batch_size", self.insert_batch_size),
            ("workers", self.workers),
            ("chunk_size", self.chunk_size),
        ];
        for (key, value) in sizes {
            if value == 0 {
                return Err(SettingsError::Invalid {
                    key,
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        for (key, table) in [("input_table", &self.input_table), ("output_table", &self.output_table)] {
            if !IDENT_RE.is_match(table) {
                return Err(SettingsError::Invalid {
                    key,
                    reason: format!("{:?} is not a plain table name", table),
                });
            }
        }
        Ok(())
    }
}
