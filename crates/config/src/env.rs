use std::env;

use reopens_common::{Month, ReopenError, ReopenResult};

pub const DEFAULT_REOPEN_COUNT_FIELD: &str = "Reopen Count";
pub const DEFAULT_REOPEN_LOG_FIELD: &str = "Reopen log [Short text]";
pub const DEFAULT_EXPORT_PATH: &str = "export.csv";
pub const DEFAULT_REPORTS_DIR: &str = "reports";

/// Configuration for the export stage (field resolution + search + export CSV).
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub month: Month,
    pub out_path: String,
    pub count_field: String,
    pub log_field: String,
}

impl ExportConfig {
    /// Load from environment variables.
    /// Loads `.env` if present, then reads `MONTH` (required, `YYYY-MM`).
    pub fn from_env() -> ReopenResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        Ok(Self {
            month: Month::parse(&get_var("MONTH")?)?,
            out_path: get_var_or("EXPORT_PATH", DEFAULT_EXPORT_PATH),
            count_field: get_var_or("REOPEN_COUNT_FIELD", DEFAULT_REOPEN_COUNT_FIELD),
            log_field: get_var_or("REOPEN_LOG_FIELD", DEFAULT_REOPEN_LOG_FIELD),
        })
    }
}

/// Configuration for the report stage (extract + aggregate + report CSVs).
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub month: Month,
    pub export_path: String,
    pub reports_dir: String,
}

impl ReportConfig {
    pub fn from_env() -> ReopenResult<Self> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            month: Month::parse(&get_var("MONTH")?)?,
            export_path: get_var_or("EXPORT_PATH", DEFAULT_EXPORT_PATH),
            reports_dir: get_var_or("REPORTS_DIR", DEFAULT_REPORTS_DIR),
        })
    }
}

pub fn get_var(key: &str) -> ReopenResult<String> {
    env::var(key).map_err(|_| ReopenError::Config(format!("{key} is required but not set")))
}

pub fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}
