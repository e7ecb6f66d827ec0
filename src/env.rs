use std::path::Path;

use tracing::{info, warn};

use crate::error::AppError;

/// Which backing store to run against. The in-memory backend exists for
/// local development and the test suite; production always talks REST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Rest,
    Memory,
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub backend: Backend,
    pub spreadsheet_id: String,
    pub api_token: String,
}

impl SheetsConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let backend = match std::env::var("SHEETS_BACKEND").as_deref() {
            Ok("memory") => Backend::Memory,
            _ => Backend::Rest,
        };

        if backend == Backend::Memory {
            return Ok(Self {
                backend,
                spreadsheet_id: String::new(),
                api_token: String::new(),
            });
        }

        let spreadsheet_id = std::env::var("SPREADSHEET_ID")
            .map_err(|_| AppError::Config("SPREADSHEET_ID not set".to_string()))?;
        let api_token = std::env::var("SHEETS_API_TOKEN")
            .map_err(|_| AppError::Config("SHEETS_API_TOKEN not set".to_string()))?;

        Ok(Self {
            backend,
            spreadsheet_id,
            api_token,
        })
    }
}

pub fn load_environment() -> Result<(), Box<dyn std::error::Error>> {
    let is_production =
        dotenvy::var("ROCKET_PROFILE").unwrap_or("development".to_string()) == "production";

    let env_files = if is_production {
        vec!["config/common.env", "config/prod.env", ".secrets.env"]
    } else {
        vec!["config/common.env", "config/dev.env", ".secrets.env"]
    };

    for env_file in env_files {
        load_env_file(env_file)?;
    }

    Ok(())
}

fn load_env_file(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !Path::new(path).exists() {
        warn!("Warning: Environment file {} not found, skipping", path);
        return Ok(());
    }

    dotenvy::from_filename_override(path)?;
    info!("Loaded environment from: {}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn memory_backend_needs_no_credentials() {
        temp_env::with_vars(
            [
                ("SHEETS_BACKEND", Some("memory")),
                ("SPREADSHEET_ID", None),
                ("SHEETS_API_TOKEN", None),
            ],
            || {
                let config = SheetsConfig::from_env().unwrap();
                assert_eq!(config.backend, Backend::Memory);
            },
        );
    }

    #[test]
    #[serial_test::serial]
    fn rest_backend_requires_spreadsheet_id() {
        temp_env::with_vars(
            [
                ("SHEETS_BACKEND", None::<&str>),
                ("SPREADSHEET_ID", None),
                ("SHEETS_API_TOKEN", None),
            ],
            || {
                let err = SheetsConfig::from_env().unwrap_err();
                assert!(matches!(err, AppError::Config(_)));
            },
        );
    }

    #[test]
    #[serial_test::serial]
    fn rest_backend_reads_credentials() {
        temp_env::with_vars(
            [
                ("SHEETS_BACKEND", None),
                ("SPREADSHEET_ID", Some("sheet-123")),
                ("SHEETS_API_TOKEN", Some("token-abc")),
            ],
            || {
                let config = SheetsConfig::from_env().unwrap();
                assert_eq!(config.backend, Backend::Rest);
                assert_eq!(config.spreadsheet_id, "sheet-123");
                assert_eq!(config.api_token, "token-abc");
            },
        );
    }
}
