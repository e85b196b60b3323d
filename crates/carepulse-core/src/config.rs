//! Runtime configuration read from environment variables.
//!
//! Backend credentials are required up front. Collection and bucket IDs are
//! optional: when one is missing the actions that need it fall back to
//! synthetic records instead of failing.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required Appwrite env variables: {}", .0.join(", "))]
    MissingAppwrite(Vec<&'static str>),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

pub const DEFAULT_DB_PATH: &str = "carepulse.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Credentials for the hosted backend.
#[derive(Debug, Clone, PartialEq)]
pub struct AppwriteSettings {
    /// API root, e.g. `https://cloud.appwrite.io/v1`
    pub endpoint: String,
    pub project_id: String,
    pub api_key: String,
}

/// Which backend implementation to run against.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendConfig {
    Appwrite(AppwriteSettings),
    /// SQLite store at `path`
    Local { path: PathBuf },
}

/// Where portal records live on the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    pub database_id: Option<String>,
    pub patient_collection_id: Option<String>,
    pub appointment_collection_id: Option<String>,
    /// Bucket for identification documents
    pub bucket_id: Option<String>,
}

impl Collections {
    /// Database and patient collection, when both are configured.
    pub fn patients(&self) -> Option<(&str, &str)> {
        Some((
            self.database_id.as_deref()?,
            self.patient_collection_id.as_deref()?,
        ))
    }

    /// Database and appointment collection, when both are configured.
    pub fn appointments(&self) -> Option<(&str, &str)> {
        Some((
            self.database_id.as_deref()?,
            self.appointment_collection_id.as_deref()?,
        ))
    }
}

/// Complete portal configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend: BackendConfig,
    pub collections: Collections,
    /// Passkey guarding the administrator endpoints
    pub admin_passkey: String,
    pub bind_addr: String,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary lookup (blank values count as unset).
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match get("CAREPULSE_BACKEND").as_deref() {
            None | Some("appwrite") => {
                let endpoint = get("APPWRITE_ENDPOINT");
                let project_id = get("APPWRITE_PROJECT_ID");
                let api_key = get("APPWRITE_API_KEY");

                let mut missing = Vec::new();
                if endpoint.is_none() {
                    missing.push("APPWRITE_ENDPOINT");
                }
                if project_id.is_none() {
                    missing.push("APPWRITE_PROJECT_ID");
                }
                if api_key.is_none() {
                    missing.push("APPWRITE_API_KEY");
                }

                match (endpoint, project_id, api_key) {
                    (Some(endpoint), Some(project_id), Some(api_key)) => {
                        BackendConfig::Appwrite(AppwriteSettings {
                            endpoint,
                            project_id,
                            api_key,
                        })
                    }
                    _ => return Err(ConfigError::MissingAppwrite(missing)),
                }
            }
            Some("local") => BackendConfig::Local {
                path: get("CAREPULSE_DB_PATH")
                    .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
                    .into(),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "CAREPULSE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let collections = Collections {
            database_id: get("DATABASE_ID"),
            patient_collection_id: get("PATIENT_COLLECTION_ID"),
            appointment_collection_id: get("APPOINTMENT_COLLECTION_ID"),
            bucket_id: get("BUCKET_ID"),
        };

        let admin_passkey = get("ADMIN_PASSKEY").ok_or(ConfigError::Missing("ADMIN_PASSKEY"))?;
        let bind_addr = get("CAREPULSE_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(Config {
            backend,
            collections,
            admin_passkey,
            bind_addr,
        })
    }
}
