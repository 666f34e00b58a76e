//! Database credentials
//!
//! Loads the YAML credentials file that locates the scan results store. The
//! file uses the mongo-db-from-config layout (`database.uri` + `database.name`)
//! or spells the connection out as host/port/username/password. Values from
//! `CLIENT_CERT_UPDATE_DB_*` environment variables override the file.

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::SetupError;

/// Prefix for environment overrides, e.g. `CLIENT_CERT_UPDATE_DB_DATABASE__PASSWORD`
pub const ENV_PREFIX: &str = "CLIENT_CERT_UPDATE_DB_";

/// Port used when the component form omits one
pub const DEFAULT_MONGO_PORT: u16 = 27017;

/// Top level of the credentials file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsFile {
    /// Layout version, informational only
    #[serde(default)]
    pub version: Option<String>,

    /// Connection details
    pub database: DatabaseConfig,
}

/// Connection details for the scan results database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database holding the `https_scan` collection
    pub name: String,

    /// Full connection string; takes precedence over the component fields
    #[serde(default)]
    pub uri: Option<String>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

/// Validated credentials ready for connecting
#[derive(Debug, Clone)]
pub struct DbCredentials {
    /// File the credentials came from, kept for diagnostics
    pub source: PathBuf,
    /// Connection string
    pub uri: String,
    /// Database name
    pub database: String,
}

impl DatabaseConfig {
    /// Resolve the connection string, or `None` when neither form is present
    pub fn connection_uri(&self) -> Option<String> {
        if let Some(uri) = &self.uri {
            return Some(uri.clone());
        }

        let host = self.host.as_deref()?;
        let port = self.port.unwrap_or(DEFAULT_MONGO_PORT);
        let auth = match (&self.username, &self.password) {
            (Some(user), Some(password)) => format!("{user}:{password}@"),
            (Some(user), None) => format!("{user}@"),
            _ => String::new(),
        };

        Some(format!("mongodb://{auth}{host}:{port}/{}", self.name))
    }
}

impl DbCredentials {
    /// Load credentials from a YAML file plus environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SetupError> {
        let path = path.as_ref();

        let content =
            std::fs::read_to_string(path).map_err(|source| SetupError::CredentialsNotFound {
                path: path.to_path_buf(),
                source,
            })?;

        // syntax first, so bad YAML is not reported as missing keys
        serde_yml::from_str::<serde_yml::Value>(&content).map_err(|source| {
            SetupError::InvalidYaml {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let file: CredentialsFile = Figment::new()
            .merge(Yaml::string(&content))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|source| SetupError::MissingKeys {
                path: path.to_path_buf(),
                source: Box::new(source),
            })?;

        let uri = file
            .database
            .connection_uri()
            .ok_or_else(|| SetupError::MissingKeys {
                path: path.to_path_buf(),
                source: Box::new(figment::Error::missing_field("database.uri")),
            })?;

        tracing::debug!(
            "Loaded credentials for database {} from {}",
            file.database.name,
            path.display()
        );

        Ok(Self {
            source: path.to_path_buf(),
            uri,
            database: file.database.name,
        })
    }
}
