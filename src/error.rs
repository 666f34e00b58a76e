//! Error types for the report run
//!
//! Setup failures (credentials, connection) and run failures (query, report,
//! message, delivery) are kept apart so the CLI can map each one onto the
//! documented exit code.

use std::path::PathBuf;
use thiserror::Error;

use crate::report::ReportError;

/// Exit status for a successful run
pub const EXIT_SUCCESS: i32 = 0;

/// Exit status for configuration, database, data and unanswered-send failures
pub const EXIT_SETUP_FAILURE: i32 = 1;

/// Exit status when the mail API answers with a non-200 status
pub const EXIT_DELIVERY_FAILURE: i32 = 2;

/// Failures while loading credentials or connecting to the results store
#[derive(Debug, Error)]
pub enum SetupError {
    /// Log level outside debug/info/warning/error
    #[error(
        "\"{0}\" is not a valid logging level.  Possible values are debug, info, warning, and error."
    )]
    InvalidLogLevel(String),

    #[error("Database configuration file {} does not exist", path.display())]
    CredentialsNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database configuration file {} does not contain valid YAML", path.display())]
    InvalidYaml {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },

    #[error("Database configuration file {} does not contain the expected keys", path.display())]
    MissingKeys {
        path: PathBuf,
        #[source]
        source: Box<figment::Error>,
    },

    #[error("Unable to connect to the database server in {}", path.display())]
    Connection {
        path: PathBuf,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("The database in {} does not exist", path.display())]
    DatabaseMissing { path: PathBuf, name: String },
}

impl SetupError {
    pub fn exit_code(&self) -> i32 {
        EXIT_SETUP_FAILURE
    }
}

/// Failures after the store connection is open
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Unable to query the scan results database")]
    Query(#[source] anyhow::Error),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Unable to read message template {}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to build the email message")]
    Message(#[source] anyhow::Error),

    /// The mail API answered with something other than 200
    #[error("Unable to send message.  Response from SES is: {response}")]
    Delivery { status: u16, response: String },

    /// The mail API could not be reached at all
    #[error("Unable to send message.  No response from SES")]
    Transport(#[source] anyhow::Error),
}

impl RunError {
    /// Exit status the process should terminate with
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Delivery { .. } => EXIT_DELIVERY_FAILURE,
            _ => EXIT_SETUP_FAILURE,
        }
    }
}
