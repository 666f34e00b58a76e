//! # client-cert-update
//!
//! Emails a report of the hosts that require authentication via client
//! certificates.
//!
//! The latest live pshtt results are read from MongoDB, rendered as JSON or
//! CSV, gzip-compressed and attached to a message sent through Amazon SES.
//!
//! ```bash
//! client-cert-update --db-creds-file=/run/secrets/scan_read_creds.yml \
//!     --from=reports@example.gov --to=ops@example.gov \
//!     --subject="Client certificate hosts" \
//!     --text=body.txt --html=body.html --format=csv
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod mail;
pub mod pipeline;
pub mod report;
pub mod store;

pub use cli::Cli;
pub use error::{RunError, SetupError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
