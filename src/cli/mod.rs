//! Command-line interface
//!
//! Parses options, installs the log subscriber, opens the store and the mail
//! client, then hands off to the pipeline. Every failure is logged here and
//! turned into the process exit status.

use clap::Parser;
use std::path::PathBuf;

use crate::config::DbCredentials;
use crate::error::EXIT_SUCCESS;
use crate::logging::{self, LogLevel};
use crate::mail::{OutboundEmail, SesTransport};
use crate::pipeline::{self, ReportRequest};
use crate::report::ReportFormat;
use crate::store::ScanDatabase;

/// Email a report of hosts that require authentication via client certificates
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML file holding the scan database credentials
    #[arg(long, value_name = "FILE", env = "CLIENT_CERT_UPDATE_DB_CREDS_FILE")]
    pub db_creds_file: PathBuf,

    /// Sender address
    #[arg(long, value_name = "EMAIL", env = "CLIENT_CERT_UPDATE_FROM")]
    pub from: String,

    /// Recipients, comma-separated
    #[arg(long, value_name = "EMAIL", env = "CLIENT_CERT_UPDATE_TO")]
    pub to: String,

    /// CC recipients, comma-separated
    #[arg(long, value_name = "EMAIL", env = "CLIENT_CERT_UPDATE_CC")]
    pub cc: Option<String>,

    /// Reply-to address
    #[arg(long, value_name = "EMAIL", env = "CLIENT_CERT_UPDATE_REPLY")]
    pub reply: Option<String>,

    /// Message subject
    #[arg(long, env = "CLIENT_CERT_UPDATE_SUBJECT")]
    pub subject: String,

    /// Plain-text body template
    #[arg(long, value_name = "FILE", env = "CLIENT_CERT_UPDATE_TEXT")]
    pub text: PathBuf,

    /// HTML body template
    #[arg(long, value_name = "FILE", env = "CLIENT_CERT_UPDATE_HTML")]
    pub html: PathBuf,

    /// Logging level: debug, info, warning or error
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warning",
        env = "CLIENT_CERT_UPDATE_LOG_LEVEL"
    )]
    pub log_level: String,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Json, env = "CLIENT_CERT_UPDATE_FORMAT")]
    pub format: ReportFormat,
}

impl Cli {
    /// Execute the run and return the process exit status
    pub async fn run(self) -> i32 {
        let level = match self.log_level.parse::<LogLevel>() {
            Ok(level) => level,
            Err(err) => {
                let _guard = tracing::subscriber::set_default(logging::stderr_subscriber(
                    LogLevel::default(),
                ));
                let code = err.exit_code();
                log_failure(err);
                return code;
            }
        };
        let _guard = tracing::subscriber::set_default(logging::stderr_subscriber(level));
        tracing::debug!("Logging at level {}", level);

        let creds = match DbCredentials::load(&self.db_creds_file) {
            Ok(creds) => creds,
            Err(err) => {
                let code = err.exit_code();
                log_failure(err);
                return code;
            }
        };

        let store = match ScanDatabase::connect(&creds).await {
            Ok(store) => store,
            Err(err) => {
                let code = err.exit_code();
                log_failure(err);
                return code;
            }
        };

        let transport = SesTransport::from_env().await;
        let request = self.request();

        match pipeline::run(&store, &transport, &request).await {
            Ok(summary) => {
                tracing::debug!("Report covered {} hosts", summary.host_count);
                EXIT_SUCCESS
            }
            Err(err) => {
                let code = err.exit_code();
                log_failure(err);
                code
            }
        }
    }

    fn request(&self) -> ReportRequest {
        ReportRequest {
            format: self.format,
            email: OutboundEmail {
                from: self.from.clone(),
                to: self.to.clone(),
                cc: self.cc.clone(),
                reply_to: self.reply.clone(),
                subject: self.subject.clone(),
                text_template: self.text.clone(),
                html_template: self.html.clone(),
            },
        }
    }
}

/// Log a failure with its full source chain
fn log_failure<E>(err: E)
where
    E: std::error::Error + Send + Sync + 'static,
{
    tracing::error!("{:?}", anyhow::Error::new(err));
}
