//! Report attachments
//!
//! Turns host scan documents into the compressed attachment mailed with the
//! update. Output formats are pluggable through [`ReportFormatter`].

use std::fmt;
use std::io::Write;

use bson::Document;
use flate2::Compression;
use flate2::write::GzEncoder;
use thiserror::Error;

pub use json::JsonReportFormatter;
pub use record::{Agency, HostScanRecord};
pub use table::{CSV_COLUMNS, CsvReportFormatter};

mod json;
mod record;
mod table;

/// Base name shared by every attachment
pub const ATTACHMENT_STEM: &str = "hosts_that_require_auth_via_client_certs";

/// `Content-Encoding` declared on attachments whose type names the uncompressed body
pub const GZIP_ENCODING: &str = "gzip";

/// Core formatting trait - one implementation per output format
pub trait ReportFormatter {
    /// Format this formatter produces
    fn format(&self) -> ReportFormat;

    /// Serialize `hosts` to uncompressed bytes.
    ///
    /// Every host is validated before anything is written; a record that does
    /// not match [`HostScanRecord`] fails the whole report.
    fn render(&self, hosts: &[Document]) -> Result<Vec<u8>, ReportError>;
}

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// Indented, key-sorted JSON
    #[default]
    Json,
    /// Fixed-column CSV sorted by agency
    Csv,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }

    /// MIME type declared for the attachment
    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Json => "application/json",
            ReportFormat::Csv => "application/gzip",
        }
    }

    /// `Content-Encoding` header value, if the attachment carries one.
    ///
    /// The CSV attachment is typed as gzip itself, so it gets none.
    pub fn content_encoding(&self) -> Option<&'static str> {
        match self {
            ReportFormat::Json => Some(GZIP_ENCODING),
            ReportFormat::Csv => None,
        }
    }

    /// Attachment filename, e.g. `hosts_that_require_auth_via_client_certs.csv.gz`
    pub fn filename(&self) -> String {
        format!("{ATTACHMENT_STEM}.{}.gz", self.extension())
    }

    pub fn formatter(&self) -> Box<dyn ReportFormatter> {
        match self {
            ReportFormat::Json => Box::new(JsonReportFormatter),
            ReportFormat::Csv => Box::new(CsvReportFormatter),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A compressed report ready to attach to a message
#[derive(Debug, Clone)]
pub struct ReportAttachment {
    pub filename: String,
    pub content_type: &'static str,
    pub content_encoding: Option<&'static str>,
    /// Gzip-compressed report body
    pub data: Vec<u8>,
    /// Number of hosts in the report
    pub host_count: usize,
}

/// Errors raised while formatting a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Host record {index} ({domain}) does not match the expected schema")]
    InvalidRecord {
        index: usize,
        domain: String,
        #[source]
        source: bson::de::Error,
    },

    #[error("Host record {index} ({domain}) has no usable scan_date")]
    InvalidScanDate {
        index: usize,
        domain: String,
        #[source]
        source: bson::document::ValueAccessError,
    },

    #[error("Unable to serialize the JSON report")]
    Json(#[from] serde_json::Error),

    #[error("Unable to write the CSV report")]
    Csv(#[from] csv::Error),

    #[error("Unable to compress the report")]
    Compress(#[from] std::io::Error),
}

/// Format `hosts` with `formatter` and gzip the result
pub fn build_attachment(
    formatter: &dyn ReportFormatter,
    hosts: &[Document],
) -> Result<ReportAttachment, ReportError> {
    let format = formatter.format();
    let rendered = formatter.render(hosts)?;
    let data = gzip(&rendered)?;

    tracing::debug!(
        "Rendered {} report with {} hosts ({} bytes, {} compressed)",
        format,
        hosts.len(),
        rendered.len(),
        data.len()
    );

    Ok(ReportAttachment {
        filename: format.filename(),
        content_type: format.content_type(),
        content_encoding: format.content_encoding(),
        data,
        host_count: hosts.len(),
    })
}

/// Gzip `bytes` at the default compression level
pub fn gzip(bytes: &[u8]) -> Result<Vec<u8>, ReportError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Domain of a raw document, for attributing errors
fn domain_of(host: &Document) -> String {
    host.get_str("domain").unwrap_or("<unknown domain>").to_string()
}

/// Validate every host against [`HostScanRecord`]
fn validate_hosts(hosts: &[Document]) -> Result<Vec<HostScanRecord>, ReportError> {
    hosts
        .iter()
        .enumerate()
        .map(|(index, host)| {
            bson::from_document::<HostScanRecord>(host.clone()).map_err(|source| {
                ReportError::InvalidRecord {
                    index,
                    domain: domain_of(host),
                    source,
                }
            })
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_filenames() {
        assert_eq!(
            ReportFormat::Json.filename(),
            "hosts_that_require_auth_via_client_certs.json.gz"
        );
        assert_eq!(
            ReportFormat::Csv.filename(),
            "hosts_that_require_auth_via_client_certs.csv.gz"
        );
    }

    #[test]
    fn test_build_attachment_is_gzipped() {
        let hosts = vec![fixtures::host("Alpha", "alpha.gov")];
        let attachment = build_attachment(&CsvReportFormatter, &hosts).unwrap();

        assert_eq!(attachment.content_type, "application/gzip");
        assert_eq!(attachment.content_encoding, None);
        assert_eq!(attachment.host_count, 1);
        // gzip magic
        assert_eq!(&attachment.data[..2], &[0x1f, 0x8b]);

        let mut text = String::new();
        GzDecoder::new(attachment.data.as_slice())
            .read_to_string(&mut text)
            .unwrap();
        assert!(text.contains("alpha.gov"));
    }

    #[test]
    fn test_json_attachment_declares_gzip_encoding() {
        let attachment = build_attachment(&JsonReportFormatter, &[]).unwrap();

        assert_eq!(attachment.content_type, "application/json");
        assert_eq!(attachment.content_encoding, Some("gzip"));
        assert_eq!(&attachment.data[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_formatter_selection() {
        assert_eq!(ReportFormat::Json.formatter().format(), ReportFormat::Json);
        assert_eq!(ReportFormat::Csv.formatter().format(), ReportFormat::Csv);
    }

    #[test]
    fn test_invalid_record_names_the_host() {
        let mut broken = fixtures::host("Alpha", "alpha.gov");
        broken.remove("valid_https");
        let hosts = vec![fixtures::host("Beta", "beta.gov"), broken];

        let err = validate_hosts(&hosts).unwrap_err();
        match err {
            ReportError::InvalidRecord { index, domain, .. } => {
                assert_eq!(index, 1);
                assert_eq!(domain, "alpha.gov");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
