//! CSV report formatter

use super::{
    HostScanRecord, ReportError, ReportFormat, ReportFormatter, domain_of, validate_hosts,
};
use bson::Document;
use chrono::{DateTime, Timelike, Utc};

/// Header row, in output order
pub const CSV_COLUMNS: [&str; 32] = [
    "Agency",
    "Base Domain",
    "Canonical URL",
    "Defaults To HTTPS",
    "Domain",
    "Domain Enforces HTTPS",
    "Domain Supports HTTPS",
    "Domain Uses Strong HSTS",
    "Downgrades HTTPS",
    "HSTS",
    "HSTS Base Domain Preloaded",
    "HSTS Entire Domain",
    "HSTS Header",
    "HSTS Max Age",
    "HSTS Preload Pending",
    "HSTS Preload Ready",
    "HSTS Preloaded",
    "HTTPS Bad Chain",
    "HTTPS Bad Hostname",
    "HTTPS Client Auth Required",
    "HTTPS Expired Cert",
    "HTTPS Full Connection",
    "HTTPS Live",
    "HTTPS Self Signed Cert",
    "Is Base Domain",
    "Live",
    "Redirect",
    "Redirect To",
    "Scan Date",
    "Strictly Forces HTTPS",
    "Unknown Error",
    "Valid HTTPS",
];

const SCAN_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Microsecond precision, used only when the fraction is non-zero
const SCAN_DATE_FRACTION_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// CSV report formatter - one fixed-column row per host, sorted by agency
pub struct CsvReportFormatter;

impl ReportFormatter for CsvReportFormatter {
    fn format(&self) -> ReportFormat {
        ReportFormat::Csv
    }

    fn render(&self, hosts: &[Document]) -> Result<Vec<u8>, ReportError> {
        let records = validate_hosts(hosts)?;

        let mut rows = Vec::with_capacity(records.len());
        for (index, (record, host)) in records.iter().zip(hosts).enumerate() {
            let scan_date = host
                .get_datetime("scan_date")
                .map_err(|source| ReportError::InvalidScanDate {
                    index,
                    domain: domain_of(host),
                    source,
                })?;
            rows.push(row(record, scan_date_cell(scan_date.to_chrono())));
        }
        // stable, so hosts within an agency keep query order
        rows.sort_by(|a, b| a[0].cmp(&b[0]));

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(Vec::new());
        writer.write_record(CSV_COLUMNS)?;
        for row in &rows {
            writer.write_record(row)?;
        }

        writer
            .into_inner()
            .map_err(|err| ReportError::Compress(err.into_error()))
    }
}

fn row(record: &HostScanRecord, scan_date: String) -> Vec<String> {
    vec![
        record.agency.name.clone(),
        record.base_domain.clone(),
        text(&record.canonical_url),
        flag(record.defaults_https),
        record.domain.clone(),
        flag(record.domain_enforces_https),
        flag(record.domain_supports_https),
        flag(record.domain_uses_strong_hsts),
        flag(record.downgrades_https),
        flag(record.hsts),
        flag(record.hsts_base_domain_preloaded),
        flag(record.hsts_entire_domain),
        text(&record.hsts_header),
        record
            .hsts_max_age
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        flag(record.hsts_preload_pending),
        flag(record.hsts_preload_ready),
        flag(record.hsts_preloaded),
        flag(record.https_bad_chain),
        flag(record.https_bad_hostname),
        flag(Some(record.https_client_auth_required)),
        flag(record.https_expired_cert),
        flag(record.https_full_connection),
        flag(record.https_live),
        flag(record.https_self_signed_cert),
        flag(record.is_base_domain),
        flag(Some(record.live)),
        flag(record.redirect),
        text(&record.redirect_to),
        scan_date,
        flag(record.strictly_forces_https),
        flag(record.unknown_error),
        flag(record.valid_https),
    ]
}

fn scan_date_cell(scan_date: DateTime<Utc>) -> String {
    let format = if scan_date.nanosecond() == 0 {
        SCAN_DATE_FORMAT
    } else {
        SCAN_DATE_FRACTION_FORMAT
    };
    scan_date.format(format).to_string()
}

/// `True`/`False`, or an empty cell for null
fn flag(value: Option<bool>) -> String {
    match value {
        Some(true) => "True".to_string(),
        Some(false) => "False".to_string(),
        None => String::new(),
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}
