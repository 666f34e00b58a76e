//! JSON report formatter

use super::{ReportError, ReportFormat, ReportFormatter, validate_hosts};
use bson::{Bson, Document};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

/// Four-space indent, matching the reports recipients already parse
const INDENT: &[u8] = b"    ";

/// JSON report formatter - the host documents exactly as stored
pub struct JsonReportFormatter;

impl ReportFormatter for JsonReportFormatter {
    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }

    fn render(&self, hosts: &[Document]) -> Result<Vec<u8>, ReportError> {
        validate_hosts(hosts)?;

        let mut report = Value::Array(
            hosts
                .iter()
                .map(|host| Bson::Document(host.clone()).into_relaxed_extjson())
                .collect(),
        );
        // bson enables serde_json's preserve_order, so keys need explicit sorting
        report.sort_all_objects();

        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
        report.serialize(&mut serializer)?;

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{build_attachment, fixtures};
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn decode(data: &[u8]) -> Value {
        let mut text = String::new();
        GzDecoder::new(data).read_to_string(&mut text).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_round_trip_preserves_records() {
        let hosts = vec![
            fixtures::host_without_scan_date("Zeta", "zeta.gov"),
            fixtures::host_without_scan_date("Alpha", "alpha.gov"),
        ];

        let attachment = build_attachment(&JsonReportFormatter, &hosts).unwrap();
        let report = decode(&attachment.data);
        let records = report.as_array().unwrap();

        assert_eq!(records.len(), 2);
        // natural query order, no re-sorting
        assert_eq!(records[0]["domain"], "zeta.gov");
        assert_eq!(records[1]["domain"], "alpha.gov");
        assert_eq!(records[1]["agency"]["name"], "Alpha");
        assert_eq!(records[1]["hsts_max_age"], 31_536_000);
        assert_eq!(records[1]["redirect_to"], Value::Null);
        assert_eq!(records[1]["https_client_auth_required"], true);
        assert!(records[1].get("scan_date").is_none());
        assert!(records[1].get("latest").is_none());
        assert!(records[1].get("_id").is_none());
    }

    #[test]
    fn test_keys_sorted_and_indented() {
        let hosts = vec![fixtures::host_without_scan_date("Alpha", "alpha.gov")];
        let rendered = String::from_utf8(JsonReportFormatter.render(&hosts).unwrap()).unwrap();

        assert!(rendered.starts_with("[\n    {\n        \"agency\": {\n            \"id\""));
        let agency = rendered.find("\"agency\"").unwrap();
        let base_domain = rendered.find("\"base_domain\"").unwrap();
        let valid_https = rendered.find("\"valid_https\"").unwrap();
        assert!(agency < base_domain && base_domain < valid_https);
    }

    #[test]
    fn test_empty_result_is_empty_list() {
        let rendered = JsonReportFormatter.render(&[]).unwrap();
        assert_eq!(rendered, b"[]");

        let attachment = build_attachment(&JsonReportFormatter, &[]).unwrap();
        assert_eq!(decode(&attachment.data), Value::Array(vec![]));
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let mut host = fixtures::host_without_scan_date("Alpha", "alpha.gov");
        host.insert("sslyze_scanned", true);

        let rendered = JsonReportFormatter.render(&[host]).unwrap();
        let report: Value = serde_json::from_slice(&rendered).unwrap();
        assert_eq!(report[0]["sslyze_scanned"], true);
    }

    #[test]
    fn test_missing_field_fails() {
        let mut host = fixtures::host_without_scan_date("Alpha", "alpha.gov");
        host.remove("base_domain");

        let err = JsonReportFormatter.render(&[host]).unwrap_err();
        assert!(matches!(err, ReportError::InvalidRecord { index: 0, .. }));
    }
}
