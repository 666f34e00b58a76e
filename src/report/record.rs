//! Host scan record schema
//!
//! Field names match the pshtt documents in `https_scan`. Every field is
//! required; the `Option` fields accept an explicit `null` but still fail when
//! the key is absent.

use serde::{Deserialize, Deserializer};

/// Agency that owns a scanned host
#[derive(Debug, Clone, Deserialize)]
pub struct Agency {
    pub name: String,
}

/// One pshtt scan result as read from the store
#[derive(Debug, Clone, Deserialize)]
pub struct HostScanRecord {
    pub agency: Agency,
    pub base_domain: String,
    #[serde(deserialize_with = "nullable")]
    pub canonical_url: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub defaults_https: Option<bool>,
    pub domain: String,
    #[serde(deserialize_with = "nullable")]
    pub domain_enforces_https: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub domain_supports_https: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub domain_uses_strong_hsts: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub downgrades_https: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub hsts: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub hsts_base_domain_preloaded: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub hsts_entire_domain: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub hsts_header: Option<String>,
    /// Stored as int32, int64 or double depending on the scanner version
    #[serde(deserialize_with = "nullable")]
    pub hsts_max_age: Option<serde_json::Number>,
    #[serde(deserialize_with = "nullable")]
    pub hsts_preload_pending: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub hsts_preload_ready: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub hsts_preloaded: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub https_bad_chain: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub https_bad_hostname: Option<bool>,
    pub https_client_auth_required: bool,
    #[serde(deserialize_with = "nullable")]
    pub https_expired_cert: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub https_full_connection: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub https_live: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub https_self_signed_cert: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub is_base_domain: Option<bool>,
    pub live: bool,
    #[serde(deserialize_with = "nullable")]
    pub redirect: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub redirect_to: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub strictly_forces_https: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub unknown_error: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub valid_https: Option<bool>,
}

/// Present-but-possibly-null field.
///
/// A bare `Option` would default to `None` when the key is missing.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures;
    use bson::{Bson, doc};

    #[test]
    fn test_record_from_fixture() {
        let record: HostScanRecord =
            bson::from_document(fixtures::host("Department of Examples", "example.gov")).unwrap();

        assert_eq!(record.agency.name, "Department of Examples");
        assert_eq!(record.domain, "example.gov");
        assert_eq!(record.canonical_url.as_deref(), Some("https://example.gov"));
        assert_eq!(record.hsts_entire_domain, None);
        assert_eq!(record.redirect_to, None);
        assert_eq!(record.hsts_max_age.unwrap().to_string(), "31536000");
        assert!(record.https_client_auth_required);
    }

    #[test]
    fn test_missing_nullable_field_is_rejected() {
        let mut host = fixtures::host("Alpha", "alpha.gov");
        host.remove("redirect_to");

        let err = bson::from_document::<HostScanRecord>(host).unwrap_err();
        assert!(err.to_string().contains("redirect_to"));
    }

    #[test]
    fn test_missing_agency_name_is_rejected() {
        let mut host = fixtures::host("Alpha", "alpha.gov");
        host.insert("agency", doc! { "id": "ALPHA" });

        assert!(bson::from_document::<HostScanRecord>(host).is_err());
    }

    #[test]
    fn test_mistyped_field_is_rejected() {
        let mut host = fixtures::host("Alpha", "alpha.gov");
        host.insert("live", "yes");

        assert!(bson::from_document::<HostScanRecord>(host).is_err());
    }

    #[test]
    fn test_max_age_accepts_any_numeric_width() {
        let mut host = fixtures::host("Alpha", "alpha.gov");
        host.insert("hsts_max_age", Bson::Int64(63_072_000));
        let record: HostScanRecord = bson::from_document(host).unwrap();
        assert_eq!(record.hsts_max_age.unwrap().to_string(), "63072000");
    }
}
