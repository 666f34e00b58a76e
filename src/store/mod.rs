//! Scan results store
//!
//! Connects to the MongoDB database holding pshtt results and runs the one
//! read this tool needs: the latest, live hosts that demand a client
//! certificate.

use anyhow::{Context, Result};
use bson::{Document, doc};
use futures::TryStreamExt;
use mongodb::{Client, Database};

use crate::config::DbCredentials;
use crate::error::SetupError;
use crate::report::ReportFormat;

/// Collection holding one document per scanned host
pub const HTTPS_SCAN_COLLECTION: &str = "https_scan";

/// Characters MongoDB refuses in database names
const INVALID_NAME_CHARS: &[char] = &['/', '\\', '.', ' ', '"', '$', '\0'];

/// A single read against the scan results collection
#[derive(Debug, Clone, PartialEq)]
pub struct HostQuery {
    pub filter: Document,
    pub projection: Document,
    pub sort: Option<Document>,
}

impl HostQuery {
    /// Query for hosts requiring client certificate authentication.
    ///
    /// The CSV report needs the scan date and sorts by agency; the JSON report
    /// drops the scan date and keeps the store's natural order.
    pub fn client_cert_hosts(format: ReportFormat) -> Self {
        let filter = doc! {
            "latest": true,
            "live": true,
            "https_client_auth_required": true,
        };

        match format {
            ReportFormat::Json => Self {
                filter,
                projection: doc! { "_id": false, "scan_date": false, "latest": false },
                sort: None,
            },
            ReportFormat::Csv => Self {
                filter,
                projection: doc! { "_id": false, "latest": false },
                sort: Some(doc! { "agency.name": 1 }),
            },
        }
    }
}

/// Source of host scan documents
#[allow(async_fn_in_trait)]
pub trait HostSource {
    /// Run `query` and return every matching document
    async fn find_hosts(&self, query: &HostQuery) -> Result<Vec<Document>>;
}

/// Open handle on the scan results database
pub struct ScanDatabase {
    database: Database,
}

impl ScanDatabase {
    /// Connect using loaded credentials.
    ///
    /// The server is pinged so an unreachable host fails here rather than at
    /// query time.
    pub async fn connect(creds: &DbCredentials) -> Result<Self, SetupError> {
        if !is_valid_database_name(&creds.database) {
            return Err(SetupError::DatabaseMissing {
                path: creds.source.clone(),
                name: creds.database.clone(),
            });
        }

        let connection_error = |source| SetupError::Connection {
            path: creds.source.clone(),
            source,
        };

        let client = Client::with_uri_str(&creds.uri)
            .await
            .map_err(connection_error)?;
        let database = client.database(&creds.database);

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(connection_error)?;
        tracing::debug!("Connected to database server for {}", creds.database);

        let collections = database
            .list_collection_names()
            .await
            .map_err(connection_error)?;
        if collections.is_empty() {
            return Err(SetupError::DatabaseMissing {
                path: creds.source.clone(),
                name: creds.database.clone(),
            });
        }

        Ok(Self { database })
    }
}

impl HostSource for ScanDatabase {
    async fn find_hosts(&self, query: &HostQuery) -> Result<Vec<Document>> {
        let collection = self.database.collection::<Document>(HTTPS_SCAN_COLLECTION);

        let mut find = collection
            .find(query.filter.clone())
            .projection(query.projection.clone());
        if let Some(sort) = &query.sort {
            find = find.sort(sort.clone());
        }

        let cursor = find
            .await
            .with_context(|| format!("Failed to query {HTTPS_SCAN_COLLECTION}"))?;
        let hosts: Vec<Document> = cursor
            .try_collect()
            .await
            .with_context(|| format!("Failed to read results from {HTTPS_SCAN_COLLECTION}"))?;

        tracing::info!(
            "Found {} hosts that require authentication via client certificates",
            hosts.len()
        );
        Ok(hosts)
    }
}

fn is_valid_database_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(INVALID_NAME_CHARS)
}
