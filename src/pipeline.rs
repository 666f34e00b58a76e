//! Report pipeline
//!
//! Query, format, assemble, send. Each stage runs once, in order, and the first
//! failure ends the run before anything is sent.

use crate::error::RunError;
use crate::mail::{MailTransport, OutboundEmail};
use crate::report::{ReportFormat, build_attachment};
use crate::store::{HostQuery, HostSource};

/// Everything one run needs besides its collaborators
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub format: ReportFormat,
    pub email: OutboundEmail,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub host_count: usize,
    pub attachment: String,
}

/// Run the query and mail the resulting report
pub async fn run<S, T>(source: &S, transport: &T, request: &ReportRequest) -> Result<RunSummary, RunError>
where
    S: HostSource,
    T: MailTransport,
{
    let query = HostQuery::client_cert_hosts(request.format);
    let hosts = source.find_hosts(&query).await.map_err(RunError::Query)?;

    let formatter = request.format.formatter();
    let attachment = build_attachment(formatter.as_ref(), &hosts)?;

    let message = request.email.assemble(&attachment)?;

    let response = transport
        .send_raw(&message.formatted())
        .await
        .map_err(RunError::Transport)?;
    if !response.is_success() {
        return Err(RunError::Delivery {
            status: response.status,
            response: response.body,
        });
    }

    tracing::info!(
        "Sent {} with {} hosts to {}",
        attachment.filename,
        attachment.host_count,
        request.email.to
    );
    Ok(RunSummary {
        host_count: attachment.host_count,
        attachment: attachment.filename,
    })
}
