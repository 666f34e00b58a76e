//! Email assembly and delivery
//!
//! [`OutboundEmail`] builds the MIME message; a [`MailTransport`] submits the
//! raw bytes. Delivery is attempted exactly once.

use anyhow::Result;

mod message;
mod ses;

pub use message::{ContentEncoding, OutboundEmail};
pub use ses::SesTransport;

/// HTTP status the mail API returns for an accepted message
pub const STATUS_OK: u16 = 200;

/// What the mail API answered
#[derive(Debug, Clone, PartialEq)]
pub struct SendResponse {
    /// HTTP status code
    pub status: u16,
    /// Full response, rendered for diagnostics
    pub body: String,
}

impl SendResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Send-raw-email API
#[allow(async_fn_in_trait)]
pub trait MailTransport {
    /// Submit a fully formed message.
    ///
    /// Returns `Err` only when no response was received at all; a rejection is
    /// an `Ok` carrying the non-200 status.
    async fn send_raw(&self, message: &[u8]) -> Result<SendResponse>;
}
