//! Amazon SES transport

use anyhow::{Context, Result};
use aws_sdk_ses::Client;
use aws_sdk_ses::error::SdkError;
use aws_sdk_ses::primitives::Blob;
use aws_sdk_ses::types::RawMessage;

use super::{MailTransport, STATUS_OK, SendResponse};

/// Sends through SES `SendRawEmail` using the default AWS credential chain
pub struct SesTransport {
    client: Client,
}

impl SesTransport {
    /// Build a client from the environment (region, profile, credentials)
    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        tracing::debug!(
            "Using SES in region {}",
            config
                .region()
                .map(|r| r.as_ref().to_string())
                .unwrap_or_else(|| "<unset>".to_string())
        );
        Self {
            client: Client::new(&config),
        }
    }
}

impl MailTransport for SesTransport {
    async fn send_raw(&self, message: &[u8]) -> Result<SendResponse> {
        let raw = RawMessage::builder()
            .data(Blob::new(message))
            .build()
            .context("Failed to wrap message for SES")?;

        match self.client.send_raw_email().raw_message(raw).send().await {
            Ok(output) => {
                tracing::info!("Message sent with id {}", output.message_id());
                Ok(SendResponse {
                    status: STATUS_OK,
                    body: format!("{output:?}"),
                })
            }
            Err(err) => {
                let status = match &err {
                    SdkError::ServiceError(service) => Some(service.raw().status().as_u16()),
                    SdkError::ResponseError(response) => Some(response.raw().status().as_u16()),
                    _ => None,
                };
                match status {
                    Some(status) => Ok(SendResponse {
                        status,
                        body: format!("{err:?}"),
                    }),
                    None => Err(anyhow::Error::new(err).context("SES request failed")),
                }
            }
        }
    }
}
