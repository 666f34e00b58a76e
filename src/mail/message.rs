//! MIME message assembly
//!
//! Builds a `multipart/mixed` message: a `multipart/alternative` body holding
//! the plain-text and inline HTML versions, followed by the compressed report.

use anyhow::{Context, Result};
use lettre::Message;
use lettre::message::header::{self, ContentType, Header, HeaderName, HeaderValue};
use lettre::message::{Mailbox, Mailboxes, MultiPart, SinglePart};
use std::path::{Path, PathBuf};

use crate::error::RunError;
use crate::report::ReportAttachment;

/// Addressing and templates for one update email
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub from: String,
    /// Comma-separated list
    pub to: String,
    /// Comma-separated list; no `Cc` header is written when absent
    pub cc: Option<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text_template: PathBuf,
    pub html_template: PathBuf,
}

/// `Content-Encoding` header, which lettre does not provide
#[derive(Debug, Clone, PartialEq)]
pub struct ContentEncoding(String);

impl Header for ContentEncoding {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Content-Encoding")
    }

    fn parse(s: &str) -> std::result::Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

impl OutboundEmail {
    /// Read both templates and build the message around `attachment`
    pub fn assemble(&self, attachment: &ReportAttachment) -> Result<Message, RunError> {
        let text = read_template(&self.text_template)?;
        tracing::debug!("Message plain-text body is: {}", text);
        let html = read_template(&self.html_template)?;
        tracing::debug!("Message HTML body is: {}", html);

        self.build(text, html, attachment).map_err(RunError::Message)
    }

    /// Build the message from already-loaded bodies
    pub fn build(&self, text: String, html: String, attachment: &ReportAttachment) -> Result<Message> {
        let from: Mailbox = self
            .from
            .parse()
            .with_context(|| format!("Invalid sender address: {}", self.from))?;
        tracing::debug!("Message will be sent from: {}", self.from);

        let to: Mailboxes = self
            .to
            .parse()
            .with_context(|| format!("Invalid recipient list: {}", self.to))?;
        tracing::debug!("Message will be sent to: {}", self.to);

        let mut builder = Message::builder()
            .from(from)
            .mailbox(header::To::from(to));

        if let Some(cc) = &self.cc {
            let mailboxes: Mailboxes = cc
                .parse()
                .with_context(|| format!("Invalid CC list: {cc}"))?;
            tracing::debug!("Message will be sent as CC to: {}", cc);
            builder = builder.mailbox(header::Cc::from(mailboxes));
        }

        if let Some(reply_to) = &self.reply_to {
            let reply_to: Mailbox = reply_to
                .parse()
                .with_context(|| format!("Invalid reply-to address: {reply_to}"))?;
            tracing::debug!("Replies will be sent to: {}", reply_to);
            builder = builder.reply_to(reply_to);
        }

        tracing::debug!("Message subject is: {}", self.subject);
        builder = builder.subject(&self.subject);

        let body = MultiPart::alternative()
            .singlepart(SinglePart::plain(text))
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_HTML)
                    .header(header::ContentDisposition::inline())
                    .body(html),
            );

        let content_type = ContentType::parse(attachment.content_type)
            .with_context(|| format!("Invalid content type: {}", attachment.content_type))?;
        let mut report = SinglePart::builder().header(content_type);
        if let Some(encoding) = attachment.content_encoding {
            report = report.header(ContentEncoding(encoding.to_string()));
        }
        let report = report
            .header(header::ContentDisposition::attachment(&attachment.filename))
            .body(attachment.data.clone());
        tracing::debug!(
            "Message will include file {} as attachment",
            attachment.filename
        );

        builder
            .multipart(MultiPart::mixed().multipart(body).singlepart(report))
            .context("Failed to assemble message")
    }
}

fn read_template(path: &Path) -> Result<String, RunError> {
    std::fs::read_to_string(path).map_err(|source| RunError::Template {
        path: path.to_path_buf(),
        source,
    })
}
