// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP delivery provider built on lettre's async transport.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MimeAttachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::warn;

use cadent_core::types::{OutboundEmail, ProviderReceipt};
use cadent_core::{CadentError, DeliveryProvider};

/// Connection settings for the SMTP provider.
#[derive(Debug, Clone)]
pub struct SmtpOptions {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender address, e.g. `"Cadent <followups@example.com>"`.
    pub from: String,
}

/// Delivery provider speaking SMTP with STARTTLS.
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpProvider {
    pub fn new(options: &SmtpOptions) -> Result<Self, CadentError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&options.host)
            .map_err(|e| CadentError::Config(format!("invalid SMTP relay host: {e}")))?
            .port(options.port);

        if let (Some(username), Some(password)) = (&options.username, &options.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from: Mailbox = options
            .from
            .parse()
            .map_err(|e| CadentError::Config(format!("invalid SMTP from address: {e}")))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl DeliveryProvider for SmtpProvider {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn send(&self, email: &OutboundEmail) -> Result<ProviderReceipt, CadentError> {
        let message = build_message(&self.from, email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| CadentError::Delivery {
                message: format!("SMTP send failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        // SMTP acceptance has no stable message id to report.
        Ok(ProviderReceipt { message_id: None })
    }
}

/// Assemble the MIME message: text (plus optional HTML alternative),
/// wrapped in a mixed multipart when attachments are present. An
/// attachment with an unparseable content type is dropped with a warning
/// rather than failing the send.
pub(crate) fn build_message(
    from: &Mailbox,
    email: &OutboundEmail,
) -> Result<Message, CadentError> {
    let to_address: Address = email.to.parse().map_err(|e| CadentError::Delivery {
        message: format!("invalid recipient address `{}`: {e}", email.to),
        source: None,
    })?;
    let to = Mailbox::new(email.to_name.clone(), to_address);

    let body_part = match &email.html {
        Some(html) => MultiPart::alternative()
            .singlepart(SinglePart::plain(email.text.clone()))
            .singlepart(SinglePart::html(html.clone())),
        None => MultiPart::mixed().singlepart(SinglePart::plain(email.text.clone())),
    };

    let mut content = MultiPart::mixed().multipart(body_part);
    for attachment in &email.attachments {
        let content_type: ContentType = match attachment.content_type.parse() {
            Ok(ct) => ct,
            Err(e) => {
                warn!(
                    filename = %attachment.filename,
                    content_type = %attachment.content_type,
                    error = %e,
                    "dropping attachment with unparseable content type"
                );
                continue;
            }
        };
        content = content.singlepart(
            MimeAttachment::new(attachment.filename.clone())
                .body(Body::new(attachment.data.clone()), content_type),
        );
    }

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(&email.subject)
        .multipart(content)
        .map_err(|e| CadentError::Delivery {
            message: format!("failed to build MIME message: {e}"),
            source: Some(Box::new(e)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadent_core::types::Attachment;

    fn from() -> Mailbox {
        "Cadent <followups@example.com>".parse().unwrap()
    }

    fn email() -> OutboundEmail {
        OutboundEmail {
            to: "ada@example.com".into(),
            to_name: Some("Ada Example".into()),
            subject: "Invoice #42".into(),
            text: "Hi Ada, following up.".into(),
            html: Some("<p>Hi Ada, following up.</p>".into()),
            attachments: vec![],
        }
    }

    #[test]
    fn builds_plain_and_html_message() {
        let message = build_message(&from(), &email()).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(raw.contains("Subject: Invoice #42"));
        assert!(raw.contains("ada@example.com"));
        assert!(raw.contains("Hi Ada, following up."));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn attachment_is_included() {
        let mut e = email();
        e.attachments.push(Attachment {
            filename: "invoice-42.pdf".into(),
            content_type: "application/pdf".into(),
            data: vec![0x25, 0x50, 0x44, 0x46],
        });
        let message = build_message(&from(), &e).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(raw.contains("invoice-42.pdf"));
        assert!(raw.contains("application/pdf"));
    }

    #[test]
    fn bad_attachment_content_type_is_dropped_not_fatal() {
        let mut e = email();
        e.attachments.push(Attachment {
            filename: "weird.bin".into(),
            content_type: "not a content type".into(),
            data: vec![1, 2, 3],
        });
        let message = build_message(&from(), &e).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(!raw.contains("weird.bin"), "attachment should be dropped");
        assert!(raw.contains("Hi Ada"), "body still present");
    }

    #[test]
    fn invalid_recipient_is_an_error() {
        let mut e = email();
        e.to = "not-an-address".into();
        assert!(build_message(&from(), &e).is_err());
    }

    #[test]
    fn provider_construction_validates_from_address() {
        let options = SmtpOptions {
            host: "smtp.example.com".into(),
            port: 587,
            username: Some("user".into()),
            password: Some("pass".into()),
            from: "not an address".into(),
        };
        assert!(SmtpProvider::new(&options).is_err());
    }
}
