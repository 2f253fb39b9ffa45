// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`Mailer`] implementations: SMTP delivery and a logging fallback.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MessageAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use parkd_config::model::SmtpConfig;
use parkd_core::{Mailer, OutboundEmail, ParkdError};

fn mail_err(message: impl Into<String>) -> ParkdError {
    ParkdError::Mail {
        message: message.into(),
        source: None,
    }
}

/// Delivers mail over SMTP with STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, ParkdError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| ParkdError::Mail {
                message: format!("bad SMTP relay {}", config.host),
                source: Some(Box::new(e)),
            })?
            .port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        let from = config
            .from_address
            .parse()
            .map_err(|_| mail_err(format!("bad from address {}", config.from_address)))?;
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

fn build_message(from: &Mailbox, email: &OutboundEmail) -> Result<Message, ParkdError> {
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|_| mail_err(format!("bad recipient address {}", email.to)))?;
    let builder = Message::builder()
        .from(from.clone())
        .to(to)
        .subject(&email.subject);

    let body = match (&email.html, &email.attachment) {
        (None, None) => {
            return builder.body(email.text.clone()).map_err(|e| ParkdError::Mail {
                message: "failed to build message".to_string(),
                source: Some(Box::new(e)),
            });
        }
        (Some(html), None) => MultiPart::alternative_plain_html(email.text.clone(), html.clone()),
        (html, Some(attachment)) => {
            let content_type = ContentType::parse(&attachment.content_type)
                .map_err(|_| mail_err(format!("bad content type {}", attachment.content_type)))?;
            let part = MessageAttachment::new(attachment.filename.clone())
                .body(attachment.data.clone().into_bytes(), content_type);
            let mixed = match html {
                Some(html) => MultiPart::mixed().multipart(MultiPart::alternative_plain_html(
                    email.text.clone(),
                    html.clone(),
                )),
                None => MultiPart::mixed().singlepart(SinglePart::plain(email.text.clone())),
            };
            mixed.singlepart(part)
        }
    };
    builder.multipart(body).map_err(|e| ParkdError::Mail {
        message: "failed to build message".to_string(),
        source: Some(Box::new(e)),
    })
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), ParkdError> {
        let message = build_message(&self.from, email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| ParkdError::Mail {
                message: format!("delivery to {} failed", email.to),
                source: Some(Box::new(e)),
            })?;
        tracing::debug!(to = %email.to, subject = %email.subject, "email delivered");
        Ok(())
    }
}

/// Logs outbound mail instead of delivering it. Used when SMTP is
/// disabled, so job processing still succeeds in development.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), ParkdError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            has_attachment = email.attachment.is_some(),
            "smtp disabled, logging email instead of sending"
        );
        Ok(())
    }
}
