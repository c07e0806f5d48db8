//! Mail transport
//!
//! SMTP delivery behind a trait so handlers and tests can swap in a
//! capturing double.

use async_trait::async_trait;
use chrono::Utc;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::{error, info, warn};
use uuid::Uuid;

use crate::config::StartupConfig;
use crate::error::MailError;
use crate::mail::message::ContactMessage;
use crate::mail::template::RenderedMail;

/// Identifier assigned to a relayed message, echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(pub String);

/// Outbound mail delivery.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Forward a rendered contact message to `to`, replying to the sender.
    async fn send(
        &self,
        contact: &ContactMessage,
        mail: &RenderedMail,
        to: &str,
    ) -> Result<MessageId, MailError>;
}

/// SMTP relay transport (STARTTLS).
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    domain: String,
}

impl SmtpMailer {
    pub fn from_config(config: &StartupConfig) -> Result<Self, MailError> {
        let from = Mailbox::new(
            Some(config.mail_from_name.clone()),
            config
                .mail_from
                .parse()
                .map_err(|_| MailError::InvalidAddress(config.mail_from.clone()))?,
        );

        let domain = config
            .mail_from
            .split('@')
            .nth(1)
            .unwrap_or("localhost")
            .to_string();

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(config.smtp_port);

        if !config.smtp_user.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_pass.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            domain,
        })
    }

    /// Probe the SMTP server at startup. Failures are logged, not fatal;
    /// the relay endpoint reports errors per request.
    pub async fn check_connection(&self) {
        match self.transport.test_connection().await {
            Ok(true) => info!("SMTP connection verified; mail relay ready"),
            Ok(false) => warn!("SMTP server refused the connection probe"),
            Err(e) => error!("SMTP connection check failed: {}", e),
        }
    }

    fn next_message_id(&self) -> String {
        format!(
            "<{}.{}@{}>",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            self.domain
        )
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(
        &self,
        contact: &ContactMessage,
        mail: &RenderedMail,
        to: &str,
    ) -> Result<MessageId, MailError> {
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|_| MailError::InvalidAddress(to.to_string()))?;

        let reply_to = Mailbox::new(
            Some(contact.name.clone()),
            contact
                .email
                .parse()
                .map_err(|_| MailError::InvalidAddress(contact.email.clone()))?,
        );

        let message_id = self.next_message_id();

        let email = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .reply_to(reply_to)
            .subject(mail.subject.clone())
            .message_id(Some(message_id.clone()))
            .multipart(MultiPart::alternative_plain_html(
                mail.text.clone(),
                mail.html.clone(),
            ))
            .map_err(|e| MailError::Transport(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(MessageId(message_id))
    }
}
