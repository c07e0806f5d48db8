//! Contact mail relay
//!
//! Validates contact-form submissions, renders them into a mail message,
//! and forwards them through an SMTP transport.

pub mod message;
pub mod template;
pub mod transport;

pub use message::ContactMessage;
pub use template::{RenderedMail, render};
pub use transport::{MailTransport, MessageId, SmtpMailer};
