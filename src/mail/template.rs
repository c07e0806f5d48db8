//! Mail rendering
//!
//! Builds the subject, plain-text and HTML bodies for a relayed
//! contact-form message.

use chrono::{DateTime, Datelike, Local};

use crate::mail::message::ContactMessage;

/// A fully rendered outgoing message, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Render a contact message into subject/text/html, stamped with the
/// submission time.
pub fn render(contact: &ContactMessage, received_at: DateTime<Local>) -> RenderedMail {
    let date = received_at.format("%A, %B %-d, %Y").to_string();
    let time = received_at.format("%I:%M %p").to_string();
    let year = received_at.year();

    let subject = format!("[MATRON] New Contact Message from {}", contact.name);

    let text = format!(
        "New Message from MATRON Portfolio Contact Form\n\
         \n\
         Date: {date}\n\
         Time: {time}\n\
         \n\
         From: {name}\n\
         Email: {email}\n\
         \n\
         Message:\n\
         {message}\n\
         \n\
         ---\n\
         This is an automated message from MATRON Portfolio Contact Form.\n\
         © {year} MATRON. All rights reserved.",
        name = contact.name,
        email = contact.email,
        message = contact.message,
    );

    let html = format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>New Contact Form Message</title>\n\
         </head>\n\
         <body>\n\
         <h2>New Contact Form Message</h2>\n\
         <p>{date} &middot; {time}</p>\n\
         <p><strong>From:</strong> {name}<br>\n\
         <strong>Email:</strong> <a href=\"mailto:{email}\">{email}</a></p>\n\
         <p><strong>Message:</strong></p>\n\
         <p style=\"white-space: pre-wrap;\">{message}</p>\n\
         <hr>\n\
         <p>This is an automated message from MATRON Portfolio Contact Form.<br>\n\
         &copy; {year} MATRON. All rights reserved.</p>\n\
         </body>\n\
         </html>",
        name = contact.name,
        email = contact.email,
        message = contact.message,
    );

    RenderedMail { subject, text, html }
}
