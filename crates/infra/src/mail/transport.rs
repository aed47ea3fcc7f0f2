use std::sync::Arc;

use thiserror::Error;
use tracing::info;

/// A rendered email.
#[derive(Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl core::fmt::Debug for MailMessage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Bodies carry codes and links.
        f.debug_struct("MailMessage")
            .field("to", &self.to)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("mail transport failed: {0}")]
pub struct TransportError(pub String);

/// Delivers one message. Called from pool worker threads.
pub trait MailTransport: Send + Sync {
    fn send(&self, message: &MailMessage) -> Result<(), TransportError>;
}

impl<T> MailTransport for Arc<T>
where
    T: MailTransport + ?Sized,
{
    fn send(&self, message: &MailMessage) -> Result<(), TransportError> {
        (**self).send(message)
    }
}

/// Writes messages to the log instead of an SMTP server.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

impl MailTransport for LogTransport {
    fn send(&self, message: &MailMessage) -> Result<(), TransportError> {
        info!(to = %message.to, subject = %message.subject, "mail delivered to log transport");
        Ok(())
    }
}
