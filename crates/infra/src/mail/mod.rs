//! Outbound notification mail.
//!
//! Callers hand messages to a [`NotificationDispatcher`]; the shipped one
//! queues them on a bounded worker pool in front of a [`MailTransport`].

mod link;
mod notify;
mod pool;
mod transport;

pub use link::LinkBuilder;
pub use notify::{MailNotifier, NotificationDispatcher};
pub use pool::{DispatchError, MailDispatchPool, MailPoolConfig, PoolStats};
pub use transport::{LogTransport, MailMessage, MailTransport, TransportError};
