use std::sync::Arc;

use tracing::debug;

use super::pool::{DispatchError, MailDispatchPool};
use super::transport::MailMessage;

/// Outbound notifications the engine sends.
///
/// Implementations must not block on delivery.
pub trait NotificationDispatcher: Send + Sync {
    /// Verification code for a root principal.
    fn send_otp(&self, email: &str, code: &str) -> Result<(), DispatchError>;

    /// Activation link for a tenant user.
    fn send_verification_link(&self, email: &str, link: &str) -> Result<(), DispatchError>;
}

impl<T> NotificationDispatcher for Arc<T>
where
    T: NotificationDispatcher + ?Sized,
{
    fn send_otp(&self, email: &str, code: &str) -> Result<(), DispatchError> {
        (**self).send_otp(email, code)
    }

    fn send_verification_link(&self, email: &str, link: &str) -> Result<(), DispatchError> {
        (**self).send_verification_link(email, link)
    }
}

/// Renders notification mails and queues them on the dispatch pool.
#[derive(Debug, Clone)]
pub struct MailNotifier {
    pool: Arc<MailDispatchPool>,
}

impl MailNotifier {
    pub fn new(pool: Arc<MailDispatchPool>) -> Self {
        Self { pool }
    }
}

impl NotificationDispatcher for MailNotifier {
    fn send_otp(&self, email: &str, code: &str) -> Result<(), DispatchError> {
        debug!(to = %email, "queueing verification code mail");
        self.pool.try_dispatch(MailMessage {
            to: email.to_string(),
            subject: "Your New Verification Code".to_string(),
            body: format!(
                "Use the code {code} to verify your email address. It expires in a few minutes."
            ),
        })
    }

    fn send_verification_link(&self, email: &str, link: &str) -> Result<(), DispatchError> {
        debug!(to = %email, "queueing verification link mail");
        self.pool.try_dispatch(MailMessage {
            to: email.to_string(),
            subject: "Your New Verification Link".to_string(),
            body: format!("Open the following link to verify your email address:\n\n{link}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::mail::pool::MailPoolConfig;
    use crate::mail::transport::{MailTransport, TransportError};

    #[derive(Default)]
    struct Outbox(Mutex<Vec<MailMessage>>);

    impl MailTransport for Outbox {
        fn send(&self, message: &MailMessage) -> Result<(), TransportError> {
            self.0.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    #[test]
    fn renders_code_and_link_mails() {
        let outbox = Arc::new(Outbox::default());
        let pool = Arc::new(MailDispatchPool::start(outbox.clone(), MailPoolConfig::default()).unwrap());
        let notifier = MailNotifier::new(pool.clone());

        notifier.send_otp("root@x.com", "123456").unwrap();
        notifier
            .send_verification_link("a@x.com", "http://ui/verify?otp=1")
            .unwrap();
        pool.shutdown();

        let mut sent = outbox.0.lock().unwrap().clone();
        sent.sort_by(|a, b| a.to.cmp(&b.to));
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "a@x.com");
        assert!(sent[0].body.contains("http://ui/verify?otp=1"));
        assert_eq!(sent[1].to, "root@x.com");
        assert!(sent[1].body.contains("123456"));
    }
}
