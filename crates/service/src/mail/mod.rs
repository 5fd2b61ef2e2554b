//! Outbound email: the [`Mailer`] seam, its SMTP and logging transports, and
//! the account verification template.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub mod console;
pub mod smtp;
pub mod template;

pub use console::ConsoleMailer;
pub use smtp::SmtpMailer;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(String),
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("failed to render template: {0}")]
    Template(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// A rendered message. The HTML body doubles as the plain-text alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

pub type DynMailer = Arc<dyn Mailer>;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// In-memory mailer that records what would have been sent.
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    impl RecordingMailer {
        /// A mailer whose every send fails with a transport error.
        pub fn failing() -> Self {
            Self { sent: Mutex::new(Vec::new()), fail: true }
        }

        pub fn sent(&self) -> Vec<EmailMessage> {
            self.sent.lock().map(|s| s.clone()).unwrap_or_default()
        }

        pub fn sent_count(&self) -> usize {
            self.sent.lock().map(|s| s.len()).unwrap_or(0)
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Transport("connection refused".into()));
            }
            self.sent
                .lock()
                .map_err(|_| MailError::Transport("recorder poisoned".into()))?
                .push(message.clone());
            Ok(())
        }
    }
}
