use async_trait::async_trait;
use tracing::info;

use super::{EmailMessage, MailError, Mailer};

/// Development transport: writes the message to the log instead of sending it.
#[derive(Debug, Default, Clone)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        info!(to = %message.to, subject = %message.subject, body = %message.html_body, "email_logged");
        Ok(())
    }
}
