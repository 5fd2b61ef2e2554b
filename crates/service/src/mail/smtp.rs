use async_trait::async_trait;
use configs::EmailConfig;
use lettre::{
    message::{Mailbox, Message, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use tracing::{error, info};

use super::{EmailMessage, MailError, Mailer};

type SmtpTransport = AsyncSmtpTransport<Tokio1Executor>;

#[derive(Clone)]
pub struct SmtpMailer {
    mailer: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(cfg: &EmailConfig) -> Result<Self, MailError> {
        let host = cfg
            .smtp_host
            .as_deref()
            .ok_or_else(|| MailError::Transport("smtp host not configured".into()))?;

        let mut builder = if cfg.starttls {
            SmtpTransport::starttls_relay(host).map_err(|e| MailError::Transport(e.to_string()))?
        } else {
            SmtpTransport::builder_dangerous(host)
        };
        builder = builder.port(cfg.smtp_port);
        if let (Some(user), Some(pass)) = (&cfg.smtp_username, &cfg.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let from: Mailbox = cfg
            .from
            .parse()
            .map_err(|e| MailError::Address(format!("{}: {}", cfg.from, e)))?;

        Ok(Self { mailer: builder.build(), from })
    }

    fn build(&self, req: &EmailMessage) -> Result<Message, MailError> {
        let to: Mailbox = req.to.parse().map_err(|e| {
            error!("invalid recipient email: {}", e);
            MailError::Address(format!("{}: {}", req.to, e))
        })?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&req.subject)
            .multipart(MultiPart::alternative_plain_html(req.html_body.clone(), req.html_body.clone()))
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, req: &EmailMessage) -> Result<(), MailError> {
        let email = self.build(req)?;
        match self.mailer.send(email).await {
            Ok(_) => {
                info!(to = %req.to, "email sent");
                Ok(())
            }
            Err(e) => {
                error!(to = %req.to, error = %e, "failed to send email");
                Err(MailError::Transport(e.to_string()))
            }
        }
    }
}
