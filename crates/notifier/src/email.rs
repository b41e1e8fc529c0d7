//! SMTP email transport.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use herald_common::config::EmailConfig;

use crate::error::NotifierError;
use crate::template;
use crate::Transport;

/// Email transport backed by a pooled SMTP connection.
///
/// The pool is created once and reused for every send; connections are opened
/// lazily and kept alive between messages.
pub struct EmailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    subject: String,
}

impl EmailTransport {
    pub fn new(config: &EmailConfig) -> Result<Self, NotifierError> {
        // Without implicit TLS the session upgrades only when the server offers
        // STARTTLS; plaintext relays are still accepted.
        let mut builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            let tls = TlsParameters::new(config.host.clone())?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .tls(Tls::Opportunistic(tls))
        };

        builder = builder.port(config.port);
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }
        let mailer = builder.build();

        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| NotifierError::invalid_address(&config.from, e))?;

        tracing::info!(
            host = %config.host,
            port = config.port,
            secure = config.secure,
            "SMTP transport configured"
        );

        Ok(Self {
            mailer,
            from,
            subject: config.subject.clone(),
        })
    }

    /// Check that the SMTP server accepts our connection and credentials.
    ///
    /// Failure is only logged; sends are still attempted afterwards.
    pub async fn verify(&self) -> bool {
        match self.mailer.test_connection().await {
            Ok(true) => {
                tracing::info!("SMTP connection verified");
                true
            }
            Ok(false) => {
                tracing::error!("SMTP connection could not be verified");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "SMTP connection check failed");
                false
            }
        }
    }

    /// Build the notification email for one recipient.
    pub fn build_message(
        &self,
        to: &str,
        display_name: &str,
        payload: &serde_json::Value,
    ) -> Result<Message, NotifierError> {
        let address: Address = to
            .trim()
            .parse()
            .map_err(|e| NotifierError::invalid_address(to, e))?;

        Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(Some(display_name.to_string()), address))
            .subject(self.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(template::email_html(display_name, payload))
            .map_err(|e| NotifierError::Message(e.to_string()))
    }

    async fn try_send(
        &self,
        to: &str,
        display_name: &str,
        payload: &serde_json::Value,
    ) -> Result<String, NotifierError> {
        let message = self.build_message(to, display_name, payload)?;
        let response = self.mailer.send(message).await?;
        Ok(response.code().to_string())
    }
}

#[async_trait]
impl Transport for EmailTransport {
    async fn send(&self, target: &str, display_name: &str, payload: &serde_json::Value) -> bool {
        match self.try_send(target, display_name, payload).await {
            Ok(code) => {
                tracing::info!(to = %target, smtp_code = %code, "Email sent");
                true
            }
            Err(e) => {
                tracing::error!(to = %target, error = %e, "Failed to send email");
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
