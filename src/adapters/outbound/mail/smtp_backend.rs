use crate::config::SmtpConfig;
use crate::ports::outbound::{DeliveryBackend, EmailMessage};
use crate::shared::{AuditError, Result};
use async_trait::async_trait;
use lettre::message::{header, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};

/// Port that implies implicit TLS even when `secure` is not set
const IMPLICIT_TLS_PORT: u16 = 465;

/// SmtpBackend adapter sending the report through an SMTP relay
///
/// Uses implicit TLS when configured as secure or when the port is 465,
/// otherwise upgrades with STARTTLS when the server offers it.
pub struct SmtpBackend {
    transport: SmtpTransport,
}

impl SmtpBackend {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let builder = if config.secure || config.port == IMPLICIT_TLS_PORT {
            SmtpTransport::relay(&config.host).map_err(|e| invalid_host(&config.host, e))?
        } else {
            let tls = TlsParameters::new(config.host.clone())
                .map_err(|e| invalid_host(&config.host, e))?;
            SmtpTransport::builder_dangerous(config.host.as_str()).tls(Tls::Opportunistic(tls))
        };

        let mut builder = builder.port(config.port);
        if let Some(username) = &config.username {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                config.password.clone().unwrap_or_default(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }

    fn build_message(message: &EmailMessage) -> Result<Message> {
        let from = message
            .from
            .parse::<Mailbox>()
            .map_err(|e| AuditError::delivery(format!("invalid sender '{}': {}", message.from, e)))?;

        let mut builder = Message::builder().from(from).subject(message.subject.clone());
        for to in &message.to {
            let mailbox = to
                .parse::<Mailbox>()
                .map_err(|e| AuditError::delivery(format!("invalid recipient '{}': {}", to, e)))?;
            builder = builder.to(mailbox);
        }

        let email = builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(message.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(message.html_body.clone()),
                    ),
            )
            .map_err(|e| AuditError::delivery(format!("cannot build email: {}", e)))?;

        Ok(email)
    }
}

fn invalid_host(host: &str, e: lettre::transport::smtp::Error) -> AuditError {
    AuditError::config(
        format!("invalid SMTP host '{}': {}", host, e),
        "Check SMTP_HOST",
    )
}

#[async_trait]
impl DeliveryBackend for SmtpBackend {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let email = Self::build_message(message)?;
        let transport = self.transport.clone();

        // lettre's SmtpTransport is blocking
        tokio::task::spawn_blocking(move || {
            transport
                .send(&email)
                .map(|_| ())
                .map_err(|e| AuditError::delivery(format!("SMTP send failed: {}", e)))
        })
        .await
        .map_err(|e| AuditError::delivery(format!("SMTP worker stopped: {}", e)))??;

        Ok(())
    }

    async fn test_connection(&self) -> bool {
        let transport = self.transport.clone();

        let outcome = tokio::task::spawn_blocking(move || transport.test_connection()).await;
        match outcome {
            Ok(Ok(true)) => true,
            Ok(Ok(false)) => {
                tracing::warn!("SMTP server did not accept the connection check");
                false
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "SMTP connection check failed");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "SMTP connection check did not complete");
                false
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "smtp"
    }
}
