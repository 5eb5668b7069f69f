//! Transactional email over SMTP.
//!
//! Sends verification codes and order receipts as plain-text messages via
//! lettre.

use brightwire_core::VerificationPurpose;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use super::receipt::STORE_NAME;
use crate::config::EmailConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a verification code.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send.
    pub async fn send_verification_code(
        &self,
        to: &str,
        code: &str,
        purpose: VerificationPurpose,
    ) -> Result<(), EmailError> {
        let subject = format!("Your {STORE_NAME} {} code", purpose.label());
        let body = verification_body(code, purpose);
        self.send_text_email(to, &subject, body).await
    }

    /// Send an order receipt.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send.
    pub async fn send_receipt(&self, to: &str, receipt: &str) -> Result<(), EmailError> {
        let subject = format!("Your {STORE_NAME} receipt");
        self.send_text_email(to, &subject, receipt.to_string()).await
    }

    async fn send_text_email(&self, to: &str, subject: &str, body: String) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

fn verification_body(code: &str, purpose: VerificationPurpose) -> String {
    format!(
        "Your {STORE_NAME} {} code is: {code}\n\n\
         Enter it on the page that requested it. The code expires soon and\n\
         can only be used once. If you did not ask for it, ignore this email.\n",
        purpose.label()
    )
}
