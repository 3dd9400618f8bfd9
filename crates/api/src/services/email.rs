//! Email delivery for verification codes.
//!
//! Delivery is strictly fire-and-forget: by the time an email is attempted
//! the triggering operation has already succeeded, so failures are logged
//! and never surfaced to the caller.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::EmailConfig;

/// Errors that can occur while sending an email.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body_text: String,
}

/// Email service for transactional mail.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
}

impl EmailService {
    /// Creates a new EmailService with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Send an email message through the configured provider.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email service disabled, skipping send"
            );
            return Ok(());
        }

        match self.config.provider.as_str() {
            "console" => self.send_console(message).await,
            "sendgrid" => self.send_sendgrid(message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured)
            }
        }
    }

    /// Send the 6-digit verification code to a freshly registered account.
    pub async fn send_verification_email(
        &self,
        to_email: &str,
        to_name: &str,
        code: &str,
    ) -> Result<(), EmailError> {
        let subject = "Mã xác thực tài khoản Family Pantry";
        let body_text = format!(
            "Chào {name},\n\n\
             Mã xác thực email của bạn là: {code}\n\n\
             Mã có hiệu lực trong 10 phút. Nếu bạn không đăng ký tài khoản, \
             vui lòng bỏ qua email này.\n\n\
             Family Pantry",
            name = to_name,
            code = code,
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: Some(to_name.to_string()),
            subject: subject.to_string(),
            body_text,
        })
        .await
    }

    /// Console provider - logs the email instead of sending it.
    async fn send_console(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            to_name = ?message.to_name,
            subject = %message.subject,
            from = %self.config.sender_email,
            from_name = %self.config.sender_name,
            body = %message.body_text,
            "Email (console provider)"
        );
        Ok(())
    }

    /// SendGrid provider - sends via the SendGrid v3 API.
    async fn send_sendgrid(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let mut to = serde_json::json!({ "email": message.to });
        if let Some(name) = &message.to_name {
            to["name"] = serde_json::json!(name);
        }

        let body = serde_json::json!({
            "personalizations": [{ "to": [to] }],
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name,
            },
            "subject": message.subject,
            "content": [{
                "type": "text/plain",
                "value": message.body_text,
            }],
        });

        let client = reqwest::Client::new();
        let response = client
            .post("https://api.sendgrid.com/v3/mail/send")
            .bearer_auth(&self.config.sendgrid_api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        if response.status().is_success() {
            info!(to = %message.to, "Email sent via SendGrid");
            Ok(())
        } else {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            Err(EmailError::ProviderError(format!(
                "SendGrid returned {}: {}",
                status, detail
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console_config(enabled: bool) -> EmailConfig {
        EmailConfig {
            enabled,
            provider: "console".to_string(),
            sendgrid_api_key: String::new(),
            sender_email: "no-reply@familypantry.app".to_string(),
            sender_name: "Family Pantry".to_string(),
        }
    }

    fn message() -> EmailMessage {
        EmailMessage {
            to: "lan@example.com".to_string(),
            to_name: Some("Lan".to_string()),
            subject: "Test".to_string(),
            body_text: "Xin chào".to_string(),
        }
    }

    #[tokio::test]
    async fn test_disabled_service_swallows_send() {
        let service = EmailService::new(console_config(false));
        assert!(service.send(message()).await.is_ok());
    }

    #[tokio::test]
    async fn test_console_provider_succeeds() {
        let service = EmailService::new(console_config(true));
        assert!(service.send(message()).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_provider_errors() {
        let mut config = console_config(true);
        config.provider = "carrier-pigeon".to_string();
        let service = EmailService::new(config);
        assert!(matches!(
            service.send(message()).await,
            Err(EmailError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_sendgrid_without_key_is_not_configured() {
        let mut config = console_config(true);
        config.provider = "sendgrid".to_string();
        let service = EmailService::new(config);
        assert!(matches!(
            service.send(message()).await,
            Err(EmailError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_verification_email_contains_code() {
        // Console provider renders the body; just exercise the path
        let service = EmailService::new(console_config(true));
        assert!(service
            .send_verification_email("lan@example.com", "Lan", "123456")
            .await
            .is_ok());
    }
}
