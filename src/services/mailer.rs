use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::Config;
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl OutgoingMail {
    pub fn verification(from: &str, to: &str, code: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: "Verify your account".to_string(),
            text: format!(
                "Welcome! Your verification code is {}.\nEnter it in the app to activate your account.",
                code
            ),
        }
    }

    pub fn password_reset(from: &str, to: &str, code: &str, ttl_minutes: i64) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: "Reset your password".to_string(),
            text: format!(
                "Your password reset code is {}.\nIt expires in {} minutes. Ignore this email if you did not ask for it.",
                code, ttl_minutes
            ),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), AppError>;
}

/// Delivers mail through a JSON HTTP mail API (`POST {from,to,subject,text}`).
#[derive(Clone)]
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpMailer {
    pub fn new(endpoint: String, api_key: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent("userhub/0.1 (+reqwest)")
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), AppError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(mail)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error reading response body".to_string());
            log::error!("Mail API error for {}: {} - {}", mail.to, status, error_text);
            return Err(AppError::Mail(format!(
                "mail API responded with status {}",
                status
            )));
        }

        log::info!("Sent '{}' mail to {}", mail.subject, mail.to);
        Ok(())
    }
}

/// Fallback when no mail API is configured: the message only goes to the log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), AppError> {
        log::warn!(
            "Mail API not configured; mail to {} ({}): {}",
            mail.to,
            mail.subject,
            mail.text
        );
        Ok(())
    }
}

/// Keeps every message in memory. Can be told to fail to exercise error paths.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    failing: Mutex<bool>,
}

impl MemoryMailer {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn last_to(&self, to: &str) -> Option<OutgoingMail> {
        self.sent().into_iter().rev().find(|m| m.to == to)
    }

    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut flag) = self.failing.lock() {
            *flag = failing;
        }
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), AppError> {
        if self.failing.lock().map(|f| *f).unwrap_or(false) {
            return Err(AppError::Mail("memory mailer set to fail".to_string()));
        }
        self.sent
            .lock()
            .map_err(|_| AppError::Internal)?
            .push(mail.clone());
        Ok(())
    }
}

/// Picks the HTTP mailer when `MAIL_API_URL` is set, the log mailer otherwise.
pub fn from_config(config: &Config) -> Result<Arc<dyn Mailer>, AppError> {
    match (&config.mail_api_url, &config.mail_api_key) {
        (Some(url), Some(key)) => Ok(Arc::new(HttpMailer::new(url.clone(), key.clone())?)),
        _ => {
            log::warn!("MAIL_API_URL not set, outgoing mail will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}
