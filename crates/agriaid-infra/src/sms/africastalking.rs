//! Africa's Talking bulk SMS gateway.
//!
//! Sends a form-encoded `POST {base_url}/messaging` with the account
//! `username`, a comma-separated `to` list, the `message`, and an optional
//! `from` sender ID. The API key goes in the `apiKey` header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use agriaid_core::sms::SmsGateway;
use agriaid_types::config::GatewayConfig;
use agriaid_types::error::GatewayError;
use agriaid_types::sms::{SmsReport, SmsReportEnvelope};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct AfricasTalkingGateway {
    client: reqwest::Client,
    api_key: SecretString,
    username: String,
    base_url: String,
    sender_id: Option<String>,
}

impl AfricasTalkingGateway {
    pub fn new(config: &GatewayConfig, api_key: SecretString) -> Result<Self, GatewayError> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(GatewayError::MissingApiKey);
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            username: config.username.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            sender_id: config.sender_id.clone().filter(|s| !s.trim().is_empty()),
        })
    }

    fn url(&self) -> String {
        format!("{}/messaging", self.base_url)
    }

    fn form(&self, recipients: &[String], message: &str) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("username", self.username.clone()),
            ("to", recipients.join(",")),
            ("message", message.to_string()),
        ];
        if let Some(sender) = &self.sender_id {
            form.push(("from", sender.clone()));
        }
        form
    }
}

impl SmsGateway for AfricasTalkingGateway {
    async fn send(&self, recipients: &[String], message: &str) -> Result<SmsReport, GatewayError> {
        if recipients.is_empty() {
            return Err(GatewayError::NoRecipients);
        }

        let response = self
            .client
            .post(self.url())
            .header("apiKey", self.api_key.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&self.form(recipients, message))
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: SmsReportEnvelope = response
            .json()
            .await
            .map_err(|e| GatewayError::Deserialization(e.to_string()))?;
        let report = envelope.data;

        let accepted = report.recipients.iter().filter(|r| r.accepted()).count();
        tracing::info!(
            recipients = recipients.len(),
            accepted,
            summary = %report.message,
            "sms dispatched"
        );
        for rejected in report.recipients.iter().filter(|r| !r.accepted()) {
            tracing::warn!(
                number = %rejected.number,
                status = %rejected.status,
                status_code = rejected.status_code,
                "sms recipient rejected"
            );
        }
        Ok(report)
    }
}
