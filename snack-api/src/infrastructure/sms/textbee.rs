use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{format_recipient, SmsError, SmsSender};
use crate::config::SmsConfig;

#[derive(Debug, Serialize)]
struct SendSmsRequest<'a> {
    recipients: Vec<String>,
    message: &'a str,
}

/// Client for the TextBee Android SMS gateway.
#[derive(Clone)]
pub struct TextBeeClient {
    client: Client,
    config: SmsConfig,
}

impl TextBeeClient {
    pub fn new(config: SmsConfig) -> Result<Self, SmsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/api/v1/gateway/devices/{}/send-sms",
            self.config.base_url.trim_end_matches('/'),
            self.config.device_id
        )
    }
}

#[async_trait]
impl SmsSender for TextBeeClient {
    async fn send(&self, to: &str, message: &str) -> Result<(), SmsError> {
        if self.config.api_key.is_empty() || self.config.device_id.is_empty() {
            return Err(SmsError::MissingCredentials);
        }

        let recipient = format_recipient(to, &self.config.country_code);
        let payload = SendSmsRequest {
            recipients: vec![recipient.clone()],
            message,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SmsError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to = %recipient, status = status.as_u16(), "SMS sent via TextBee");
        Ok(())
    }
}
