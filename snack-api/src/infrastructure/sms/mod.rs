pub mod textbee;

use async_trait::async_trait;
use thiserror::Error;

pub use textbee::TextBeeClient;

#[derive(Error, Debug)]
pub enum SmsError {
    #[error("SMS gateway credentials missing")]
    MissingCredentials,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway rejected message: {status} {body}")]
    Rejected { status: u16, body: String },
}

/// Outbound text message delivery.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, message: &str) -> Result<(), SmsError>;
}

/// Prefixes bare 10-digit numbers with `country_code`; anything else is kept as given.
pub fn format_recipient(phone: &str, country_code: &str) -> String {
    let phone = phone.trim();
    if phone.starts_with('+') {
        return phone.to_string();
    }
    if phone.len() == 10 && phone.chars().all(|c| c.is_ascii_digit()) {
        return format!("{}{}", country_code, phone);
    }
    phone.to_string()
}
