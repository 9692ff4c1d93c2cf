use chrono::{DateTime, Duration, Utc};
use rand::Rng;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Otp {
    pub phone: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

impl Otp {
    /// Issues a fresh 4-digit code for `phone`.
    pub fn generate(phone: &str) -> Self {
        let code: u16 = rand::rng().random_range(1000..=9999);
        Self {
            phone: phone.to_string(),
            code: code.to_string(),
            created_at: Utc::now(),
        }
    }

    /// A `ttl` of zero never expires.
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        !ttl.is_zero() && now - self.created_at > ttl
    }
}
