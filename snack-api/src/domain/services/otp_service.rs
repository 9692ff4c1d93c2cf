use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::SqliteConnection;

use crate::domain::models::otp::Otp;
use crate::error::AppError;
use crate::server::AppState;

pub struct OtpService {
    state: Arc<AppState>,
}

impl OtpService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Stores a fresh code for `phone`, replacing any earlier one, and texts it.
    ///
    /// Delivery is best-effort: the code stays valid when the gateway fails and the
    /// return value only reports whether the SMS went out.
    pub async fn issue(&self, phone: &str) -> Result<bool, AppError> {
        let otp = Otp::generate(phone);

        sqlx::query(
            r#"
            INSERT INTO otps (phone, code, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(phone) DO UPDATE SET code = excluded.code, created_at = excluded.created_at
            "#,
        )
        .bind(&otp.phone)
        .bind(&otp.code)
        .bind(otp.created_at)
        .execute(&self.state.db)
        .await?;

        let message = otp_message(
            &self.state.config.sms.sender_name,
            &otp.code,
            self.state.config.otp.ttl()?,
        );

        match self.state.sms.send(phone, &message).await {
            Ok(()) => {
                tracing::info!(phone = %phone, "OTP sent");
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(phone = %phone, error = %e, "OTP delivery failed, code kept");
                tracing::debug!(phone = %phone, code = %otp.code, "fallback OTP");
                Ok(false)
            }
        }
    }

    /// Returns the stored OTP when `code` matches and has not aged out.
    pub async fn find_valid(&self, phone: &str, code: &str) -> Result<Option<Otp>, AppError> {
        let otp = sqlx::query_as::<_, Otp>(
            "SELECT phone, code, created_at FROM otps WHERE phone = ? AND code = ?",
        )
        .bind(phone)
        .bind(code)
        .fetch_optional(&self.state.db)
        .await?;

        let now = Utc::now();
        Ok(match self.state.config.otp.ttl()? {
            Some(ttl) => otp.filter(|otp| !otp.is_expired(ttl, now)),
            None => otp,
        })
    }

    /// Deletes the matching code; `false` means another request consumed it first.
    pub async fn consume(conn: &mut SqliteConnection, phone: &str, code: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM otps WHERE phone = ? AND code = ?")
            .bind(phone)
            .bind(code)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() == 1)
    }

}

fn otp_message(sender_name: &str, code: &str, ttl: Option<Duration>) -> String {
    match ttl {
        Some(ttl) => format!(
            "Your {} verification code is {}. Valid for {} mins.",
            sender_name,
            code,
            (ttl.num_seconds() + 59) / 60
        ),
        None => format!("Your {} verification code is {}.", sender_name, code),
    }
}
