use std::sync::Arc;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,     // admin username
    pub exp: usize,      // Expiration time
    pub iat: usize,      // Issued at time
}

#[derive(Debug)]
pub struct AuthResult {
    pub access_token: String,
    pub expires_in: u64,
}

pub struct AuthService {
    state: Arc<AppState>,
}

impl AuthService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub fn login(&self, username: &str, password: &str) -> Result<AuthResult, AppError> {
        let admin = &self.state.config.admin;

        if admin.password.is_empty() || username != admin.username || password != admin.password {
            tracing::warn!(username = %username, "rejected admin login");
            return Err(AppError::Auth("Invalid username or password".to_string()));
        }

        self.generate_token(username)
    }

    /// Returns the admin username carried by a valid token.
    pub fn validate_token(&self, token: &str) -> Result<String, AppError> {
        let secret = self.state.config.admin.jwt_secret.as_bytes();
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
            .map_err(|_| AppError::Auth("Invalid token".to_string()))?;

        if token_data.claims.sub != self.state.config.admin.username {
            return Err(AppError::Auth("Invalid token subject".to_string()));
        }

        Ok(token_data.claims.sub)
    }

    fn generate_token(&self, username: &str) -> Result<AuthResult, AppError> {
        let expiry_hours = self.state.config.admin.token_expiry_hours.max(1);
        let secret = self.state.config.admin.jwt_secret.as_bytes();

        let now = Utc::now();
        let exp = now
            .checked_add_signed(Duration::hours(expiry_hours as i64))
            .ok_or_else(|| AppError::Internal("Invalid token expiry".to_string()))?
            .timestamp() as usize;

        let claims = Claims {
            sub: username.to_string(),
            exp,
            iat: now.timestamp() as usize,
        };

        let access_token = encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(AuthResult {
            access_token,
            expires_in: expiry_hours * 3600,
        })
    }
}
