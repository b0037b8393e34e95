use serde::{Deserialize, Serialize};

use pvara_auth::Claims;

const MIN_PASSWORD_LEN: usize = 6;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    /// Shape checks only; whether the user exists is decided by the directory.
    pub fn validate(&self) -> Result<(), &'static str> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err("email must be a valid address");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("password must be at least 6 characters");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub organization_id: Option<String>,
    pub expires_at: i64,
}

impl From<&Claims> for MeResponse {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.subject_id.to_string(),
            email: claims.email.clone(),
            role: claims.role.as_ref().map(|r| r.to_string()),
            organization_id: claims.organization_id.as_ref().map(|o| o.to_string()),
            expires_at: claims.expires_at.timestamp(),
        }
    }
}
