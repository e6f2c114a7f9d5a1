//! Admin key authorization for privileged endpoints.

use serde_json::json;

use crate::error::AppError;
use crate::utils::constant_time::constant_time_eq;

/// Checks presented credentials against the configured admin key.
///
/// The comparison is constant-time, so response latency does not reveal how
/// much of a guessed key was correct.
pub struct AuthService {
    admin_key: String,
}

impl AuthService {
    pub fn new(admin_key: String) -> Self {
        Self { admin_key }
    }

    /// Authorizes a request carrying `presented` as its admin key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the key is missing or wrong.
    pub fn authorize(&self, presented: Option<&str>) -> Result<(), AppError> {
        let presented = presented.unwrap_or_default();

        if presented.is_empty() || !constant_time_eq(presented, &self.admin_key) {
            return Err(AppError::unauthorized(
                "Invalid or missing API key",
                json!({ "reason": "Admin key is missing or invalid" }),
            ));
        }

        Ok(())
    }
}
