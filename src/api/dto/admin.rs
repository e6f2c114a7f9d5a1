//! Response bodies of the privileged and informational endpoints.

use serde::Serialize;

/// Plain status message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response of `PATCH /sync-counter`.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub message: String,
    pub new_count: u64,
}
