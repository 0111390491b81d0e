use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emailed one-time code. Valid iff not consumed and not expired; consumed
/// atomically with the password change it authorizes.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct PasswordResetCode {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub consumed: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
