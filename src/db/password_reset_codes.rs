use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::models::PasswordResetCode;

pub async fn create(
    pool: &PgPool,
    email: &str,
    code: &str,
    expires_at: DateTime<Utc>,
) -> Result<PasswordResetCode, sqlx::Error> {
    sqlx::query_as::<_, PasswordResetCode>(
        "INSERT INTO password_reset_codes (email, code, expires_at)
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(email)
    .bind(code)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

/// Consume a valid code in one atomic statement. Returns `None` when the code
/// is unknown, already consumed, or expired — a second verification with the
/// same code always fails. Runs on any executor so the caller can pair it
/// with the password change inside one transaction.
pub async fn consume<'e>(
    executor: impl PgExecutor<'e>,
    email: &str,
    code: &str,
) -> Result<Option<PasswordResetCode>, sqlx::Error> {
    sqlx::query_as::<_, PasswordResetCode>(
        "UPDATE password_reset_codes SET consumed = true
         WHERE id = (
             SELECT id FROM password_reset_codes
             WHERE email = $1 AND code = $2 AND consumed = false AND expires_at > now()
             ORDER BY created_at DESC
             LIMIT 1
             FOR UPDATE SKIP LOCKED
         )
         RETURNING *",
    )
    .bind(email)
    .bind(code)
    .fetch_optional(executor)
    .await
}
