use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One like per user per video, enforced by a uniqueness constraint.
/// Deleted on toggle-off.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Like {
    pub id: Uuid,
    pub user_id: Uuid,
    pub generation_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// One counted view per user per video. Never deleted; repeat views are
/// no-ops.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct View {
    pub id: Uuid,
    pub user_id: Uuid,
    pub generation_id: Uuid,
    pub ip: Option<String>,
    pub created_at: DateTime<Utc>,
}
