use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Third-party vendor performing the actual video synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum ProviderKind {
    #[sqlx(rename = "d-id")]
    #[serde(rename = "d-id")]
    DId,
    #[sqlx(rename = "heygen")]
    #[serde(rename = "heygen")]
    HeyGen,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::DId => "d-id",
            ProviderKind::HeyGen => "heygen",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical internal lifecycle of a generation job. Advanced only by the
/// reconciler; `done` and `error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Created,
    Processing,
    Done,
    Error,
}

impl GenerationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationStatus::Done | GenerationStatus::Error)
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Generation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub provider: ProviderKind,
    pub provider_job_id: String,
    pub status: GenerationStatus,
    pub source_url: String,
    pub script_input: String,
    pub result_url: Option<String>,
    pub audio_url: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub config: serde_json::Value,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Public-feed row: a generation plus its computed social counters.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct FeedVideo {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub generation: Generation,
    pub likes_count: i64,
    pub views_count: i64,
    pub is_liked: bool,
}
