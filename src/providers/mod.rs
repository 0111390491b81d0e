pub mod did;
pub mod heygen;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{GenerationStatus, ProviderKind};

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The vendor rejected a submission, or its response lacked a job id.
    /// Carries the raw response text for diagnostics.
    #[error("submission failed: {0}")]
    Submission(String),
    /// Transport failure or non-success response while polling. Callers must
    /// treat the job as still processing, never as a terminal failure.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Everything a vendor needs to start a generation job.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub source_url: String,
    pub script: String,
    pub voice_id: Option<String>,
    pub background_url: Option<String>,
}

/// Vendor-reported job state, in the vendor's own vocabulary.
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    pub raw_status: String,
    pub result_url: Option<String>,
    pub audio_url: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Build the vendor payload and perform one outbound call. Returns the
    /// vendor-assigned job id.
    async fn submit(&self, req: &SubmitRequest) -> Result<String, ProviderError>;

    /// One outbound poll for the given vendor job id.
    async fn fetch_status(&self, provider_job_id: &str) -> Result<StatusReport, ProviderError>;

    /// Fixed mapping from the vendor's status vocabulary to the internal
    /// lifecycle.
    fn map_status(&self, raw: &str) -> GenerationStatus;
}

pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.kind(), provider);
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&Arc<dyn Provider>> {
        self.providers.get(&kind)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
