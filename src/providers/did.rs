use async_trait::async_trait;
use serde_json::json;

use super::{Provider, ProviderError, StatusReport, SubmitRequest};
use crate::config::DidConfig;
use crate::models::{GenerationStatus, ProviderKind};

/// Client for the D-ID talks API.
pub struct DidProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl DidProvider {
    pub fn new(client: reqwest::Client, config: &DidConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Basic {}", self.api_key)
    }
}

#[async_trait]
impl Provider for DidProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::DId
    }

    async fn submit(&self, req: &SubmitRequest) -> Result<String, ProviderError> {
        let mut script = json!({
            "type": "text",
            "input": req.script,
        });
        if let Some(ref voice_id) = req.voice_id {
            script["provider"] = json!({
                "type": "microsoft",
                "voice_id": voice_id,
            });
        }

        let body = json!({
            "source_url": req.source_url,
            "script": script,
            "config": {
                "fluent": false,
                "pad_audio": 0.0,
            },
        });

        let resp = self
            .client
            .post(format!("{}/talks", self.api_url))
            .header("Accept", "application/json")
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Submission(format!("D-ID request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Submission(format!(
                "D-ID returned {status}: {text}"
            )));
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::Submission(format!("D-ID returned invalid JSON: {e}")))?;

        data["id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ProviderError::Submission(format!("D-ID returned no talk id: {data}")))
    }

    async fn fetch_status(&self, provider_job_id: &str) -> Result<StatusReport, ProviderError> {
        let resp = self
            .client
            .get(format!("{}/talks/{provider_job_id}", self.api_url))
            .header("Accept", "application/json")
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("D-ID status request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Unavailable(format!(
                "D-ID status returned {status}: {text}"
            )));
        }

        let data: serde_json::Value = resp.json().await.map_err(|e| {
            ProviderError::Unavailable(format!("D-ID status returned invalid JSON: {e}"))
        })?;

        Ok(StatusReport {
            raw_status: data["status"].as_str().unwrap_or_default().to_string(),
            result_url: data["result_url"].as_str().map(|s| s.to_string()),
            audio_url: data["audio_url"].as_str().map(|s| s.to_string()),
            metadata: data.get("metadata").filter(|m| !m.is_null()).cloned(),
        })
    }

    fn map_status(&self, raw: &str) -> GenerationStatus {
        match raw {
            "created" => GenerationStatus::Created,
            "started" => GenerationStatus::Processing,
            "done" => GenerationStatus::Done,
            "error" | "rejected" => GenerationStatus::Error,
            // Unrecognized tokens are treated as still in flight rather than
            // terminal, pending vendor vocabulary documentation.
            _ => GenerationStatus::Processing,
        }
    }
}
