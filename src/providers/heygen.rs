use async_trait::async_trait;
use serde_json::json;

use super::{Provider, ProviderError, StatusReport, SubmitRequest};
use crate::config::HeyGenConfig;
use crate::models::{GenerationStatus, ProviderKind};

/// Client for the HeyGen talking-photo video API.
pub struct HeyGenProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HeyGenProvider {
    pub fn new(client: reqwest::Client, config: &HeyGenConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl Provider for HeyGenProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::HeyGen
    }

    async fn submit(&self, req: &SubmitRequest) -> Result<String, ProviderError> {
        let mut voice = json!({
            "type": "text",
            "input_text": req.script,
        });
        if let Some(ref voice_id) = req.voice_id {
            voice["voice_id"] = json!(voice_id);
        }

        let mut video_input = json!({
            "character": {
                "type": "talking_photo",
                "talking_photo_url": req.source_url,
            },
            "voice": voice,
        });
        if let Some(ref background_url) = req.background_url {
            video_input["background"] = json!({
                "type": "image",
                "url": background_url,
            });
        }

        let body = json!({
            "video_inputs": [video_input],
            "dimension": { "width": 720, "height": 1280 },
        });

        let resp = self
            .client
            .post(format!("{}/v2/video/generate", self.api_url))
            .header("X-Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Submission(format!("HeyGen request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Submission(format!(
                "HeyGen returned {status}: {text}"
            )));
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::Submission(format!("HeyGen returned invalid JSON: {e}")))?;

        data["data"]["video_id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                ProviderError::Submission(format!("HeyGen returned no video id: {data}"))
            })
    }

    async fn fetch_status(&self, provider_job_id: &str) -> Result<StatusReport, ProviderError> {
        let resp = self
            .client
            .get(format!("{}/v1/video_status.get", self.api_url))
            .query(&[("video_id", provider_job_id)])
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                ProviderError::Unavailable(format!("HeyGen status request failed: {e}"))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Unavailable(format!(
                "HeyGen status returned {status}: {text}"
            )));
        }

        let data: serde_json::Value = resp.json().await.map_err(|e| {
            ProviderError::Unavailable(format!("HeyGen status returned invalid JSON: {e}"))
        })?;

        let inner = &data["data"];
        Ok(StatusReport {
            raw_status: inner["status"].as_str().unwrap_or_default().to_string(),
            result_url: inner["video_url"].as_str().map(|s| s.to_string()),
            audio_url: inner["audio_url"].as_str().map(|s| s.to_string()),
            metadata: inner
                .get("error")
                .filter(|e| !e.is_null())
                .map(|e| json!({ "error": e })),
        })
    }

    fn map_status(&self, raw: &str) -> GenerationStatus {
        match raw {
            "completed" => GenerationStatus::Done,
            "failed" => GenerationStatus::Error,
            _ => GenerationStatus::Processing,
        }
    }
}
