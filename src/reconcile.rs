use crate::db;
use crate::error::AppError;
use crate::models::{Generation, GenerationStatus};
use crate::state::AppState;
use crate::storage::MediaStore;

/// Poll the job's provider and advance local state to match.
///
/// Never raises for a transient vendor outage; the caller gets the last-known
/// stored record back. The media transfer into owned storage happens at most
/// once per job.
pub async fn reconcile(state: &AppState, job: Generation) -> Result<Generation, AppError> {
    // Idempotence fast path: terminal and already republished means there is
    // nothing left to learn from the vendor.
    if job.status.is_terminal()
        && job
            .result_url
            .as_deref()
            .is_some_and(|url| state.storage.as_ref().is_some_and(|s| s.is_owned(url)))
    {
        return Ok(job);
    }

    let provider = state.providers.get(job.provider).ok_or_else(|| {
        AppError::Internal(format!("{} provider not configured", job.provider))
    })?;

    let report = match provider.fetch_status(&job.provider_job_id).await {
        Ok(report) => report,
        Err(e) => {
            // A network blip must never be recorded as a terminal failure.
            tracing::warn!(job_id = %job.id, "Poll failed, keeping last-known state: {e}");
            return Ok(job);
        }
    };

    let status = advance(job.status, provider.map_status(&report.raw_status));

    let mut result_url = job.result_url.clone();
    if status == GenerationStatus::Done {
        if let Some(vendor_url) = report.result_url {
            result_url = Some(republish(state, &job, vendor_url).await);
        }
    }

    let audio_url = report.audio_url.or(job.audio_url.clone());
    let metadata = report.metadata.or(job.metadata.clone());

    let updated = db::generations::update_reconciled(
        &state.pool,
        job.id,
        status,
        result_url.as_deref(),
        audio_url.as_deref(),
        metadata,
    )
    .await?;

    Ok(updated)
}

/// Statuses only move forward; a terminal state is never regressed.
fn advance(current: GenerationStatus, mapped: GenerationStatus) -> GenerationStatus {
    if current.is_terminal() {
        return current;
    }
    if current == GenerationStatus::Processing && mapped == GenerationStatus::Created {
        return current;
    }
    mapped
}

/// Move a finished video from the vendor's transient URL into owned storage,
/// unless it is already there. A failed transfer degrades to the vendor URL
/// rather than failing the reconciliation.
async fn republish(state: &AppState, job: &Generation, vendor_url: String) -> String {
    let Some(store) = &state.storage else {
        // Without a store there is no way to tell an owned URL from a vendor
        // one, so an already-recorded result is never replaced.
        if let Some(existing) = job.result_url.clone() {
            return existing;
        }
        tracing::warn!(job_id = %job.id, "Object storage not configured, keeping vendor URL");
        return vendor_url;
    };

    // Already republished (or the vendor URL somehow points at us).
    if let Some(existing) = job.result_url.as_deref() {
        if store.is_owned(existing) {
            return existing.to_string();
        }
    }
    if store.is_owned(&vendor_url) {
        return vendor_url;
    }

    let filename = vendor_url
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("result.mp4");
    let key = MediaStore::generate_key("videos", filename);

    match store.put_from_remote_url(&vendor_url, &key).await {
        Ok(owned_url) => {
            tracing::info!(job_id = %job.id, "Republished result to {owned_url}");
            owned_url
        }
        Err(e) => {
            tracing::error!(job_id = %job.id, "Transfer to owned storage failed: {e}");
            vendor_url
        }
    }
}
