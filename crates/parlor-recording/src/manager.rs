//! Recording lifecycle manager.
//!
//! Owns at most one room recording at a time. `start` creates a
//! room-composite egress job uploading to the Spaces bucket; `stop` tears it
//! down best-effort and reconciles through the job listing when the job
//! already died on its own. Whatever happens remotely, `stop` always leaves
//! the manager idle and ready for the next session.
//!
//! Callers serialize `start`/`stop` per instance (the `&mut self` receivers
//! make overlapping calls impossible within one task); the manager adds no
//! locking of its own and imposes no timeouts beyond the HTTP client's.

use crate::config::{RecordingConfig, SpacesConfig};
use crate::egress::{EgressClient, EgressInfo, StartRoomCompositeRequest};
use crate::error::{EgressApiError, ReconcileUnavailable, RecordingError};
use crate::storage::StoragePolicySetter;
use chrono::{DateTime, Utc};
use parlor_types::SessionLabels;

/// Lifecycle states of the single recording slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    /// No recording tracked; ready to start.
    Idle,
    /// Start request in flight.
    Starting,
    /// A remote job is recording the room.
    Active,
    /// Stop request in flight.
    Stopping,
    /// The job was stopped cleanly.
    Stopped,
    /// The job ended in a failure state.
    Failed,
}

impl RecordingState {
    /// Canonical label for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Active => "active",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }
}

/// What reconciliation recovered about a job that failed on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationInfo {
    /// A partially-written output path, when one was found.
    pub file_path: Option<String>,
    /// The failure detail reported by the service.
    pub error: Option<String>,
    /// The artifact never reached the bucket and may only exist on the
    /// egress host.
    pub upload_failed: bool,
}

/// Manages the lifecycle of at most one active room recording.
pub struct RecordingManager {
    inner: Option<Enabled>,
}

/// Live state behind an enabled manager.
struct Enabled {
    egress: EgressClient,
    storage: StoragePolicySetter,
    spaces: SpacesConfig,
    state: RecordingState,
    current_job: Option<String>,
}

impl RecordingManager {
    /// Builds a manager from a credential set.
    ///
    /// Incomplete LiveKit credentials put the manager in disabled mode:
    /// every operation becomes a safe no-op, announced once here.
    pub fn new(config: RecordingConfig) -> Self {
        let Some(credentials) = config.livekit else {
            tracing::warn!("missing LiveKit credentials, recording is disabled");
            return Self { inner: None };
        };

        Self {
            inner: Some(Enabled {
                egress: EgressClient::new(&credentials),
                storage: StoragePolicySetter::new(
                    config.spaces.access_key.clone(),
                    config.spaces.secret_key.clone(),
                ),
                spaces: config.spaces,
                state: RecordingState::Idle,
                current_job: None,
            }),
        }
    }

    /// Builds a manager from the process environment.
    pub fn from_env() -> Self {
        Self::new(RecordingConfig::from_env())
    }

    /// Replaces the storage policy setter. Used when the upload target is
    /// not a standard Spaces endpoint (and by the tests). No-op on a
    /// disabled manager.
    pub fn with_storage_policy(mut self, setter: StoragePolicySetter) -> Self {
        if let Some(enabled) = self.inner.as_mut() {
            enabled.storage = setter;
        }
        self
    }

    /// Whether recording is configured at all.
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Current lifecycle state. A disabled or closed manager reports `Idle`.
    pub fn state(&self) -> RecordingState {
        self.inner
            .as_ref()
            .map_or(RecordingState::Idle, |enabled| enabled.state)
    }

    /// Identifier of the tracked job, when one is active.
    pub fn current_job(&self) -> Option<&str> {
        self.inner
            .as_ref()
            .and_then(|enabled| enabled.current_job.as_deref())
    }

    /// Starts a room-composite recording of `room_name`.
    ///
    /// Returns the remote job identifier on success. Returns `Ok(None)` when
    /// recording is disabled or the start attempt fails remotely — the
    /// failure is logged, never propagated, and the slot is left idle rather
    /// than stuck in `Starting`. The only error is `SessionAlreadyActive`,
    /// returned when the slot is occupied; the prior job is left untouched.
    pub async fn start(
        &mut self,
        room_name: &str,
        labels: &SessionLabels,
    ) -> Result<Option<String>, RecordingError> {
        let Some(enabled) = self.inner.as_mut() else {
            tracing::debug!("recording disabled, ignoring start request");
            return Ok(None);
        };

        if matches!(
            enabled.state,
            RecordingState::Starting | RecordingState::Active
        ) {
            return Err(RecordingError::SessionAlreadyActive {
                job_id: enabled.current_job.clone().unwrap_or_default(),
            });
        }

        enabled.state = RecordingState::Starting;
        match start_job(enabled, room_name, labels).await {
            Ok(job_id) => {
                enabled.state = RecordingState::Active;
                enabled.current_job = Some(job_id.clone());
                tracing::info!(room = room_name, job_id = %job_id, "recording started");
                Ok(Some(job_id))
            }
            Err(error) => {
                enabled.state = RecordingState::Idle;
                enabled.current_job = None;
                tracing::error!(room = room_name, error = %error, "failed to start recording");
                Ok(None)
            }
        }
    }

    /// Stops the tracked recording, best-effort.
    ///
    /// A no-op when nothing is tracked. Three remote outcomes are handled:
    /// a clean stop (output paths logged), a job that already reached the
    /// terminal failed state (reconciled through the listing, not treated as
    /// a failure), and anything else (logged, not retried). In every case the tracked
    /// job is cleared and the state returns to `Idle` before this returns.
    pub async fn stop(&mut self) {
        let Some(enabled) = self.inner.as_mut() else {
            return;
        };
        let Some(job_id) = enabled.current_job.clone() else {
            return;
        };

        enabled.state = RecordingState::Stopping;
        tracing::info!(job_id = %job_id, "stopping recording");

        match enabled.egress.stop(&job_id).await {
            Ok(info) => {
                enabled.state = RecordingState::Stopped;
                log_stop_outputs(&info);
                tracing::info!(job_id = %job_id, "recording stopped");
            }
            Err(error) if error.is_already_failed() => {
                enabled.state = RecordingState::Failed;
                tracing::info!(
                    job_id = %job_id,
                    "recording already failed remotely, checking for saved files"
                );
                match reconcile(&enabled.egress, &job_id).await {
                    Ok(info) => log_reconciliation(&job_id, &info),
                    Err(ReconcileUnavailable(reason)) => {
                        tracing::debug!(job_id = %job_id, reason = %reason, "could not reconcile failed recording");
                    }
                }
            }
            Err(error) => {
                enabled.state = RecordingState::Failed;
                tracing::error!(job_id = %job_id, error = %error, "failed to stop recording");
            }
        }

        enabled.current_job = None;
        enabled.state = RecordingState::Idle;
    }

    /// Releases the remote clients. Idempotent; the manager behaves as
    /// disabled afterwards.
    pub fn close(&mut self) {
        self.inner = None;
    }
}

/// The fallible part of `start`: policy, key derivation, and the remote
/// create. Every failure funnels into the caller's single logged path.
async fn start_job(
    enabled: &mut Enabled,
    room_name: &str,
    labels: &SessionLabels,
) -> Result<String, RecordingError> {
    if room_name.trim().is_empty() {
        return Err(RecordingError::Config("room name is empty".into()));
    }

    let bucket = enabled.spaces.bucket.clone();
    let region = enabled.spaces.region().to_string();
    enabled.storage.ensure_public_access(&bucket, &region).await?;

    let key = output_key(room_name, labels, Utc::now());
    tracing::info!(url = %enabled.spaces.object_url(&key), "recording will be uploaded");

    let request = StartRoomCompositeRequest::mp4(room_name, &key, &enabled.spaces);
    let info = enabled.egress.start_room_composite(&request).await?;

    let job_id = info.job_id().ok_or_else(|| {
        RecordingError::Egress(EgressApiError::Decode(
            "start response carried no job identifier".into(),
        ))
    })?;
    Ok(job_id.to_string())
}

/// Queries the egress listing for `job_id` and extracts whatever partial
/// output information is present.
///
/// Never escalates: every failure collapses into `ReconcileUnavailable` for
/// the caller to log at low severity.
pub async fn reconcile(
    egress: &EgressClient,
    job_id: &str,
) -> Result<ReconciliationInfo, ReconcileUnavailable> {
    let items = egress
        .list()
        .await
        .map_err(|error| ReconcileUnavailable(error.to_string()))?;

    let entry = items
        .iter()
        .find(|info| info.job_id() == Some(job_id))
        .ok_or_else(|| ReconcileUnavailable(format!("job {job_id} not present in listing")))?;

    let error = entry.error.clone().filter(|detail| !detail.is_empty());
    let upload_failed = error
        .as_deref()
        .is_some_and(|detail| detail.contains("S3 upload failed"));

    Ok(ReconciliationInfo {
        file_path: entry.recorded_file_path().map(str::to_string),
        error,
        upload_failed,
    })
}

/// Derives the object-storage key for a recording.
///
/// The template is a compatibility contract and must stay bit-exact:
/// `{room}-{label1}_{label2}_{label3}-{YYYYMMDD-HHMMSS}.mp4`, UTC.
pub fn output_key(room_name: &str, labels: &SessionLabels, at: DateTime<Utc>) -> String {
    format!("{}-{}-{}.mp4", room_name, labels, at.format("%Y%m%d-%H%M%S"))
}

fn log_stop_outputs(info: &EgressInfo) {
    for result in &info.file_results {
        if let Some(filename) = &result.filename {
            tracing::info!(file = %filename, "recording saved");
        }
        if let Some(playlist) = &result.playlist_name {
            tracing::info!(playlist = %playlist, "playlist saved");
        }
    }

    if info.file_results.is_empty() {
        if let Some(filename) = info.file.as_ref().and_then(|f| f.filename.as_deref()) {
            tracing::info!(file = %filename, "recording saved");
        } else if let Some(playlist) = info
            .playlist
            .as_ref()
            .and_then(|p| p.playlist_name.as_deref())
        {
            tracing::info!(playlist = %playlist, "playlist saved");
        }
    }
}

fn log_reconciliation(job_id: &str, info: &ReconciliationInfo) {
    if let Some(path) = &info.file_path {
        if info.upload_failed {
            tracing::warn!(
                job_id = %job_id,
                file = %path,
                "upload failed, file remains on the egress host"
            );
        } else {
            tracing::info!(job_id = %job_id, file = %path, "partial recording file located");
        }
    }
    if let Some(error) = &info.error {
        tracing::warn!(job_id = %job_id, error = %error, "recording ended with an error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn labels() -> SessionLabels {
        SessionLabels::new("a", "b", "c")
    }

    #[test]
    fn output_key_is_deterministic() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            output_key("room1", &labels(), at),
            "room1-a_b_c-20240102-030405.mp4"
        );
    }

    #[test]
    fn output_key_pads_timestamp_fields() {
        let at = Utc.with_ymd_and_hms(2025, 11, 30, 23, 59, 59).unwrap();
        assert_eq!(
            output_key("demo", &labels(), at),
            "demo-a_b_c-20251130-235959.mp4"
        );
    }

    #[tokio::test]
    async fn disabled_manager_ignores_start() {
        let mut manager = RecordingManager::new(RecordingConfig::new(None, Default::default()));
        assert!(!manager.is_enabled());

        let result = manager.start("room1", &labels()).await.unwrap();
        assert_eq!(result, None);
        assert_eq!(manager.state(), RecordingState::Idle);
        assert_eq!(manager.current_job(), None);
    }

    #[tokio::test]
    async fn disabled_manager_ignores_stop() {
        let mut manager = RecordingManager::new(RecordingConfig::new(None, Default::default()));
        manager.stop().await;
        assert_eq!(manager.state(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let mut manager = RecordingManager::new(RecordingConfig::new(None, Default::default()));
        manager.close();
        manager.close();
        assert!(!manager.is_enabled());
    }

    #[test]
    fn state_labels() {
        assert_eq!(RecordingState::Idle.as_str(), "idle");
        assert_eq!(RecordingState::Failed.as_str(), "failed");
    }
}
