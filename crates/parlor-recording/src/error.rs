//! Error types for the recording lifecycle.

use thiserror::Error;

/// Errors surfaced by the recording manager.
///
/// Remote faults never appear here — they are logged inside the manager and
/// collapse into absent results. The only `start()` error is
/// `SessionAlreadyActive`, a caller contract violation.
#[derive(Debug, Error)]
pub enum RecordingError {
    /// A recording session is already starting or active on this manager.
    #[error("a recording session is already active (job {job_id})")]
    SessionAlreadyActive {
        /// The identifier of the job currently occupying the slot.
        job_id: String,
    },

    /// The egress control plane rejected or failed a request.
    #[error("egress API error: {0}")]
    Egress(#[from] EgressApiError),

    /// The storage policy could not be applied.
    #[error("storage policy error: {0}")]
    Storage(String),

    /// Invalid input or configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Errors from the thin egress Twirp client.
#[derive(Debug, Error)]
pub enum EgressApiError {
    /// Minting the service access token failed.
    #[error("access token error: {0}")]
    Token(#[from] livekit_api::access_token::AccessTokenError),

    /// The HTTP request itself failed (connect, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a Twirp error payload.
    #[error("egress service error ({code}): {msg}")]
    Service {
        /// Twirp error code, e.g. `failed_precondition`.
        code: String,
        /// Human-readable message from the service.
        msg: String,
    },

    /// The response body could not be interpreted.
    #[error("malformed egress response: {0}")]
    Decode(String),
}

impl EgressApiError {
    /// True when a stop request was refused because the job already reached
    /// the terminal failed state. This is an expected outcome, not a fault:
    /// the manager follows it with a listing-based reconciliation pass.
    pub fn is_already_failed(&self) -> bool {
        matches!(
            self,
            Self::Service { code, msg }
                if code == "failed_precondition" && msg.contains("EGRESS_FAILED")
        )
    }
}

/// Reconciliation could not produce a result.
///
/// Carried back to `stop()` so the caller can log it at low severity; it
/// never escalates past that.
#[derive(Debug, Error)]
#[error("egress reconciliation unavailable: {0}")]
pub struct ReconcileUnavailable(pub String);
