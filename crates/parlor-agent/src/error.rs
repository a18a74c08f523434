use thiserror::Error;

/// Errors raised by the orchestrator's room control.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LiveKit API error: {0}")]
    LiveKit(#[from] livekit_api::access_token::AccessTokenError),

    #[error("room service error: {0}")]
    RoomService(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
