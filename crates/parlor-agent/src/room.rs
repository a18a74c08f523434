//! LiveKit room control for agent sessions.
//!
//! Server-side room operations the orchestrator needs before a session can
//! run: making sure the room exists, minting a join token for the media
//! pipeline participant, and checking occupancy.

use crate::error::AgentError;
use livekit_api::access_token::{AccessToken, VideoGrants};
use livekit_api::services::room::{CreateRoomOptions, RoomClient};
use livekit_protocol::Room;
use std::time::Duration;
use uuid::Uuid;

/// JWT TTL for pipeline join tokens. Default: 3600 (1 hour).
const JOIN_TOKEN_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug)]
pub struct RoomService {
    api_key: String,
    api_secret: String,
    room_client: RoomClient,
}

impl RoomService {
    pub fn new(url: &str, api_key: &str, api_secret: &str) -> Self {
        let room_client = RoomClient::with_api_key(url, api_key, api_secret);
        Self {
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            room_client,
        }
    }

    /// Builds a service from `LIVEKIT_URL`/`LIVEKIT_API_KEY`/
    /// `LIVEKIT_API_SECRET`; `None` when any credential is missing.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("LIVEKIT_URL").ok().filter(|v| !v.is_empty())?;
        let api_key = std::env::var("LIVEKIT_API_KEY")
            .ok()
            .filter(|v| !v.is_empty())?;
        let api_secret = std::env::var("LIVEKIT_API_SECRET")
            .ok()
            .filter(|v| !v.is_empty())?;
        Some(Self::new(&url, &api_key, &api_secret))
    }

    /// Creates the session room. LiveKit treats creation as idempotent, so
    /// this is safe to call when the room already exists.
    pub async fn ensure_room(&self, name: &str) -> Result<Room, AgentError> {
        let options = CreateRoomOptions::default();

        self.room_client
            .create_room(name, options)
            .await
            .map_err(|e| AgentError::RoomService(e.to_string()))
    }

    /// Mints a join token for the media pipeline participant.
    ///
    /// When no identity is supplied, a fresh `pipeline-{uuid}` identity is
    /// generated so reconnecting pipelines never collide.
    pub fn pipeline_join_token(
        &self,
        room_name: &str,
        identity: Option<&str>,
    ) -> Result<String, AgentError> {
        let identity = match identity {
            Some(identity) => identity.to_string(),
            None => format!("pipeline-{}", Uuid::new_v4()),
        };

        let token = AccessToken::with_api_key(&self.api_key, &self.api_secret)
            .with_identity(&identity)
            .with_name("Parlor Pipeline")
            .with_grants(VideoGrants {
                room_join: true,
                room: room_name.to_string(),
                can_publish: true,
                can_subscribe: true,
                can_publish_data: true,
                ..Default::default()
            })
            .with_ttl(JOIN_TOKEN_TTL);

        token.to_jwt().map_err(AgentError::LiveKit)
    }

    /// Returns the number of participants currently in a room.
    /// Returns 0 if the room does not exist.
    pub async fn participant_count(&self, room_name: &str) -> Result<u32, AgentError> {
        match self.room_client.list_participants(room_name).await {
            Ok(participants) => Ok(participants.len() as u32),
            Err(_) => Ok(0), // Room doesn't exist yet
        }
    }
}
