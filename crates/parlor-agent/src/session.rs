//! Session lifecycle: wires the room service, prompt material, and the
//! recording manager together at session boundaries.
//!
//! `begin` and `end` are the two hooks the process calls around a
//! conversation. Recording is auxiliary: nothing in here lets a recording
//! failure take the session down.

use crate::config::Config;
use crate::prompts::{self, PromptSet};
use crate::room::RoomService;
use parlor_recording::RecordingManager;
use std::path::Path;
use tracing::{error, info, warn};

/// Runtime state for one agent session.
pub struct SessionRuntime {
    config: Config,
    room: Option<RoomService>,
    recording: RecordingManager,
    prompts: Option<PromptSet>,
}

impl SessionRuntime {
    /// Builds the runtime from configuration and the process environment.
    pub fn new(config: Config) -> Self {
        let room = RoomService::from_env();
        if room.is_none() {
            warn!("missing LiveKit credentials, running without room control");
        }

        Self {
            config,
            room,
            recording: RecordingManager::from_env(),
            prompts: None,
        }
    }

    /// Start-of-session hook.
    ///
    /// Resolves prompt material and the provider selection, prepares the
    /// room and the pipeline join token, and starts the session recording.
    /// Partial failures are logged; the session proceeds regardless.
    pub async fn begin(&mut self) {
        let prompt_set = prompts::load_prompts(
            Path::new(&self.config.prompts.instructions_dir),
            Path::new(&self.config.prompts.knowledge_dir),
        );
        info!(
            instruction_bytes = prompt_set.instructions.len(),
            has_knowledge = prompt_set.knowledge.is_some(),
            "session prompt material resolved"
        );

        let selection = &self.config.providers;
        info!(
            stt = selection.stt.label(),
            llm = selection.llm.label(),
            tts = selection.tts.label(),
            "provider selection resolved"
        );

        let room_name = self.config.room.name.clone();
        if let Some(room) = &self.room {
            match room.ensure_room(&room_name).await {
                Ok(_) => {
                    let occupants = room.participant_count(&room_name).await.unwrap_or(0);
                    info!(room = %room_name, occupants, "room ready");
                }
                Err(e) => error!(room = %room_name, error = %e, "failed to prepare room"),
            }

            match room.pipeline_join_token(&room_name, None) {
                Ok(token) => info!(
                    room = %room_name,
                    token_len = token.len(),
                    "pipeline join token minted"
                ),
                Err(e) => error!(room = %room_name, error = %e, "failed to mint pipeline token"),
            }
        }

        let labels = selection.labels();
        match self.recording.start(&room_name, &labels).await {
            Ok(Some(job_id)) => info!(job_id = %job_id, "session recording started"),
            Ok(None) => warn!("session recording did not start"),
            Err(e) => warn!(error = %e, "recording start rejected"),
        }

        info!(
            greeting = %self.config.room.greeting,
            "greeting instruction handed to pipeline"
        );
        self.prompts = Some(prompt_set);
    }

    /// End-of-session hook: stops any tracked recording and releases the
    /// remote clients. Always leaves the recording manager idle.
    pub async fn end(&mut self) {
        self.recording.stop().await;
        self.recording.close();
        info!("session ended");
    }

    /// Prompt material resolved by `begin`, when it has run.
    pub fn prompts(&self) -> Option<&PromptSet> {
        self.prompts.as_ref()
    }

    /// Identifier of the active recording job, when one is tracked.
    pub fn recording_job(&self) -> Option<&str> {
        self.recording.current_job()
    }
}
