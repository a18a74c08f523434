//! Shared types for the Parlor voice-agent platform.
//!
//! This crate provides the cross-cutting configuration types used by the
//! orchestrator and the recording core: the speech-provider selection that is
//! resolved once at process start, and the ordered label triple embedded in
//! recording artifact names.
//!
//! No crate in the workspace depends on anything *except* `parlor-types` for
//! these definitions. This keeps the dependency graph clean and prevents
//! circular dependencies.

use serde::{Deserialize, Serialize};
use std::fmt;

mod providers;
pub use providers::{LlmProvider, ProviderSelection, SttProvider, TtsProvider};

/// The ordered label triple embedded in recording artifact names.
///
/// A session is labelled by the three provider model names (STT, LLM, TTS)
/// active for that conversation. The order is part of the artifact-naming
/// contract and must not be reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLabels(pub [String; 3]);

impl SessionLabels {
    /// Builds a label triple from three label strings.
    pub fn new(
        first: impl Into<String>,
        second: impl Into<String>,
        third: impl Into<String>,
    ) -> Self {
        Self([first.into(), second.into(), third.into()])
    }

    /// Returns the labels in order.
    pub fn as_array(&self) -> &[String; 3] {
        &self.0
    }
}

impl fmt::Display for SessionLabels {
    /// Formats the triple as `{first}_{second}_{third}`, exactly as it
    /// appears inside recording file names.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.0[0], self.0[1], self.0[2])
    }
}
