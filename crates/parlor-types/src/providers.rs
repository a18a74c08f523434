//! Speech-provider selection for a voice session.
//!
//! The choice of STT/LLM/TTS providers is a process-wide configuration
//! decision: it is deserialized from the agent config, resolved once at
//! startup, and injected into the orchestrator. Each provider variant
//! carries its own connection configuration; the actual media pipeline that
//! consumes these settings runs as a remote service.

use crate::SessionLabels;
use serde::{Deserialize, Serialize};

/// Speech-to-text provider options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum SttProvider {
    /// OpenAI transcription API.
    OpenAi {
        /// Transcription model (e.g. `whisper-1`, `gpt-4o-transcribe`).
        #[serde(default = "default_stt_model")]
        model: String,
    },
    /// Deepgram streaming transcription.
    Deepgram {
        /// Deepgram model name (e.g. `nova-3`).
        model: String,
        /// BCP-47 language hint, or `multi` for multilingual sessions.
        #[serde(default)]
        language: Option<String>,
    },
    /// Groq-hosted Whisper.
    Groq {
        /// Whisper variant (e.g. `whisper-large-v3-turbo`).
        model: String,
    },
}

impl SttProvider {
    /// Returns the model name used as this provider's session label.
    pub fn label(&self) -> &str {
        match self {
            Self::OpenAi { model } | Self::Deepgram { model, .. } | Self::Groq { model } => model,
        }
    }
}

impl Default for SttProvider {
    fn default() -> Self {
        Self::OpenAi {
            model: default_stt_model(),
        }
    }
}

/// Language-model provider options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum LlmProvider {
    /// OpenAI chat completions.
    OpenAi {
        /// Chat model (e.g. `gpt-4o-mini`).
        #[serde(default = "default_llm_model")]
        model: String,
    },
    /// Groq-hosted open-weight models.
    Groq {
        /// Model name (e.g. `llama-3.1-8b-instant`).
        model: String,
    },
    /// Self-hosted model behind an OpenAI-compatible endpoint.
    Ollama {
        /// Model name (e.g. `llama3.1`).
        model: String,
        /// Base URL of the OpenAI-compatible API.
        base_url: String,
    },
}

impl LlmProvider {
    /// Returns the model name used as this provider's session label.
    pub fn label(&self) -> &str {
        match self {
            Self::OpenAi { model } | Self::Groq { model } | Self::Ollama { model, .. } => model,
        }
    }
}

impl Default for LlmProvider {
    fn default() -> Self {
        Self::OpenAi {
            model: default_llm_model(),
        }
    }
}

/// Text-to-speech provider options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum TtsProvider {
    /// OpenAI speech synthesis.
    OpenAi {
        /// Synthesis model (e.g. `gpt-4o-mini-tts`).
        #[serde(default = "default_tts_model")]
        model: String,
        /// Optional named voice.
        #[serde(default)]
        voice: Option<String>,
    },
    /// Cartesia voice synthesis.
    Cartesia {
        /// Cartesia voice identifier.
        voice: String,
    },
}

impl TtsProvider {
    /// Returns the session label for this provider: the model name where one
    /// exists, otherwise the provider family name.
    pub fn label(&self) -> &str {
        match self {
            Self::OpenAi { model, .. } => model,
            Self::Cartesia { .. } => "cartesia",
        }
    }
}

impl Default for TtsProvider {
    fn default() -> Self {
        Self::OpenAi {
            model: default_tts_model(),
            voice: None,
        }
    }
}

/// The full provider selection for a session, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderSelection {
    /// Speech-to-text provider.
    #[serde(default)]
    pub stt: SttProvider,
    /// Language-model provider.
    #[serde(default)]
    pub llm: LlmProvider,
    /// Text-to-speech provider.
    #[serde(default)]
    pub tts: TtsProvider,
}

impl ProviderSelection {
    /// Returns the ordered `[stt, llm, tts]` label triple for artifact naming.
    pub fn labels(&self) -> SessionLabels {
        SessionLabels::new(self.stt.label(), self.llm.label(), self.tts.label())
    }
}

fn default_stt_model() -> String {
    "whisper-1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_tts_model() -> String {
    "gpt-4o-mini-tts".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_labels() {
        let selection = ProviderSelection::default();
        assert_eq!(
            selection.labels().to_string(),
            "whisper-1_gpt-4o-mini_gpt-4o-mini-tts"
        );
    }

    #[test]
    fn provider_labels_use_model_names() {
        let stt = SttProvider::Deepgram {
            model: "nova-3".into(),
            language: Some("multi".into()),
        };
        assert_eq!(stt.label(), "nova-3");

        let llm = LlmProvider::Ollama {
            model: "llama3.1".into(),
            base_url: "http://localhost:11434/v1".into(),
        };
        assert_eq!(llm.label(), "llama3.1");

        let tts = TtsProvider::Cartesia {
            voice: "6f84f4b8".into(),
        };
        assert_eq!(tts.label(), "cartesia");
    }

    #[test]
    fn selection_parses_from_toml() {
        let toml_str = r#"
            [stt]
            provider = "groq"
            model = "whisper-large-v3-turbo"

            [llm]
            provider = "open_ai"
            model = "gpt-4o-mini"

            [tts]
            provider = "open_ai"
            model = "gpt-4o-mini-tts"
        "#;

        let selection: ProviderSelection = toml::from_str(toml_str).expect("parse TOML");
        assert_eq!(selection.stt.label(), "whisper-large-v3-turbo");
        assert_eq!(
            selection.labels().to_string(),
            "whisper-large-v3-turbo_gpt-4o-mini_gpt-4o-mini-tts"
        );
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let selection: ProviderSelection = toml::from_str("").expect("parse empty TOML");
        assert_eq!(selection, ProviderSelection::default());
    }
}
