//! Recording credentials loaded from the execution environment.
//!
//! Two credential groups: the LiveKit control plane (required — without it
//! the manager runs disabled) and the Spaces upload target (not validated up
//! front; a missing storage credential only surfaces when the egress job
//! attempts the upload).

use std::fmt;

/// LiveKit control-plane credentials.
#[derive(Clone)]
pub struct LiveKitCredentials {
    /// Server URL (`wss://…` or `https://…`).
    pub url: String,
    /// API key.
    pub api_key: String,
    /// API secret.
    pub api_secret: String,
}

impl fmt::Debug for LiveKitCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveKitCredentials")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// DigitalOcean Spaces (S3-compatible) upload target.
#[derive(Clone, Default)]
pub struct SpacesConfig {
    /// Access key for the Spaces API.
    pub access_key: String,
    /// Secret key for the Spaces API.
    pub secret_key: String,
    /// Endpoint host without scheme, e.g. `fra1.digitaloceanspaces.com`.
    pub endpoint: String,
    /// Target bucket name.
    pub bucket: String,
}

impl SpacesConfig {
    /// The storage region, derived as the first dot-separated label of the
    /// endpoint (`fra1.digitaloceanspaces.com` → `fra1`).
    pub fn region(&self) -> &str {
        self.endpoint.split('.').next().unwrap_or("")
    }

    /// Public URL of an object in the bucket, in virtual-host form.
    pub fn object_url(&self, key: &str) -> String {
        format!("https://{}.{}/{}", self.bucket, self.endpoint, key)
    }

    /// Endpoint URL with scheme, as handed to the egress upload descriptor.
    pub fn endpoint_url(&self) -> String {
        format!("https://{}", self.endpoint)
    }
}

impl fmt::Debug for SpacesConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpacesConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .finish()
    }
}

/// The full credential set for a recording manager instance.
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Control-plane credentials; `None` disables recording entirely.
    pub livekit: Option<LiveKitCredentials>,
    /// Upload target. Never blocks construction.
    pub spaces: SpacesConfig,
}

impl RecordingConfig {
    /// Builds a config from explicit parts.
    pub fn new(livekit: Option<LiveKitCredentials>, spaces: SpacesConfig) -> Self {
        Self { livekit, spaces }
    }

    /// Reads credentials from the environment.
    ///
    /// LiveKit: `LIVEKIT_URL`, `LIVEKIT_API_KEY`, `LIVEKIT_API_SECRET` — all
    /// three must be present and non-empty, otherwise recording is disabled.
    /// Spaces: `DO_SPACES_KEY`, `DO_SPACES_SECRET`, `DO_SPACES_ENDPOINT`,
    /// `DO_SPACES_BUCKET` — each defaults to empty when unset.
    pub fn from_env() -> Self {
        let livekit = match (
            env_non_empty("LIVEKIT_URL"),
            env_non_empty("LIVEKIT_API_KEY"),
            env_non_empty("LIVEKIT_API_SECRET"),
        ) {
            (Some(url), Some(api_key), Some(api_secret)) => Some(LiveKitCredentials {
                url,
                api_key,
                api_secret,
            }),
            _ => None,
        };

        let spaces = SpacesConfig {
            access_key: env_non_empty("DO_SPACES_KEY").unwrap_or_default(),
            secret_key: env_non_empty("DO_SPACES_SECRET").unwrap_or_default(),
            endpoint: env_non_empty("DO_SPACES_ENDPOINT").unwrap_or_default(),
            bucket: env_non_empty("DO_SPACES_BUCKET").unwrap_or_default(),
        };

        Self { livekit, spaces }
    }

    /// Whether the control-plane credentials are complete.
    pub fn is_enabled(&self) -> bool {
        self.livekit.is_some()
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
