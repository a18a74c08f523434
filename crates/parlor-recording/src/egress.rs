//! Thin authenticated client for the LiveKit Egress service.
//!
//! Talks to the egress control plane through its Twirp JSON endpoints
//! (`/twirp/livekit.Egress/<Method>`) rather than generated protobuf
//! bindings: listing responses are not uniform across server versions, and
//! the recording manager needs a tolerant view of them — the job identifier
//! may appear under either of two field names, and output metadata lives in
//! nested, optionally-absent substructures. Requests are authenticated with
//! short-lived JWTs carrying the `roomRecord` grant.

use crate::config::{LiveKitCredentials, SpacesConfig};
use crate::error::EgressApiError;
use livekit_api::access_token::{AccessToken, VideoGrants};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Composite layout requested for room recordings.
pub const COMPOSITE_LAYOUT: &str = "speaker";

/// Fixed encoding preset for recordings (H.264 720p at 30 fps).
pub const ENCODING_PRESET: &str = "H264_720P_30";

/// HTTP request timeout for egress control-plane calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// TTL of the per-request service tokens.
const TOKEN_TTL: Duration = Duration::from_secs(600);

/// Identity claimed by the recorder's service tokens.
const SERVICE_IDENTITY: &str = "parlor-recorder";

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Authenticated egress control-plane client.
#[derive(Debug)]
pub struct EgressClient {
    base_url: String,
    api_key: String,
    api_secret: String,
    http: reqwest::Client,
}

impl EgressClient {
    /// Creates a client for the given control plane. The LiveKit URL may use
    /// a WebSocket scheme; it is normalized to HTTP for API calls.
    pub fn new(credentials: &LiveKitCredentials) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            base_url: normalize_base_url(&credentials.url),
            api_key: credentials.api_key.clone(),
            api_secret: credentials.api_secret.clone(),
            http,
        }
    }

    /// Starts a room-composite recording job.
    pub async fn start_room_composite(
        &self,
        request: &StartRoomCompositeRequest,
    ) -> Result<EgressInfo, EgressApiError> {
        self.twirp("StartRoomCompositeEgress", request).await
    }

    /// Stops a job by identifier.
    pub async fn stop(&self, egress_id: &str) -> Result<EgressInfo, EgressApiError> {
        self.twirp(
            "StopEgress",
            &StopEgressRequest {
                egress_id: egress_id.to_string(),
            },
        )
        .await
    }

    /// Lists all egress jobs known to the service.
    pub async fn list(&self) -> Result<Vec<EgressInfo>, EgressApiError> {
        let response: ListEgressResponse = self.twirp("ListEgress", &ListEgressRequest {}).await?;
        Ok(response.items)
    }

    async fn twirp<Req, Resp>(&self, method: &str, body: &Req) -> Result<Resp, EgressApiError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let token = self.service_token()?;
        let url = format!("{}/twirp/livekit.Egress/{}", self.base_url, method);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_twirp_error(status, &text));
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| EgressApiError::Decode(e.to_string()))
    }

    /// Mints a short-lived token with the recording grant.
    fn service_token(&self) -> Result<String, EgressApiError> {
        let token = AccessToken::with_api_key(&self.api_key, &self.api_secret)
            .with_identity(SERVICE_IDENTITY)
            .with_grants(VideoGrants {
                room_record: true,
                ..Default::default()
            })
            .with_ttl(TOKEN_TTL);

        Ok(token.to_jwt()?)
    }
}

/// Converts a LiveKit URL to its HTTP API base: `ws`/`wss` schemes become
/// `http`/`https`, trailing slashes are dropped.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');
    if let Some(rest) = url.strip_prefix("wss://") {
        format!("https://{rest}")
    } else if let Some(rest) = url.strip_prefix("ws://") {
        format!("http://{rest}")
    } else {
        url.to_string()
    }
}

/// Interprets a non-2xx response body as a Twirp error payload, falling back
/// to the raw text for non-JSON bodies.
fn parse_twirp_error(status: reqwest::StatusCode, body: &str) -> EgressApiError {
    #[derive(Deserialize)]
    struct TwirpError {
        code: String,
        msg: String,
    }

    match serde_json::from_str::<TwirpError>(body) {
        Ok(error) => EgressApiError::Service {
            code: error.code,
            msg: error.msg,
        },
        Err(_) => EgressApiError::Service {
            code: status.as_str().to_string(),
            msg: body.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Start request for a room-composite recording.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRoomCompositeRequest {
    /// Room to record.
    pub room_name: String,
    /// Composition layout.
    pub layout: String,
    /// Encoding preset name.
    pub preset: String,
    /// Record audio and video.
    pub audio_only: bool,
    /// File outputs; the manager always requests exactly one.
    pub file_outputs: Vec<FileOutput>,
}

impl StartRoomCompositeRequest {
    /// Builds the fixed-shape request the manager uses: speaker layout,
    /// 720p30 preset, audio+video, one MP4 upload to the Spaces bucket with
    /// path-style addressing.
    pub fn mp4(room_name: &str, filepath: &str, spaces: &SpacesConfig) -> Self {
        Self {
            room_name: room_name.to_string(),
            layout: COMPOSITE_LAYOUT.to_string(),
            preset: ENCODING_PRESET.to_string(),
            audio_only: false,
            file_outputs: vec![FileOutput {
                file_type: "MP4".to_string(),
                filepath: filepath.to_string(),
                s3: S3Upload {
                    access_key: spaces.access_key.clone(),
                    secret: spaces.secret_key.clone(),
                    region: spaces.region().to_string(),
                    endpoint: spaces.endpoint_url(),
                    bucket: spaces.bucket.clone(),
                    force_path_style: true,
                },
            }],
        }
    }
}

/// One encoded-file output descriptor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutput {
    /// Container type, e.g. `MP4`.
    pub file_type: String,
    /// Destination key within the bucket.
    pub filepath: String,
    /// Upload destination.
    pub s3: S3Upload,
}

/// S3-compatible upload destination for an egress output.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Upload {
    /// Access key for the storage API.
    pub access_key: String,
    /// Secret key for the storage API.
    pub secret: String,
    /// Storage region.
    pub region: String,
    /// Endpoint URL with scheme.
    pub endpoint: String,
    /// Target bucket.
    pub bucket: String,
    /// Put the bucket name in the URL path rather than the subdomain.
    pub force_path_style: bool,
}

impl fmt::Debug for S3Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Upload")
            .field("access_key", &self.access_key)
            .field("secret", &"[REDACTED]")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StopEgressRequest {
    egress_id: String,
}

#[derive(Debug, Serialize)]
struct ListEgressRequest {}

// ---------------------------------------------------------------------------
// Tolerant response model
// ---------------------------------------------------------------------------

/// One egress job descriptor, as returned by start, stop, and list calls.
///
/// Every field is optional: the schema varies across server versions, and a
/// missing or renamed field must degrade to "no information", never to a
/// parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EgressInfo {
    /// Job identifier under its current field name.
    #[serde(default)]
    pub egress_id: Option<String>,
    /// Job identifier as exposed by older deployments.
    #[serde(default)]
    pub id: Option<String>,
    /// Job status, e.g. `EGRESS_ACTIVE`, `EGRESS_FAILED`.
    #[serde(default)]
    pub status: Option<String>,
    /// Failure detail reported by the service.
    #[serde(default)]
    pub error: Option<String>,
    /// Per-file results on completed jobs.
    #[serde(default)]
    pub file_results: Vec<FileResult>,
    /// Legacy single-file result.
    #[serde(default)]
    pub file: Option<FileResult>,
    /// Legacy single-playlist result.
    #[serde(default)]
    pub playlist: Option<FileResult>,
    /// Echo of the room-composite request, including its output descriptors.
    #[serde(default)]
    pub room_composite: Option<RoomCompositeSection>,
}

impl EgressInfo {
    /// The job identifier: an explicit two-candidate lookup, `egressId`
    /// first, then `id`.
    pub fn job_id(&self) -> Option<&str> {
        self.egress_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.id.as_deref().filter(|id| !id.is_empty()))
    }

    /// First recorded file path found in the descriptor, checking the
    /// room-composite output list before the legacy direct file descriptor.
    pub fn recorded_file_path(&self) -> Option<&str> {
        if let Some(composite) = &self.room_composite {
            for output in &composite.file_outputs {
                if let Some(filepath) = output.filepath.as_deref() {
                    if !filepath.is_empty() {
                        return Some(filepath);
                    }
                }
            }
        }
        self.file
            .as_ref()
            .and_then(|file| file.filename.as_deref())
            .filter(|name| !name.is_empty())
    }
}

/// A finished (or partially written) output file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResult {
    /// Output file name or key.
    #[serde(default)]
    pub filename: Option<String>,
    /// HLS playlist name, when segmented output was requested.
    #[serde(default)]
    pub playlist_name: Option<String>,
    /// Final storage location, when the upload succeeded.
    #[serde(default)]
    pub location: Option<String>,
}

/// The room-composite section of a job descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCompositeSection {
    /// Requested file outputs.
    #[serde(default)]
    pub file_outputs: Vec<CompositeFileOutput>,
}

/// One requested file output inside the room-composite section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeFileOutput {
    /// Destination path of the output.
    #[serde(default)]
    pub filepath: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ListEgressResponse {
    #[serde(default)]
    items: Vec<EgressInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_normalization() {
        assert_eq!(
            normalize_base_url("wss://example.livekit.cloud/"),
            "https://example.livekit.cloud"
        );
        assert_eq!(
            normalize_base_url("ws://localhost:7880"),
            "http://localhost:7880"
        );
        assert_eq!(
            normalize_base_url("https://example.livekit.cloud"),
            "https://example.livekit.cloud"
        );
    }

    #[test]
    fn job_id_prefers_current_field_name() {
        let info: EgressInfo =
            serde_json::from_str(r#"{"egressId": "EG_new", "id": "EG_old"}"#).unwrap();
        assert_eq!(info.job_id(), Some("EG_new"));
    }

    #[test]
    fn job_id_falls_back_to_legacy_field_name() {
        let info: EgressInfo = serde_json::from_str(r#"{"id": "EG_old"}"#).unwrap();
        assert_eq!(info.job_id(), Some("EG_old"));

        let info: EgressInfo = serde_json::from_str(r#"{"egressId": "", "id": "EG_old"}"#).unwrap();
        assert_eq!(info.job_id(), Some("EG_old"));
    }

    #[test]
    fn empty_descriptor_has_no_id_or_path() {
        let info: EgressInfo = serde_json::from_str("{}").unwrap();
        assert_eq!(info.job_id(), None);
        assert_eq!(info.recorded_file_path(), None);
    }

    #[test]
    fn recorded_path_prefers_composite_outputs() {
        let info: EgressInfo = serde_json::from_str(
            r#"{
                "egressId": "EG_1",
                "roomComposite": {"fileOutputs": [{"filepath": "room.mp4"}]},
                "file": {"filename": "legacy.mp4"}
            }"#,
        )
        .unwrap();
        assert_eq!(info.recorded_file_path(), Some("room.mp4"));
    }

    #[test]
    fn recorded_path_falls_back_to_direct_file() {
        let info: EgressInfo = serde_json::from_str(
            r#"{"egressId": "EG_1", "file": {"filename": "legacy.mp4"}}"#,
        )
        .unwrap();
        assert_eq!(info.recorded_file_path(), Some("legacy.mp4"));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let info: EgressInfo = serde_json::from_str(
            r#"{"egressId": "EG_1", "roomId": "RM_1", "startedAt": 123, "streamResults": []}"#,
        )
        .unwrap();
        assert_eq!(info.job_id(), Some("EG_1"));
    }

    #[test]
    fn twirp_error_parsing() {
        let error = parse_twirp_error(
            reqwest::StatusCode::PRECONDITION_FAILED,
            r#"{"code": "failed_precondition", "msg": "egress is already in state EGRESS_FAILED"}"#,
        );
        assert!(error.is_already_failed());

        let error = parse_twirp_error(reqwest::StatusCode::BAD_GATEWAY, "<html>nope</html>");
        match error {
            EgressApiError::Service { code, msg } => {
                assert_eq!(code, "502");
                assert_eq!(msg, "<html>nope</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn start_request_serializes_camel_case() {
        let spaces = SpacesConfig {
            access_key: "AK".into(),
            secret_key: "SK".into(),
            endpoint: "fra1.digitaloceanspaces.com".into(),
            bucket: "recordings".into(),
        };
        let request = StartRoomCompositeRequest::mp4("room1", "room1-a_b_c.mp4", &spaces);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["roomName"], "room1");
        assert_eq!(value["layout"], "speaker");
        assert_eq!(value["preset"], "H264_720P_30");
        assert_eq!(value["audioOnly"], false);
        let output = &value["fileOutputs"][0];
        assert_eq!(output["fileType"], "MP4");
        assert_eq!(output["filepath"], "room1-a_b_c.mp4");
        assert_eq!(output["s3"]["region"], "fra1");
        assert_eq!(output["s3"]["endpoint"], "https://fra1.digitaloceanspaces.com");
        assert_eq!(output["s3"]["forcePathStyle"], true);
    }
}
