//! Session recording lifecycle for the Parlor platform.
//!
//! Starts, tracks, and tears down LiveKit room-composite egress jobs that
//! upload to S3-compatible object storage (DigitalOcean Spaces). The manager
//! owns at most one recording at a time and keeps the voice session healthy
//! when the recording side misbehaves: remote faults are logged and absorbed,
//! never surfaced to the session orchestrator.
//!
//! The interesting states are the partial-failure ones — a job that already
//! failed before we asked it to stop, an upload that never reached the
//! bucket, credentials that were never configured — and each of them leaves
//! the manager idle and ready for the next session.

pub mod config;
pub mod egress;
pub mod error;
pub mod manager;
pub mod storage;

pub use config::{LiveKitCredentials, RecordingConfig, SpacesConfig};
pub use egress::{EgressClient, EgressInfo, StartRoomCompositeRequest};
pub use error::{EgressApiError, ReconcileUnavailable, RecordingError};
pub use manager::{
    output_key, reconcile, ReconciliationInfo, RecordingManager, RecordingState,
};
pub use storage::StoragePolicySetter;
