//! Public-read bucket policy for the recording upload target.
//!
//! Finished recordings are meant to be directly linkable, so the target
//! bucket gets a fixed public-read policy before the first job starts. The
//! policy document is idempotent: applying it twice converges to the same
//! end state, and the manager is free to call this on every start.

use crate::error::RecordingError;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use serde_json::json;
use std::fmt;

/// Applies the public-read policy to the upload bucket.
///
/// The S3 client is constructed lazily on the first call and reused for the
/// lifetime of the setter, bound to the region's endpoint with path-style
/// signing.
pub struct StoragePolicySetter {
    access_key: String,
    secret_key: String,
    endpoint_override: Option<String>,
    client: Option<aws_sdk_s3::Client>,
}

impl StoragePolicySetter {
    /// Creates a setter targeting the standard Spaces endpoint for whatever
    /// region is passed to `ensure_public_access`.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            endpoint_override: None,
            client: None,
        }
    }

    /// Creates a setter bound to an explicit endpoint URL instead of the
    /// `https://{region}.digitaloceanspaces.com` default. Used for
    /// non-DigitalOcean S3-compatible deployments and tests.
    pub fn with_endpoint(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            endpoint_override: Some(endpoint.into()),
            client: None,
        }
    }

    /// Whether the underlying S3 client has been constructed yet.
    pub fn client_initialized(&self) -> bool {
        self.client.is_some()
    }

    /// Ensures `bucket` carries the public-read policy. Safe to repeat.
    pub async fn ensure_public_access(
        &mut self,
        bucket: &str,
        region: &str,
    ) -> Result<(), RecordingError> {
        let endpoint = match &self.endpoint_override {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{region}.digitaloceanspaces.com"),
        };

        let access_key = &self.access_key;
        let secret_key = &self.secret_key;
        let client = self.client.get_or_insert_with(|| {
            let credentials = Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "parlor-recording",
            );
            let config = aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .region(Region::new(region.to_string()))
                .endpoint_url(endpoint)
                .credentials_provider(credentials)
                .force_path_style(true)
                .build();
            aws_sdk_s3::Client::from_conf(config)
        });

        client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(public_read_policy(bucket))
            .send()
            .await
            .map_err(|e| RecordingError::Storage(DisplayErrorContext(e).to_string()))?;

        tracing::info!(bucket, "applied public-read bucket policy");
        Ok(())
    }
}

impl fmt::Debug for StoragePolicySetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoragePolicySetter")
            .field("access_key", &self.access_key)
            .field("secret_key", &"[REDACTED]")
            .field("endpoint_override", &self.endpoint_override)
            .field("client_initialized", &self.client.is_some())
            .finish()
    }
}

/// The fixed public-read policy document: allow `s3:GetObject` from any
/// principal on every object in `bucket`.
fn public_read_policy(bucket: &str) -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Sid": "PublicReadGetObject",
                "Effect": "Allow",
                "Principal": "*",
                "Action": "s3:GetObject",
                "Resource": format!("arn:aws:s3:::{bucket}/*"),
            }
        ]
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_document_shape() {
        let policy = public_read_policy("recordings");
        let value: serde_json::Value = serde_json::from_str(&policy).unwrap();

        assert_eq!(value["Version"], "2012-10-17");
        let statement = &value["Statement"][0];
        assert_eq!(statement["Sid"], "PublicReadGetObject");
        assert_eq!(statement["Effect"], "Allow");
        assert_eq!(statement["Principal"], "*");
        assert_eq!(statement["Action"], "s3:GetObject");
        assert_eq!(statement["Resource"], "arn:aws:s3:::recordings/*");
    }

    #[test]
    fn client_is_not_built_eagerly() {
        let setter = StoragePolicySetter::new("key", "secret");
        assert!(!setter.client_initialized());
    }
}
