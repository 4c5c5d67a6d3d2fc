// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::fmt;
use std::time::SystemTime;

use aws_credential_types::Credentials;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

use crate::constants::{EXEC_CREDENTIAL_API_VERSION, EXEC_CREDENTIAL_KIND};

/// Temporary AWS credentials obtained through web identity federation.
#[derive(Clone, ZeroizeOnDrop)]
pub struct FederatedCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    #[zeroize(skip)]
    pub expires_at: Option<SystemTime>,
}

// Custom Debug implementation to prevent accidental logging of sensitive data
impl fmt::Debug for FederatedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FederatedCredentials")
            .field("access_key_id", &"[REDACTED]")
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl From<&FederatedCredentials> for Credentials {
    fn from(credentials: &FederatedCredentials) -> Self {
        Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            Some(credentials.session_token.clone()),
            credentials.expires_at,
            "web-identity-federation",
        )
    }
}

/// A presigned GetCallerIdentity URL and the instant it was signed at.
///
/// STS accepts the URL for a fixed window after `signed_at`, regardless of
/// the presign expiry parameter carried in the query string.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedIdentityUrl {
    pub url: String,
    pub signed_at: SystemTime,
}

/// `client.authentication.k8s.io/v1beta1` ExecCredential, as written to stdout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecCredential {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub status: ExecCredentialStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecCredentialStatus {
    pub token: String,
    #[serde(rename = "expirationTimestamp", with = "rfc3339_seconds")]
    pub expiration_timestamp: DateTime<Utc>,
}

impl ExecCredential {
    pub fn new(token: String, expiration_timestamp: DateTime<Utc>) -> Self {
        Self {
            api_version: EXEC_CREDENTIAL_API_VERSION.to_string(),
            kind: EXEC_CREDENTIAL_KIND.to_string(),
            status: ExecCredentialStatus {
                token,
                expiration_timestamp,
            },
        }
    }
}

/// Kubernetes serializes `metav1.Time` at second precision in UTC.
mod rfc3339_seconds {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}

/// Identifies one federation scope in the credential cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    #[serde(rename = "aws_role_arn")]
    pub role_arn: String,
    #[serde(rename = "eks_cluster_name")]
    pub cluster_name: String,
    #[serde(rename = "sts_region")]
    pub sts_region: String,
}

impl CacheKey {
    pub fn new(
        role_arn: impl Into<String>,
        cluster_name: impl Into<String>,
        sts_region: impl Into<String>,
    ) -> Self {
        Self {
            role_arn: role_arn.into(),
            cluster_name: cluster_name.into(),
            sts_region: sts_region.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.role_arn, self.cluster_name, self.sts_region)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(with = "base64_bytes")]
    pub exec_credential: Vec<u8>,
    pub expiration_time: DateTime<Utc>,
}

impl CacheEntry {
    pub fn remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.expiration_time - now
    }

    pub fn expiration_rfc3339(&self) -> String {
        self.expiration_time.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Byte payloads are stored as padded standard base64 strings.
mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        STANDARD.decode(raw.as_bytes()).map_err(D::Error::custom)
    }
}
