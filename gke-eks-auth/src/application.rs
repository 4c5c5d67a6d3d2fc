// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::authenticator::{Authenticator, StaticIdentityToken};
use crate::cache::CredentialCache;
use crate::configuration::AuthOptions;
use crate::constants::{PRESIGNED_URL_EXPIRATION, REQUEST_PRESIGN_PARAM};
use crate::errors::AppError;
use crate::exec_credential;
use crate::metadata::{GcpMetadata, HybridMetadata, MetadataProvider};
use crate::models::CacheKey;

/// One credential exchange: cache lookup, then identity, federation,
/// signing and formatting on a miss.
pub struct Application {
    options: AuthOptions,
    metadata: Arc<dyn MetadataProvider>,
    cache: Option<CredentialCache>,
}

impl Application {
    pub async fn build(options: AuthOptions) -> Result<Self, AppError> {
        options.validate()?;

        let gcp = GcpMetadata::new(options.metadata_timeout())?;
        let metadata: Arc<dyn MetadataProvider> = if options.hybrid {
            Arc::new(HybridMetadata::detect(gcp).await)
        } else {
            Arc::new(gcp)
        };

        let cache = if options.cache {
            match CredentialCache::new() {
                Ok(cache) => Some(cache),
                Err(err) => {
                    tracing::warn!("[app] proceeding without cache: {}", err);
                    None
                }
            }
        } else {
            None
        };

        Self::with_parts(options, metadata, cache)
    }

    /// Assembles an application from already constructed collaborators.
    /// `cache` is ignored unless caching is enabled in `options`.
    pub fn with_parts(
        options: AuthOptions,
        metadata: Arc<dyn MetadataProvider>,
        cache: Option<CredentialCache>,
    ) -> Result<Self, AppError> {
        options.validate()?;
        let cache = cache.filter(|_| options.cache);
        Ok(Self {
            options,
            metadata,
            cache,
        })
    }

    fn cache_key(&self) -> CacheKey {
        CacheKey::new(
            &self.options.role_arn,
            &self.options.cluster_name,
            &self.options.sts_region,
        )
    }

    /// Returns the serialized ExecCredential, from cache when a usable
    /// entry exists.
    #[tracing::instrument(skip(self), fields(cluster = %self.options.cluster_name))]
    pub async fn run(&self) -> Result<Vec<u8>, AppError> {
        let key = self.cache_key();

        if let Some(cache) = &self.cache {
            if let Some(data) = cache.get(&key) {
                tracing::info!("[app] using cached credential for {}", key);
                return Ok(data);
            }
        }

        let session_id = self.metadata.session_identifier().await?;
        let token = self.metadata.identity_token(&self.options.audience).await?;
        tracing::debug!("[app] fetched identity token for session {}", session_id);

        let authenticator = Authenticator::new(
            &self.options.role_arn,
            &session_id,
            &self.options.sts_region,
            Some(Arc::new(StaticIdentityToken::new(token))),
            self.options.endpoint_url.as_deref(),
        )?
        .with_timeout(self.options.http_timeout());

        let credentials = authenticator.get_credentials().await?;
        let signed = authenticator.get_signed_identity_url(
            &self.options.cluster_name,
            &credentials,
            Duration::from_secs(REQUEST_PRESIGN_PARAM),
        )?;

        let validity = chrono::Duration::from_std(PRESIGNED_URL_EXPIRATION)
            .map_err(|err| AppError::SigningError(format!("invalid validity window: {err}")))?;
        let expiration = DateTime::<Utc>::from(signed.signed_at) + validity;

        let credential = exec_credential::generate(&signed.url, expiration);
        let expires_at = credential.status.expiration_timestamp;
        if expires_at <= Utc::now() {
            return Err(AppError::SigningError(format!(
                "generated credential already expired at {expires_at}"
            )));
        }

        let output = serde_json::to_vec(&credential)?;

        if let Some(cache) = &self.cache {
            if let Err(err) = cache.put(&key, &output, expires_at) {
                tracing::warn!("[app] failed to cache credential: {}", err);
            }
        }

        tracing::info!("[app] issued credential expiring at {}", expires_at);
        Ok(output)
    }
}
