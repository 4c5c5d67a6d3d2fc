// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! AWS side of the exchange.
//!
//! [`Authenticator::get_credentials`] trades the GCP identity token for
//! temporary credentials with `AssumeRoleWithWebIdentity`.
//! [`Authenticator::get_signed_identity_url`] then presigns a
//! `GetCallerIdentity` request with those credentials. The EKS cluster header
//! is injected by [`HeaderInjectingPresigner`] right before the signature is
//! computed, so it is part of the signed headers.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_sts::error::DisplayErrorContext;
use aws_sigv4::http_request::{
    SignableBody, SignableRequest, SignatureLocation, SigningParams, SigningSettings, sign,
};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use http::{HeaderName, HeaderValue, Method, Request};
use zeroize::ZeroizeOnDrop;

use crate::constants::{
    DEFAULT_HTTP_TIMEOUT_SECS, HEADER_EKS_CLUSTER_ID, HEADER_EXPIRES, STS_API_VERSION,
    STS_SERVICE_NAME,
};
use crate::errors::AppError;
use crate::models::{FederatedCredentials, SignedIdentityUrl};

/// Supplies the web identity token presented to STS.
#[async_trait]
pub trait IdentityTokenSource: Send + Sync {
    async fn identity_token(&self) -> Result<Vec<u8>, AppError>;
}

/// A token fetched ahead of time.
#[derive(Clone, ZeroizeOnDrop)]
pub struct StaticIdentityToken(Vec<u8>);

impl StaticIdentityToken {
    pub fn new(token: impl Into<Vec<u8>>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl IdentityTokenSource for StaticIdentityToken {
    async fn identity_token(&self) -> Result<Vec<u8>, AppError> {
        Ok(self.0.clone())
    }
}

/// Adds a fixed set of headers to a request immediately before SigV4
/// presigning it. Injection happens only inside [`presign`](Self::presign).
#[derive(Debug, Clone)]
pub struct HeaderInjectingPresigner {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderInjectingPresigner {
    pub fn new<'a>(headers: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self, AppError> {
        let headers = headers
            .into_iter()
            .map(|(name, value)| {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|err| AppError::SigningError(format!("invalid header name {name}: {err}")))?;
                let value = HeaderValue::from_str(value).map_err(|err| {
                    AppError::SigningError(format!("invalid value for header {name}: {err}"))
                })?;
                Ok((name, value))
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(Self { headers })
    }

    /// Presigns `request` with query-string SigV4 and returns the signed URL.
    ///
    /// `X-Amz-Expires` is a query parameter on presigned requests, so an
    /// injected value is handed to the signer as the presign expiry rather
    /// than signed as a header.
    pub fn presign(
        &self,
        mut request: Request<()>,
        credentials: &Credentials,
        region: &str,
        signing_time: SystemTime,
    ) -> Result<String, AppError> {
        for (name, value) in &self.headers {
            request.headers_mut().insert(name.clone(), value.clone());
        }

        let expires_in = match request.headers_mut().remove(HEADER_EXPIRES) {
            Some(value) => {
                let seconds = value
                    .to_str()
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .ok_or_else(|| {
                        AppError::SigningError(format!("invalid {HEADER_EXPIRES} value {value:?}"))
                    })?;
                Some(Duration::from_secs(seconds))
            }
            None => None,
        };

        let mut settings = SigningSettings::default();
        settings.signature_location = SignatureLocation::QueryParams;
        settings.expires_in = expires_in;

        let identity: Identity = credentials.clone().into();
        let signing_params: SigningParams<'_> = v4::SigningParams::builder()
            .identity(&identity)
            .region(region)
            .name(STS_SERVICE_NAME)
            .time(signing_time)
            .settings(settings)
            .build()
            .map_err(|err| AppError::SigningError(format!("invalid signing parameters: {err}")))?
            .into();

        let uri = request.uri().to_string();
        let signable_request = SignableRequest::new(
            request.method().as_str(),
            uri,
            request
                .headers()
                .iter()
                .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v))),
            SignableBody::Bytes(&[]),
        )
        .map_err(|err| AppError::SigningError(format!("failed to build signable request: {err}")))?;

        let (instructions, _signature) = sign(signable_request, &signing_params)
            .map_err(|err| AppError::SigningError(format!("failed to presign request: {err}")))?
            .into_parts();
        instructions.apply_to_request_http1x(&mut request);

        Ok(request.uri().to_string())
    }
}

pub struct Authenticator {
    role_arn: String,
    session_name: String,
    sts_region: String,
    token_source: Arc<dyn IdentityTokenSource>,
    endpoint_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("role_arn", &self.role_arn)
            .field("session_name", &self.session_name)
            .field("sts_region", &self.sts_region)
            .field("endpoint_url", &self.endpoint_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Authenticator {
    /// Validates the federation parameters without any network access.
    ///
    /// Without `endpoint_url` the public regional endpoint
    /// `https://sts.<region>.amazonaws.com` is used.
    pub fn new(
        role_arn: &str,
        session_name: &str,
        sts_region: &str,
        token_source: Option<Arc<dyn IdentityTokenSource>>,
        endpoint_url: Option<&str>,
    ) -> Result<Self, AppError> {
        if role_arn.is_empty() {
            return Err(AppError::ConfigError("AWS role ARN is required".into()));
        }
        if session_name.is_empty() {
            return Err(AppError::ConfigError("session ID is required".into()));
        }
        if sts_region.is_empty() {
            return Err(AppError::ConfigError("AWS STS region is required".into()));
        }
        let token_source =
            token_source.ok_or_else(|| AppError::ConfigError("token retriever is required".into()))?;

        let endpoint_url = match endpoint_url {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => format!("https://sts.{sts_region}.amazonaws.com"),
        };

        Ok(Self {
            role_arn: role_arn.to_string(),
            session_name: session_name.to_string(),
            sts_region: sts_region.to_string(),
            token_source,
            endpoint_url,
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        })
    }

    /// Per-operation timeout for STS calls.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn role_arn(&self) -> &str {
        &self.role_arn
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn sts_region(&self) -> &str {
        &self.sts_region
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    async fn sts_client(&self) -> aws_sdk_sts::Client {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.sts_region.clone()))
            .endpoint_url(self.endpoint_url.clone())
            .no_credentials()
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(self.timeout)
                    .build(),
            )
            .load()
            .await;

        aws_sdk_sts::Client::new(&config)
    }

    /// Exchanges the identity token for temporary credentials of the role.
    #[tracing::instrument(skip(self), fields(role_arn = %self.role_arn, session = %self.session_name))]
    pub async fn get_credentials(&self) -> Result<FederatedCredentials, AppError> {
        let token = self.token_source.identity_token().await?;
        let token = String::from_utf8(token).map_err(|_| {
            AppError::FederationError("identity token is not valid UTF-8".into())
        })?;

        let response = self
            .sts_client()
            .await
            .assume_role_with_web_identity()
            .role_arn(&self.role_arn)
            .role_session_name(&self.session_name)
            .web_identity_token(token)
            .send()
            .await
            .map_err(|err| {
                AppError::FederationError(format!(
                    "failed to assume role {}: {}",
                    self.role_arn,
                    DisplayErrorContext(&err)
                ))
            })?;

        let credentials = response.credentials().ok_or_else(|| {
            AppError::FederationError("no credentials in AssumeRoleWithWebIdentity response".into())
        })?;

        if credentials.access_key_id().is_empty()
            || credentials.secret_access_key().is_empty()
            || credentials.session_token().is_empty()
        {
            return Err(AppError::FederationError(
                "incomplete credentials in AssumeRoleWithWebIdentity response".into(),
            ));
        }

        let expires_at = SystemTime::try_from(*credentials.expiration()).ok();
        tracing::info!("[auth] obtained temporary credentials, expires_at: {:?}", expires_at);

        Ok(FederatedCredentials {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().to_string(),
            expires_at,
        })
    }

    /// Presigns `GetCallerIdentity` for `cluster_name`, signed now.
    pub fn get_signed_identity_url(
        &self,
        cluster_name: &str,
        credentials: &FederatedCredentials,
        header_expiry: Duration,
    ) -> Result<SignedIdentityUrl, AppError> {
        self.get_signed_identity_url_at(cluster_name, credentials, header_expiry, SystemTime::now())
    }

    #[tracing::instrument(skip(self, credentials))]
    pub fn get_signed_identity_url_at(
        &self,
        cluster_name: &str,
        credentials: &FederatedCredentials,
        header_expiry: Duration,
        signed_at: SystemTime,
    ) -> Result<SignedIdentityUrl, AppError> {
        let expiry_seconds = header_expiry.as_secs().to_string();
        let presigner = HeaderInjectingPresigner::new([
            (HEADER_EKS_CLUSTER_ID, cluster_name),
            (HEADER_EXPIRES, expiry_seconds.as_str()),
        ])?;

        let request = Request::builder()
            .method(Method::GET)
            .uri(format!(
                "{}/?Action=GetCallerIdentity&Version={}",
                self.endpoint_url, STS_API_VERSION
            ))
            .body(())
            .map_err(|err| AppError::SigningError(format!("invalid STS endpoint: {err}")))?;

        let url = presigner.presign(request, &credentials.into(), &self.sts_region, signed_at)?;

        tracing::debug!("[auth] presigned GetCallerIdentity for cluster {}", cluster_name);
        Ok(SignedIdentityUrl { url, signed_at })
    }
}
