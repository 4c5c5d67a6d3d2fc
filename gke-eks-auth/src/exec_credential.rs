// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Encoding of presigned STS URLs into Kubernetes ExecCredentials.
//!
//! The bearer token understood by the EKS authenticator is the fixed
//! [`TOKEN_V1_PREFIX`] followed by the unpadded URL-safe base64 encoding of
//! the presigned URL. Everything in this module is a pure function of its
//! inputs.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};

use crate::constants::{TOKEN_EXPIRATION_BUFFER, TOKEN_V1_PREFIX};
use crate::errors::AppError;
use crate::models::ExecCredential;

/// Builds the ExecCredential for `signed_url`.
///
/// The advertised expiration is `expiration` minus [`TOKEN_EXPIRATION_BUFFER`]
/// so clients refresh before STS starts rejecting the URL.
pub fn generate(signed_url: &str, expiration: DateTime<Utc>) -> ExecCredential {
    ExecCredential::new(encode_token(signed_url), expiration - buffer())
}

pub fn encode_token(signed_url: &str) -> String {
    format!("{}{}", TOKEN_V1_PREFIX, URL_SAFE_NO_PAD.encode(signed_url.as_bytes()))
}

/// Recovers the presigned URL from a `k8s-aws-v1.` token.
pub fn decode_token(token: &str) -> Result<String, AppError> {
    let encoded = token.strip_prefix(TOKEN_V1_PREFIX).ok_or_else(|| {
        AppError::SerializationError(format!("token does not start with {TOKEN_V1_PREFIX}"))
    })?;
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|err| AppError::SerializationError(format!("invalid token encoding: {err}")))?;
    String::from_utf8(bytes)
        .map_err(|err| AppError::SerializationError(format!("token is not UTF-8: {err}")))
}

fn buffer() -> chrono::Duration {
    chrono::Duration::from_std(TOKEN_EXPIRATION_BUFFER).unwrap_or_else(|_| chrono::Duration::zero())
}
