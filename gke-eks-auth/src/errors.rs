// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum AppError {
    #[error("{0}")]
    ConfigError(String),
    #[error("metadata error: {0}")]
    MetadataError(String),
    #[error("federation error: {0}")]
    FederationError(String),
    #[error("signing error: {0}")]
    SigningError(String),
    #[error("cache error: {0}")]
    CacheError(String),
    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for AppError {
    fn from(source: serde_json::Error) -> Self {
        tracing::debug!("{:?}", source);
        AppError::SerializationError(source.to_string())
    }
}
