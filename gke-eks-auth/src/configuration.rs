// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::constants::{
    DEFAULT_AUDIENCE, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_METADATA_TIMEOUT_SECS,
    DEFAULT_STS_REGION, MAX_LOG_VERBOSITY,
};
use crate::errors::AppError;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct AuthOptions {
    /// AWS role ARN to assume
    #[arg(long = "rolearn", default_value = "", env("GKE_EKS_AUTH_ROLE_ARN"))]
    pub role_arn: String,
    /// EKS cluster name for which credentials are created
    #[arg(long = "cluster", default_value = "", env("GKE_EKS_AUTH_CLUSTER"))]
    pub cluster_name: String,
    /// AWS STS region to which requests are made
    #[arg(long = "stsregion", default_value = DEFAULT_STS_REGION, env("GKE_EKS_AUTH_STS_REGION"))]
    pub sts_region: String,
    /// Custom STS endpoint, e.g. a local emulator
    #[arg(long, env("GKE_EKS_AUTH_ENDPOINT_URL"))]
    pub endpoint_url: Option<String>,
    /// Audience of the GCP identity token
    #[arg(long, default_value = DEFAULT_AUDIENCE, env("GKE_EKS_AUTH_AUDIENCE"))]
    pub audience: String,
    #[arg(long, default_value = "false", env("GKE_EKS_AUTH_CACHE"), action = ArgAction::SetTrue)]
    pub cache: bool,
    /// Fall back to local substitutes when not running on GCP
    #[arg(long, default_value = "false", env("GKE_EKS_AUTH_HYBRID"), action = ArgAction::SetTrue)]
    pub hybrid: bool,
    #[arg(long, default_value_t = DEFAULT_METADATA_TIMEOUT_SECS, env("GKE_EKS_AUTH_METADATA_TIMEOUT"))]
    pub metadata_timeout: u64,
    #[arg(long, default_value_t = DEFAULT_HTTP_TIMEOUT_SECS, env("GKE_EKS_AUTH_HTTP_TIMEOUT"))]
    pub http_timeout: u64,
    #[arg(short = 'v', long, default_value_t = 0, env("GKE_EKS_AUTH_VERBOSITY"))]
    pub verbosity: u8,
    #[arg(long, env("GKE_EKS_AUTH_LOG_FILE"))]
    pub log_file: Option<PathBuf>,
}

impl Default for AuthOptions {
    fn default() -> Self {
        AuthOptions {
            role_arn: String::new(),
            cluster_name: String::new(),
            sts_region: DEFAULT_STS_REGION.to_string(),
            endpoint_url: None,
            audience: DEFAULT_AUDIENCE.to_string(),
            cache: false,
            hybrid: false,
            metadata_timeout: DEFAULT_METADATA_TIMEOUT_SECS,
            http_timeout: DEFAULT_HTTP_TIMEOUT_SECS,
            verbosity: 0,
            log_file: None,
        }
    }
}

impl AuthOptions {
    /// Checks the options before any network or filesystem access happens.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.role_arn.is_empty() {
            return Err(AppError::ConfigError("AWS role ARN is required".into()));
        }
        if self.cluster_name.is_empty() {
            return Err(AppError::ConfigError("EKS cluster name is required".into()));
        }
        if self.sts_region.is_empty() {
            return Err(AppError::ConfigError("AWS STS region is required".into()));
        }
        if self.verbosity > MAX_LOG_VERBOSITY {
            return Err(AppError::ConfigError(format!(
                "log verbosity must be between 0 and {MAX_LOG_VERBOSITY}, got {}",
                self.verbosity
            )));
        }
        if self.metadata_timeout == 0 || self.http_timeout == 0 {
            return Err(AppError::ConfigError("timeouts must be greater than zero".into()));
        }
        Ok(())
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }

    /// Filter directive used when RUST_LOG is not set.
    pub fn log_directive(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
