// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::time::Duration;

pub const TOKEN_V1_PREFIX: &str = "k8s-aws-v1.";
pub const EXEC_CREDENTIAL_API_VERSION: &str = "client.authentication.k8s.io/v1beta1";
pub const EXEC_CREDENTIAL_KIND: &str = "ExecCredential";

/// Header naming the EKS cluster in the presigned GetCallerIdentity call
pub const HEADER_EKS_CLUSTER_ID: &str = "x-k8s-aws-id";
pub const HEADER_EXPIRES: &str = "X-Amz-Expires";
/// The presigned STS URL is valid for 15 minutes after X-Amz-Date no matter
/// what this says. EKS 0.3.0 and earlier check for a value in 0..=60.
pub const REQUEST_PRESIGN_PARAM: u64 = 60;
pub const PRESIGNED_URL_EXPIRATION: Duration = Duration::from_secs(15 * 60);
pub const TOKEN_EXPIRATION_BUFFER: Duration = Duration::from_secs(60);
pub const CACHE_MIN_VALIDITY_PERIOD: Duration = Duration::from_secs(5 * 60);

pub const STS_SERVICE_NAME: &str = "sts";
pub const STS_API_VERSION: &str = "2011-06-15";
pub const DEFAULT_STS_REGION: &str = "us-east-1";
pub const DEFAULT_AUDIENCE: &str = "gcp";
pub const DEFAULT_METADATA_TIMEOUT_SECS: u64 = 2;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;
pub const MAX_LOG_VERBOSITY: u8 = 5;

pub const METADATA_ROOT: &str = "http://metadata.google.internal";
pub const GCE_METADATA_HOST_ENV_VAR: &str = "GCE_METADATA_HOST";
pub const ADC_ENV_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const ADC_WELL_KNOWN_FILE: &str = "gcloud/application_default_credentials.json";
pub const ADC_AUTHORIZED_USER_TYPE: &str = "authorized_user";
pub const METADATA_FLAVOR: &str = "metadata-flavor";
pub const METADATA_FLAVOR_VALUE: &str = "Google";
pub const METADATA_PROJECT_ID_PATH: &str = "/computeMetadata/v1/project/project-id";
pub const METADATA_HOSTNAME_PATH: &str = "/computeMetadata/v1/instance/hostname";
pub const METADATA_IDENTITY_PATH: &str =
    "/computeMetadata/v1/instance/service-accounts/default/identity";

/// STS caps RoleSessionName at 64, the session tag we derive is kept at 32
pub const MAX_SESSION_IDENTIFIER_LENGTH: usize = 32;
pub const RANDOM_SUFFIX_LENGTH: usize = 8;
pub const RANDOM_SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub const CACHE_DIR_NAME: &str = "gke-eks-auth";
