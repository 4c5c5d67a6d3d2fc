// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! # GKE to EKS Auth
//!
//! Kubernetes client-go credential plugin that lets workloads on Google Cloud
//! authenticate to Amazon EKS clusters without long-lived AWS keys.
//!
//! ## Architecture
//!
//! ```text
//! GCP metadata -> identity token -> STS AssumeRoleWithWebIdentity
//!                                          |
//!                     presigned GetCallerIdentity URL <-+
//!                                          |
//!                        ExecCredential (stdout) <-> cache file
//! ```
//!
//! ## Modules
//!
//! - [`application`]: sequences one exchange, with optional caching
//! - [`authenticator`]: web identity federation and SigV4 presigning
//! - [`cache`]: per-scope on-disk ExecCredential cache
//! - [`configuration`]: CLI arguments with clap
//! - [`constants`]: protocol constants and defaults
//! - [`errors`]: application error types
//! - [`exec_credential`]: token encoding and ExecCredential assembly
//! - [`metadata`]: GCP metadata service and off-GCP substitutes
//! - [`models`]: credential, artifact and cache types
//!
//! ## Usage
//!
//! ```bash
//! gke-eks-auth --rolearn arn:aws:iam::123456789012:role/eks-access --cluster my-cluster --cache
//! ```
//!
//! ## Security Considerations
//!
//! - Temporary AWS credentials are zeroized on drop and never persisted
//! - Cache files are owner-readable only and named from sanitized keys
//! - Off-GCP identifiers are drawn from a CSPRNG

pub mod application;
pub mod authenticator;
pub mod cache;
pub mod configuration;
pub mod constants;
pub mod errors;
pub mod exec_credential;
pub mod metadata;
pub mod models;
