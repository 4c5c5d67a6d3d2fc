// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! On-disk cache of issued ExecCredentials.
//!
//! One JSON file per (role ARN, cluster, region) scope. Entries are never
//! deleted: an entry with less than [`CACHE_MIN_VALIDITY_PERIOD`] left is a
//! miss and gets overwritten by the next successful exchange. Concurrent
//! invocations race on the same file without locking; a torn write shows up
//! as a parse failure on the next read, which is also just a miss.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::constants::{CACHE_DIR_NAME, CACHE_MIN_VALIDITY_PERIOD};
use crate::errors::AppError;
use crate::models::{CacheEntry, CacheKey};

pub struct CredentialCache {
    dir: PathBuf,
}

impl CredentialCache {
    /// Uses the first candidate directory that can be created with owner-only
    /// permissions: `~/.kube/cache`, the platform user cache dir, then the
    /// temporary directory.
    pub fn new() -> Result<Self, AppError> {
        Self::from_candidates(default_candidates())
    }

    pub fn from_candidates(candidates: Vec<PathBuf>) -> Result<Self, AppError> {
        for dir in candidates {
            match create_private_dir(&dir) {
                Ok(()) => {
                    tracing::debug!("[cache] using cache directory {}", dir.display());
                    return Ok(Self { dir });
                }
                Err(err) => {
                    tracing::warn!(
                        "[cache] failed to create cache directory {}: {}",
                        dir.display(),
                        err
                    );
                }
            }
        }

        Err(AppError::CacheError(
            "failed to create cache directory in any known location".into(),
        ))
    }

    /// Uses `dir` as is, creating it if needed.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        Self::from_candidates(vec![dir.into()])
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the cached ExecCredential for `key` if it stays valid for at
    /// least [`CACHE_MIN_VALIDITY_PERIOD`]. Any failure reads as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<u8>> {
        self.get_at(key, Utc::now())
    }

    fn get_at(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<Vec<u8>> {
        let path = self.path_for(key);

        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(_) => {
                tracing::debug!("[cache] no cache file found at {}", path.display());
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_slice(&data) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!("[cache] failed to parse cache entry: {}", err);
                return None;
            }
        };

        if !is_valid(&entry, now) {
            tracing::debug!("[cache] cached credential is expired or will expire soon");
            return None;
        }

        tracing::debug!(
            "[cache] using cached credential for {} (expires at {})",
            key,
            entry.expiration_rfc3339()
        );
        Some(entry.exec_credential)
    }

    /// Overwrites the entry for `key`. The file is readable by the owner only.
    pub fn put(
        &self,
        key: &CacheKey,
        exec_credential: &[u8],
        expiration_time: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let entry = CacheEntry {
            exec_credential: exec_credential.to_vec(),
            expiration_time,
        };
        let data = serde_json::to_vec(&entry)?;

        let path = self.path_for(key);
        let mut file = open_private_file(&path)
            .map_err(|err| AppError::CacheError(format!("failed to open {}: {err}", path.display())))?;
        file.write_all(&data)
            .map_err(|err| AppError::CacheError(format!("failed to write {}: {err}", path.display())))?;

        tracing::debug!(
            "[cache] stored credential for {} (expires at {})",
            key,
            entry.expiration_rfc3339()
        );
        Ok(())
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        let filename = format!(
            "{}_{}_{}.json",
            sanitize(&key.role_arn),
            sanitize(&key.cluster_name),
            sanitize(&key.sts_region)
        );
        self.dir.join(filename)
    }
}

fn is_valid(entry: &CacheEntry, now: DateTime<Utc>) -> bool {
    match chrono::Duration::from_std(CACHE_MIN_VALIDITY_PERIOD) {
        Ok(min_validity) => entry.remaining(now) >= min_validity,
        Err(_) => false,
    }
}

/// Replaces path separators and `:` so a role ARN cannot escape the cache dir.
pub fn sanitize(component: &str) -> String {
    component.replace(['/', '\\', ':'], "_")
}

fn default_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(3);
    match dirs::home_dir() {
        Some(home) => candidates.push(home.join(".kube").join("cache").join(CACHE_DIR_NAME)),
        None => tracing::warn!("[cache] failed to get user home directory"),
    }
    match dirs::cache_dir() {
        Some(cache) => candidates.push(cache.join(CACHE_DIR_NAME)),
        None => tracing::warn!("[cache] failed to get user cache directory"),
    }
    candidates.push(std::env::temp_dir().join(CACHE_DIR_NAME));
    candidates
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::DirBuilder::new().recursive(true).create(dir)
}

#[cfg(unix)]
fn open_private_file(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private_file(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
