// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage-layer error type. Wraps [`HiveError`] plus the I/O/serialization
//! failure modes specific to the on-disk snapshot and lock files.

use hive_core::{ErrorKind, HiveError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to acquire store lock at {path}: {reason}")]
    LockFailed { path: std::path::PathBuf, reason: String },

    #[error("snapshot at unsupported version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("{0}")]
    Hive(#[from] HiveError),
}

impl From<StoreError> for HiveError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Hive(inner) => inner,
            StoreError::LockFailed { .. } => HiveError::new(ErrorKind::Timeout, err.to_string()),
            StoreError::UnsupportedVersion { .. } => {
                HiveError::new(ErrorKind::InvalidState, err.to_string())
            }
            StoreError::Io(_) | StoreError::Json(_) => {
                HiveError::new(ErrorKind::Internal, err.to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
