// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter-layer error type. Wraps [`HiveError`] plus the subprocess/HTTP
//! failure modes specific to the session, detector, and connector adapters.

use hive_core::{ErrorKind, HiveError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("session {0} not found")]
    SessionNotFound(String),

    #[error("session {0} already exists")]
    SessionAlreadyExists(String),

    #[error("subprocess failed: {0}")]
    SubprocessFailed(String),

    #[error("connector call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("connector call failed: {0}")]
    ConnectorFailed(String),

    #[error("no provider configured")]
    NoProviderConfigured,

    #[error("{0}")]
    Hive(#[from] HiveError),
}

/// Maps onto the shared [`ErrorKind`] taxonomy at the adapter boundary so
/// callers in `hive-engine`/`hive-daemon` can match uniformly (spec.md §7).
/// Connector failures map to `ExternalFailure`/`Timeout`, which are never
/// pipeline-fatal; everything else is a programming error or a missing
/// local resource.
impl From<AdapterError> for HiveError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::Hive(inner) => inner,
            AdapterError::SessionNotFound(_) => HiveError::new(ErrorKind::NotFound, err.to_string()),
            AdapterError::SessionAlreadyExists(_) => {
                HiveError::new(ErrorKind::Conflict, err.to_string())
            }
            AdapterError::Timeout(_) => HiveError::new(ErrorKind::Timeout, err.to_string()),
            AdapterError::ConnectorFailed(_) | AdapterError::NoProviderConfigured => {
                HiveError::new(ErrorKind::ExternalFailure, err.to_string())
            }
            AdapterError::SubprocessFailed(_) => HiveError::new(ErrorKind::Internal, err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
