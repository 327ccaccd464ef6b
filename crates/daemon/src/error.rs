// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-layer error type. Startup/lock/socket failure modes plus a
//! transparent wrapper over every other crate's error, since the
//! reconciliation loop calls through storage, engine, and adapters alike.

use hive_core::HiveError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to acquire daemon lock at {0}: another daemon is already running")]
    AlreadyRunning(PathBuf),

    #[error("failed to bind control socket at {path}: {source}")]
    BindFailed { path: PathBuf, source: std::io::Error },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Hive(#[from] HiveError),
}

impl From<hive_storage::StoreError> for DaemonError {
    fn from(err: hive_storage::StoreError) -> Self {
        Self::Hive(err.into())
    }
}

impl From<hive_adapters::AdapterError> for DaemonError {
    fn from(err: hive_adapters::AdapterError) -> Self {
        Self::Hive(err.into())
    }
}

impl From<hive_engine::EngineError> for DaemonError {
    fn from(err: hive_engine::EngineError) -> Self {
        Self::Hive(err.into())
    }
}

pub type Result<T> = std::result::Result<T, DaemonError>;
