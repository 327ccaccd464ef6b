// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code (spec.md §6: "exit 0
//! on success, 1 on user/config error, 2 on internal failure"). Commands
//! return `ExitError` instead of calling `std::process::exit()` directly,
//! letting `main()` own process termination.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// A user or configuration error (spec.md §6 exit code 1).
    pub fn user(message: impl Into<String>) -> Self {
        Self::new(1, message)
    }

    /// An internal failure (spec.md §6 exit code 2).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<hive_core::HiveError> for ExitError {
    fn from(err: hive_core::HiveError) -> Self {
        use hive_core::ErrorKind;
        let code = match err.kind {
            ErrorKind::NotFound | ErrorKind::Conflict | ErrorKind::InvalidState | ErrorKind::Unauthorized => 1,
            ErrorKind::ExternalFailure | ErrorKind::Timeout | ErrorKind::Internal => 2,
        };
        Self::new(code, err.to_string())
    }
}

impl From<hive_storage::StoreError> for ExitError {
    fn from(err: hive_storage::StoreError) -> Self {
        hive_core::HiveError::from(err).into()
    }
}

impl From<hive_engine::EngineError> for ExitError {
    fn from(err: hive_engine::EngineError) -> Self {
        hive_core::HiveError::from(err).into()
    }
}

impl From<hive_daemon::DaemonError> for ExitError {
    fn from(err: hive_daemon::DaemonError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<hive_adapters::AdapterError> for ExitError {
    fn from(err: hive_adapters::AdapterError) -> Self {
        hive_core::HiveError::from(err).into()
    }
}
