// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Closed error taxonomy shared by every crate in the workspace.
//!
//! `ErrorKind` is the taxonomy; `HiveError` carries a kind, a message, and an
//! optional source. Crate-local error types (`StoreError`, `AdapterError`)
//! wrap a `HiveError` and add their own variants, mapping back onto
//! `ErrorKind` at their public boundary so callers can match uniformly.

use std::fmt;

/// Closed set of error kinds. Never add a variant without updating every
/// `match` that is exhaustive over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidState,
    Unauthorized,
    ExternalFailure,
    Timeout,
    Internal,
}

crate::simple_display! {
    ErrorKind {
        NotFound => "not_found",
        Conflict => "conflict",
        InvalidState => "invalid_state",
        Unauthorized => "unauthorized",
        ExternalFailure => "external_failure",
        Timeout => "timeout",
        Internal => "internal",
    }
}

impl ErrorKind {
    /// `ExternalFailure` and `Timeout` are never pipeline-fatal: the next
    /// reconciliation tick retries rather than aborting.
    pub fn is_pipeline_fatal(self) -> bool {
        !matches!(self, ErrorKind::ExternalFailure | ErrorKind::Timeout)
    }
}

/// The one error type every fallible core/storage/adapter operation returns.
#[derive(Debug)]
pub struct HiveError {
    pub kind: ErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HiveError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), source: None }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn external_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalFailure, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for HiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for HiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type Result<T> = std::result::Result<T, HiveError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
