// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine-layer error type. Thin wrapper over [`HiveError`]; the Scheduler
//! and spawn protocol never invent their own error kinds.

use hive_core::HiveError;
use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct EngineError(#[from] HiveError);

impl From<hive_storage::StoreError> for EngineError {
    fn from(err: hive_storage::StoreError) -> Self {
        Self(err.into())
    }
}

impl From<hive_adapters::AdapterError> for EngineError {
    fn from(err: hive_adapters::AdapterError) -> Self {
        Self(err.into())
    }
}

impl From<EngineError> for HiveError {
    fn from(err: EngineError) -> Self {
        err.0
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
