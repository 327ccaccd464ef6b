// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hive-storage: the shared transactional state store for the Hive
//! orchestrator (spec.md §4.1, §5). A cross-process advisory lock plus a
//! zstd-compressed JSON snapshot, rewritten atomically on every committed
//! transaction.

pub mod error;
pub mod lock;
pub mod snapshot;
pub mod state;
pub mod store;

pub use error::{Result, StoreError};
pub use lock::StoreLock;
pub use snapshot::{Snapshot, CURRENT_SNAPSHOT_VERSION};
pub use state::MaterializedState;
pub use store::Store;
