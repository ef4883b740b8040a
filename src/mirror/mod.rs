//! Persistence Mirror
//!
//! Ledgers keep their state in memory and mirror it into a local store so it
//! survives restarts. The mirror is never read again while the process is alive.

use std::fmt::Debug;

use async_trait::async_trait;
use jiff::Timestamp;
use thiserror::Error;

pub(crate) mod columns;
mod sync;

pub(crate) use sync::SyncHandle;
pub use sync::diff;

/// Mirror errors.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Storage failure.
    #[error("storage error: {0}")]
    Sql(#[from] sqlx::Error),

    /// Schema migration failure.
    #[error("failed to migrate mirror schema")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// The most recent resync failed.
    #[error("mirror is out of sync: {0}")]
    OutOfSync(String),

    /// The sync worker is gone.
    #[error("mirror sync worker has stopped")]
    WorkerStopped,
}

/// An entry a ledger stores in its mirror.
pub trait MirrorEntry: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// Ledger-local identifier of the entry.
    type Id: Copy + Ord + Debug + Send + Sync + 'static;

    /// Returns the entry's ledger-local identifier.
    fn mirror_id(&self) -> Self::Id;
}

/// A single change to apply to a mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum Change<E: MirrorEntry> {
    /// Insert the entry, or replace the stored entry with the same id.
    Upsert(E),

    /// Delete the entry with this id.
    Delete(E::Id),
}

/// Local store holding a derived copy of a ledger.
#[async_trait]
pub trait Mirror<E: MirrorEntry>: Send + Sync {
    /// Returns every stored entry, ordered by id.
    async fn list_all(&self) -> Result<Vec<E>, MirrorError>;

    /// Deletes every stored entry.
    async fn delete_all(&self) -> Result<(), MirrorError>;

    /// Stores a new entry.
    async fn insert(&self, entry: &E) -> Result<(), MirrorError>;

    /// Applies a batch of changes atomically.
    async fn apply(&self, changes: &[Change<E>]) -> Result<(), MirrorError>;
}

/// The current time, truncated to the millisecond precision the mirror stores.
pub(crate) fn now() -> Timestamp {
    let now = Timestamp::now();

    Timestamp::from_millisecond(now.as_millisecond()).unwrap_or(now)
}
