//! Mirror synchronization worker
//!
//! Every ledger owns one worker task. Snapshots are queued without waiting and
//! handled strictly in order, so two resyncs of the same ledger never overlap.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use tokio::sync::{
    mpsc::{self, UnboundedReceiver, UnboundedSender},
    oneshot,
};
use tracing::{debug, warn};

use super::{Change, Mirror, MirrorEntry, MirrorError};

/// Computes the changes that turn the `persisted` entries into `next`.
///
/// Removed entries come first as deletions, followed by upserts for entries that
/// are new or differ from their persisted copy. Unchanged entries produce nothing.
pub fn diff<E: MirrorEntry>(persisted: &[E], next: &[E]) -> Vec<Change<E>> {
    let before: BTreeMap<E::Id, &E> = persisted
        .iter()
        .map(|entry| (entry.mirror_id(), entry))
        .collect();

    let kept: BTreeSet<E::Id> = next.iter().map(MirrorEntry::mirror_id).collect();

    let deletes = before
        .keys()
        .filter(|id| !kept.contains(*id))
        .map(|id| Change::Delete(*id));

    let upserts = next
        .iter()
        .filter(|entry| {
            before
                .get(&entry.mirror_id())
                .is_none_or(|stored| *stored != *entry)
        })
        .cloned()
        .map(Change::Upsert);

    deletes.chain(upserts).collect()
}

enum Command<E> {
    Sync(Vec<E>),
    Flush(oneshot::Sender<Result<(), MirrorError>>),
}

/// Handle used by a ledger to feed its sync worker.
#[derive(Debug)]
pub(crate) struct SyncHandle<E> {
    ledger: &'static str,
    commands: UnboundedSender<Command<E>>,
}

impl<E: MirrorEntry> SyncHandle<E> {
    /// Spawn a worker for `mirror`, which currently holds `persisted`.
    pub(crate) fn spawn(ledger: &'static str, mirror: Arc<dyn Mirror<E>>, persisted: Vec<E>) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();

        let worker = SyncWorker {
            ledger,
            mirror,
            persisted: Some(persisted),
            last_error: None,
        };

        tokio::spawn(worker.run(receiver));

        Self { ledger, commands }
    }

    /// Queue a snapshot of the ledger. Never blocks.
    pub(crate) fn push(&self, snapshot: Vec<E>) {
        if self.commands.send(Command::Sync(snapshot)).is_err() {
            warn!(ledger = self.ledger, "mirror sync worker has stopped, snapshot dropped");
        }
    }

    /// Wait until every snapshot queued so far has been handled.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::OutOfSync`] if the most recent resync failed, or
    /// [`MirrorError::WorkerStopped`] if the worker is gone.
    pub(crate) async fn flush(&self) -> Result<(), MirrorError> {
        let (ack, done) = oneshot::channel();

        self.commands
            .send(Command::Flush(ack))
            .map_err(|_closed| MirrorError::WorkerStopped)?;

        done.await.map_err(|_closed| MirrorError::WorkerStopped)?
    }
}

impl<E> std::fmt::Debug for Command<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Sync(snapshot) => f.debug_tuple("Sync").field(&snapshot.len()).finish(),
            Command::Flush(_) => f.write_str("Flush"),
        }
    }
}

struct SyncWorker<E: MirrorEntry> {
    ledger: &'static str,
    mirror: Arc<dyn Mirror<E>>,

    /// What the mirror is known to hold; `None` after a failed resync.
    persisted: Option<Vec<E>>,

    last_error: Option<String>,
}

impl<E: MirrorEntry> SyncWorker<E> {
    async fn run(mut self, mut commands: UnboundedReceiver<Command<E>>) {
        while let Some(command) = commands.recv().await {
            let mut latest = None;
            let mut acks = Vec::new();

            Self::collect(command, &mut latest, &mut acks);

            // Only the newest queued snapshot matters.
            while let Ok(command) = commands.try_recv() {
                Self::collect(command, &mut latest, &mut acks);
            }

            if let Some(snapshot) = latest {
                self.sync(snapshot).await;
            }

            for ack in acks {
                if ack.send(self.status()).is_err() {
                    debug!(ledger = self.ledger, "flush requester went away");
                }
            }
        }

        debug!(ledger = self.ledger, "mirror sync worker stopped");
    }

    fn collect(
        command: Command<E>,
        latest: &mut Option<Vec<E>>,
        acks: &mut Vec<oneshot::Sender<Result<(), MirrorError>>>,
    ) {
        match command {
            Command::Sync(snapshot) => *latest = Some(snapshot),
            Command::Flush(ack) => acks.push(ack),
        }
    }

    async fn sync(&mut self, snapshot: Vec<E>) {
        let result = match self.persisted.take() {
            Some(persisted) => self.apply_diff(&persisted, &snapshot).await,
            None => self.rewrite(&snapshot).await,
        };

        match result {
            Ok(()) => {
                self.persisted = Some(snapshot);
                self.last_error = None;
            }
            Err(error) => {
                warn!(
                    ledger = self.ledger,
                    %error,
                    "mirror sync failed, the next sync rewrites the mirror"
                );

                self.last_error = Some(error.to_string());
            }
        }
    }

    async fn apply_diff(&self, persisted: &[E], snapshot: &[E]) -> Result<(), MirrorError> {
        let changes = diff(persisted, snapshot);

        if changes.is_empty() {
            return Ok(());
        }

        self.mirror.apply(&changes).await?;

        debug!(ledger = self.ledger, changes = changes.len(), "mirror synced");

        Ok(())
    }

    async fn rewrite(&self, snapshot: &[E]) -> Result<(), MirrorError> {
        self.mirror.delete_all().await?;

        for entry in snapshot {
            self.mirror.insert(entry).await?;
        }

        debug!(ledger = self.ledger, entries = snapshot.len(), "mirror rewritten");

        Ok(())
    }

    fn status(&self) -> Result<(), MirrorError> {
        match &self.last_error {
            None => Ok(()),
            Some(message) => Err(MirrorError::OutOfSync(message.clone())),
        }
    }
}
