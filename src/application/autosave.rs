//! Step-local autosave.
//!
//! Step screens keep a local draft so typing stays responsive, and commit it
//! to the [`SessionStore`] once the participant pauses.
//!
//! | Type | Role |
//! |------|------|
//! | [`DebouncedCommitter`] | Restartable timer that commits the latest pushed value |
//! | [`StepDraft`] | Local copy of one aggregate field, committed through a debouncer |
//!
//! # Debounce law
//!
//! For pushes `v1..vn` where each arrives less than `delay` after the one
//! before, the commit callback runs exactly once, with `vn`, `delay` after
//! the last push. Dropping the committer commits a pending value instead of
//! losing it.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, Instant};
use tracing::warn;

use super::session_store::SessionStore;
use crate::domain::workshop::{WorkshopData, WorkshopPatch};

enum Command<T> {
    Push(T),
    Flush(oneshot::Sender<()>),
}

/// Commits the most recent value once pushes stop for `delay`.
///
/// The timer runs on a background task; the committer itself is a cheap
/// channel handle.
pub struct DebouncedCommitter<T> {
    commands: mpsc::UnboundedSender<Command<T>>,
    delay: Duration,
}

impl<T: Send + 'static> DebouncedCommitter<T> {
    /// Starts the timer task.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new<F, Fut>(delay: Duration, commit: F) -> Self
    where
        F: Fn(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (commands, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_timer(rx, delay, commit));
        Self { commands, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces the pending value and restarts the timer.
    pub fn push(&self, value: T) {
        if self.commands.send(Command::Push(value)).is_err() {
            warn!("Debounce task has stopped; edit not committed");
        }
    }

    /// Commits the pending value now, if any, and waits for the commit.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }
}

async fn run_timer<T, F, Fut>(mut commands: mpsc::UnboundedReceiver<Command<T>>, delay: Duration, commit: F)
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut pending: Option<T> = None;
    let timer = sleep(delay);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Push(value)) => {
                    pending = Some(value);
                    timer.as_mut().reset(Instant::now() + delay);
                }
                Some(Command::Flush(ack)) => {
                    if let Some(value) = pending.take() {
                        commit(value).await;
                    }
                    let _ = ack.send(());
                }
                // Committer dropped: the last edit still lands.
                None => {
                    if let Some(value) = pending.take() {
                        commit(value).await;
                    }
                    break;
                }
            },
            () = &mut timer, if pending.is_some() => {
                if let Some(value) = pending.take() {
                    commit(value).await;
                }
            }
        }
    }
}

/// Draft of one step's field, committed to the store after a pause.
///
/// `read` picks the field out of the aggregate; `write` turns a draft value
/// into a patch that replaces only that field.
pub struct StepDraft<T> {
    value: T,
    committer: DebouncedCommitter<T>,
}

impl<T> StepDraft<T>
where
    T: Clone + Send + 'static,
{
    /// Opens a draft seeded from the store's current aggregate, committing
    /// after the store's autosave delay.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open<R, W>(store: &SessionStore, read: R, write: W) -> Self
    where
        R: FnOnce(&WorkshopData) -> T,
        W: Fn(T) -> WorkshopPatch + Send + 'static,
    {
        Self::open_with_delay(store, store.autosave_delay(), read, write)
    }

    pub fn open_with_delay<R, W>(store: &SessionStore, delay: Duration, read: R, write: W) -> Self
    where
        R: FnOnce(&WorkshopData) -> T,
        W: Fn(T) -> WorkshopPatch + Send + 'static,
    {
        let value = read(&store.workshop_data());
        let store = store.clone();
        let committer = DebouncedCommitter::new(delay, move |value: T| {
            store.update_workshop_data(write(value));
            std::future::ready(())
        });
        Self { value, committer }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Updates the local copy now and schedules the commit.
    pub fn edit(&mut self, value: T) {
        self.value = value.clone();
        self.committer.push(value);
    }

    /// Edits the local copy in place.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        let mut value = self.value.clone();
        f(&mut value);
        self.edit(value);
    }

    /// Commits a pending edit immediately, e.g. when leaving the step.
    pub async fn commit(&self) {
        self.committer.flush().await;
    }
}
