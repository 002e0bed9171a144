//! Session store - the single authoritative holder of workshop state.
//!
//! Step screens read snapshots and write patches; the store owns the
//! session id, the current step, the aggregate and the autosave guard, and
//! is the only component that talks to the [`SessionGateway`].
//!
//! # Concurrency
//!
//! All state sits behind one `std::sync::Mutex` that is never held across
//! an `.await`. Mutations are synchronous; remote writes run on spawned
//! tasks. At most one write is in flight per session. A save requested
//! while one is in flight sets a single "resave pending" bit, and the
//! in-flight cycle then writes the aggregate as it stands at that moment.
//! Any number of such requests collapse into that one follow-up write.
//!
//! Every state change is published to a `watch` channel; subscribers see
//! the latest [`SessionSnapshot`].
//!
//! # Failure policy
//!
//! Gateway errors never reach callers. They are logged and surfaced as a
//! [`SaveOutcome`] or [`SessionStart`]. Local state is never rolled back.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::AutosaveConfig;
use crate::domain::foundation::{SessionId, WorkshopStep};
use crate::domain::workshop::{WorkshopData, WorkshopField, WorkshopPatch};
use crate::ports::{GatewayError, GatewayErrorKind, SessionGateway, SessionIdSlot, WorkshopRecord};

// ════════════════════════════════════════════════════════════════════════════
// Public types
// ════════════════════════════════════════════════════════════════════════════

/// Tuning for [`SessionStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Quiet period before a step draft commits to the store.
    pub debounce: Duration,
    /// Extra load attempts after a transient failure.
    pub load_retry_attempts: u32,
    /// Attempt `n` waits `n` times this before retrying.
    pub load_retry_backoff: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(400),
            load_retry_attempts: 2,
            load_retry_backoff: Duration::from_millis(250),
        }
    }
}

impl StoreConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_load_retry(mut self, attempts: u32, backoff: Duration) -> Self {
        self.load_retry_attempts = attempts;
        self.load_retry_backoff = backoff;
        self
    }
}

impl From<&AutosaveConfig> for StoreConfig {
    fn from(config: &AutosaveConfig) -> Self {
        Self {
            debounce: config.debounce(),
            load_retry_attempts: config.load_retry_attempts,
            load_retry_backoff: config.load_retry_backoff(),
        }
    }
}

/// What subscribers see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session_id: Option<SessionId>,
    pub current_step: WorkshopStep,
    pub workshop_data: Arc<WorkshopData>,
    pub is_saving: bool,
}

/// Why a save did not reach the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No session has been initialized or loaded.
    NoSession,
    /// Another write is in flight; a follow-up write has been scheduled.
    InFlight,
}

/// Result of a save attempt, for observability only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Skipped(SkipReason),
    Failed(GatewayErrorKind),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }
}

/// How a session became active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStart {
    /// A new, empty session was created.
    Created(SessionId),
    /// An existing session was loaded.
    Resumed(SessionId),
    /// The requested session could not be loaded and was replaced by a new one.
    Replaced {
        discarded: SessionId,
        created: SessionId,
    },
}

impl SessionStart {
    /// The session that is now active.
    pub fn session_id(&self) -> &SessionId {
        match self {
            SessionStart::Created(id) | SessionStart::Resumed(id) => id,
            SessionStart::Replaced { created, .. } => created,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Internal state
// ════════════════════════════════════════════════════════════════════════════

/// One write to perform.
#[derive(Debug)]
struct SaveJob {
    generation: u64,
    session_id: SessionId,
    data: Arc<WorkshopData>,
    step: WorkshopStep,
    /// The record has not been created remotely yet.
    create: bool,
}

#[derive(Debug)]
struct StoreState {
    session_id: Option<SessionId>,
    current_step: WorkshopStep,
    data: Arc<WorkshopData>,
    /// The gateway holds a record for `session_id`.
    persisted: bool,
    saving: bool,
    resave_pending: bool,
    /// Bumped whenever a different session is hydrated.
    generation: u64,
}

impl StoreState {
    fn empty() -> Self {
        Self {
            session_id: None,
            current_step: WorkshopStep::BigIdea,
            data: Arc::new(WorkshopData::default()),
            persisted: false,
            saving: false,
            resave_pending: false,
            generation: 0,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            current_step: self.current_step,
            workshop_data: Arc::clone(&self.data),
            is_saving: self.saving,
        }
    }

    /// Replaces the whole session. A cycle still writing the previous
    /// session keeps running but no longer owns the save guard.
    fn hydrate(&mut self, session_id: SessionId, data: WorkshopData, step: WorkshopStep, persisted: bool) {
        self.session_id = Some(session_id);
        self.data = Arc::new(data);
        self.current_step = step;
        self.persisted = persisted;
        self.saving = false;
        self.resave_pending = false;
        self.generation += 1;
    }

    fn current_job(&self) -> Option<SaveJob> {
        let session_id = self.session_id.clone()?;
        Some(SaveJob {
            generation: self.generation,
            session_id,
            data: Arc::clone(&self.data),
            step: self.current_step,
            create: !self.persisted,
        })
    }

    /// Takes the save guard, or records why not.
    fn claim_save(&mut self) -> Result<SaveJob, SkipReason> {
        if self.session_id.is_none() {
            return Err(SkipReason::NoSession);
        }
        if self.saving {
            self.resave_pending = true;
            return Err(SkipReason::InFlight);
        }
        let job = self.current_job().ok_or(SkipReason::NoSession)?;
        self.saving = true;
        Ok(job)
    }
}

struct StoreInner {
    gateway: Arc<dyn SessionGateway>,
    slot: Arc<dyn SessionIdSlot>,
    config: StoreConfig,
    state: Mutex<StoreState>,
    snapshots: watch::Sender<SessionSnapshot>,
    /// Background writes (save cycles and step updates) not yet finished.
    activity: watch::Sender<usize>,
}

/// Keeps the activity count raised while alive.
struct ActivityGuard {
    store: SessionStore,
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.store
            .inner
            .activity
            .send_modify(|n| *n = n.saturating_sub(1));
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Session store
// ════════════════════════════════════════════════════════════════════════════

/// Cheap-to-clone handle to the session state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

impl SessionStore {
    pub fn new(
        gateway: Arc<dyn SessionGateway>,
        slot: Arc<dyn SessionIdSlot>,
        config: StoreConfig,
    ) -> Self {
        let state = StoreState::empty();
        let (snapshots, _) = watch::channel(state.snapshot());
        let (activity, _) = watch::channel(0usize);
        Self {
            inner: Arc::new(StoreInner {
                gateway,
                slot,
                config,
                state: Mutex::new(state),
                snapshots,
                activity,
            }),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    /// Receives every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshots.subscribe()
    }

    pub fn workshop_data(&self) -> Arc<WorkshopData> {
        Arc::clone(&self.lock().data)
    }

    pub fn current_step(&self) -> WorkshopStep {
        self.lock().current_step
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.lock().session_id.clone()
    }

    pub fn is_saving(&self) -> bool {
        self.lock().saving
    }

    /// Debounce delay step drafts should use.
    pub fn autosave_delay(&self) -> Duration {
        self.inner.config.debounce
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Resumes the session named in the id slot, or starts a new one.
    pub async fn initialize_session(&self) -> SessionStart {
        match self.inner.slot.load().await {
            Ok(Some(session_id)) => return self.load_session(session_id).await,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Session id slot unreadable; starting a new session"),
        }
        SessionStart::Created(self.start_new_session().await)
    }

    /// Loads `session_id`, falling back to a new session if it cannot be loaded.
    ///
    /// Transient failures are retried first; a missing or undecodable record
    /// is discarded immediately.
    pub async fn load_session(&self, session_id: SessionId) -> SessionStart {
        match self.fetch_with_retry(&session_id).await {
            Ok(record) => {
                let step = record.current_step;
                {
                    let mut state = self.lock();
                    state.hydrate(session_id.clone(), record.workshop_data, step, true);
                    self.publish(&state);
                }
                if let Err(e) = self.inner.slot.store(&session_id).await {
                    warn!(session_id = %session_id, error = %e, "Failed to remember session id");
                }
                info!(session_id = %session_id, step = %step, "Workshop session resumed");
                SessionStart::Resumed(session_id)
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Discarding session that could not be loaded");
                if let Err(e) = self.inner.slot.clear().await {
                    warn!(error = %e, "Failed to clear session id slot");
                }
                let created = self.start_new_session().await;
                SessionStart::Replaced {
                    discarded: session_id,
                    created,
                }
            }
        }
    }

    async fn fetch_with_retry(&self, session_id: &SessionId) -> Result<WorkshopRecord, GatewayError> {
        let mut attempt: u32 = 0;
        loop {
            match self.inner.gateway.load(session_id).await {
                Err(e) if e.is_transient() && attempt < self.inner.config.load_retry_attempts => {
                    attempt += 1;
                    warn!(session_id = %session_id, attempt, error = %e, "Transient failure loading session; retrying");
                    tokio::time::sleep(self.inner.config.load_retry_backoff * attempt).await;
                }
                result => return result,
            }
        }
    }

    async fn start_new_session(&self) -> SessionId {
        let session_id = SessionId::generate();
        let claimed = {
            let mut state = self.lock();
            state.hydrate(session_id.clone(), WorkshopData::default(), WorkshopStep::BigIdea, false);
            let claimed = self.claim_tracked(&mut state);
            self.publish(&state);
            claimed
        };

        if let Err(e) = self.inner.slot.store(&session_id).await {
            warn!(session_id = %session_id, error = %e, "Failed to remember session id");
        }
        info!(session_id = %session_id, "Workshop session started");

        if let Ok((job, _activity)) = claimed {
            self.run_save_cycle(job).await;
        }
        session_id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Writes the aggregate and current step to the gateway.
    ///
    /// Skipped when no session is active or a write is already in flight;
    /// in the latter case the in-flight cycle writes once more when done.
    pub async fn save_session(&self) -> SaveOutcome {
        let claimed = {
            let mut state = self.lock();
            let claimed = self.claim_tracked(&mut state);
            self.publish(&state);
            claimed
        };

        match claimed {
            Ok((job, _activity)) => self.run_save_cycle(job).await,
            Err(reason) => {
                debug!(?reason, "Save skipped");
                SaveOutcome::Skipped(reason)
            }
        }
    }

    /// Shallow-merges `patch` into the aggregate and schedules a save.
    ///
    /// The merge and the broadcast happen before this returns; the save runs
    /// in the background. Returns the fields that were replaced.
    pub fn update_workshop_data(&self, patch: WorkshopPatch) -> Vec<WorkshopField> {
        let (fields, claimed) = {
            let mut state = self.lock();
            let fields = Arc::make_mut(&mut state.data).merge(patch);
            let claimed = self.claim_tracked(&mut state);
            self.publish(&state);
            (fields, claimed)
        };

        match claimed {
            Ok((job, activity)) => self.spawn_save_cycle(job, activity),
            Err(reason) => debug!(?reason, fields = ?fields, "Autosave deferred"),
        }
        fields
    }

    /// Moves to `step` immediately and tells the gateway in the background.
    ///
    /// A failed remote update is logged; the local step is kept.
    pub fn set_current_step(&self, step: WorkshopStep) {
        enum StepSync {
            None,
            Patch(SessionId, ActivityGuard),
            Save(SaveJob, ActivityGuard),
        }

        let sync = {
            let mut state = self.lock();
            state.current_step = step;
            let sync = match state.session_id.clone() {
                None => StepSync::None,
                // Until the record exists the step travels with the next full write.
                Some(_) if !state.persisted => match self.claim_tracked(&mut state) {
                    Ok((job, activity)) => StepSync::Save(job, activity),
                    Err(_) => StepSync::None,
                },
                // The in-flight write captured the old step; the follow-up write carries this one.
                Some(_) if state.saving => {
                    state.resave_pending = true;
                    StepSync::None
                }
                Some(session_id) => StepSync::Patch(session_id, self.track()),
            };
            self.publish(&state);
            sync
        };

        match sync {
            StepSync::None => debug!(step = %step, "Step changed locally"),
            StepSync::Save(job, activity) => self.spawn_save_cycle(job, activity),
            StepSync::Patch(session_id, activity) => {
                let gateway = Arc::clone(&self.inner.gateway);
                self.spawn(async move {
                    let _activity = activity;
                    match gateway.update_step(&session_id, step).await {
                        Ok(()) => debug!(session_id = %session_id, step = %step, "Step updated"),
                        Err(e) => {
                            warn!(session_id = %session_id, step = %step, error = %e, "Step update failed; keeping local step")
                        }
                    }
                });
            }
        }
    }

    /// Waits until no save or step update is running or pending.
    pub async fn flush(&self) {
        let mut activity = self.inner.activity.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = activity.wait_for(|n| *n == 0).await;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Save machinery
    // ─────────────────────────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &StoreState) {
        self.inner.snapshots.send_replace(state.snapshot());
    }

    fn track(&self) -> ActivityGuard {
        self.inner.activity.send_modify(|n| *n += 1);
        ActivityGuard { store: self.clone() }
    }

    /// Claims the save guard and raises the activity count in one step.
    fn claim_tracked(&self, state: &mut StoreState) -> Result<(SaveJob, ActivityGuard), SkipReason> {
        let job = state.claim_save()?;
        Ok((job, self.track()))
    }

    fn spawn<F>(&self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(task);
            }
            Err(_) => warn!("No async runtime available; remote write dropped"),
        }
    }

    fn spawn_save_cycle(&self, job: SaveJob, activity: ActivityGuard) {
        if Handle::try_current().is_err() {
            warn!(session_id = %job.session_id, "No async runtime available; autosave skipped");
            let mut state = self.lock();
            if state.generation == job.generation {
                state.saving = false;
                state.resave_pending = false;
            }
            self.publish(&state);
            return;
        }

        let store = self.clone();
        self.spawn(async move {
            let _activity = activity;
            store.run_save_cycle(job).await;
        });
    }

    /// Writes `job`, then keeps writing while a resave is pending.
    async fn run_save_cycle(&self, mut job: SaveJob) -> SaveOutcome {
        loop {
            let outcome = self.write(&job).await;

            let next = {
                let mut state = self.lock();
                if state.generation != job.generation {
                    return outcome;
                }
                if outcome.is_saved() && job.create {
                    state.persisted = true;
                }
                let next = if state.resave_pending {
                    state.resave_pending = false;
                    state.current_job()
                } else {
                    None
                };
                if next.is_none() {
                    state.saving = false;
                    self.publish(&state);
                }
                next
            };

            match next {
                Some(next) => job = next,
                None => return outcome,
            }
        }
    }

    async fn write(&self, job: &SaveJob) -> SaveOutcome {
        let result = if job.create {
            let record = WorkshopRecord::new(job.session_id.clone(), (*job.data).clone(), job.step);
            self.inner.gateway.create(&record).await
        } else {
            self.inner
                .gateway
                .save(&job.session_id, &job.data, job.step)
                .await
        };

        match result {
            Ok(()) => {
                debug!(session_id = %job.session_id, step = %job.step, created = job.create, "Workshop saved");
                SaveOutcome::Saved
            }
            Err(e) => {
                match &e {
                    GatewayError::NotFound(_) => {
                        error!(session_id = %job.session_id, "Workshop save target no longer exists")
                    }
                    _ => warn!(session_id = %job.session_id, error = %e, "Workshop save failed"),
                }
                SaveOutcome::Failed(e.kind())
            }
        }
    }
}
