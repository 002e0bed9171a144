//! In-Memory Session Gateway Adapter
//!
//! Keeps workshop records in a map. Backs the `memory` storage backend and
//! doubles as the test gateway: it counts calls, can fail on demand and can
//! hold saves in flight until released.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{RwLock, Semaphore};

use crate::domain::foundation::{SessionId, Timestamp, WorkshopStep};
use crate::domain::workshop::WorkshopData;
use crate::ports::{GatewayError, SessionGateway, WorkshopRecord};

/// Gateway operation, for targeting injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    Load,
    Create,
    Save,
    UpdateStep,
}

#[derive(Debug, Default)]
struct CallCounts {
    loads: AtomicUsize,
    creates: AtomicUsize,
    saves: AtomicUsize,
    step_updates: AtomicUsize,
}

/// In-memory storage for workshop records
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionGateway {
    records: Arc<RwLock<HashMap<SessionId, WorkshopRecord>>>,
    counts: Arc<CallCounts>,
    failures: Arc<Mutex<HashMap<GatewayOp, VecDeque<GatewayError>>>>,
    save_gate: Arc<Mutex<Option<Arc<Semaphore>>>>,
}

impl InMemorySessionGateway {
    /// Create an empty gateway
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing counters and failures.
    pub async fn insert(&self, record: WorkshopRecord) {
        self.records
            .write()
            .await
            .insert(record.session_id.clone(), record);
    }

    /// Read a stored record without counting a load.
    pub async fn record(&self, session_id: &SessionId) -> Option<WorkshopRecord> {
        self.records.read().await.get(session_id).cloned()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub fn load_count(&self) -> usize {
        self.counts.loads.load(Ordering::SeqCst)
    }

    pub fn create_count(&self) -> usize {
        self.counts.creates.load(Ordering::SeqCst)
    }

    /// Number of `save` calls that reached the gateway, including failed ones.
    pub fn save_count(&self) -> usize {
        self.counts.saves.load(Ordering::SeqCst)
    }

    pub fn step_update_count(&self) -> usize {
        self.counts.step_updates.load(Ordering::SeqCst)
    }

    /// Make the next call of `op` fail with `error`. Queued errors are used in order.
    pub fn fail_next(&self, op: GatewayOp, error: GatewayError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.entry(op).or_default().push_back(error);
        }
    }

    /// Hold every subsequent `save` until [`release_saves`](Self::release_saves)
    /// or [`open_saves`](Self::open_saves) lets it through.
    pub fn hold_saves(&self) {
        if let Ok(mut gate) = self.save_gate.lock() {
            *gate = Some(Arc::new(Semaphore::new(0)));
        }
    }

    /// Let `n` held saves proceed.
    pub fn release_saves(&self, n: usize) {
        if let Some(gate) = self.current_gate() {
            gate.add_permits(n);
        }
    }

    /// Remove the gate, letting held and future saves through.
    pub fn open_saves(&self) {
        let gate = self.save_gate.lock().ok().and_then(|mut gate| gate.take());
        if let Some(gate) = gate {
            gate.close();
        }
    }

    fn current_gate(&self) -> Option<Arc<Semaphore>> {
        self.save_gate.lock().ok().and_then(|gate| gate.clone())
    }

    fn take_failure(&self, op: GatewayOp) -> Result<(), GatewayError> {
        let failure = self
            .failures
            .lock()
            .ok()
            .and_then(|mut failures| failures.get_mut(&op).and_then(VecDeque::pop_front));
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SessionGateway for InMemorySessionGateway {
    async fn load(&self, session_id: &SessionId) -> Result<WorkshopRecord, GatewayError> {
        self.counts.loads.fetch_add(1, Ordering::SeqCst);
        self.take_failure(GatewayOp::Load)?;

        let records = self.records.read().await;
        records
            .get(session_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(session_id.clone()))
    }

    async fn create(&self, record: &WorkshopRecord) -> Result<(), GatewayError> {
        self.counts.creates.fetch_add(1, Ordering::SeqCst);
        self.take_failure(GatewayOp::Create)?;

        self.insert(record.clone()).await;
        Ok(())
    }

    async fn save(
        &self,
        session_id: &SessionId,
        data: &WorkshopData,
        step: WorkshopStep,
    ) -> Result<(), GatewayError> {
        self.counts.saves.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = self.current_gate() {
            // A closed gate means it was opened; either way, proceed.
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        self.take_failure(GatewayOp::Save)?;

        let mut records = self.records.write().await;
        let record = records
            .get_mut(session_id)
            .ok_or_else(|| GatewayError::NotFound(session_id.clone()))?;
        record.workshop_data = data.clone();
        record.current_step = step;
        record.updated_at = Timestamp::now();
        Ok(())
    }

    async fn update_step(&self, session_id: &SessionId, step: WorkshopStep) -> Result<(), GatewayError> {
        self.counts.step_updates.fetch_add(1, Ordering::SeqCst);
        self.take_failure(GatewayOp::UpdateStep)?;

        let mut records = self.records.write().await;
        let record = records
            .get_mut(session_id)
            .ok_or_else(|| GatewayError::NotFound(session_id.clone()))?;
        record.current_step = step;
        record.updated_at = Timestamp::now();
        Ok(())
    }
}
