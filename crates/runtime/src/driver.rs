//! Async refresh driver around the view state machine.
//!
//! The driver is the single owner of [`ViewState`]. Inputs are applied under
//! a lock, and any refresh ticket they produce runs on the blocking pool. A
//! newer ticket aborts the task waiting on the older one; the generation
//! check in [`ViewState::complete`] drops whatever still slips through.
//!
//! Lock order is `in_flight` then `state`. The `in_flight` lock is held from
//! issuing a ticket until its task handle is stored, so handles are replaced
//! in generation order even when inputs arrive from several threads.

use std::sync::Arc;

use foundation::GeoBounds;
use parking_lot::Mutex;
use store::{MeasurementStore, StoreError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use view::{Completion, RefreshOutput, RefreshTicket, Transition, ViewMode, ViewState};

/// Message delivered to the rendering side.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    Render(RefreshOutput),
    Failed(StoreError),
}

pub struct RefreshDriver {
    state: Arc<Mutex<ViewState>>,
    store: Arc<dyn MeasurementStore>,
    updates: mpsc::Sender<ViewUpdate>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshDriver {
    pub fn new(
        store: Arc<dyn MeasurementStore>,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<ViewUpdate>) {
        let (updates, receiver) = mpsc::channel(capacity.max(1));
        let driver = Self {
            state: Arc::new(Mutex::new(ViewState::new())),
            store,
            updates,
            in_flight: Mutex::new(None),
        };
        (driver, receiver)
    }

    pub fn mode(&self) -> ViewMode {
        self.state.lock().mode().clone()
    }

    pub fn select(&self, network_id: impl Into<String>) -> ViewMode {
        self.apply(|state| state.select(network_id))
    }

    pub fn deselect(&self) -> ViewMode {
        self.apply(ViewState::deselect)
    }

    pub fn viewport_changed(&self, bounds: GeoBounds) -> ViewMode {
        self.apply(|state| state.viewport_changed(bounds))
    }

    pub fn request_refresh(&self) -> ViewMode {
        self.apply(ViewState::request_refresh)
    }

    /// Deletes every observation. Any refresh still in flight is discarded.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        {
            let mut in_flight = self.in_flight.lock();
            self.state.lock().clear();
            if let Some(task) = in_flight.take() {
                task.abort();
            }
        }
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.delete_all())
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?
    }

    fn apply(&self, input: impl FnOnce(&mut ViewState) -> Transition) -> ViewMode {
        let mut in_flight = self.in_flight.lock();
        let transition = input(&mut *self.state.lock());
        if let Some(ticket) = transition.refresh {
            let task = self.spawn_refresh(ticket);
            if let Some(previous) = in_flight.replace(task) {
                previous.abort();
            }
        }
        transition.mode
    }

    fn spawn_refresh(&self, ticket: RefreshTicket) -> JoinHandle<()> {
        let state = self.state.clone();
        let store = self.store.clone();
        let updates = self.updates.clone();

        tokio::spawn(async move {
            let mut next = Some(ticket);
            while let Some(ticket) = next.take() {
                let run_store = store.clone();
                let run_ticket = ticket.clone();
                let result = tokio::task::spawn_blocking(move || run_ticket.run(&*run_store))
                    .await
                    .unwrap_or_else(|e| Err(StoreError::Io(e.to_string())));

                let completion = state.lock().complete(&ticket, result);
                let update = match completion {
                    Completion::Render(output) => ViewUpdate::Render(output),
                    Completion::Failed(e) => ViewUpdate::Failed(e),
                    Completion::Fallback(t) => {
                        next = t.refresh;
                        continue;
                    }
                    Completion::Superseded => return,
                };
                if updates.send(update).await.is_err() {
                    tracing::debug!("renderer gone, dropping update");
                }
            }
        })
    }
}
