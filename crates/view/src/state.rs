use foundation::GeoBounds;
use store::{MeasurementStore, StoreError};

use crate::mode::ViewMode;
use crate::refresh::{RefreshOutput, refresh};

/// Monotonically increasing id of an issued refresh.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

/// Snapshot of everything a background refresh needs.
///
/// Tickets are taken on the thread that owns the [`ViewState`] and carry the
/// mode and bounds by value, so later viewport changes cannot tear an
/// in-flight query.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshTicket {
    pub generation: Generation,
    pub mode: ViewMode,
    pub bounds: Option<GeoBounds>,
}

impl RefreshTicket {
    pub fn run<S: MeasurementStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<RefreshOutput, StoreError> {
        refresh(store, &self.mode, self.bounds.as_ref())
    }
}

/// Result of feeding an input to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub mode: ViewMode,
    /// Refresh to dispatch next, if the input calls for one.
    pub refresh: Option<RefreshTicket>,
}

/// What to do with a finished refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Render(RefreshOutput),
    /// A newer refresh was issued, or the view changed, after this one started.
    Superseded,
    /// The selection went stale; the view fell back to summary.
    Fallback(Transition),
    Failed(StoreError),
}

/// Summary/detail view state machine.
///
/// Only the latest issued ticket may render. Issuing a new one supersedes any
/// refresh still in flight; its result is discarded on completion.
#[derive(Debug, Default)]
pub struct ViewState {
    mode: ViewMode,
    bounds: Option<GeoBounds>,
    next_generation: u64,
    in_flight: Option<Generation>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    pub fn bounds(&self) -> Option<&GeoBounds> {
        self.bounds.as_ref()
    }

    pub fn in_flight(&self) -> Option<Generation> {
        self.in_flight
    }

    /// User picked a rendered network or cluster item.
    ///
    /// Picking the network that is already selected changes nothing.
    pub fn select(&mut self, network_id: impl Into<String>) -> Transition {
        let network_id = network_id.into();
        if self.mode.selected() == Some(network_id.as_str()) {
            return self.unchanged();
        }
        tracing::debug!(from = %self.mode, to = %network_id, "select");
        self.mode = ViewMode::Detail(network_id);
        self.issue()
    }

    /// User tapped an empty part of the map.
    pub fn deselect(&mut self) -> Transition {
        if self.mode.is_summary() {
            return self.unchanged();
        }
        tracing::debug!(from = %self.mode, "deselect");
        self.mode = ViewMode::Summary;
        self.issue()
    }

    /// Pan or zoom. Always recorded; only summary mode requeries.
    pub fn viewport_changed(&mut self, bounds: GeoBounds) -> Transition {
        self.bounds = Some(bounds);
        if self.mode.is_summary() {
            return self.issue();
        }
        self.unchanged()
    }

    /// Periodic or explicit reload of whatever is currently shown.
    pub fn request_refresh(&mut self) -> Transition {
        self.issue()
    }

    /// All data was deleted: back to summary, and nothing in flight may render.
    pub fn clear(&mut self) -> Transition {
        self.mode = ViewMode::Summary;
        self.in_flight = None;
        self.unchanged()
    }

    /// Applies a finished refresh.
    pub fn complete(
        &mut self,
        ticket: &RefreshTicket,
        result: Result<RefreshOutput, StoreError>,
    ) -> Completion {
        if self.in_flight != Some(ticket.generation) || ticket.mode != self.mode {
            tracing::debug!(generation = ticket.generation.0, "discarding superseded refresh");
            return Completion::Superseded;
        }
        self.in_flight = None;

        match result {
            Err(e) => {
                tracing::warn!(mode = %ticket.mode, error = %e, "refresh failed");
                Completion::Failed(e)
            }
            Ok(RefreshOutput::StaleSelection { network_id }) => {
                tracing::warn!(
                    network_id = %network_id,
                    "selection no longer valid, back to summary"
                );
                self.mode = ViewMode::Summary;
                Completion::Fallback(self.issue())
            }
            Ok(output) => Completion::Render(output),
        }
    }

    fn issue(&mut self) -> Transition {
        let generation = Generation(self.next_generation);
        self.next_generation += 1;
        if let Some(previous) = self.in_flight {
            tracing::debug!(previous = previous.0, next = generation.0, "superseding refresh");
        }
        self.in_flight = Some(generation);
        Transition {
            mode: self.mode.clone(),
            refresh: Some(RefreshTicket {
                generation,
                mode: self.mode.clone(),
                bounds: self.bounds,
            }),
        }
    }

    fn unchanged(&self) -> Transition {
        Transition {
            mode: self.mode.clone(),
            refresh: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Completion, ViewState};
    use crate::mode::ViewMode;
    use crate::refresh::RefreshOutput;
    use crate::testing::{RecordingStore, StoreCall, obs};
    use foundation::GeoBounds;
    use pretty_assertions::assert_eq;
    use store::{InMemoryStore, MeasurementStore, StoreError};

    fn store() -> RecordingStore {
        let inner = InMemoryStore::new();
        inner
            .insert_many(&[
                obs("cafe", 1.0, 1.0, -50),
                obs("cafe", 1.0, 3.0, -50),
                obs("home", 2.0, 2.0, -60),
            ])
            .unwrap();
        RecordingStore::new(inner)
    }

    fn viewport() -> GeoBounds {
        GeoBounds::new(0.0, 5.0, 0.0, 5.0)
    }

    #[test]
    fn starts_in_summary() {
        let s = ViewState::new();
        assert_eq!(s.mode(), &ViewMode::Summary);
        assert!(s.in_flight().is_none());
    }

    #[test]
    fn select_then_tap_map_returns_to_summary() {
        let mut s = ViewState::new();
        let t = s.select("cafe");
        assert_eq!(t.mode, ViewMode::Detail("cafe".into()));
        assert!(t.refresh.is_some());

        let t = s.deselect();
        assert_eq!(t.mode, ViewMode::Summary);
        assert!(t.refresh.is_some());

        // Tapping the map in summary does nothing.
        let t = s.deselect();
        assert!(t.refresh.is_none());
    }

    #[test]
    fn selecting_another_network_goes_straight_to_it() {
        let mut s = ViewState::new();
        s.select("cafe");
        let t = s.select("home");
        assert_eq!(t.mode, ViewMode::Detail("home".into()));
        assert_eq!(t.refresh.unwrap().mode, ViewMode::Detail("home".into()));
    }

    #[test]
    fn reselecting_same_network_is_a_noop_without_query() {
        let store = store();
        let mut s = ViewState::new();
        let ticket = s.select("cafe").refresh.unwrap();
        let out = ticket.run(&store);
        assert!(matches!(s.complete(&ticket, out), Completion::Render(_)));
        store.reset();

        let t = s.select("cafe");
        assert_eq!(t.mode, ViewMode::Detail("cafe".into()));
        assert!(t.refresh.is_none());
        assert!(s.in_flight().is_none());
        assert!(store.calls().is_empty());
    }

    #[test]
    fn viewport_requeries_only_in_summary() {
        let mut s = ViewState::new();
        let t = s.viewport_changed(viewport());
        let ticket = t.refresh.unwrap();
        assert_eq!(ticket.bounds, Some(viewport()));

        s.select("cafe");
        let moved = GeoBounds::new(10.0, 20.0, 10.0, 20.0);
        let t = s.viewport_changed(moved);
        assert!(t.refresh.is_none());
        assert_eq!(s.bounds(), Some(&moved));

        // Back in summary the latest bounds are used.
        let ticket = s.deselect().refresh.unwrap();
        assert_eq!(ticket.bounds, Some(moved));
    }

    #[test]
    fn refresh_keeps_state() {
        let mut s = ViewState::new();
        s.select("cafe");
        let t = s.request_refresh();
        assert_eq!(t.mode, ViewMode::Detail("cafe".into()));
        assert!(t.refresh.is_some());
    }

    #[test]
    fn stale_detail_falls_back_to_summary() {
        let store = store();
        let mut s = ViewState::new();
        s.viewport_changed(viewport());
        let ticket = s.select("cafe").refresh.unwrap();

        store.inner().delete_all().unwrap();
        let result = ticket.run(&store);
        let completion = s.complete(&ticket, result);

        let Completion::Fallback(t) = completion else {
            panic!("expected fallback, got {completion:?}");
        };
        assert_eq!(t.mode, ViewMode::Summary);
        assert_eq!(s.mode(), &ViewMode::Summary);
        let follow_up = t.refresh.unwrap();
        assert_eq!(follow_up.bounds, Some(viewport()));

        let out = follow_up.run(&store);
        assert!(matches!(
            s.complete(&follow_up, out),
            Completion::Render(RefreshOutput::Summary { .. })
        ));
    }

    #[test]
    fn newer_ticket_supersedes_older() {
        let store = store();
        let mut s = ViewState::new();
        let first = s.viewport_changed(viewport()).refresh.unwrap();
        let second = s
            .viewport_changed(GeoBounds::new(1.5, 2.5, 1.5, 2.5))
            .refresh
            .unwrap();

        let late = first.run(&store);
        let fresh = second.run(&store);

        // The newer one lands first; the older result must not clobber it.
        let Completion::Render(RefreshOutput::Summary { items, .. }) = s.complete(&second, fresh)
        else {
            panic!("expected render");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(s.complete(&first, late), Completion::Superseded);
    }

    #[test]
    fn mode_change_discards_in_flight_result() {
        let store = store();
        let mut s = ViewState::new();
        let summary = s.viewport_changed(viewport()).refresh.unwrap();
        s.select("home");
        let out = summary.run(&store);
        assert_eq!(s.complete(&summary, out), Completion::Superseded);
    }

    #[test]
    fn clear_discards_in_flight_result() {
        let store = store();
        let mut s = ViewState::new();
        let ticket = s.select("cafe").refresh.unwrap();
        let t = s.clear();
        assert_eq!(t.mode, ViewMode::Summary);
        assert!(t.refresh.is_none());
        let out = ticket.run(&store);
        assert_eq!(s.complete(&ticket, out), Completion::Superseded);
    }

    #[test]
    fn store_failure_is_reported_not_rendered_empty() {
        let store = store();
        let mut s = ViewState::new();
        let ticket = s.request_refresh().refresh.unwrap();
        store.inner().close();
        let out = ticket.run(&store);
        assert_eq!(s.complete(&ticket, out), Completion::Failed(StoreError::Closed));
        assert_eq!(s.mode(), &ViewMode::Summary);
    }

    #[test]
    fn detail_refresh_issues_single_network_query() {
        let store = store();
        let mut s = ViewState::new();
        s.viewport_changed(viewport());
        let ticket = s.select("home").refresh.unwrap();
        let _ = ticket.run(&store);
        assert_eq!(store.calls(), vec![StoreCall::ObservationsFor("home".into())]);
    }
}
