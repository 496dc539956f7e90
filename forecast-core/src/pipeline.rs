//! Fetch-then-project pipeline and the view-state it holds.
//!
//! The held [`ViewState`] lives in a `tokio::sync::watch` channel and is only
//! ever replaced as a whole, so a reader sees either the previous or the new
//! list. Every trigger takes a sequence number; a response is applied only if
//! its number is still the latest issued, so a slow older response cannot
//! overwrite a newer one.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::{ForecastError, ForecastErrorKind},
    model::{DaySummary, ForecastDocument},
    projection::Projector,
    provider::ForecastProvider,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Showing the last successful projection, or nothing yet.
    #[default]
    Idle,
    /// The latest request is in flight.
    Loading,
}

/// What the UI reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub days: Arc<Vec<DaySummary>>,
    pub phase: Phase,
    /// Sequence number of the request `days` came from; 0 before the first success.
    pub revision: u64,
    /// Failure of the latest request, cleared by the next success.
    pub last_error: Option<ForecastErrorKind>,
}

/// Sequence number handed out by [`ForecastPipeline::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The projection replaced the held view-state.
    Applied(Arc<Vec<DaySummary>>),
    /// A newer request was issued meanwhile; the response was dropped.
    Superseded,
}

#[derive(Debug)]
pub struct ForecastPipeline {
    provider: Box<dyn ForecastProvider>,
    projector: Projector,
    state: watch::Sender<ViewState>,
    issued: AtomicU64,
}

impl ForecastPipeline {
    pub fn new(provider: Box<dyn ForecastProvider>, projector: Projector) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        Self { provider, projector, state, issued: AtomicU64::new(0) }
    }

    /// Copy of the current view-state.
    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every view-state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Fetch the forecast for `location` and replace the view-state with its
    /// projection. On failure the held days are left untouched. Dropping the
    /// future before it resolves behaves like [`ForecastPipeline::cancel`].
    #[instrument(skip(self))]
    pub async fn refresh(&self, location: &str) -> Result<RefreshOutcome, ForecastError> {
        let ticket = self.begin();
        let pending = PendingRefresh { pipeline: self, ticket: Some(ticket) };
        let result = self.provider.fetch_forecast(location).await;
        pending.settle();
        self.complete(ticket, result)
    }

    /// Issue the next sequence number and mark the pipeline as loading.
    pub fn begin(&self) -> RefreshTicket {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| state.phase = Phase::Loading);
        debug!(seq, "Forecast refresh started");
        RefreshTicket(seq)
    }

    /// Settle the request identified by `ticket`.
    pub fn complete(
        &self,
        ticket: RefreshTicket,
        result: Result<ForecastDocument, ForecastError>,
    ) -> Result<RefreshOutcome, ForecastError> {
        match result {
            Ok(document) => {
                let days = Arc::new(self.projector.project(&document));
                let applied = self.state.send_if_modified(|state| {
                    if !self.is_latest(ticket) {
                        return false;
                    }
                    *state = ViewState {
                        days: Arc::clone(&days),
                        phase: Phase::Idle,
                        revision: ticket.0,
                        last_error: None,
                    };
                    true
                });

                if applied {
                    info!(seq = ticket.0, days = days.len(), "View-state replaced");
                    Ok(RefreshOutcome::Applied(days))
                } else {
                    debug!(seq = ticket.0, "Dropping superseded forecast response");
                    Ok(RefreshOutcome::Superseded)
                }
            }
            Err(err) => {
                let kind = err.kind();
                let latest = self.state.send_if_modified(|state| {
                    if !self.is_latest(ticket) {
                        return false;
                    }
                    state.phase = Phase::Idle;
                    state.last_error = Some(kind);
                    true
                });
                warn!(seq = ticket.0, %kind, latest, error = %err, "Forecast refresh failed");
                Err(err)
            }
        }
    }

    /// Abandon `ticket` without a result. If it is still the latest request
    /// the pipeline goes back to `Idle` with the held days unchanged.
    pub fn cancel(&self, ticket: RefreshTicket) {
        let reset = self.state.send_if_modified(|state| {
            if !self.is_latest(ticket) || state.phase != Phase::Loading {
                return false;
            }
            state.phase = Phase::Idle;
            true
        });
        debug!(seq = ticket.0, reset, "Forecast refresh cancelled");
    }

    fn is_latest(&self, ticket: RefreshTicket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }
}

/// Cancels its ticket on drop unless settled first.
struct PendingRefresh<'a> {
    pipeline: &'a ForecastPipeline,
    ticket: Option<RefreshTicket>,
}

impl PendingRefresh<'_> {
    fn settle(mut self) {
        self.ticket = None;
    }
}

impl Drop for PendingRefresh<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.pipeline.cancel(ticket);
        }
    }
}
