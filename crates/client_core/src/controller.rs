use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use chrono::Utc;
use shared::{domain::AttemptId, protocol::OrderRequest, validation::OrderFields};
use tracing::{debug, info, warn};

use crate::{
    form::{FormModel, SubmitLabels},
    state::{transition, Effect, FormEvent, FormUiState, SubmitFailure},
    timers::DeferredResets,
    transport::{OrderTransport, SubmitOutcome},
};

pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// How long the success and error panels stay up before the form resets.
    pub reset_delay: Duration,
    pub labels: SubmitLabels,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            reset_delay: DEFAULT_RESET_DELAY,
            labels: SubmitLabels::default(),
        }
    }
}

struct ControllerInner {
    state: FormUiState,
    form: FormModel,
    labels: SubmitLabels,
    resets: DeferredResets,
}

/// Drives one order form: validation, the POST, and the panels afterwards.
///
/// The lock around the form is never held across an `.await`, so the network
/// call runs with the form free for timers and readers.
pub struct OrderSubmissionController {
    transport: Arc<dyn OrderTransport>,
    inner: Arc<Mutex<ControllerInner>>,
    last_attempt: AtomicU64,
}

impl OrderSubmissionController {
    pub fn new(transport: Arc<dyn OrderTransport>, config: ControllerConfig) -> Self {
        let form = FormModel::new(&config.labels);
        Self {
            transport,
            inner: Arc::new(Mutex::new(ControllerInner {
                state: FormUiState::Idle,
                form,
                labels: config.labels,
                resets: DeferredResets::new(config.reset_delay),
            })),
            last_attempt: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> FormUiState {
        lock(&self.inner).state.clone()
    }

    pub fn form(&self) -> FormModel {
        lock(&self.inner).form.clone()
    }

    /// Replaces the input values, as if the user had typed them.
    pub fn fill(&self, fields: OrderFields) {
        lock(&self.inner).form.fields = fields;
    }

    /// Submits whatever the form currently holds and returns the state the
    /// attempt ended in.
    ///
    /// Validation failures and transport errors are not returned as `Err`;
    /// they land in [`FormUiState::Error`] and on the error panel.
    pub async fn submit(&self) -> FormUiState {
        let attempt = AttemptId(self.last_attempt.fetch_add(1, Ordering::Relaxed) + 1);
        let fields = lock(&self.inner).form.fields.clone();

        let Some(order) = apply_event(
            &self.inner,
            FormEvent::Submit {
                attempt,
                fields,
                submitted_at: Utc::now(),
            },
        ) else {
            return self.state();
        };

        let outcome = self.send(attempt, &order).await;
        apply_event(&self.inner, outcome);
        self.state()
    }

    async fn send(&self, attempt: AttemptId, order: &OrderRequest) -> FormEvent {
        match self.transport.submit_order(order).await {
            Ok(SubmitOutcome::Accepted) => {
                info!(%attempt, telegram = %order.telegram, city = %order.city, "order accepted");
                FormEvent::Accepted { attempt }
            }
            Ok(SubmitOutcome::Rejected { status, message }) => {
                warn!(%attempt, status, ?message, "order rejected by backend");
                FormEvent::Rejected {
                    attempt,
                    status,
                    message,
                }
            }
            Err(error) => {
                warn!(%attempt, %error, "order transport failed");
                FormEvent::TransportFailed { attempt }
            }
        }
    }
}

fn lock(inner: &Mutex<ControllerInner>) -> MutexGuard<'_, ControllerInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs one transition under the lock and performs its local effects.
/// Returns the order to send, if the transition asked for one.
fn apply_event(shared: &Arc<Mutex<ControllerInner>>, event: FormEvent) -> Option<OrderRequest> {
    let mut guard = lock(shared);
    let inner = &mut *guard;

    if let FormEvent::ResetElapsed { panel, attempt } = &event {
        inner.resets.complete(*panel, *attempt);
    }

    let from = inner.state.name();
    let next = transition(&inner.state, event);
    if next.state == inner.state && next.effects.is_empty() {
        debug!(state = from, "order form event ignored");
        return None;
    }
    debug!(from, to = next.state.name(), "order form transition");

    if let FormUiState::Error {
        attempt,
        failure: SubmitFailure::Validation(err),
    } = &next.state
    {
        debug!(%attempt, kind = err.kind(), "order form rejected locally");
    }

    let mut outgoing = None;
    for effect in next.effects {
        match effect {
            Effect::SendOrder { attempt, order } => {
                debug!(%attempt, "order ready to send");
                outgoing = Some(order);
            }
            Effect::ScheduleReset { panel, attempt } => {
                let weak = Arc::downgrade(shared);
                inner.resets.schedule(panel, attempt, move || {
                    if let Some(shared) = weak.upgrade() {
                        apply_event(&shared, FormEvent::ResetElapsed { panel, attempt });
                    }
                });
            }
            Effect::CancelReset { panel } => inner.resets.cancel(panel),
            Effect::ClearFields => inner.form.clear_fields(),
        }
    }

    inner.state = next.state;
    inner.form.render(&inner.state, &inner.labels);
    outgoing
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
