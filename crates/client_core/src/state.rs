//! Order form state and its transition function.
//!
//! [`transition`] is pure: it maps the current [`FormUiState`] and a
//! [`FormEvent`] to the next state plus the [`Effect`]s the caller has to run.
//! Everything visible on the form is derived from the state afterwards, see
//! [`crate::form::FormModel::render`].

use chrono::{DateTime, Utc};
use shared::{
    domain::AttemptId,
    protocol::OrderRequest,
    validation::{OrderFields, ValidOrder, ValidationError},
};

pub const DEFAULT_FAILURE_MESSAGE: &str = "submission failed, try again";
pub const CONNECTIVITY_FAILURE_MESSAGE: &str = "connection problem, check your internet";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormUiState {
    Idle,
    Submitting {
        attempt: AttemptId,
    },
    Success {
        attempt: AttemptId,
    },
    Error {
        attempt: AttemptId,
        failure: SubmitFailure,
    },
}

impl FormUiState {
    pub fn attempt(&self) -> Option<AttemptId> {
        match self {
            Self::Idle => None,
            Self::Submitting { attempt }
            | Self::Success { attempt }
            | Self::Error { attempt, .. } => Some(*attempt),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting { .. } => "submitting",
            Self::Success { .. } => "success",
            Self::Error { .. } => "error",
        }
    }

    /// A new submit is only accepted while the form is shown and the submit
    /// control is enabled.
    pub fn accepts_submit(&self) -> bool {
        matches!(self, Self::Idle | Self::Error { .. })
    }
}

/// Why an attempt ended in [`FormUiState::Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitFailure {
    Validation(ValidationError),
    Server { status: u16, message: Option<String> },
    Transport,
}

impl SubmitFailure {
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Server { message, .. } => message
                .clone()
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            Self::Transport => CONNECTIVITY_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Message panels that reset themselves after a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Submit {
        attempt: AttemptId,
        fields: OrderFields,
        submitted_at: DateTime<Utc>,
    },
    Accepted {
        attempt: AttemptId,
    },
    Rejected {
        attempt: AttemptId,
        status: u16,
        message: Option<String>,
    },
    TransportFailed {
        attempt: AttemptId,
    },
    ResetElapsed {
        panel: Panel,
        attempt: AttemptId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SendOrder {
        attempt: AttemptId,
        order: OrderRequest,
    },
    ScheduleReset {
        panel: Panel,
        attempt: AttemptId,
    },
    CancelReset {
        panel: Panel,
    },
    ClearFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: FormUiState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(state: FormUiState, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }

    fn unchanged(state: &FormUiState) -> Self {
        Self::to(state.clone(), Vec::new())
    }
}

pub fn transition(state: &FormUiState, event: FormEvent) -> Transition {
    match (state, event) {
        (
            FormUiState::Idle | FormUiState::Error { .. },
            FormEvent::Submit {
                attempt,
                fields,
                submitted_at,
            },
        ) => {
            let mut effects = Vec::new();
            if matches!(state, FormUiState::Error { .. }) {
                effects.push(Effect::CancelReset {
                    panel: Panel::Error,
                });
            }

            match ValidOrder::try_from(&fields) {
                Ok(order) => {
                    effects.push(Effect::SendOrder {
                        attempt,
                        order: order.into_request(submitted_at),
                    });
                    Transition::to(FormUiState::Submitting { attempt }, effects)
                }
                Err(err) => {
                    effects.push(Effect::ScheduleReset {
                        panel: Panel::Error,
                        attempt,
                    });
                    Transition::to(
                        FormUiState::Error {
                            attempt,
                            failure: SubmitFailure::Validation(err),
                        },
                        effects,
                    )
                }
            }
        }
        (FormUiState::Submitting { attempt: current }, FormEvent::Accepted { attempt })
            if *current == attempt =>
        {
            Transition::to(
                FormUiState::Success { attempt },
                vec![Effect::ScheduleReset {
                    panel: Panel::Success,
                    attempt,
                }],
            )
        }
        (
            FormUiState::Submitting { attempt: current },
            FormEvent::Rejected {
                attempt,
                status,
                message,
            },
        ) if *current == attempt => {
            let message = message.filter(|m| !m.is_empty());
            error_entered(attempt, SubmitFailure::Server { status, message })
        }
        (FormUiState::Submitting { attempt: current }, FormEvent::TransportFailed { attempt })
            if *current == attempt =>
        {
            error_entered(attempt, SubmitFailure::Transport)
        }
        (
            FormUiState::Success { attempt: current },
            FormEvent::ResetElapsed {
                panel: Panel::Success,
                attempt,
            },
        ) if *current == attempt => Transition::to(FormUiState::Idle, vec![Effect::ClearFields]),
        (
            FormUiState::Error {
                attempt: current, ..
            },
            FormEvent::ResetElapsed {
                panel: Panel::Error,
                attempt,
            },
        ) if *current == attempt => Transition::to(FormUiState::Idle, Vec::new()),
        // Submits while in flight or while the success panel covers the form,
        // stale resets, and outcomes for attempts that are no longer current.
        _ => Transition::unchanged(state),
    }
}

fn error_entered(attempt: AttemptId, failure: SubmitFailure) -> Transition {
    Transition::to(
        FormUiState::Error { attempt, failure },
        vec![Effect::ScheduleReset {
            panel: Panel::Error,
            attempt,
        }],
    )
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
