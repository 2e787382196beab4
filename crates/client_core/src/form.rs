use shared::validation::OrderFields;

use crate::state::FormUiState;

pub const DEFAULT_SUBMIT_LABEL: &str = "SEND ORDER";
pub const DEFAULT_SENDING_LABEL: &str = "SENDING...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitLabels {
    pub idle: String,
    pub sending: String,
}

impl Default for SubmitLabels {
    fn default() -> Self {
        Self {
            idle: DEFAULT_SUBMIT_LABEL.into(),
            sending: DEFAULT_SENDING_LABEL.into(),
        }
    }
}

/// Everything the page markup exposes to the order form: the three inputs,
/// the form itself, both message panels and the submit button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormModel {
    pub fields: OrderFields,
    pub form_visible: bool,
    pub success_visible: bool,
    pub success_text: String,
    pub error_visible: bool,
    pub error_text: String,
    pub submit_enabled: bool,
    pub submit_label: String,
}

impl FormModel {
    pub fn new(labels: &SubmitLabels) -> Self {
        let mut model = Self {
            fields: OrderFields::default(),
            form_visible: true,
            success_visible: false,
            success_text: String::new(),
            error_visible: false,
            error_text: String::new(),
            submit_enabled: true,
            submit_label: String::new(),
        };
        model.render(&FormUiState::Idle, labels);
        model
    }

    /// Projects `state` onto the visibility and enabled flags. Input values
    /// are left alone; only [`FormModel::clear_fields`] touches them.
    pub fn render(&mut self, state: &FormUiState, labels: &SubmitLabels) {
        let submitting = matches!(state, FormUiState::Submitting { .. });

        self.form_visible = !matches!(state, FormUiState::Success { .. });
        self.success_visible = matches!(state, FormUiState::Success { .. });
        self.error_visible = matches!(state, FormUiState::Error { .. });
        if let FormUiState::Error { failure, .. } = state {
            self.error_text = failure.user_message();
        }

        self.submit_enabled = !submitting;
        self.submit_label = if submitting {
            labels.sending.clone()
        } else {
            labels.idle.clone()
        };
    }

    pub fn clear_fields(&mut self) {
        self.fields = OrderFields::default();
    }
}
