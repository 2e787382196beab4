use std::sync::Arc;

use crate::notify::Notifier;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) notifier: Arc<dyn Notifier>,
}
