use std::{collections::HashMap, time::Duration};

use shared::domain::AttemptId;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::state::Panel;

struct PendingReset {
    attempt: AttemptId,
    handle: JoinHandle<()>,
}

/// At most one pending reset per panel. Scheduling a panel again aborts the
/// task it replaces.
pub struct DeferredResets {
    delay: Duration,
    pending: HashMap<Panel, PendingReset>,
}

impl DeferredResets {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, panel: Panel, attempt: AttemptId, on_elapsed: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_elapsed();
        });

        if let Some(previous) = self.pending.insert(panel, PendingReset { attempt, handle }) {
            previous.handle.abort();
            debug!(
                ?panel,
                replaced = %previous.attempt,
                %attempt,
                "replaced pending panel reset"
            );
        }
    }

    pub fn cancel(&mut self, panel: Panel) {
        if let Some(previous) = self.pending.remove(&panel) {
            previous.handle.abort();
            debug!(?panel, attempt = %previous.attempt, "cancelled pending panel reset");
        }
    }

    /// Forgets the entry for `panel` once its task has fired, unless a newer
    /// attempt has taken the slot in the meantime.
    pub fn complete(&mut self, panel: Panel, attempt: AttemptId) {
        if self
            .pending
            .get(&panel)
            .is_some_and(|pending| pending.attempt == attempt)
        {
            self.pending.remove(&panel);
        }
    }

    pub fn pending_attempt(&self, panel: Panel) -> Option<AttemptId> {
        self.pending.get(&panel).map(|pending| pending.attempt)
    }
}

impl Drop for DeferredResets {
    fn drop(&mut self) {
        for (_, pending) in self.pending.drain() {
            pending.handle.abort();
        }
    }
}
