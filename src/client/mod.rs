//! Client side of the dashboard: an HTTP client for the proxy, cached data
//! hooks and the modal-state channel the admin screens coordinate through.

pub mod cache;
pub mod hooks;
pub mod http;
pub mod modal;

pub use cache::{ResourceState, Snapshot, SwrCache, SwrOptions};
pub use hooks::AdminHooks;
pub use http::{ClientError, DashboardApi, DashboardClient, SessionCookie};
pub use modal::{FileStorage, MemoryStorage, ModalChannel, ModalError, ModalKind, ModalStorage};

use serde_json::{json, Value};

/// Admin screens: data hooks plus the dialogs that edit them.
pub struct AdminPanel<A: DashboardApi> {
    hooks: AdminHooks<A>,
    modals: ModalChannel,
}

impl<A: DashboardApi> AdminPanel<A> {
    pub fn new(hooks: AdminHooks<A>, modals: ModalChannel) -> Self {
        Self { hooks, modals }
    }

    pub fn hooks(&self) -> &AdminHooks<A> {
        &self.hooks
    }

    pub fn modals(&self) -> &ModalChannel {
        &self.modals
    }

    /// Open or close a dialog: persist and announce the flag, then mirror it
    /// into the dialog's cache entry.
    pub fn handle_dialog(&self, kind: ModalKind, open: bool) -> Result<(), ModalError> {
        self.modals.set(kind, open)?;
        self.hooks.cache().mutate(kind.cache_key(), |current| {
            let mut state = match current {
                Some(Value::Object(map)) => Value::Object(map),
                _ => json!({}),
            };
            state["modal"] = Value::Bool(open);
            state
        });
        Ok(())
    }
}
