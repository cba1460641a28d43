//! Modal-state channel.
//!
//! Each dialog has a boolean flag persisted as `{"modal": bool}` under a
//! fixed storage key. Writers store the flag and then notify; subscribers
//! re-read storage when notified, never on the write itself.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalKind {
    User,
    Package,
    Subscription,
    Coach,
}

impl ModalKind {
    pub const ALL: [ModalKind; 4] = [ModalKind::User, ModalKind::Package, ModalKind::Subscription, ModalKind::Coach];

    /// Key the flag is persisted under.
    pub fn storage_key(self) -> &'static str {
        match self {
            ModalKind::User => "userModalState",
            ModalKind::Package => "packageModalState",
            ModalKind::Subscription => "subscriptionModalState",
            ModalKind::Coach => "coachModalState",
        }
    }

    /// Cache entry mirrored by [`AdminPanel::handle_dialog`](super::AdminPanel::handle_dialog).
    pub fn cache_key(self) -> &'static str {
        match self {
            ModalKind::User => "api/admin/users/modal",
            ModalKind::Package => "api/admin/packages/modal",
            ModalKind::Subscription => "api/admin/subscriptions/modal",
            ModalKind::Coach => "api/admin/coaches/modal",
        }
    }
}

impl fmt::Display for ModalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModalKind::User => "user",
            ModalKind::Package => "package",
            ModalKind::Subscription => "subscription",
            ModalKind::Coach => "coach",
        })
    }
}

impl FromStr for ModalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" | "users" => Ok(ModalKind::User),
            "package" | "packages" | "plan" | "plans" => Ok(ModalKind::Package),
            "subscription" | "subscriptions" => Ok(ModalKind::Subscription),
            "coach" | "coaches" => Ok(ModalKind::Coach),
            other => Err(format!("unknown dialog '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ModalState {
    modal: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ModalError {
    #[error("modal storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("modal storage is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key/value store with browser local-storage semantics.
pub trait ModalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, ModalError>;
    fn set_item(&self, key: &str, value: String) -> Result<(), ModalError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl ModalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ModalError> {
        let items = self.items.read().unwrap_or_else(|p| p.into_inner());
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: String) -> Result<(), ModalError> {
        let mut items = self.items.write().unwrap_or_else(|p| p.into_inner());
        items.insert(key.to_string(), value);
        Ok(())
    }
}

/// All keys in one pretty-printed JSON object on disk.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> Result<HashMap<String, String>, ModalError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Sibling file the next version is written to before it replaces `path`.
    fn staging_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "modal.json".to_string());
        path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
    }
}

impl ModalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ModalError> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: String) -> Result<(), ModalError> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut items = match self.read_all() {
            Ok(items) => items,
            Err(ModalError::Json(e)) => {
                tracing::warn!("{} is unreadable, starting over: {}", self.path.display(), e);
                HashMap::new()
            }
            Err(e) => return Err(e),
        };
        items.insert(key.to_string(), value);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Readers see either the old file or the new one, never a partial write
        let staging = Self::staging_path(&self.path);
        fs::write(&staging, serde_json::to_string_pretty(&items)?)?;
        if let Err(e) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }
        Ok(())
    }
}

type Listener = Arc<dyn Fn(bool) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

pub struct ModalChannel {
    storage: Arc<dyn ModalStorage>,
    listeners: Mutex<Vec<(SubscriptionId, ModalKind, Listener)>>,
    next_id: AtomicU64,
}

impl ModalChannel {
    pub fn new(storage: Arc<dyn ModalStorage>) -> Self {
        Self {
            storage,
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::default()))
    }

    /// Persisted flag for `kind`. Missing or unreadable entries read as closed.
    pub fn get(&self, kind: ModalKind) -> bool {
        match self.storage.get_item(kind.storage_key()) {
            Ok(Some(raw)) => serde_json::from_str::<ModalState>(&raw).map(|s| s.modal).unwrap_or(false),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("could not read {}: {}", kind.storage_key(), e);
                false
            }
        }
    }

    /// Store the flag without telling anyone.
    pub fn write(&self, kind: ModalKind, open: bool) -> Result<(), ModalError> {
        let value = serde_json::to_string(&ModalState { modal: open })?;
        self.storage.set_item(kind.storage_key(), value)
    }

    /// Store the flag, then notify every subscriber.
    pub fn set(&self, kind: ModalKind, open: bool) -> Result<(), ModalError> {
        self.write(kind, open)?;
        tracing::debug!("{} dialog {}", kind, if open { "opened" } else { "closed" });
        self.notify();
        Ok(())
    }

    /// Run every subscriber synchronously with its flag re-read from storage.
    pub fn notify(&self) {
        let listeners: Vec<(ModalKind, Listener)> = {
            let guard = self.listeners.lock().unwrap_or_else(|p| p.into_inner());
            guard.iter().map(|(_, kind, l)| (*kind, Arc::clone(l))).collect()
        };
        for (kind, listener) in listeners {
            listener(self.get(kind));
        }
    }

    pub fn subscribe(&self, kind: ModalKind, listener: impl Fn(bool) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut guard = self.listeners.lock().unwrap_or_else(|p| p.into_inner());
        guard.push((id, kind, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut guard = self.listeners.lock().unwrap_or_else(|p| p.into_inner());
        guard.retain(|(sid, _, _)| *sid != id);
    }
}
