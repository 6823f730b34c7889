use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneState {
    Completed,
    Cancelled,
    Interrupted,
}

/// Where the native layer should write an item once its start event was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Undecided,
    Path(PathBuf),
    Prompt,
}

/// Value pushed to the host window's progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ProgressBar {
    Value(f64),
    /// Bytes are flowing but the expected total is unknown.
    Indeterminate,
    #[default]
    Hidden,
}

impl From<Option<f64>> for ProgressBar {
    fn from(fraction: Option<f64>) -> Self {
        match fraction {
            Some(value) => ProgressBar::Value(value),
            None => ProgressBar::Indeterminate,
        }
    }
}

/// Notifications raised by a host session's native download layer.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    WillDownload(DownloadItem),
    Updated(ItemId),
    Done(ItemId, DoneState),
}

#[derive(Debug)]
struct ItemState {
    received_bytes: u64,
    total_bytes: u64,
    mime_type: String,
    filename: String,
    destination: Destination,
    save_path: Option<PathBuf>,
    state: Option<DoneState>,
}

/// Handle to one native transfer, shared by the native layer and the orchestrator.
#[derive(Debug, Clone)]
pub struct DownloadItem {
    id: ItemId,
    url: Url,
    state: Arc<Mutex<ItemState>>,
    decided: Arc<Notify>,
}

impl DownloadItem {
    pub fn new(
        id: ItemId,
        url: Url,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        total_bytes: u64,
    ) -> Self {
        Self {
            id,
            url,
            state: Arc::new(Mutex::new(ItemState {
                received_bytes: 0,
                total_bytes,
                mime_type: mime_type.into(),
                filename: filename.into(),
                destination: Destination::Undecided,
                save_path: None,
                state: None,
            })),
            decided: Arc::new(Notify::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ItemState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn received_bytes(&self) -> u64 {
        self.lock().received_bytes
    }

    /// Expected size in bytes, 0 when the native layer does not know it.
    pub fn total_bytes(&self) -> u64 {
        self.lock().total_bytes
    }

    pub fn mime_type(&self) -> String {
        self.lock().mime_type.clone()
    }

    /// Name suggested by the native layer.
    pub fn filename(&self) -> String {
        self.lock().filename.clone()
    }

    pub fn save_path(&self) -> Option<PathBuf> {
        self.lock().save_path.clone()
    }

    pub fn state(&self) -> Option<DoneState> {
        self.lock().state
    }

    pub fn destination(&self) -> Destination {
        self.lock().destination.clone()
    }

    pub fn set_save_path(&self, path: &Path) {
        {
            let mut state = self.lock();
            state.destination = Destination::Path(path.to_path_buf());
            state.save_path = Some(path.to_path_buf());
        }
        self.decided.notify_one();
    }

    /// Leaves the destination to the user.
    pub fn prompt_for_save_path(&self) {
        self.lock().destination = Destination::Prompt;
        self.decided.notify_one();
    }

    /// Resolves once `set_save_path` or `prompt_for_save_path` has been called.
    pub async fn destination_decided(&self) -> Destination {
        loop {
            let destination = self.destination();
            if destination != Destination::Undecided {
                return destination;
            }
            self.decided.notified().await;
        }
    }

    pub fn record_save_path(&self, path: &Path) {
        self.lock().save_path = Some(path.to_path_buf());
    }

    pub fn set_received_bytes(&self, bytes: u64) {
        self.lock().received_bytes = bytes;
    }

    pub fn add_received_bytes(&self, bytes: u64) {
        let mut state = self.lock();
        state.received_bytes = state.received_bytes.saturating_add(bytes);
    }

    pub fn set_total_bytes(&self, bytes: u64) {
        self.lock().total_bytes = bytes;
    }

    pub fn finish(&self, state: DoneState) {
        self.lock().state = Some(state);
    }
}

/// Two handles are equal when they name the same native transfer.
impl PartialEq for DownloadItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DownloadItem {}
