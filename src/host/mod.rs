//! Capabilities the orchestrator calls into: the bound window's session and
//! the OS shell around it.

pub mod desktop;
pub mod http;
#[cfg(test)]
pub mod testing;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use url::Url;

use crate::domain::{ProgressBar, SubscriptionId};

pub use desktop::DesktopShell;
pub use http::HttpSession;

/// A host window and the browsing session that performs its downloads.
pub trait HostWindow: Send {
    /// Starts routing the session's download notifications to the orchestrator.
    fn subscribe(&mut self) -> SubscriptionId;

    fn unsubscribe(&mut self, subscription: SubscriptionId);

    /// Asks the session to begin a native download. The matching
    /// `SessionEvent::WillDownload` arrives later as a separate event.
    fn download_url(&mut self, url: &Url);

    fn set_progress_bar(&mut self, progress: ProgressBar);

    fn is_destroyed(&self) -> bool {
        false
    }
}

/// One-way OS side effects.
pub trait Shell: Send {
    fn downloads_dir(&self) -> PathBuf {
        dirs::download_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Badge counts only exist on macOS docks and Linux launchers.
    fn supports_badge(&self) -> bool {
        cfg!(any(target_os = "macos", target_os = "linux"))
    }

    fn set_badge_count(&mut self, count: usize);

    fn download_finished(&mut self, _path: &Path) {}

    fn show_item_in_folder(&mut self, path: &Path);

    fn show_error_box(&mut self, title: &str, message: &str);
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndicatorState {
    pub progress_bar: ProgressBar,
    pub badge_count: usize,
    /// A finished download is waiting for the window to ask for attention.
    pub attention: bool,
}

/// Window indicators written by the host side effects and read by the UI.
#[derive(Debug, Clone, Default)]
pub struct Indicators {
    state: Arc<Mutex<IndicatorState>>,
}

impl Indicators {
    fn lock(&self) -> MutexGuard<'_, IndicatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> IndicatorState {
        *self.lock()
    }

    pub fn set_progress_bar(&self, progress: ProgressBar) {
        self.lock().progress_bar = progress;
    }

    pub fn set_badge_count(&self, count: usize) {
        self.lock().badge_count = count;
    }

    pub fn request_attention(&self) {
        self.lock().attention = true;
    }

    /// Clears a pending attention request, returning whether one was set.
    pub fn take_attention(&self) -> bool {
        std::mem::take(&mut self.lock().attention)
    }
}
