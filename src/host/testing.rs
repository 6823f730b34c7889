use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use url::Url;

use super::{HostWindow, Shell};
use crate::domain::{ProgressBar, SubscriptionId};

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Subscribe(SubscriptionId),
    Unsubscribe(SubscriptionId),
    DownloadUrl(String),
    ProgressBar(ProgressBar),
    Badge(usize),
    DownloadFinished(PathBuf),
    ShowInFolder(PathBuf),
    ErrorBox(String, String),
}

/// Call log shared by a fake window and a fake shell.
#[derive(Debug, Clone, Default)]
pub struct HostLog {
    calls: Arc<Mutex<Vec<HostCall>>>,
}

impl HostLog {
    fn push(&self, call: HostCall) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::DownloadUrl(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn last_progress_bar(&self) -> Option<ProgressBar> {
        self.calls().into_iter().rev().find_map(|call| match call {
            HostCall::ProgressBar(bar) => Some(bar),
            _ => None,
        })
    }

    pub fn badges(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Badge(count) => Some(count),
                _ => None,
            })
            .collect()
    }
}

pub struct FakeWindow {
    log: HostLog,
    next_subscription: u64,
    destroyed: Arc<AtomicBool>,
}

impl FakeWindow {
    pub fn new(log: &HostLog) -> Self {
        Self {
            log: log.clone(),
            next_subscription: 1,
            destroyed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn destroyed_flag(&self) -> Arc<AtomicBool> {
        self.destroyed.clone()
    }
}

impl HostWindow for FakeWindow {
    fn subscribe(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.log.push(HostCall::Subscribe(id));
        id
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) {
        self.log.push(HostCall::Unsubscribe(subscription));
    }

    fn download_url(&mut self, url: &Url) {
        self.log.push(HostCall::DownloadUrl(url.to_string()));
    }

    fn set_progress_bar(&mut self, progress: ProgressBar) {
        self.log.push(HostCall::ProgressBar(progress));
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

pub struct FakeShell {
    log: HostLog,
    downloads: PathBuf,
    badge: bool,
}

impl FakeShell {
    pub fn new(log: &HostLog, downloads: impl Into<PathBuf>) -> Self {
        Self {
            log: log.clone(),
            downloads: downloads.into(),
            badge: true,
        }
    }

    pub fn without_badge(mut self) -> Self {
        self.badge = false;
        self
    }
}

impl Shell for FakeShell {
    fn downloads_dir(&self) -> PathBuf {
        self.downloads.clone()
    }

    fn supports_badge(&self) -> bool {
        self.badge
    }

    fn set_badge_count(&mut self, count: usize) {
        self.log.push(HostCall::Badge(count));
    }

    fn download_finished(&mut self, path: &Path) {
        self.log.push(HostCall::DownloadFinished(path.to_path_buf()));
    }

    fn show_item_in_folder(&mut self, path: &Path) {
        self.log.push(HostCall::ShowInFolder(path.to_path_buf()));
    }

    fn show_error_box(&mut self, title: &str, message: &str) {
        self.log
            .push(HostCall::ErrorBox(title.to_string(), message.to_string()));
    }
}
