use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::debug;
use url::Url;

use super::binder::SessionBinder;
use super::handle::{Completion, DownloadHandle};
use super::lifecycle::{ActiveSet, Lifecycle};
use super::options::DownloadOptions;
use super::progress::{AggregateCounters, ProgressAccumulator};
use super::sequencer::{PendingRequest, QueueSequencer};
use crate::domain::{
    BindError, DoneState, DownloadError, DownloadItem, ItemId, SessionEvent, SubmitError,
};
use crate::host::{HostWindow, Shell};

#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    /// Directory used when a request names none; the shell's downloads folder otherwise.
    pub download_directory: Option<PathBuf>,
    /// Active items silent for longer than this are rejected by `reap_stalled`.
    pub stall_timeout: Option<Duration>,
}

/// What a session event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Paired with the request occupying the handshake slot.
    Started(ItemId),
    /// No handshake was outstanding, the session prompts for this one itself.
    Unclaimed(ItemId),
    Progressed(ItemId),
    Finished(ItemId, DoneState),
    /// Unknown item, or no window bound.
    Ignored,
}

/// Queues download requests against a single bound window.
///
/// Handshakes are serialized: one request at a time waits for its start
/// notification. Transfers are not; the queue advances as soon as an item
/// starts, so several items can be receiving bytes at once.
pub struct DownloadOrchestrator {
    config: OrchestratorConfig,
    shell: Box<dyn Shell>,
    binder: SessionBinder,
    sequencer: QueueSequencer,
    active: ActiveSet,
    progress: ProgressAccumulator,
}

impl DownloadOrchestrator {
    pub fn new(shell: Box<dyn Shell>, config: OrchestratorConfig) -> Self {
        Self {
            config,
            shell,
            binder: SessionBinder::default(),
            sequencer: QueueSequencer::default(),
            active: ActiveSet::default(),
            progress: ProgressAccumulator::default(),
        }
    }

    pub fn bind(&mut self, window: Box<dyn HostWindow>) -> Result<(), BindError> {
        self.binder.bind(window)?;
        debug!("window bound");
        Ok(())
    }

    /// Detaches from the window. Queued, awaiting and active requests can no
    /// longer settle through it and are rejected with `DownloadError::Unbound`.
    pub fn unbind(&mut self) -> bool {
        if !self.binder.is_bound() {
            return false;
        }
        for request in self.sequencer.drain_all() {
            request.completion.reject(DownloadError::Unbound);
        }
        self.lifecycle().abandon_all(DownloadError::Unbound);
        self.binder.unbind();
        debug!("window unbound");
        true
    }

    pub fn is_bound(&self) -> bool {
        self.binder.is_bound()
    }

    /// Queues a download. Fails before touching the queue when no window is bound.
    pub fn submit(
        &mut self,
        url: &str,
        options: DownloadOptions,
    ) -> Result<DownloadHandle, SubmitError> {
        if !self.binder.is_bound() {
            return Err(SubmitError::NotBound);
        }
        let url = Url::parse(url).map_err(|e| SubmitError::InvalidUrl(e.to_string()))?;

        let (completion, handle) = Completion::channel();
        debug!(%url, pending = self.sequencer.pending_len() + 1, "download queued");
        self.sequencer.enqueue(PendingRequest {
            url,
            options,
            completion,
        });
        self.advance();
        Ok(handle)
    }

    /// Drops queued requests that have not been handed to the session.
    /// In-flight and active items are untouched.
    pub fn clear_pending(&mut self) -> usize {
        let cleared = self.sequencer.clear_pending();
        let count = cleared.len();
        for request in cleared {
            request.completion.reject(DownloadError::Cleared);
        }
        if count > 0 {
            debug!(count, "pending downloads cleared");
        }
        count
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> Dispatch {
        if !self.binder.is_bound() {
            debug!(?event, "session event without a bound window");
            if let SessionEvent::WillDownload(item) = &event {
                item.prompt_for_save_path();
            }
            return Dispatch::Ignored;
        }
        match event {
            SessionEvent::WillDownload(item) => self.on_will_download(item),
            SessionEvent::Updated(id) => {
                if self.lifecycle().update(id, Instant::now()) {
                    Dispatch::Progressed(id)
                } else {
                    Dispatch::Ignored
                }
            }
            SessionEvent::Done(id, state) => {
                if self.lifecycle().finish(id, state) {
                    Dispatch::Finished(id, state)
                } else {
                    Dispatch::Ignored
                }
            }
        }
    }

    /// Rejects active items idle past the configured stall timeout.
    pub fn reap_stalled(&mut self, now: Instant) -> Vec<ItemId> {
        match self.config.stall_timeout {
            Some(timeout) => self.lifecycle().reap_stalled(now, timeout),
            None => Vec::new(),
        }
    }

    pub fn pending_len(&self) -> usize {
        self.sequencer.pending_len()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn is_awaiting_start(&self) -> bool {
        self.sequencer.is_awaiting_start()
    }

    pub fn counters(&self) -> AggregateCounters {
        self.progress.counters()
    }

    pub fn progress(&self) -> Option<f64> {
        self.progress.fraction()
    }

    pub fn active_items(&self) -> Vec<DownloadItem> {
        self.active.items().cloned().collect()
    }

    fn on_will_download(&mut self, item: DownloadItem) -> Dispatch {
        let id = item.id();
        let Some(request) = self.sequencer.take_slot() else {
            debug!(item = id.0, "start notification with no handshake outstanding");
            item.prompt_for_save_path();
            return Dispatch::Unclaimed(id);
        };

        let default_directory = self
            .config
            .download_directory
            .clone()
            .unwrap_or_else(|| self.shell.downloads_dir());
        self.lifecycle()
            .start(item, request, &default_directory, Instant::now());

        // Advance on start, not on finish: the next handshake begins while
        // this item is still transferring.
        self.advance();
        Dispatch::Started(id)
    }

    /// The only place a native download is initiated.
    fn advance(&mut self) {
        let Some(window) = self.binder.window_mut() else {
            return;
        };
        if let Some(url) = self.sequencer.advance() {
            debug!(%url, "requesting native download");
            window.download_url(url);
        }
    }

    fn lifecycle(&mut self) -> Lifecycle<'_> {
        Lifecycle {
            active: &mut self.active,
            progress: &mut self.progress,
            shell: self.shell.as_mut(),
            window: self.binder.window_mut(),
        }
    }
}
