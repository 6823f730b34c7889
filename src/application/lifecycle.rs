use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::filename;
use super::handle::Completion;
use super::options::DownloadOptions;
use super::progress::{self, ProgressAccumulator};
use super::sequencer::PendingRequest;
use crate::domain::{DoneState, DownloadError, DownloadItem, ItemId, ProgressBar};
use crate::host::{HostWindow, Shell};
use crate::utils::render_template;

/// Wiring for one started item. Dropping it is the item's unsubscription.
pub(crate) struct ItemListener {
    item: DownloadItem,
    options: DownloadOptions,
    directory: PathBuf,
    file_path: Option<PathBuf>,
    counted_total: u64,
    last_activity: Instant,
    completion: Completion,
}

/// Items between their start notification and their terminal notification.
#[derive(Default)]
pub(crate) struct ActiveSet {
    listeners: BTreeMap<ItemId, ItemListener>,
}

impl ActiveSet {
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &DownloadItem> {
        self.listeners.values().map(|listener| &listener.item)
    }

    fn byte_counts(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.listeners
            .values()
            .map(|listener| (listener.item.received_bytes(), listener.counted_total))
    }

    fn badge_requested(&self) -> bool {
        self.listeners.values().any(|listener| listener.options.show_badge)
    }
}

/// Reacts to native item notifications for the orchestrator.
pub(crate) struct Lifecycle<'a> {
    pub active: &'a mut ActiveSet,
    pub progress: &'a mut ProgressAccumulator,
    pub shell: &'a mut (dyn Shell + 'static),
    pub window: Option<&'a mut (dyn HostWindow + 'static)>,
}

impl Lifecycle<'_> {
    /// Runs when a request's start notification arrives: counts the item,
    /// decides its destination and arms its listener.
    pub fn start(
        &mut self,
        item: DownloadItem,
        request: PendingRequest,
        default_directory: &Path,
        now: Instant,
    ) {
        let PendingRequest {
            url,
            mut options,
            completion,
        } = request;

        let counted_total = item.total_bytes();
        self.progress.add_total(counted_total);

        let directory = options
            .directory
            .clone()
            .unwrap_or_else(|| default_directory.to_path_buf());

        let file_path = if options.save_as {
            item.prompt_for_save_path();
            None
        } else {
            let resolved = filename::resolve(
                &directory,
                options.filename.as_deref(),
                &item.filename(),
                &item.mime_type(),
            );
            debug!(
                path = %resolved.path.display(),
                naming = ?resolved.naming,
                collision_avoided = resolved.collision_avoided,
                "resolved destination"
            );
            item.set_save_path(&resolved.path);
            Some(resolved.path)
        };

        if let Some(on_started) = options.on_started.as_mut() {
            on_started(&item);
        }

        info!(item = item.id().0, %url, total_bytes = counted_total, "download started");
        self.active.listeners.insert(
            item.id(),
            ItemListener {
                item,
                options,
                directory,
                file_path,
                counted_total,
                last_activity: now,
                completion,
            },
        );
    }

    /// Handles an "updated" notification. `false` when the item is not active.
    pub fn update(&mut self, id: ItemId, now: Instant) -> bool {
        let Some(listener) = self.active.listeners.get_mut(&id) else {
            return false;
        };
        listener.last_activity = now;

        let total = listener.item.total_bytes();
        if total != listener.counted_total {
            self.progress.retotal(listener.counted_total, total);
            listener.counted_total = total;
        }
        let item_fraction = progress::fraction(listener.item.received_bytes(), total);
        let show_badge = listener.options.show_badge;

        self.progress.recompute(self.active.byte_counts());
        if show_badge {
            self.refresh_badge();
        }
        self.set_progress_bar(ProgressBar::from(self.progress.fraction()));

        if let Some(listener) = self.active.listeners.get_mut(&id) {
            if let Some(on_progress) = listener.options.on_progress.as_mut() {
                on_progress(item_fraction);
            }
        }
        true
    }

    /// Handles a terminal notification. `false` when the item is not active.
    pub fn finish(&mut self, id: ItemId, state: DoneState) -> bool {
        let Some(mut listener) = self.remove(id) else {
            return false;
        };

        match state {
            DoneState::Cancelled => {
                info!(item = id.0, "download cancelled");
                if let Some(on_cancel) = listener.options.on_cancel.as_mut() {
                    on_cancel(&listener.item);
                }
            }
            DoneState::Interrupted => {
                let message = render_template(
                    listener.options.error_message_template(),
                    &listener.item.filename(),
                );
                let title = listener.options.error_title_text().to_string();
                warn!(item = id.0, %message, "download interrupted");
                if listener.options.show_error_dialog {
                    self.shell.show_error_box(&title, &message);
                }
                listener
                    .completion
                    .reject(DownloadError::Interrupted { title, message });
            }
            DoneState::Completed => {
                let saved = listener.item.save_path().or(listener.file_path);
                if let Some(path) = &saved {
                    self.shell.download_finished(path);
                }
                if listener.options.open_folder_when_done {
                    let reveal = saved
                        .unwrap_or_else(|| listener.directory.join(listener.item.filename()));
                    self.shell.show_item_in_folder(&reveal);
                }
                info!(item = id.0, "download completed");
                listener.completion.resolve(listener.item);
            }
        }
        true
    }

    /// Rejects active items that have not reported progress within `timeout`.
    pub fn reap_stalled(&mut self, now: Instant, timeout: Duration) -> Vec<ItemId> {
        let stalled: Vec<ItemId> = self
            .active
            .listeners
            .iter()
            .filter(|(_, listener)| now.saturating_duration_since(listener.last_activity) > timeout)
            .map(|(id, _)| *id)
            .collect();

        for id in &stalled {
            if let Some(listener) = self.remove(*id) {
                let filename = listener.item.filename();
                warn!(item = id.0, %filename, "download stalled");
                listener.completion.reject(DownloadError::Stalled {
                    filename,
                    idle_secs: timeout.as_secs(),
                });
            }
        }
        stalled
    }

    /// Drops every listener, rejecting each request with `error`.
    pub fn abandon_all(&mut self, error: DownloadError) {
        if self.active.is_empty() {
            return;
        }
        let badge = self.active.badge_requested();
        for (_, listener) in std::mem::take(&mut self.active.listeners) {
            listener.completion.reject(error.clone());
        }
        if badge {
            self.refresh_badge();
        }
        self.set_progress_bar(ProgressBar::Hidden);
        self.progress.reset();
    }

    /// Every removal goes through here so the counters stay consistent.
    fn remove(&mut self, id: ItemId) -> Option<ItemListener> {
        let listener = self.active.listeners.remove(&id)?;

        let total = listener.item.total_bytes();
        if total != listener.counted_total {
            self.progress.retotal(listener.counted_total, total);
        }
        self.progress.complete(total);

        if listener.options.show_badge {
            self.refresh_badge();
        }

        if self.active.is_empty() {
            self.set_progress_bar(ProgressBar::Hidden);
            self.progress.reset();
        } else {
            self.progress.recompute(self.active.byte_counts());
            self.set_progress_bar(ProgressBar::from(self.progress.fraction()));
        }
        Some(listener)
    }

    fn refresh_badge(&mut self) {
        if self.shell.supports_badge() {
            self.shell.set_badge_count(self.active.len());
        }
    }

    fn set_progress_bar(&mut self, progress: ProgressBar) {
        if let Some(window) = self.window.as_deref_mut() {
            if !window.is_destroyed() {
                window.set_progress_bar(progress);
            }
        }
    }
}
