use std::path::PathBuf;

use crate::domain::DownloadItem;

pub const DEFAULT_ERROR_MESSAGE: &str = "The download of {filename} was interrupted";
pub const DEFAULT_ERROR_TITLE: &str = "Download Error";

pub type ItemCallback = Box<dyn FnMut(&DownloadItem) + Send>;
/// Receives the item's own fraction, `None` while its size is unknown.
pub type ProgressCallback = Box<dyn FnMut(Option<f64>) + Send>;

/// Per-request options for [`DownloadOrchestrator::submit`](super::DownloadOrchestrator::submit).
pub struct DownloadOptions {
    /// Target directory, the platform downloads folder when unset.
    pub directory: Option<PathBuf>,
    /// Exact filename to use; skips extension inference and collision checks.
    pub filename: Option<String>,
    /// Let the user pick the destination instead of setting one.
    pub save_as: bool,
    /// Interruption message template, `{filename}` is substituted.
    pub error_message: Option<String>,
    pub error_title: Option<String>,
    pub show_error_dialog: bool,
    pub open_folder_when_done: bool,
    pub show_badge: bool,
    pub on_started: Option<ItemCallback>,
    pub on_progress: Option<ProgressCallback>,
    pub on_cancel: Option<ItemCallback>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            directory: None,
            filename: None,
            save_as: false,
            error_message: None,
            error_title: None,
            show_error_dialog: false,
            open_folder_when_done: false,
            show_badge: true,
            on_started: None,
            on_progress: None,
            on_cancel: None,
        }
    }
}

impl DownloadOptions {
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn save_as(mut self, save_as: bool) -> Self {
        self.save_as = save_as;
        self
    }

    pub fn error_message(mut self, template: impl Into<String>) -> Self {
        self.error_message = Some(template.into());
        self
    }

    pub fn on_started(mut self, callback: impl FnMut(&DownloadItem) + Send + 'static) -> Self {
        self.on_started = Some(Box::new(callback));
        self
    }

    pub fn on_progress(mut self, callback: impl FnMut(Option<f64>) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn on_cancel(mut self, callback: impl FnMut(&DownloadItem) + Send + 'static) -> Self {
        self.on_cancel = Some(Box::new(callback));
        self
    }

    pub(crate) fn error_message_template(&self) -> &str {
        self.error_message.as_deref().unwrap_or(DEFAULT_ERROR_MESSAGE)
    }

    pub(crate) fn error_title_text(&self) -> &str {
        self.error_title.as_deref().unwrap_or(DEFAULT_ERROR_TITLE)
    }
}
