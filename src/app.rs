use std::path::PathBuf;
use std::time::{Duration, Instant};

use iced::{window, Subscription, Task};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::application::{Dispatch, DownloadOrchestrator, DownloadResult};
use crate::config::Settings;
use crate::domain::{DownloadError, SessionEvent};
use crate::host::{DesktopShell, HttpSession, Indicators};
use crate::ui::{DownloadMessage, DownloadView, ItemRow, QueueSummary};

pub struct DownloadApp {
    view: DownloadView,
    orchestrator: DownloadOrchestrator,
    // Clone of the bound window, kept for cancellation
    session: HttpSession,
    indicators: Indicators,
    settings: Settings,
}

impl DownloadApp {
    pub fn boot(runtime: Handle, settings: Settings) -> (Self, Task<Message>) {
        let (session, events) = HttpSession::new(runtime);
        let indicators = session.indicators();

        let mut orchestrator = DownloadOrchestrator::new(
            Box::new(DesktopShell::new(indicators.clone())),
            settings.orchestrator_config(),
        );
        if let Err(e) = orchestrator.bind(Box::new(session.clone())) {
            warn!(error = %e, "failed to bind window session");
        }

        let view = DownloadView {
            directory: settings.download_directory.clone(),
            ..DownloadView::default()
        };

        let app = Self {
            view,
            orchestrator,
            session,
            indicators,
            settings,
        };
        (app, Task::stream(events).map(Message::Session))
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    FolderSelected(Option<PathBuf>),
    /// Native notification from the bound session
    Session(SessionEvent),
    /// (URL, outcome) once a request's handle settles
    DownloadSettled(String, DownloadResult),
    Tick,
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::DownloadPressed => return submit(app),
                DownloadMessage::ClearQueuePressed => {
                    let cleared = app.orchestrator.clear_pending();
                    app.view.status_message = format!("Removed {} queued download(s)", cleared);
                }
                DownloadMessage::ChooseFolderPressed => {
                    return Task::perform(
                        async {
                            rfd::AsyncFileDialog::new()
                                .pick_folder()
                                .await
                                .map(|handle| handle.path().to_path_buf())
                        },
                        Message::FolderSelected,
                    );
                }
                DownloadMessage::CancelPressed(id) => {
                    if !app.session.cancel(id) {
                        debug!(item = id.0, "cancel requested for a finished transfer");
                    }
                }
                DownloadMessage::UrlChanged(_) | DownloadMessage::SaveAsToggled => {}
            }
        }
        Message::FolderSelected(selected) => {
            if let Some(dir) = selected {
                app.view.status_message = format!("Saving to: {}", dir.display());
                app.view.directory = Some(dir);
            }
        }
        Message::Session(event) => {
            if let Dispatch::Unclaimed(id) = app.orchestrator.handle_event(event) {
                debug!(item = id.0, "download started outside the queue");
            }
            if app.indicators.take_attention() {
                return request_attention();
            }
        }
        Message::DownloadSettled(url, result) => {
            app.view.status_message = match result {
                Ok(item) => match item.save_path() {
                    Some(path) => format!("Saved: {}", path.display()),
                    None => format!("Finished: {}", url),
                },
                Err(DownloadError::Unsettled) => format!("Cancelled: {}", url),
                Err(e) => format!("Download failed: {}", e),
            };
        }
        Message::Tick => {
            for id in app.orchestrator.reap_stalled(Instant::now()) {
                app.session.cancel(id);
            }
        }
    }
    Task::none()
}

/// Bounces the dock icon once for a finished download.
fn request_attention() -> Task<Message> {
    window::oldest().and_then(|id| {
        window::request_user_attention(id, Some(window::UserAttention::Informational))
    })
}

fn submit(app: &mut DownloadApp) -> Task<Message> {
    let url = app.view.url_input.trim().to_string();
    if url.is_empty() {
        return Task::none();
    }

    let mut options = app
        .settings
        .download_options()
        .save_as(app.view.save_as)
        .on_cancel(|item| info!(item = item.id().0, name = %item.filename(), "cancelled by user"));
    options.directory = app.view.directory.clone();

    match app.orchestrator.submit(&url, options) {
        Ok(handle) => {
            app.view.url_input.clear();
            app.view.status_message = format!("Queued: {}", url);
            Task::perform(handle, move |result| {
                Message::DownloadSettled(url.clone(), result)
            })
        }
        Err(e) => {
            app.view.status_message = e.to_string();
            Task::none()
        }
    }
}

pub fn subscription(app: &DownloadApp) -> Subscription<Message> {
    if app.settings.stall_timeout_secs.is_some() {
        iced::time::every(Duration::from_secs(1)).map(|_| Message::Tick)
    } else {
        Subscription::none()
    }
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    let rows = app
        .orchestrator
        .active_items()
        .iter()
        .map(ItemRow::from)
        .collect();
    let summary = QueueSummary {
        pending: app.orchestrator.pending_len(),
        active: app.orchestrator.active_len(),
        awaiting_start: app.orchestrator.is_awaiting_start(),
        indicators: app.indicators.snapshot(),
    };
    app.view.view(rows, summary).map(Message::UiMessage)
}
