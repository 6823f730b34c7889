use std::path::PathBuf;

use iced::{
    widget::{button, column, progress_bar, row, scrollable, text, text_input, Column, Space},
    Element, Length,
};

use crate::domain::{DownloadItem, ItemId, ProgressBar};
use crate::host::IndicatorState;

/// Main view state
pub struct DownloadView {
    pub url_input: String,
    pub status_message: String,
    pub save_as: bool,
    pub directory: Option<PathBuf>,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            url_input: String::new(),
            status_message: "Enter a URL to download".to_string(),
            save_as: false,
            directory: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    DownloadPressed,
    SaveAsToggled,
    ChooseFolderPressed,
    ClearQueuePressed,
    CancelPressed(ItemId),
}

/// One active transfer as shown in the list
pub struct ItemRow {
    pub id: ItemId,
    pub name: String,
    pub received_bytes: u64,
    pub fraction: Option<f32>,
}

impl From<&DownloadItem> for ItemRow {
    fn from(item: &DownloadItem) -> Self {
        let received_bytes = item.received_bytes();
        let total = item.total_bytes();
        Self {
            id: item.id(),
            name: item
                .save_path()
                .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
                .unwrap_or_else(|| item.filename()),
            received_bytes,
            fraction: (total > 0).then(|| received_bytes as f32 / total as f32),
        }
    }
}

pub struct QueueSummary {
    pub pending: usize,
    pub active: usize,
    pub awaiting_start: bool,
    pub indicators: IndicatorState,
}

impl QueueSummary {
    pub fn label(&self) -> String {
        format!(
            "Active: {} | Queued: {}{}",
            self.active,
            self.pending,
            if self.awaiting_start { " | starting..." } else { "" }
        )
    }
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => {
                self.url_input = url;
            }
            DownloadMessage::SaveAsToggled => {
                self.save_as = !self.save_as;
            }
            _ => {
                // Will be handled by the app
            }
        }
    }

    pub fn view(&self, rows: Vec<ItemRow>, summary: QueueSummary) -> Element<'_, DownloadMessage> {
        let folder = match &self.directory {
            Some(dir) => format!("Folder: {}", dir.display()),
            None => "Folder: system downloads".to_string(),
        };
        let save_as = if self.save_as {
            "Ask where to save: on"
        } else {
            "Ask where to save: off"
        };
        let queue = summary.label();

        let overall: Element<'_, DownloadMessage> = match summary.indicators.progress_bar {
            ProgressBar::Value(value) => progress_bar(0.0..=1.0, value as f32).into(),
            ProgressBar::Indeterminate => text("Downloading, size unknown").size(14).into(),
            ProgressBar::Hidden => Space::new().height(Length::Fixed(0.0)).into(),
        };

        let controls = row![
            button("Download")
                .on_press(DownloadMessage::DownloadPressed)
                .padding([10, 20]),
            button(save_as)
                .on_press(DownloadMessage::SaveAsToggled)
                .padding([10, 20]),
            button("Choose folder")
                .on_press(DownloadMessage::ChooseFolderPressed)
                .padding([10, 20]),
            button("Clear queue")
                .on_press(DownloadMessage::ClearQueuePressed)
                .padding([10, 20]),
        ]
        .spacing(10);

        let items = Column::with_children(rows.into_iter().map(item_row)).spacing(8);

        column![
            text("Download Queue").size(32),
            Space::new().height(Length::Fixed(20.0)),
            text_input("https://example.com/file.zip", &self.url_input)
                .on_input(DownloadMessage::UrlChanged)
                .on_submit(DownloadMessage::DownloadPressed)
                .padding(10),
            controls,
            text(folder).size(14),
            text(&self.status_message).size(14),
            text(queue).size(14),
            overall,
            scrollable(items),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}

fn item_row<'a>(entry: ItemRow) -> Element<'a, DownloadMessage> {
    let progress: Element<'a, DownloadMessage> = match entry.fraction {
        Some(fraction) => progress_bar(0.0..=1.0, fraction).into(),
        None => text(format!("{} bytes", entry.received_bytes)).into(),
    };

    row![
        text(entry.name).width(Length::FillPortion(2)),
        progress,
        button("Cancel")
            .on_press(DownloadMessage::CancelPressed(entry.id))
            .padding([5, 10]),
    ]
    .spacing(10)
    .into()
}
