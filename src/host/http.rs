//! Native download layer backed by reqwest.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::channel::mpsc;
use futures::StreamExt;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Response};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::{HostWindow, Indicators};
use crate::domain::{
    Destination, DoneState, DownloadItem, ItemId, ProgressBar, SessionEvent, SubscriptionId,
};
use crate::utils::{filename_from_content_disposition, filename_from_url};

const FALLBACK_FILENAME: &str = "download";

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Delivers session events while a subscriber is attached.
#[derive(Clone)]
struct EventSink {
    sender: mpsc::UnboundedSender<SessionEvent>,
    subscriber: Arc<Mutex<Option<SubscriptionId>>>,
}

impl EventSink {
    fn subscriber(&self) -> MutexGuard<'_, Option<SubscriptionId>> {
        self.subscriber.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `false` when nobody is listening.
    fn emit(&self, event: SessionEvent) -> bool {
        if self.subscriber().is_none() {
            return false;
        }
        self.sender.unbounded_send(event).is_ok()
    }
}

/// A window session whose downloads run as tokio tasks on `runtime`.
#[derive(Clone)]
pub struct HttpSession {
    client: Client,
    runtime: Handle,
    sink: EventSink,
    indicators: Indicators,
    next_item: Arc<AtomicU64>,
    next_subscription: Arc<AtomicU64>,
    cancel_registry: Arc<Mutex<HashMap<ItemId, CancellationToken>>>,
}

impl HttpSession {
    pub fn new(runtime: Handle) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (sender, receiver) = mpsc::unbounded();
        let session = Self {
            client: Client::new(),
            runtime,
            sink: EventSink {
                sender,
                subscriber: Arc::new(Mutex::new(None)),
            },
            indicators: Indicators::default(),
            next_item: Arc::new(AtomicU64::new(1)),
            next_subscription: Arc::new(AtomicU64::new(1)),
            cancel_registry: Arc::new(Mutex::new(HashMap::new())),
        };
        (session, receiver)
    }

    pub fn indicators(&self) -> Indicators {
        self.indicators.clone()
    }

    /// Requests cancellation of a running transfer. `false` when the item is unknown.
    pub fn cancel(&self, id: ItemId) -> bool {
        let registry = self
            .cancel_registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match registry.get(&id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn register(&self, id: ItemId) -> CancellationToken {
        let token = CancellationToken::new();
        self.cancel_registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, token.clone());
        token
    }
}

impl HostWindow for HttpSession {
    fn subscribe(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::SeqCst));
        *self.sink.subscriber() = Some(id);
        id
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) {
        let mut subscriber = self.sink.subscriber();
        if *subscriber == Some(subscription) {
            *subscriber = None;
        }
    }

    fn download_url(&mut self, url: &Url) {
        let id = ItemId(self.next_item.fetch_add(1, Ordering::SeqCst));
        let transfer = Transfer {
            id,
            url: url.clone(),
            client: self.client.clone(),
            sink: self.sink.clone(),
            cancel: self.register(id),
        };
        let registry = self.cancel_registry.clone();
        self.runtime.spawn(async move {
            transfer.run().await;
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id);
        });
    }

    fn set_progress_bar(&mut self, progress: ProgressBar) {
        self.indicators.set_progress_bar(progress);
    }
}

struct Transfer {
    id: ItemId,
    url: Url,
    client: Client,
    sink: EventSink,
    cancel: CancellationToken,
}

impl Transfer {
    async fn run(self) {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .and_then(Response::error_for_status);

        // A failed request still announces an item so its request settles
        let (item, response) = match response {
            Ok(response) => (self.describe(&response), Some(response)),
            Err(e) => {
                warn!(url = %self.url, error = %e, "download request failed");
                let name = filename_from_url(&self.url)
                    .unwrap_or_else(|| FALLBACK_FILENAME.to_string());
                (DownloadItem::new(self.id, self.url.clone(), name, "", 0), None)
            }
        };

        let announced = self.sink.emit(SessionEvent::WillDownload(item.clone()));

        let state = match response {
            // Nothing to save, so no destination is awaited
            None => DoneState::Interrupted,
            Some(response) => {
                if !announced {
                    item.prompt_for_save_path();
                }
                match self.destination(&item).await {
                    None => DoneState::Cancelled,
                    Some(path) => {
                        item.record_save_path(&path);
                        match self.write_body(response, &path, &item).await {
                            Ok(state) => state,
                            Err(e) => {
                                warn!(item = self.id.0, error = %e, "download failed");
                                DoneState::Interrupted
                            }
                        }
                    }
                }
            }
        };

        item.finish(state);
        debug!(item = self.id.0, ?state, "transfer finished");
        self.sink.emit(SessionEvent::Done(self.id, state));
    }

    fn describe(&self, response: &Response) -> DownloadItem {
        let headers = response.headers();
        let filename = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_content_disposition)
            .or_else(|| filename_from_url(response.url()))
            .unwrap_or_else(|| FALLBACK_FILENAME.to_string());
        let mime_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let total_bytes = response.content_length().unwrap_or(0);

        DownloadItem::new(self.id, self.url.clone(), filename, mime_type, total_bytes)
    }

    /// `None` when the save dialog was dismissed or the transfer was cancelled first.
    async fn destination(&self, item: &DownloadItem) -> Option<PathBuf> {
        let decided = tokio::select! {
            _ = self.cancel.cancelled() => return None,
            decided = item.destination_decided() => decided,
        };
        match decided {
            Destination::Path(path) => Some(path),
            Destination::Prompt => tokio::select! {
                _ = self.cancel.cancelled() => None,
                chosen = choose_save_path(item.filename()) => chosen,
            },
            Destination::Undecided => None,
        }
    }

    async fn write_body(
        &self,
        response: Response,
        path: &Path,
        item: &DownloadItem,
    ) -> Result<DoneState, TransferError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(path).await?;
        let mut stream = response.bytes_stream();

        loop {
            let chunk = tokio::select! {
                _ = self.cancel.cancelled() => {
                    drop(file);
                    let _ = tokio::fs::remove_file(path).await;
                    return Ok(DoneState::Cancelled);
                }
                chunk = stream.next() => match chunk {
                    Some(chunk) => chunk?,
                    None => break,
                },
            };
            file.write_all(&chunk).await?;
            item.add_received_bytes(chunk.len() as u64);
            self.sink.emit(SessionEvent::Updated(self.id));
        }

        file.sync_all().await?;
        Ok(DoneState::Completed)
    }
}

async fn choose_save_path(suggested_filename: String) -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_file_name(&suggested_filename)
        .save_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}
