use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::FutureExt;

use crate::domain::{DownloadError, DownloadItem};

pub type DownloadResult = Result<DownloadItem, DownloadError>;

/// Settles when the submitted download completes or is rejected.
///
/// A cancelled download is reported through `on_cancel` only; its handle
/// yields [`DownloadError::Unsettled`] once the orchestrator lets go of it.
#[derive(Debug)]
pub struct DownloadHandle {
    receiver: oneshot::Receiver<DownloadResult>,
}

impl Future for DownloadHandle {
    type Output = DownloadResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.receiver
            .poll_unpin(cx)
            .map(|settled| settled.unwrap_or_else(|_| Err(DownloadError::Unsettled)))
    }
}

/// Sending half of a [`DownloadHandle`].
#[derive(Debug)]
pub(crate) struct Completion {
    sender: oneshot::Sender<DownloadResult>,
}

impl Completion {
    pub(crate) fn channel() -> (Self, DownloadHandle) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, DownloadHandle { receiver })
    }

    pub(crate) fn resolve(self, item: DownloadItem) {
        let _ = self.sender.send(Ok(item));
    }

    pub(crate) fn reject(self, error: DownloadError) {
        let _ = self.sender.send(Err(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped_completion_is_unsettled() {
        let (completion, handle) = Completion::channel();
        drop(completion);
        assert_eq!(handle.now_or_never(), Some(Err(DownloadError::Unsettled)));
    }

    #[test]
    fn test_reject_reaches_handle() {
        let (completion, mut handle) = Completion::channel();
        assert!((&mut handle).now_or_never().is_none());

        completion.reject(DownloadError::Cleared);
        assert_eq!(handle.now_or_never(), Some(Err(DownloadError::Cleared)));
    }
}
