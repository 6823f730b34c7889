use std::collections::VecDeque;

use url::Url;

use super::handle::Completion;
use super::options::DownloadOptions;

/// A submitted download waiting for its handshake.
pub(crate) struct PendingRequest {
    pub url: Url,
    pub options: DownloadOptions,
    pub completion: Completion,
}

/// FIFO of pending requests plus the handshake slot.
///
/// The slot holds the one request whose native download has been asked for
/// but whose start notification has not arrived yet. It is idle or occupied,
/// never double-armed.
#[derive(Default)]
pub(crate) struct QueueSequencer {
    pending: VecDeque<PendingRequest>,
    slot: Option<PendingRequest>,
}

impl QueueSequencer {
    pub fn enqueue(&mut self, request: PendingRequest) {
        self.pending.push_back(request);
    }

    pub fn is_awaiting_start(&self) -> bool {
        self.slot.is_some()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Moves the head of the queue into an idle slot and returns the URL to
    /// initiate. `None` when the slot is occupied or nothing is pending.
    pub fn advance(&mut self) -> Option<&Url> {
        if self.slot.is_some() {
            return None;
        }
        let next = self.pending.pop_front()?;
        Some(&self.slot.insert(next).url)
    }

    /// Vacates the slot for the request whose start notification just arrived.
    pub fn take_slot(&mut self) -> Option<PendingRequest> {
        self.slot.take()
    }

    /// Removes every request not yet handed to the session.
    pub fn clear_pending(&mut self) -> Vec<PendingRequest> {
        self.pending.drain(..).collect()
    }

    /// Empties the slot and the queue.
    pub fn drain_all(&mut self) -> Vec<PendingRequest> {
        self.slot.take().into_iter().chain(self.pending.drain(..)).collect()
    }
}
