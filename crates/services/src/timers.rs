use std::future;

use ladder_core::TimerRequest;
use tokio::time::{self, Instant};

/// Pending game timers, fired in deadline order.
#[derive(Debug, Default)]
pub(crate) struct TimerQueue {
    entries: Vec<Entry>,
    seq: u64,
}

#[derive(Debug)]
struct Entry {
    deadline: Instant,
    seq: u64,
    request: TimerRequest,
}

impl TimerQueue {
    pub(crate) fn schedule(&mut self, request: TimerRequest) {
        self.schedule_at(Instant::now() + request.after, request);
    }

    fn schedule_at(&mut self, deadline: Instant, request: TimerRequest) {
        self.seq += 1;
        self.entries.push(Entry {
            deadline,
            seq: self.seq,
            request,
        });
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Wait for the earliest timer and remove it. Pends forever while empty.
    ///
    /// Cancel safe: an entry is only removed once its deadline has passed.
    pub(crate) async fn next(&mut self) -> TimerRequest {
        let Some(deadline) = self.earliest().map(|entry| entry.deadline) else {
            return future::pending().await;
        };
        time::sleep_until(deadline).await;

        let position = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(_, entry)| (entry.deadline, entry.seq))
            .map(|(position, _)| position);
        match position {
            Some(position) => self.entries.swap_remove(position).request,
            None => future::pending().await,
        }
    }

    fn earliest(&self) -> Option<&Entry> {
        self.entries
            .iter()
            .min_by_key(|entry| (entry.deadline, entry.seq))
    }
}
