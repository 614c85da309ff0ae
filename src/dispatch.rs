//! Single-slot request mailbox between a triggering and a processing
//! context.
//!
//! The slot holds at most one pending request. [`Request::make`] overwrites
//! it (last write wins) and [`Request::take`] empties it back to the default
//! [`RequestId::CreateFormwork`], both as a single atomic swap.

use std::sync::atomic::{AtomicU8, Ordering};

/// Commands understood by the processing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum RequestId {
    /// The primary action, also what an empty slot reads as.
    #[default]
    CreateFormwork = 0,
    DeleteElement = 1,
    None = 2,
}

impl RequestId {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::DeleteElement,
            2 => Self::None,
            _ => Self::CreateFormwork,
        }
    }
}

/// The request slot. Share it between contexts behind an `Arc`.
#[derive(Debug, Default)]
pub struct Request {
    slot: AtomicU8,
}

impl Request {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `id`, discarding any request not yet taken. Returns the
    /// discarded value.
    pub fn make(&self, id: RequestId) -> RequestId {
        RequestId::from_u8(self.slot.swap(id as u8, Ordering::AcqRel))
    }

    /// Takes the pending request and resets the slot to the default.
    pub fn take(&self) -> RequestId {
        RequestId::from_u8(self.slot.swap(RequestId::default() as u8, Ordering::AcqRel))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn empty_slot_reads_primary_action() {
        let request = Request::new();
        assert_eq!(request.take(), RequestId::CreateFormwork);
    }

    #[test]
    fn last_write_wins() {
        let request = Request::new();
        request.make(RequestId::DeleteElement);
        let replaced = request.make(RequestId::None);
        assert_eq!(replaced, RequestId::DeleteElement);
        assert_eq!(request.take(), RequestId::None);
    }

    #[test]
    fn take_resets_slot() {
        let request = Request::new();
        request.make(RequestId::DeleteElement);
        assert_eq!(request.take(), RequestId::DeleteElement);
        assert_eq!(request.take(), RequestId::CreateFormwork);
    }

    #[test]
    fn each_request_is_taken_at_most_once() {
        let request = Arc::new(Request::new());
        let makes = 1000;
        let taken = thread::scope(|scope| {
            let producer = Arc::clone(&request);
            scope.spawn(move || {
                for _ in 0..makes {
                    producer.make(RequestId::DeleteElement);
                }
            });
            let consumer = Arc::clone(&request);
            let handle = scope.spawn(move || {
                (0..makes)
                    .filter(|_| consumer.take() == RequestId::DeleteElement)
                    .count()
            });
            handle.join().unwrap_or_default()
        });
        let leftover = usize::from(request.take() == RequestId::DeleteElement);
        assert!(taken + leftover <= makes);
        assert!(taken + leftover >= 1);
    }
}
