#![forbid(unsafe_code)]

//! Deadline-ordered timer queue.
//!
//! Timers are payloads scheduled at an absolute monotonic deadline. The host
//! advances the clock and drains due payloads one at a time with
//! [`TimerQueue::pop_due`], so a handler may schedule or cancel other timers
//! before the next one is popped. Ties on the deadline fire in scheduling
//! order.

use std::collections::BTreeMap;

use web_time::Duration;

use crate::cancellation::CancellationToken;

/// Identifier of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw sequence number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Scheduled<T> {
    token: Option<CancellationToken>,
    payload: T,
}

/// A queue of payloads waiting for their deadline.
#[derive(Debug)]
pub struct TimerQueue<T> {
    entries: BTreeMap<(Duration, u64), Scheduled<T>>,
    next_sequence: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_sequence: 1,
        }
    }

    /// Schedule `payload` to fire at `deadline`.
    ///
    /// When `token` is cancelled before the deadline the payload is dropped
    /// without firing.
    pub fn schedule(
        &mut self,
        deadline: Duration,
        token: Option<CancellationToken>,
        payload: T,
    ) -> TimerId {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        self.entries
            .insert((deadline, sequence), Scheduled { token, payload });
        TimerId(sequence)
    }

    /// Cancel one timer by id. Returns `true` if it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self.entries.keys().find(|(_, seq)| *seq == id.0).copied();
        key.and_then(|key| self.entries.remove(&key)).is_some()
    }

    /// Drop every pending timer whose payload matches `predicate`.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !predicate(&entry.payload));
        before - self.entries.len()
    }

    /// Pop the earliest live payload whose deadline is at or before `now`.
    ///
    /// Returns the deadline it was scheduled for alongside the payload.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, T)> {
        loop {
            let (&(deadline, _), _) = self.entries.first_key_value()?;
            if deadline > now {
                return None;
            }
            let ((deadline, _), entry) = self.entries.pop_first()?;
            if entry.token.as_ref().is_some_and(CancellationToken::is_cancelled) {
                continue;
            }
            return Some((deadline, entry.payload));
        }
    }

    /// Earliest pending deadline, including cancelled entries not yet purged.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Number of pending entries that are still live.
    #[must_use]
    pub fn live_len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| !entry.token.as_ref().is_some_and(CancellationToken::is_cancelled))
            .count()
    }

    /// Whether no live entries remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_len() == 0
    }

    /// Iterate live payloads in firing order.
    pub fn pending(&self) -> impl Iterator<Item = (Duration, &T)> + '_ {
        self.entries.iter().filter_map(|((deadline, _), entry)| {
            (!entry.token.as_ref().is_some_and(CancellationToken::is_cancelled))
                .then_some((*deadline, &entry.payload))
        })
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
