#![forbid(unsafe_code)]

//! Cooperative cancellation tokens for scheduled sequences.
//!
//! Every multi-step sequence on the desktop (a chat reply turn, the dial-up
//! intro, a mail refresh) owns one [`CancellationSource`]. Timers scheduled
//! for the sequence carry a [`CancellationToken`]; restarting the sequence
//! cancels the old source so its pending timers are discarded instead of
//! mutating state that has moved on.
//!
//! # Example
//!
//! ```
//! use oxford_core::cancellation::CancellationSource;
//!
//! let source = CancellationSource::new();
//! let token = source.token();
//! assert!(!token.is_cancelled());
//! source.cancel();
//! assert!(token.is_cancelled());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cloneable cancellation token.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Arc<AtomicBool>,
}

/// The control handle that triggers cancellation.
///
/// Dropping the source does **not** cancel the token; call
/// [`cancel`](Self::cancel) explicitly.
#[derive(Debug)]
pub struct CancellationSource {
    inner: Arc<AtomicBool>,
}

impl CancellationSource {
    /// Create a new cancellation source with an uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Obtain a cloneable token that observes this source's state.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Signal cancellation to every token derived from this source.
    pub fn cancel(&self) {
        self.inner.store(true, Ordering::Release);
    }

    /// Check whether cancellation has already been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }

    /// Cancel this source and replace it with a fresh one.
    ///
    /// Returns the token of the new source.
    pub fn restart(&mut self) -> CancellationToken {
        self.cancel();
        *self = Self::new();
        self.token()
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    /// Returns `true` if cancellation has been requested.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }

    /// Create a token that is never cancelled.
    #[must_use]
    pub fn never() -> Self {
        Self {
            inner: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_observes_source() {
        let source = CancellationSource::new();
        let token = source.token();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        source.cancel();
        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());
        assert!(source.is_cancelled());
    }

    #[test]
    fn restart_cancels_old_tokens_only() {
        let mut source = CancellationSource::new();
        let old = source.token();
        let fresh = source.restart();
        assert!(old.is_cancelled());
        assert!(!fresh.is_cancelled());
        assert!(!source.is_cancelled());
    }

    #[test]
    fn dropping_source_does_not_cancel() {
        let token = {
            let source = CancellationSource::new();
            source.token()
        };
        assert!(!token.is_cancelled());
    }

    #[test]
    fn never_token_stays_live() {
        assert!(!CancellationToken::never().is_cancelled());
    }
}
