#![forbid(unsafe_code)]

//! Reply turn-taking for the open conversation.
//!
//! ```text
//! Idle --send--> PendingReply --show delay--> TypingVisible --reply delay--> Idle
//!   ^                 |                             |
//!   +----cancel-------+-----------------------------+
//! ```
//!
//! Both timers of a turn share one cancellation token. Sending again,
//! switching buddy or hiding the window restarts the source, so a stale reply
//! can never land in another conversation.

use oxford_core::{CancellationSource, RandomSource};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::services::{Services, TimerEvent};

/// Reply timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TurnConfig {
    /// Base of the outer reply budget.
    pub auto_reply_delay_ms: u64,
    /// Fixed part of the jitter added on send.
    pub jitter_base_ms: u64,
    /// Random part of the jitter, `[0, span)`.
    pub jitter_span_ms: u32,
    /// The reply never lands sooner than this.
    pub typing_min_ms: u64,
    pub natural_base_ms: u64,
    pub natural_span_ms: u32,
    /// The natural delay ends at least this long before the outer budget.
    pub finish_margin_ms: u64,
    pub typing_show_delay_ms: u64,
    /// The indicator must stay up at least this long to be shown at all.
    pub typing_visible_margin_ms: u64,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            auto_reply_delay_ms: 2000,
            jitter_base_ms: 500,
            jitter_span_ms: 800,
            typing_min_ms: 900,
            natural_base_ms: 800,
            natural_span_ms: 900,
            finish_margin_ms: 100,
            typing_show_delay_ms: 400,
            typing_visible_margin_ms: 150,
        }
    }
}

impl TurnConfig {
    #[must_use]
    pub fn auto_reply_delay_ms(mut self, ms: u64) -> Self {
        self.auto_reply_delay_ms = ms;
        self
    }

    #[must_use]
    pub fn typing_min_ms(mut self, ms: u64) -> Self {
        self.typing_min_ms = ms;
        self
    }

    #[must_use]
    pub fn typing_show_delay_ms(mut self, ms: u64) -> Self {
        self.typing_show_delay_ms = ms;
        self
    }

    /// Outer budget for one reply: base plus jitter.
    pub fn total_delay_ms(&self, rng: &mut dyn RandomSource) -> u64 {
        self.auto_reply_delay_ms + self.jitter_base_ms + u64::from(rng.next_below(self.jitter_span_ms))
    }

    /// When the indicator appears and when the reply lands.
    pub fn plan(&self, total_ms: u64, rng: &mut dyn RandomSource) -> ReplyPlan {
        let natural = self.natural_base_ms + u64::from(rng.next_below(self.natural_span_ms));
        let reply_ms = self
            .typing_min_ms
            .max(total_ms.saturating_sub(self.finish_margin_ms).min(natural));
        let typing_at_ms = (reply_ms > self.typing_show_delay_ms + self.typing_visible_margin_ms)
            .then_some(self.typing_show_delay_ms);
        ReplyPlan {
            reply_ms,
            typing_at_ms,
        }
    }
}

/// Timer offsets of one turn, relative to the send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyPlan {
    pub reply_ms: u64,
    pub typing_at_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Idle,
    PendingReply,
    TypingVisible,
}

/// The single in-flight turn of the chat window.
#[derive(Debug, Default)]
pub struct ChatTurn {
    source: CancellationSource,
    pending: bool,
    typing: bool,
}

impl ChatTurn {
    #[must_use]
    pub const fn state(&self) -> TurnState {
        match (self.pending, self.typing) {
            (_, true) => TurnState::TypingVisible,
            (true, false) => TurnState::PendingReply,
            (false, false) => TurnState::Idle,
        }
    }

    #[must_use]
    pub const fn is_typing(&self) -> bool {
        self.typing
    }

    /// Cancel any previous turn and schedule this one.
    pub fn schedule(&mut self, services: &mut Services, plan: ReplyPlan) {
        let token = self.source.restart();
        self.typing = false;
        if let Some(at) = plan.typing_at_ms {
            services.schedule(at, Some(token.clone()), TimerEvent::ChatShowTyping);
        }
        services.schedule(plan.reply_ms, Some(token), TimerEvent::ChatDeliverReply);
        self.pending = true;
        debug!(reply_ms = plan.reply_ms, typing_at_ms = ?plan.typing_at_ms, "chat reply scheduled");
    }

    /// Drop pending timers and the indicator. Returns `true` if a turn was
    /// in flight.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.pending || self.typing;
        self.source.cancel();
        self.pending = false;
        self.typing = false;
        if was_active {
            debug!("chat reply cancelled");
        }
        was_active
    }

    /// The show timer fired.
    pub fn show_typing(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        self.typing = true;
        true
    }

    /// The reply timer fired; the turn is over.
    pub fn finish(&mut self) -> bool {
        let was_pending = self.pending;
        self.pending = false;
        self.typing = false;
        was_pending
    }
}
