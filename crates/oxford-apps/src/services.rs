#![forbid(unsafe_code)]

//! Explicit dependencies handed to every controller.
//!
//! There are no globals: the window shell, clock, timers, randomness, both
//! storage backends and the effect outbox live in one [`Services`] value that
//! the desktop owns and lends to controllers by `&mut`.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDateTime;
use oxford_core::{
    CancellationToken, HostClock, MemoryStorage, RandomSource, StorageBackend, TimerId, TimerQueue,
    Viewport,
};
use oxford_shell::Shell;
use serde::Serialize;
use tracing::debug;

use crate::audio::{AudioBus, AudioConfig};
use crate::effects::{Effect, SoundCue};

/// Which controller owns a window or taskbar entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "app", content = "key", rename_all = "snake_case")]
pub enum AppRoute {
    Chat,
    Mail,
    Compose(u32),
    MediaPlayer,
    Paint,
    Channels,
    Slides,
    Folder(String),
    Browser,
    StartMenu,
    Terminal,
    DosLibrary,
    DosGame(String),
}

/// Steps of the dial-up connect sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialupStep {
    /// Fill connection box `n` (1-based).
    Box(u8),
    /// The dial tone finished without a playable sample.
    Connected,
    /// Show "Welcome!" and play the welcome sample.
    Welcome,
    /// Start fading the overlay out.
    Fade,
    /// Remove the overlay and reveal the desktop.
    Remove,
}

/// Payload of every scheduled timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    ChatShowTyping,
    ChatDeliverReply,
    MailRefreshDone,
    MailAlert,
    MailStatusClear { text: String },
    MailToastHide { id: u64 },
    MailToastRemove { id: u64 },
    SoundCap { playback: u64 },
    Dialup(DialupStep),
    MediaFlashEnd,
    ClockTick,
}

/// What to run when a sound with a follow-up finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundFollowUp {
    DialupConnected,
    DialupWelcomeEnded,
    DialupGotMailEnded,
}

/// Everything a controller may touch.
pub struct Services {
    pub shell: Shell<AppRoute>,
    pub clock: HostClock,
    pub timers: TimerQueue<TimerEvent>,
    pub audio: AudioBus<SoundFollowUp>,
    pub effects: Vec<Effect>,
    rng: Box<dyn RandomSource>,
    session: Box<dyn StorageBackend>,
    local: Box<dyn StorageBackend>,
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("now", &self.clock.now())
            .field("windows", &self.shell.windows.len())
            .field("timers", &self.timers.live_len())
            .field("effects", &self.effects.len())
            .finish_non_exhaustive()
    }
}

impl Services {
    /// Services with in-memory storage.
    #[must_use]
    pub fn new(viewport: Viewport, clock: HostClock, rng: Box<dyn RandomSource>) -> Self {
        Self {
            shell: Shell::new(viewport),
            clock,
            timers: TimerQueue::new(),
            audio: AudioBus::new(AudioConfig::default()),
            effects: Vec::new(),
            rng,
            session: Box::new(MemoryStorage::new()),
            local: Box::new(MemoryStorage::new()),
        }
    }

    /// Replace the session-scoped backend.
    #[must_use]
    pub fn with_session(mut self, backend: Box<dyn StorageBackend>) -> Self {
        self.session = backend;
        self
    }

    /// Replace the persistent backend.
    #[must_use]
    pub fn with_local(mut self, backend: Box<dyn StorageBackend>) -> Self {
        self.local = backend;
        self
    }

    #[must_use]
    pub fn with_audio(mut self, config: AudioConfig) -> Self {
        self.audio = AudioBus::new(config);
        self
    }

    pub fn rng(&mut self) -> &mut dyn RandomSource {
        self.rng.as_mut()
    }

    #[must_use]
    pub fn session(&self) -> &dyn StorageBackend {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> &mut dyn StorageBackend {
        self.session.as_mut()
    }

    #[must_use]
    pub fn local(&self) -> &dyn StorageBackend {
        self.local.as_ref()
    }

    pub fn local_mut(&mut self) -> &mut dyn StorageBackend {
        self.local.as_mut()
    }

    /// Schedule `event` `delay_ms` from now. A deadline past the end of the
    /// monotonic range can never fire and is dropped.
    pub fn schedule(&mut self, delay_ms: u64, token: Option<CancellationToken>, event: TimerEvent) -> Option<TimerId> {
        let Some(deadline) = self.clock.now().checked_add(Duration::from_millis(delay_ms)) else {
            debug!(?event, "timer deadline out of range; dropped");
            return None;
        };
        Some(self.timers.schedule(deadline, token, event))
    }

    pub fn emit(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Fire-and-forget sound.
    pub fn play(&mut self, cue: SoundCue) {
        self.audio.play(cue, &mut self.effects);
    }

    /// "You've got mail" followed by the alert chime 180 ms later.
    pub fn play_mail_sound(&mut self) {
        self.audio.init();
        self.play(SoundCue::GotMail);
        self.schedule(180, None, TimerEvent::MailAlert);
    }

    #[must_use]
    pub fn wall_now(&self) -> NaiveDateTime {
        self.clock.wall_now()
    }

    /// Milliseconds since the Unix epoch on the wall clock.
    #[must_use]
    pub fn epoch_ms(&self) -> i64 {
        self.clock.epoch_ms()
    }

    /// Drain pending effects.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}
