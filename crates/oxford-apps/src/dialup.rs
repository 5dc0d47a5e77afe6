#![forbid(unsafe_code)]

//! Sign-in screen and the dial-up connect sequence.
//!
//! The sequence is a small state machine driven by [`DialupStep`] timers and
//! sound follow-ups. All of its timers share one cancellation source, so
//! removal of the overlay drops whatever is still queued.

use oxford_core::{CancellationSource, StorageBackend};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::audio::Playback;
use crate::effects::{Effect, SoundCue};
use crate::services::{DialupStep, Services, SoundFollowUp, TimerEvent};

/// Session key holding the signed-in screen name.
pub const SESSION_USER_KEY: &str = "ooUser";
/// Session flag set once the intro has been shown.
pub const SHOWN_KEY: &str = "dialupShown";

const CONNECTING: &str = "Connecting To Oxford Online...";
const CONNECTED: &str = "Connected. Preparing welcome...";
const WELCOME: &str = "Welcome!";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DialupConfig {
    /// Longest the dial tone may play.
    pub max_dial_ms: u64,
    /// Pause between the dial tone and the welcome sample.
    pub welcome_delay_ms: u64,
    pub fade_delay_ms: u64,
    pub fade_ms: u64,
    pub logo: String,
}

impl Default for DialupConfig {
    fn default() -> Self {
        Self {
            max_dial_ms: 9000,
            welcome_delay_ms: 1500,
            fade_delay_ms: 500,
            fade_ms: 1000,
            logo: "media/Oxford/logo.svg".to_string(),
        }
    }
}

/// How long the dial tone plays: the sample length capped at `max`, or `max`
/// when the length is unknown.
#[must_use]
pub fn target_dial_ms(sample_ms: Option<u64>, max: u64) -> u64 {
    match sample_ms {
        Some(ms) if ms > 0 => ms.min(max),
        _ => max,
    }
}

/// When each of the three connection boxes fills.
#[must_use]
pub fn box_fill_times(target_ms: u64) -> [u64; 3] {
    let at = |percent: u64, floor: u64| (target_ms * percent / 100).max(floor);
    [at(11, 200), at(44, 400), at(77, 600)]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialupPhase {
    /// No overlay.
    Hidden,
    Login,
    Connecting,
    Fading,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialupView {
    pub phase: DialupPhase,
    pub title: &'static str,
    pub logo: String,
    pub status: &'static str,
    pub boxes: [bool; 3],
}

#[derive(Debug)]
pub struct DialupIntro {
    config: DialupConfig,
    phase: DialupPhase,
    has_played: bool,
    status: &'static str,
    boxes: [bool; 3],
    sequence: CancellationSource,
}

impl DialupIntro {
    #[must_use]
    pub fn new(config: DialupConfig) -> Self {
        Self {
            config,
            phase: DialupPhase::Hidden,
            has_played: false,
            status: CONNECTING,
            boxes: [false; 3],
            sequence: CancellationSource::new(),
        }
    }

    #[must_use]
    pub const fn phase(&self) -> DialupPhase {
        self.phase
    }

    /// Show the sign-in screen once per session.
    pub fn show(&mut self, services: &mut Services) -> bool {
        let shown = matches!(services.session().get_item(SHOWN_KEY), Ok(Some(_)));
        if self.has_played || shown {
            return false;
        }
        self.has_played = true;
        if let Err(err) = services.session_mut().set_item(SHOWN_KEY, "true".to_string()) {
            warn!(%err, "could not record the dial-up flag");
        }
        self.phase = DialupPhase::Login;
        true
    }

    /// Forget that the intro ran.
    pub fn reset(&mut self, services: &mut Services) {
        if let Err(err) = services.session_mut().remove_item(SHOWN_KEY) {
            warn!(%err, "could not clear the dial-up flag");
        }
        self.has_played = false;
    }

    /// Sign-in submit. Both fields must be non-blank. On success the screen
    /// name is kept for the session, audio is unlocked and the connect
    /// sequence starts; the caller then brings up the desktop apps.
    pub fn login(&mut self, services: &mut Services, user: &str, password: &str, dial_ms: Option<u64>) -> bool {
        let user = user.trim();
        if self.phase != DialupPhase::Login || user.is_empty() || password.trim().is_empty() {
            return false;
        }
        if let Err(err) = services.session_mut().set_item(SESSION_USER_KEY, user.to_string()) {
            warn!(%err, "could not store the screen name");
        }
        services.audio.init();
        info!(user, "signed in");
        self.connect(services, dial_ms);
        true
    }

    fn connect(&mut self, services: &mut Services, dial_ms: Option<u64>) {
        self.phase = DialupPhase::Connecting;
        self.status = CONNECTING;
        self.boxes = [false; 3];
        let token = self.sequence.restart();

        let target = target_dial_ms(dial_ms, self.config.max_dial_ms);
        debug!(target, sample = ?dial_ms, "dialing");
        for (index, at) in (1u8..).zip(box_fill_times(target)) {
            services.schedule(at, Some(token.clone()), TimerEvent::Dialup(DialupStep::Box(index)));
        }

        match services
            .audio
            .play_capped(SoundCue::DialUp, target, SoundFollowUp::DialupConnected, &mut services.effects)
        {
            Playback::Started(playback) => {
                services.schedule(target, Some(token), TimerEvent::SoundCap { playback });
            }
            Playback::Finished(_) => {
                services.schedule(target, Some(token), TimerEvent::Dialup(DialupStep::Connected));
            }
        }
    }

    fn after_dial(&mut self, services: &mut Services) {
        self.status = CONNECTED;
        services.schedule(
            self.config.welcome_delay_ms,
            Some(self.sequence.token()),
            TimerEvent::Dialup(DialupStep::Welcome),
        );
    }

    fn after_welcome(&mut self, services: &mut Services) {
        if let Playback::Finished(next) =
            services
                .audio
                .play_then(SoundCue::GotMail, SoundFollowUp::DialupGotMailEnded, &mut services.effects)
        {
            self.sound_finished(services, next);
        }
    }

    fn fade_out(&mut self, services: &mut Services) {
        if !matches!(self.phase, DialupPhase::Connecting | DialupPhase::Fading) {
            return;
        }
        self.phase = DialupPhase::Fading;
        services.schedule(
            self.config.fade_ms,
            Some(self.sequence.token()),
            TimerEvent::Dialup(DialupStep::Remove),
        );
    }

    /// A sequence timer fired.
    pub fn step(&mut self, services: &mut Services, step: DialupStep) {
        match step {
            DialupStep::Box(n) => {
                if let Some(filled) = self.boxes.get_mut(usize::from(n.saturating_sub(1))) {
                    *filled = true;
                }
                if n == 1 {
                    self.status = CONNECTING;
                }
            }
            DialupStep::Connected => self.after_dial(services),
            DialupStep::Welcome => {
                self.status = WELCOME;
                if let Playback::Finished(next) =
                    services
                        .audio
                        .play_then(SoundCue::Welcome, SoundFollowUp::DialupWelcomeEnded, &mut services.effects)
                {
                    self.sound_finished(services, next);
                }
            }
            DialupStep::Fade => self.fade_out(services),
            DialupStep::Remove => {
                if self.phase == DialupPhase::Hidden {
                    return;
                }
                self.phase = DialupPhase::Hidden;
                self.sequence.cancel();
                info!("dial-up finished");
                services.emit(Effect::RevealDesktop);
            }
        }
    }

    /// A sound owned by the sequence ended or hit its cap.
    pub fn sound_finished(&mut self, services: &mut Services, follow_up: SoundFollowUp) {
        match follow_up {
            SoundFollowUp::DialupConnected => self.after_dial(services),
            SoundFollowUp::DialupWelcomeEnded => self.after_welcome(services),
            SoundFollowUp::DialupGotMailEnded => {
                services.schedule(
                    self.config.fade_delay_ms,
                    Some(self.sequence.token()),
                    TimerEvent::Dialup(DialupStep::Fade),
                );
            }
        }
    }

    /// Skip button or Escape while connecting.
    pub fn skip(&mut self, services: &mut Services) -> bool {
        if self.phase != DialupPhase::Connecting {
            return false;
        }
        services.audio.stop_all(&mut services.effects);
        self.fade_out(services);
        true
    }

    #[must_use]
    pub fn view(&self) -> DialupView {
        DialupView {
            phase: self.phase,
            title: "Welcome to Oxford Online",
            logo: self.config.logo.clone(),
            status: self.status,
            boxes: self.boxes,
        }
    }
}
