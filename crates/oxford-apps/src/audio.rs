#![forbid(unsafe_code)]

//! Sound playback bookkeeping.
//!
//! The host owns the actual samples. [`AudioBus`] hands out playback ids,
//! emits play/stop effects and remembers which playbacks carry a follow-up to
//! run when they finish. A playback finishes exactly once: on the host's
//! "ended" report or, for capped playbacks, when the cap elapses first.
//!
//! Before [`AudioBus::init`] no sample exists, so every play finishes
//! immediately and its follow-up is handed straight back to the caller.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::effects::{Effect, SoundCue};

/// Audio settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Prefix joined to every [`SoundCue::file`].
    pub sound_root: String,
    /// Initial master volume, `0.0..=1.0`.
    pub master_volume: f32,
    pub muted: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sound_root: "media/sounds/".to_string(),
            master_volume: 1.0,
            muted: false,
        }
    }
}

impl AudioConfig {
    #[must_use]
    pub fn sound_root(mut self, root: impl Into<String>) -> Self {
        self.sound_root = root.into();
        self
    }

    #[must_use]
    pub fn master_volume(mut self, volume: f32) -> Self {
        self.master_volume = volume.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }
}

/// Result of starting a playback that carries a follow-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback<F> {
    /// Playing; the follow-up runs when `id` finishes.
    Started(u64),
    /// No sample was available; run the follow-up now.
    Finished(F),
}

#[derive(Debug, Clone)]
struct Pending<F> {
    cue: SoundCue,
    follow_up: F,
}

/// Playback ids and pending follow-ups.
#[derive(Debug, Clone)]
pub struct AudioBus<F> {
    config: AudioConfig,
    initialized: bool,
    next_playback: u64,
    volume: f32,
    muted: bool,
    pending: BTreeMap<u64, Pending<F>>,
}

impl<F> AudioBus<F> {
    #[must_use]
    pub fn new(config: AudioConfig) -> Self {
        let volume = config.master_volume.clamp(0.0, 1.0);
        let muted = config.muted;
        Self {
            config,
            initialized: false,
            next_playback: 1,
            volume,
            muted,
            pending: BTreeMap::new(),
        }
    }

    /// Make the samples available. Idempotent.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        debug!(root = %self.config.sound_root, "audio initialized");
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub const fn volume(&self) -> f32 {
        self.volume
    }

    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.muted
    }

    /// Number of playbacks still waiting to finish.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn src(&self, cue: SoundCue) -> String {
        format!("{}{}", self.config.sound_root, cue.file())
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_playback;
        self.next_playback = self.next_playback.saturating_add(1);
        id
    }

    /// Fire-and-forget playback. `None` before [`init`](Self::init).
    pub fn play(&mut self, cue: SoundCue, effects: &mut Vec<Effect>) -> Option<u64> {
        if !self.initialized {
            return None;
        }
        let playback = self.allocate();
        effects.push(Effect::PlaySound {
            playback,
            cue,
            src: self.src(cue),
            volume: cue.volume(),
        });
        Some(playback)
    }

    /// Play and run `follow_up` once the sample ends.
    pub fn play_then(&mut self, cue: SoundCue, follow_up: F, effects: &mut Vec<Effect>) -> Playback<F> {
        match self.play(cue, effects) {
            Some(playback) => {
                self.pending.insert(playback, Pending { cue, follow_up });
                Playback::Started(playback)
            }
            None => Playback::Finished(follow_up),
        }
    }

    /// Play with a hard cap. The caller schedules [`cap_elapsed`](Self::cap_elapsed)
    /// after `cap_ms`; whichever of end or cap comes first finishes it.
    pub fn play_capped(
        &mut self,
        cue: SoundCue,
        cap_ms: u64,
        follow_up: F,
        effects: &mut Vec<Effect>,
    ) -> Playback<F> {
        if !self.initialized {
            return Playback::Finished(follow_up);
        }
        let playback = self.allocate();
        effects.push(Effect::PlaySoundCapped {
            playback,
            cue,
            src: self.src(cue),
            volume: cue.volume(),
            cap_ms,
        });
        self.pending.insert(playback, Pending { cue, follow_up });
        Playback::Started(playback)
    }

    /// The host reports that a playback ended (or failed to play).
    pub fn ended(&mut self, playback: u64) -> Option<F> {
        let pending = self.pending.remove(&playback)?;
        debug!(playback, cue = ?pending.cue, "sound finished");
        Some(pending.follow_up)
    }

    /// The cap of a capped playback elapsed. Stops it if it is still playing.
    pub fn cap_elapsed(&mut self, playback: u64, effects: &mut Vec<Effect>) -> Option<F> {
        let pending = self.pending.remove(&playback)?;
        debug!(playback, cue = ?pending.cue, "sound cap reached");
        effects.push(Effect::StopSound { playback });
        Some(pending.follow_up)
    }

    /// Stop every sample. Pending follow-ups are dropped, as a stopped
    /// sample never reports an end.
    pub fn stop_all(&mut self, effects: &mut Vec<Effect>) {
        self.pending.clear();
        effects.push(Effect::StopAllSounds);
    }

    pub fn set_volume(&mut self, volume: f32, effects: &mut Vec<Effect>) {
        self.volume = volume.clamp(0.0, 1.0);
        effects.push(Effect::SetMasterVolume {
            volume: self.volume,
        });
    }

    pub fn set_muted(&mut self, muted: bool, effects: &mut Vec<Effect>) {
        self.muted = muted;
        effects.push(Effect::SetMuted { muted });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn uninitialized_bus_finishes_immediately() {
        let mut bus: AudioBus<&str> = AudioBus::new(AudioConfig::default());
        let mut effects = Vec::new();
        assert_eq!(bus.play(SoundCue::Send, &mut effects), None);
        assert_eq!(bus.play_then(SoundCue::Welcome, "next", &mut effects), Playback::Finished("next"));
        assert_eq!(bus.play_capped(SoundCue::DialUp, 9000, "dial", &mut effects), Playback::Finished("dial"));
        assert!(effects.is_empty());
    }

    #[test]
    fn capped_playback_finishes_once() {
        let mut bus = AudioBus::new(AudioConfig::default());
        bus.init();
        let mut effects = Vec::new();
        let Playback::Started(id) = bus.play_capped(SoundCue::DialUp, 9000, 7_u8, &mut effects) else {
            panic!("expected a started playback");
        };
        assert_eq!(
            effects[0],
            Effect::PlaySoundCapped {
                playback: id,
                cue: SoundCue::DialUp,
                src: "media/sounds/dial-up-modem-sound.mp3".into(),
                volume: 0.6,
                cap_ms: 9000,
            }
        );
        assert_eq!(bus.cap_elapsed(id, &mut effects), Some(7));
        assert_eq!(effects.last(), Some(&Effect::StopSound { playback: id }));
        assert_eq!(bus.ended(id), None);
        assert_eq!(bus.cap_elapsed(id, &mut effects), None);
    }

    #[test]
    fn stop_all_drops_follow_ups() {
        let mut bus = AudioBus::new(AudioConfig::default());
        bus.init();
        let mut effects = Vec::new();
        let started = bus.play_then(SoundCue::Welcome, "got-mail", &mut effects);
        assert!(matches!(started, Playback::Started(_)));
        bus.stop_all(&mut effects);
        assert_eq!(bus.pending_len(), 0);
        assert_eq!(effects.last(), Some(&Effect::StopAllSounds));
    }

    #[test]
    fn volume_is_clamped() {
        let mut bus: AudioBus<()> = AudioBus::new(AudioConfig::default().master_volume(0.5));
        let mut effects = Vec::new();
        assert!((bus.volume() - 0.5).abs() < f32::EPSILON);
        bus.set_volume(3.0, &mut effects);
        assert!((bus.volume() - 1.0).abs() < f32::EPSILON);
        bus.set_muted(true, &mut effects);
        assert!(bus.is_muted());
        assert_eq!(effects.len(), 2);
    }
}
