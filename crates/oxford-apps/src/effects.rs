#![forbid(unsafe_code)]

//! Side effects requested by controllers.
//!
//! Controllers never touch audio, media elements, the emulator or the
//! browser. They push [`Effect`] values; the host drains them after every
//! command and reports completion back (sound ended, media metadata, emulator
//! started or failed).

use serde::{Deserialize, Serialize};

/// One of the fixed UI sound samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Send,
    Receive,
    DialUp,
    Welcome,
    GotMail,
    Alert,
}

impl SoundCue {
    pub const ALL: [Self; 6] = [
        Self::Send,
        Self::Receive,
        Self::DialUp,
        Self::Welcome,
        Self::GotMail,
        Self::Alert,
    ];

    /// Sample file name, relative to the configured sound root.
    #[must_use]
    pub const fn file(self) -> &'static str {
        match self {
            Self::Send => "aim-send.mp3",
            Self::Receive => "aim-in.mp3",
            Self::DialUp => "dial-up-modem-sound.mp3",
            Self::Welcome => "welcome.mp3",
            Self::GotMail => "you-ve-got-mail.mp3",
            Self::Alert => "alert.mp3",
        }
    }

    /// Per-sample volume before the master volume is applied.
    #[must_use]
    pub const fn volume(self) -> f32 {
        match self {
            Self::Send | Self::Receive => 0.7,
            Self::DialUp => 0.6,
            Self::Welcome | Self::GotMail | Self::Alert => 0.8,
        }
    }
}

/// Kind of media element the host should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Video,
}

/// Commands for the host's media element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MediaCommand {
    Load {
        src: String,
        kind: MediaKind,
        autoplay: bool,
    },
    Play,
    Pause,
    Seek { seconds: f64 },
    SetVolume { volume: f64 },
}

/// Emulator runtime flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DosRuntime {
    /// Pure-JS build; always available.
    Js,
    /// WebAssembly build; falls back to [`DosRuntime::Js`] on failure.
    Wasm,
}

/// Commands for the host's DOS emulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EmulatorCommand {
    Run {
        game: String,
        bundle_url: String,
        runtime: DosRuntime,
        window: String,
    },
    /// Exit through the attached command interface.
    Exit { game: String },
    /// Stop the emulator when no command interface is attached.
    Stop { game: String },
}

/// A side effect for the host to perform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    PlaySound {
        playback: u64,
        cue: SoundCue,
        src: String,
        volume: f32,
    },
    /// Play with a hard time cap; the host stops the sample if it outlives it.
    PlaySoundCapped {
        playback: u64,
        cue: SoundCue,
        src: String,
        volume: f32,
        cap_ms: u64,
    },
    StopSound { playback: u64 },
    StopAllSounds,
    SetMasterVolume { volume: f32 },
    SetMuted { muted: bool },
    OpenUrl { url: String, target: String },
    Media(MediaCommand),
    Emulator(EmulatorCommand),
    Download { filename: String, bytes: Vec<u8> },
    RevealDesktop,
}
