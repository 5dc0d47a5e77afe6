#![forbid(unsafe_code)]

//! The Oxford Online apps and the desktop that hosts them.
//!
//! # Role
//! Each app is a controller that owns its own state and mutates the shared
//! window shell through [`Services`]. Controllers never reach each other;
//! [`Desktop`] routes taskbar clicks, title-bar buttons, timers and sound
//! completions to the controller that owns them.
//!
//! Side effects a browser would perform (sounds, media elements, downloads,
//! the DOS emulator) are queued as [`Effect`]s for the host to drain.
//!
//! # Layout
//! - [`services`]: the shared context plus timer and route enums.
//! - [`audio`], [`effects`]: the sound bus and the host effect queue.
//! - [`chat`], [`mail`], [`media`], [`paint`], [`slides`], [`channels`],
//!   [`folder`], [`browser`], [`dos`], [`terminal`]: one controller each.
//! - [`start_menu`], [`desktop_icons`], [`dialup`]: desktop furniture.
//! - [`desktop`], [`snapshot`], [`config`]: composition and host surface.

pub mod audio;
pub mod browser;
pub mod channels;
pub mod chat;
pub mod clipart;
pub mod config;
pub mod desktop;
pub mod desktop_icons;
pub mod dialup;
pub mod dos;
pub mod effects;
pub mod folder;
pub mod mail;
pub mod media;
pub mod paint;
pub mod services;
pub mod slides;
pub mod snapshot;
pub mod start_menu;
pub mod terminal;

pub use audio::{AudioBus, AudioConfig, Playback};
pub use config::DesktopConfig;
pub use desktop::Desktop;
pub use desktop_icons::DesktopIcon;
pub use effects::{DosRuntime, Effect, EmulatorCommand, SoundCue};
pub use services::{AppRoute, Services, TimerEvent};
pub use snapshot::DesktopSnapshot;
pub use start_menu::StartItem;
