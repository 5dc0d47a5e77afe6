#![forbid(unsafe_code)]

//! Aggregate configuration.
//!
//! Every controller keeps its own `*Config`; [`DesktopConfig`] only groups
//! them so a host can ship one JSON document with whatever it overrides.

use serde::Deserialize;
use tracing::warn;

use crate::audio::AudioConfig;
use crate::browser::BrowserConfig;
use crate::channels::ChannelsConfig;
use crate::chat::ChatConfig;
use crate::dialup::DialupConfig;
use crate::dos::DosConfig;
use crate::folder::FolderConfig;
use crate::mail::MailConfig;
use crate::media::MediaConfig;
use crate::paint::PaintConfig;
use crate::slides::SlidesConfig;
use crate::start_menu::StartMenuConfig;
use crate::terminal::TerminalConfig;

/// Milliseconds between taskbar clock refreshes.
pub const CLOCK_TICK_MS: u64 = 60_000;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    pub audio: AudioConfig,
    pub chat: ChatConfig,
    pub mail: MailConfig,
    pub media: MediaConfig,
    pub paint: PaintConfig,
    pub slides: SlidesConfig,
    pub channels: ChannelsConfig,
    pub folder: FolderConfig,
    pub browser: BrowserConfig,
    pub start_menu: StartMenuConfig,
    pub dos: DosConfig,
    pub terminal: TerminalConfig,
    pub dialup: DialupConfig,
}

impl DesktopConfig {
    /// Parse `text`, falling back to the defaults when it is not valid.
    #[must_use]
    pub fn from_json_or_default(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str(text) {
            Ok(config) => config,
            Err(err) => {
                warn!(%err, "invalid desktop config, using defaults");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn audio(mut self, audio: AudioConfig) -> Self {
        self.audio = audio;
        self
    }

    #[must_use]
    pub fn chat(mut self, chat: ChatConfig) -> Self {
        self.chat = chat;
        self
    }

    #[must_use]
    pub fn dos(mut self, dos: DosConfig) -> Self {
        self.dos = dos;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::DosRuntime;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_documents_override_only_what_they_name() {
        let config = DesktopConfig::from_json_or_default(
            r#"{"dos": {"runtime": "wasm", "asset_base": "https://cdn.test/"}, "terminal": {"scrollback": 50}}"#,
        );
        assert_eq!(config.dos.runtime, DosRuntime::Wasm);
        assert_eq!(config.dos.asset_base, "https://cdn.test/");
        assert_eq!(config.dos.games.len(), 2);
        assert_eq!(config.terminal.scrollback, 50);
        assert_eq!(config.chat, ChatConfig::default());
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        assert_eq!(DesktopConfig::from_json_or_default("{not json"), DesktopConfig::default());
        assert_eq!(DesktopConfig::from_json_or_default("  "), DesktopConfig::default());
    }
}
