#![forbid(unsafe_code)]

//! Oxford Media Player.
//!
//! The host owns the real `<audio>`/`<video>` element. This controller keeps
//! the player model (source, status line, transport state, timer and seek
//! readouts, visualizer bars) and drives the element through
//! [`MediaCommand`] effects. The element reports back with [`MediaEvent`].

use oxford_core::html::escape;
use oxford_core::WindowRect;
use oxford_shell::{AppWindow, AppWindowSpec, ControlButton, ShellConfig, WindowControls, WindowId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::effects::{Effect, MediaCommand, MediaKind};
use crate::services::{AppRoute, Services, TimerEvent};

const SKIP_SECONDS: f64 = 5.0;
const FLASH_MS: u64 = 150;
const BAR_COUNT: usize = 5;
const BAR_MIN: u8 = 8;
const BAR_MAX: u8 = 64;
const BAR_REST: u8 = 10;
const FILE_PREFIX: &str = "#file:";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub file_root: String,
    pub default_audio: String,
    pub title: String,
    pub taskbar_id: String,
    pub icon: String,
    pub rect: WindowRect,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            file_root: "media/Oxford/".to_string(),
            default_audio: "#file:jingle.mp4".to_string(),
            title: "Oxford Media Player".to_string(),
            taskbar_id: "media-player".to_string(),
            icon: "media-icon".to_string(),
            rect: WindowRect::new(140, 140, 420, 340),
        }
    }
}

impl MediaConfig {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn file_root(mut self, root: impl Into<String>) -> Self {
        self.file_root = root.into();
        self
    }
}

/// Strip a query string and fragment.
fn strip_suffixes(src: &str) -> &str {
    let no_query = src.split('?').next().unwrap_or(src);
    no_query.split('#').next().unwrap_or(no_query)
}

/// `#file:name` becomes `{root}name`; anything else is returned as is.
#[must_use]
pub fn resolve_source(root: &str, value: &str) -> String {
    match value.strip_prefix(FILE_PREFIX) {
        Some(name) if !name.trim().is_empty() => format!("{root}{}", name.trim()),
        _ => value.to_string(),
    }
}

/// Video for mp4/webm/ogv/mov, audio otherwise.
#[must_use]
pub fn detect_kind(src: &str) -> MediaKind {
    let clean = strip_suffixes(src);
    let ext = clean.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match ext.as_str() {
        "mp4" | "webm" | "ogv" | "mov" => MediaKind::Video,
        _ => MediaKind::Audio,
    }
}

#[must_use]
pub fn file_name(src: &str) -> String {
    if src.is_empty() {
        return "Unknown Media".to_string();
    }
    let clean = strip_suffixes(src);
    match clean.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => clean.to_string(),
    }
}

/// `mm:ss`, minutes zero-padded to at least two digits.
#[must_use]
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Bar heights from analyser frequency bins.
#[must_use]
pub fn bar_heights(bins: &[u8]) -> [u8; BAR_COUNT] {
    let mut bars = [BAR_MIN; BAR_COUNT];
    let seg = (bins.len() / BAR_COUNT).max(1);
    for (i, bar) in bars.iter_mut().enumerate() {
        let start = i * seg;
        let end = bins.len().min(start + seg);
        if end <= start {
            continue;
        }
        let sum: u32 = bins[start..end].iter().map(|b| u32::from(*b)).sum();
        let avg = f64::from(sum) / (end - start) as f64;
        let height = (avg / 255.0 * f64::from(BAR_MAX)).round();
        *bar = height.clamp(f64::from(BAR_MIN), f64::from(BAR_MAX)) as u8;
    }
    bars
}

/// What to play.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaRequest {
    pub src: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub kind: Option<MediaKind>,
    #[serde(default = "yes")]
    pub autoplay: bool,
    /// Opened from a user click, so the host may start playback at once.
    #[serde(default)]
    pub gesture: bool,
}

const fn yes() -> bool {
    true
}

impl MediaRequest {
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            title: None,
            kind: None,
            autoplay: true,
            gesture: false,
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub const fn kind(mut self, kind: MediaKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub const fn gesture(mut self, gesture: bool) -> Self {
        self.gesture = gesture;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub name: Option<String>,
    pub path: String,
    #[serde(default)]
    pub kind: Option<MediaKind>,
}

/// Transport buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    Play,
    Pause,
    Stop,
    Rewind,
    FastForward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Playing,
    Paused,
    Stopped,
}

/// Reports from the host's media element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MediaEvent {
    Metadata {
        #[serde(default)]
        duration: Option<f64>,
    },
    Playing,
    Paused,
    Ended,
    TimeUpdate {
        current_time: f64,
        #[serde(default)]
        duration: Option<f64>,
    },
    /// The host's play attempt was rejected by the autoplay policy.
    AutoplayBlocked,
    Frequency { bins: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistEntryView {
    pub index: usize,
    /// Escaped display name.
    pub label: String,
}

/// Media player view model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaView {
    pub open: bool,
    pub visible: bool,
    pub src: Option<String>,
    pub kind: Option<MediaKind>,
    pub track_title: String,
    pub status: &'static str,
    pub state: PlayerState,
    pub timer: String,
    pub seek_max: u64,
    pub seek_value: u64,
    pub volume: f64,
    pub click_to_play: bool,
    pub visualizer_visible: bool,
    pub visualizer_active: bool,
    pub bars: [u8; BAR_COUNT],
    pub flashing: Option<Transport>,
    pub playlist_name: String,
    pub playlist: Vec<PlaylistEntryView>,
}

#[derive(Debug)]
pub struct MediaController {
    config: MediaConfig,
    app: AppWindow,
    src: Option<String>,
    kind: MediaKind,
    track_title: Option<String>,
    status: &'static str,
    state: PlayerState,
    current_time: f64,
    duration: Option<f64>,
    timer_forced: bool,
    autoplay_pending: bool,
    scrubbing: bool,
    volume: f64,
    click_to_play: bool,
    bars: [u8; BAR_COUNT],
    flashing: Option<Transport>,
    playlist_name: String,
    playlist: Vec<PlaylistItem>,
}

impl MediaController {
    #[must_use]
    pub fn new(config: MediaConfig) -> Self {
        let app = AppWindow::new(
            AppWindowSpec::new(
                "media-player-window",
                ShellConfig::new(config.title.clone())
                    .class_tag("media-player-window")
                    .rect(config.rect)
                    .controls(WindowControls::minimize_close()),
            )
            .taskbar(config.taskbar_id.clone(), config.title.clone())
            .icon(config.icon.clone()),
        );
        Self {
            config,
            app,
            src: None,
            kind: MediaKind::Audio,
            track_title: None,
            status: "Ready",
            state: PlayerState::Stopped,
            current_time: 0.0,
            duration: None,
            timer_forced: false,
            autoplay_pending: false,
            scrubbing: false,
            volume: 1.0,
            click_to_play: false,
            bars: [BAR_REST; BAR_COUNT],
            flashing: None,
            playlist_name: String::new(),
            playlist: Vec::new(),
        }
    }

    #[must_use]
    pub fn window_id(&self) -> &WindowId {
        self.app.id()
    }

    #[must_use]
    pub fn is_open(&self, services: &Services) -> bool {
        self.app.is_open(&services.shell)
    }

    #[must_use]
    pub const fn state(&self) -> PlayerState {
        self.state
    }

    #[must_use]
    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    /// The Oxford Innovation clip.
    pub fn open_oxford_innovation(&mut self, services: &mut Services, gesture: bool) {
        let request = MediaRequest::new(self.config.default_audio.clone())
            .title("OxfordInnovation.mp4")
            .kind(MediaKind::Video)
            .gesture(gesture);
        self.open(services, request);
    }

    /// Show the player (creating it if needed) and load `request`.
    pub fn open(&mut self, services: &mut Services, request: MediaRequest) {
        if request.src.is_empty() {
            return;
        }
        let src = resolve_source(&self.config.file_root, &request.src);
        let kind = request.kind.unwrap_or_else(|| detect_kind(&src));
        self.app.open(&mut services.shell, AppRoute::MediaPlayer);
        self.load(services, src, kind, request);
    }

    fn load(&mut self, services: &mut Services, src: String, kind: MediaKind, request: MediaRequest) {
        self.track_title = Some(request.title.unwrap_or_else(|| file_name(&src)));
        self.kind = kind;
        self.current_time = 0.0;
        self.duration = None;
        self.timer_forced = false;
        self.status = "Loading";
        self.autoplay_pending = request.autoplay;
        services.emit(Effect::Media(MediaCommand::Load {
            src: src.clone(),
            kind,
            autoplay: request.autoplay,
        }));
        if request.autoplay && request.gesture {
            services.emit(Effect::Media(MediaCommand::Play));
        }
        info!(src = %src, ?kind, "media loaded");
        self.src = Some(src);
    }

    /// Apply a report from the host element.
    pub fn on_event(&mut self, services: &mut Services, event: MediaEvent) {
        if self.src.is_none() {
            return;
        }
        match event {
            MediaEvent::Metadata { duration } => {
                self.status = "Ready";
                self.duration = duration.filter(|d| d.is_finite() && *d > 0.0);
                self.timer_forced = true;
                if self.autoplay_pending && self.state != PlayerState::Playing {
                    services.emit(Effect::Media(MediaCommand::Play));
                }
            }
            MediaEvent::Playing => {
                self.status = "Playing";
                self.autoplay_pending = false;
                self.set_state(PlayerState::Playing);
            }
            MediaEvent::Paused => {
                self.status = "Paused";
                self.set_state(PlayerState::Paused);
            }
            MediaEvent::Ended => {
                self.status = "Stopped";
                self.set_state(PlayerState::Stopped);
                self.timer_forced = true;
                self.bars = [BAR_REST; BAR_COUNT];
            }
            MediaEvent::TimeUpdate { current_time, duration } => {
                if !self.scrubbing && current_time.is_finite() {
                    self.current_time = current_time.max(0.0);
                }
                if let Some(d) = duration.filter(|d| d.is_finite() && *d > 0.0) {
                    self.duration = Some(d);
                }
            }
            MediaEvent::AutoplayBlocked => {
                self.status = "Ready";
                self.autoplay_pending = false;
                self.click_to_play = true;
                debug!("autoplay blocked");
            }
            MediaEvent::Frequency { bins } => {
                if self.kind == MediaKind::Audio && self.state == PlayerState::Playing {
                    self.bars = bar_heights(&bins);
                }
            }
        }
    }

    fn set_state(&mut self, state: PlayerState) {
        self.state = state;
        match state {
            PlayerState::Playing => self.click_to_play = false,
            PlayerState::Stopped => self.click_to_play = true,
            PlayerState::Paused => {}
        }
    }

    /// Transport buttons; ignored with nothing loaded.
    pub fn transport(&mut self, services: &mut Services, action: Transport) {
        if self.src.is_none() {
            return;
        }
        match action {
            Transport::Play => {
                services.emit(Effect::Media(MediaCommand::Play));
                self.set_state(PlayerState::Playing);
            }
            Transport::Pause => {
                services.emit(Effect::Media(MediaCommand::Pause));
                self.set_state(PlayerState::Paused);
            }
            Transport::Stop => {
                services.emit(Effect::Media(MediaCommand::Pause));
                self.seek_to(services, 0.0);
                self.status = "Stopped";
                self.set_state(PlayerState::Stopped);
                self.timer_forced = true;
            }
            Transport::Rewind => {
                let target = (self.current_time - SKIP_SECONDS).max(0.0);
                self.seek_to(services, target);
                self.flash(services, action);
            }
            Transport::FastForward => {
                let ahead = self.current_time + SKIP_SECONDS;
                let target = self.duration.map_or(ahead, |d| ahead.min(d));
                self.seek_to(services, target);
                self.flash(services, action);
            }
        }
    }

    fn seek_to(&mut self, services: &mut Services, seconds: f64) {
        self.current_time = seconds;
        services.emit(Effect::Media(MediaCommand::Seek { seconds }));
    }

    fn flash(&mut self, services: &mut Services, action: Transport) {
        self.flashing = Some(action);
        services.schedule(FLASH_MS, None, TimerEvent::MediaFlashEnd);
    }

    pub fn on_flash_end(&mut self) {
        self.flashing = None;
    }

    /// Seek slider input; only meaningful once the duration is known.
    pub fn scrub(&mut self, services: &mut Services, value: f64) {
        if self.src.is_none() {
            return;
        }
        self.scrubbing = true;
        if let Some(duration) = self.duration {
            let target = if value.is_finite() { value.clamp(0.0, duration) } else { 0.0 };
            self.seek_to(services, target);
            self.timer_forced = true;
        }
    }

    /// Seek slider released.
    pub fn end_scrub(&mut self) {
        self.scrubbing = false;
    }

    pub fn set_volume(&mut self, services: &mut Services, volume: f64) {
        if self.src.is_none() {
            return;
        }
        self.volume = if volume.is_nan() { 1.0 } else { volume.clamp(0.0, 1.0) };
        services.emit(Effect::Media(MediaCommand::SetVolume { volume: self.volume }));
    }

    pub fn set_playlist(&mut self, name: &str, items: Vec<PlaylistItem>) {
        self.playlist_name = name.to_string();
        self.playlist = items;
    }

    pub fn select_playlist(&mut self, services: &mut Services, index: usize) -> bool {
        let Some(item) = self.playlist.get(index).cloned() else {
            return false;
        };
        let mut request = MediaRequest::new(item.path);
        request.title = item.name;
        request.kind = item.kind;
        self.open(services, request);
        true
    }

    pub fn minimize(&self, services: &mut Services) {
        self.app.minimize(&mut services.shell);
    }

    pub fn activate(&self, services: &mut Services) {
        if self.is_open(services) {
            self.app.activate(&mut services.shell);
        }
    }

    /// Pause, drop the element and remove the window and taskbar entry.
    pub fn close(&mut self, services: &mut Services) {
        if !self.is_open(services) {
            return;
        }
        if self.src.take().is_some() {
            services.emit(Effect::Media(MediaCommand::Pause));
        }
        self.app.close(&mut services.shell);
        self.state = PlayerState::Stopped;
        self.status = "Ready";
        self.click_to_play = false;
        self.bars = [BAR_REST; BAR_COUNT];
        debug!("media player closed");
    }

    /// A taskbar click while closed starts the Oxford clip.
    pub fn toggle_from_taskbar(&mut self, services: &mut Services) {
        if self.is_open(services) {
            self.app.toggle_from_taskbar(&mut services.shell, AppRoute::MediaPlayer);
        } else {
            self.open_oxford_innovation(services, true);
        }
    }

    pub fn handle_control(&mut self, services: &mut Services, button: ControlButton) {
        match button {
            ControlButton::Minimize => self.minimize(services),
            ControlButton::Close => self.close(services),
            ControlButton::Maximize => {}
        }
    }

    fn timer_text(&self) -> String {
        let duration = self.duration.unwrap_or(0.0);
        if self.src.is_none() || (!self.timer_forced && duration == 0.0 && self.current_time == 0.0) {
            return "00:00 / 00:00".to_string();
        }
        let total = self.duration.map_or_else(|| "--:--".to_string(), format_time);
        format!("{} / {total}", format_time(self.current_time))
    }

    #[must_use]
    pub fn view(&self, services: &Services) -> MediaView {
        let seek_max = self.duration.map_or(0, |d| d.floor() as u64);
        let seek_value = if seek_max == 0 { 0 } else { self.current_time.floor() as u64 };
        let loaded = self.src.is_some();
        MediaView {
            open: self.is_open(services),
            visible: self.app.is_visible(&services.shell),
            src: self.src.clone(),
            kind: loaded.then_some(self.kind),
            track_title: if loaded {
                self.track_title.clone().unwrap_or_default()
            } else {
                "No media loaded".to_string()
            },
            status: self.status,
            state: self.state,
            timer: self.timer_text(),
            seek_max,
            seek_value,
            volume: self.volume,
            click_to_play: self.click_to_play,
            visualizer_visible: !loaded || self.kind == MediaKind::Audio,
            visualizer_active: self.state == PlayerState::Playing,
            bars: self.bars,
            flashing: self.flashing,
            playlist_name: self.playlist_name.clone(),
            playlist: self
                .playlist
                .iter()
                .enumerate()
                .map(|(index, item)| PlaylistEntryView {
                    index,
                    label: escape(&item.name.clone().unwrap_or_else(|| file_name(&item.path))),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::services;
    use pretty_assertions::assert_eq;

    fn media_effects(services: &mut Services) -> Vec<MediaCommand> {
        services
            .take_effects()
            .into_iter()
            .filter_map(|e| match e {
                Effect::Media(cmd) => Some(cmd),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn sources_resolve_and_classify() {
        assert_eq!(resolve_source("media/Oxford/", "#file:jingle.mp4"), "media/Oxford/jingle.mp4");
        assert_eq!(resolve_source("media/Oxford/", "#file:  "), "#file:  ");
        assert_eq!(detect_kind("clip.MOV?x=1"), MediaKind::Video);
        assert_eq!(detect_kind("song.mp3#t=3"), MediaKind::Audio);
        assert_eq!(file_name("media/intro.mp4?v=2"), "intro.mp4");
        assert_eq!(file_name(""), "Unknown Media");
        assert_eq!(format_time(125.9), "02:05");
    }

    #[test]
    fn bars_are_clamped() {
        let quiet = bar_heights(&[0; 20]);
        assert_eq!(quiet, [8; 5]);
        let loud = bar_heights(&[255; 20]);
        assert_eq!(loud, [64; 5]);
        let half = bar_heights(&[128; 10]);
        assert_eq!(half[0], 32);
    }

    #[test]
    fn innovation_with_gesture_loads_and_plays_at_once() {
        let mut services = services();
        let mut media = MediaController::new(MediaConfig::default());
        media.open_oxford_innovation(&mut services, true);
        assert_eq!(
            media_effects(&mut services),
            vec![
                MediaCommand::Load {
                    src: "media/Oxford/jingle.mp4".into(),
                    kind: MediaKind::Video,
                    autoplay: true
                },
                MediaCommand::Play
            ]
        );
        let view = media.view(&services);
        assert_eq!(view.track_title, "OxfordInnovation.mp4");
        assert_eq!(view.status, "Loading");
        assert_eq!(view.timer, "00:00 / 00:00");
        assert!(!view.visualizer_visible);
        assert!(services.shell.taskbar.is_active("media-player"));
    }

    #[test]
    fn metadata_retries_autoplay_and_blocked_shows_click_to_play() {
        let mut services = services();
        let mut media = MediaController::new(MediaConfig::default());
        media.open(&mut services, MediaRequest::new("media/song.mp3"));
        services.take_effects();
        media.on_event(&mut services, MediaEvent::Metadata { duration: Some(61.5) });
        assert_eq!(media_effects(&mut services), vec![MediaCommand::Play]);
        assert_eq!(media.view(&services).timer, "00:00 / 01:01");
        media.on_event(&mut services, MediaEvent::AutoplayBlocked);
        let view = media.view(&services);
        assert_eq!(view.status, "Ready");
        assert!(view.click_to_play);
        media.on_event(&mut services, MediaEvent::Playing);
        assert!(!media.view(&services).click_to_play);
    }

    #[test]
    fn transport_seeks_within_bounds() {
        let mut services = services();
        let mut media = MediaController::new(MediaConfig::default());
        media.open(&mut services, MediaRequest::new("a.mp3"));
        media.on_event(&mut services, MediaEvent::Metadata { duration: Some(7.0) });
        media.on_event(&mut services, MediaEvent::TimeUpdate { current_time: 4.0, duration: None });
        services.take_effects();
        media.transport(&mut services, Transport::FastForward);
        assert_eq!(media_effects(&mut services), vec![MediaCommand::Seek { seconds: 7.0 }]);
        assert_eq!(media.view(&services).flashing, Some(Transport::FastForward));
        media.transport(&mut services, Transport::Rewind);
        media.transport(&mut services, Transport::Rewind);
        assert_eq!(media_effects(&mut services), vec![
            MediaCommand::Seek { seconds: 2.0 },
            MediaCommand::Seek { seconds: 0.0 }
        ]);
        media.transport(&mut services, Transport::Stop);
        let view = media.view(&services);
        assert_eq!(view.status, "Stopped");
        assert_eq!(view.state, PlayerState::Stopped);
        assert!(view.click_to_play);
        assert_eq!(view.timer, "00:00 / 00:07");
    }

    #[test]
    fn unknown_duration_shows_dashes() {
        let mut services = services();
        let mut media = MediaController::new(MediaConfig::default());
        media.open(&mut services, MediaRequest::new("live.mp3"));
        media.on_event(&mut services, MediaEvent::TimeUpdate { current_time: 3.0, duration: None });
        media.transport(&mut services, Transport::FastForward);
        assert_eq!(media.view(&services).timer, "00:08 / --:--");
    }

    #[test]
    fn volume_is_clamped_and_ignored_without_media() {
        let mut services = services();
        let mut media = MediaController::new(MediaConfig::default());
        media.set_volume(&mut services, 0.5);
        assert!(services.take_effects().is_empty());
        media.open(&mut services, MediaRequest::new("a.mp3"));
        media.set_volume(&mut services, 3.0);
        media.set_volume(&mut services, f64::NAN);
        assert_eq!(media.view(&services).volume, 1.0);
    }

    #[test]
    fn playlist_selection_opens_the_item() {
        let mut services = services();
        let mut media = MediaController::new(MediaConfig::default());
        media.set_playlist(
            "Homework",
            vec![PlaylistItem {
                name: Some("<intro>.mp4".into()),
                path: "media/intro.mp4".into(),
                kind: None,
            }],
        );
        assert!(media.select_playlist(&mut services, 0));
        assert!(!media.select_playlist(&mut services, 3));
        let view = media.view(&services);
        assert_eq!(view.src.as_deref(), Some("media/intro.mp4"));
        assert_eq!(view.kind, Some(MediaKind::Video));
        assert_eq!(view.playlist[0].label, "&lt;intro&gt;.mp4");
    }

    #[test]
    fn close_pauses_and_taskbar_reopens_the_clip() {
        let mut services = services();
        let mut media = MediaController::new(MediaConfig::default());
        media.open(&mut services, MediaRequest::new("a.mp3"));
        services.take_effects();
        media.handle_control(&mut services, ControlButton::Close);
        assert_eq!(media_effects(&mut services), vec![MediaCommand::Pause]);
        assert!(!services.shell.taskbar.contains("media-player"));
        media.toggle_from_taskbar(&mut services);
        assert_eq!(media.src(), Some("media/Oxford/jingle.mp4"));
    }

    #[test]
    fn visualizer_follows_audio_playback_and_rests_on_end() {
        let mut services = services();
        let mut media = MediaController::new(MediaConfig::default());
        media.open(&mut services, MediaRequest::new("a.mp3"));
        media.on_event(&mut services, MediaEvent::Frequency { bins: vec![255; 10] });
        assert_eq!(media.view(&services).bars, [10; 5]);
        media.on_event(&mut services, MediaEvent::Playing);
        media.on_event(&mut services, MediaEvent::Frequency { bins: vec![255; 10] });
        assert_eq!(media.view(&services).bars, [64; 5]);
        media.on_event(&mut services, MediaEvent::Ended);
        assert_eq!(media.view(&services).bars, [10; 5]);
    }
}
