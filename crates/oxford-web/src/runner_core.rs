#![forbid(unsafe_code)]

//! Platform-independent runner core wrapping [`Desktop`].
//!
//! This module contains the logic shared between the wasm-bindgen exports
//! and the native test harness. No JS/WASM types here.

use std::collections::VecDeque;

use chrono::{DateTime, NaiveDateTime, TimeDelta};
use oxford_apps::chat::ChatWindow;
use oxford_apps::dos::FailureStage;
use oxford_apps::mail::ListKey;
use oxford_apps::mail::compose::ComposeEdit;
use oxford_apps::mail::store::{Folder, SortKey};
use oxford_apps::media::{MediaEvent, Transport};
use oxford_apps::paint::Tool;
use oxford_apps::{Desktop, DesktopConfig, DesktopIcon, Effect, Services, StartItem};
use oxford_core::logging::{CaptureHandle, capture_dispatch};
use oxford_core::{HostClock, Point, SeededRandom, StorageBackend, Viewport};
use oxford_shell::{ControlButton, PointerButton, PointerDispatch, ResizeHandle, WindowId};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use web_time::{Duration, Instant};

/// Most log lines kept between drains; older lines are dropped first.
pub const LOG_CAPACITY: usize = 512;

/// Why a host command was not applied.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("host command is not valid JSON or has an unknown shape: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("host command has no \"kind\" field")]
    MissingKind,
    #[error("{kind} refers to unknown window {window}")]
    UnknownWindow { kind: &'static str, window: String },
}

/// Phase of a paint stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokePhase {
    Down,
    Move,
    Up,
}

/// Everything the host can tell the desktop, as JSON tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostCommand {
    Boot,
    Login {
        user: String,
        password: String,
        #[serde(default)]
        dial_ms: Option<u64>,
    },
    SkipIntro,
    ResetIntro,
    Resize {
        width: i32,
        height: i32,
    },
    Tick {
        dt_ms: f64,
    },
    WallClock {
        epoch_ms: i64,
        #[serde(default)]
        offset_minutes: i32,
    },
    TitlePointerDown {
        window: String,
        pointer_id: u32,
        button: PointerButton,
        x: i32,
        y: i32,
        #[serde(default)]
        on_control: bool,
    },
    HandlePointerDown {
        window: String,
        handle: ResizeHandle,
        pointer_id: u32,
        button: PointerButton,
        x: i32,
        y: i32,
    },
    PointerMove {
        pointer_id: u32,
        x: i32,
        y: i32,
    },
    PointerUp {
        pointer_id: u32,
        button: PointerButton,
        x: i32,
        y: i32,
    },
    PointerCancel {
        #[serde(default)]
        pointer_id: Option<u32>,
    },
    PointerLeave {
        pointer_id: u32,
    },
    CaptureAcquired {
        pointer_id: u32,
    },
    LostPointerCapture {
        pointer_id: u32,
    },
    Blur,
    WindowControl {
        window: String,
        button: ControlButton,
    },
    FocusWindow {
        window: String,
    },
    TaskbarClick {
        id: String,
    },
    IconClick {
        icon: DesktopIcon,
    },
    IconOpen {
        icon: DesktopIcon,
    },
    IconKey {
        icon: DesktopIcon,
        key: String,
    },
    DesktopClick,
    StartButton,
    StartItem {
        item: StartItem,
    },
    DocumentClick {
        inside: bool,
    },
    ChatOpen {
        buddy: String,
    },
    ChatSend {
        text: String,
    },
    ChatControl {
        window: ChatWindow,
        button: ControlButton,
    },
    MailFolder {
        folder: Folder,
    },
    MailSort {
        key: SortKey,
    },
    MailOpenMessage {
        id: String,
    },
    MailToggleRead,
    MailKey {
        key: ListKey,
    },
    MailTogglePreview,
    MailNudge {
        grow: bool,
    },
    MailSplitterDrag {
        start_width: f64,
        pane_width: f64,
        dx: f64,
    },
    MailSplitterEnd,
    MailRefresh,
    MailReply,
    MailDelete,
    MailCompose {
        #[serde(default)]
        to: String,
        #[serde(default)]
        subject: String,
        #[serde(default)]
        body: String,
    },
    MailComposeEdit {
        id: u32,
        edit: ComposeEdit,
    },
    MailComposeSend {
        id: u32,
    },
    MailComposeCancel {
        id: u32,
    },
    Media {
        event: MediaEvent,
    },
    MediaTransport {
        action: Transport,
    },
    MediaScrub {
        value: f64,
    },
    MediaScrubEnd,
    MediaVolume {
        volume: f64,
    },
    MediaPlaylist {
        index: usize,
    },
    PaintBase {
        width: u32,
        height: u32,
        #[serde(default)]
        rgba: Option<Vec<u8>>,
    },
    PaintBaseFailed,
    PaintFit {
        width: f64,
        height: f64,
    },
    PaintTool {
        tool: Tool,
    },
    PaintColor {
        color: String,
    },
    PaintSize {
        size: u32,
    },
    PaintStroke {
        phase: StrokePhase,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },
    PaintUndo,
    PaintRedo,
    PaintSave,
    SlidesNext {
        window: String,
    },
    SlidesPrev {
        window: String,
    },
    SlidesTitleDoubleClick {
        window: String,
    },
    SlidesExhibit {
        window: String,
    },
    SlidesMedia {
        window: String,
        link: usize,
    },
    ChannelTile {
        index: usize,
    },
    FolderFile {
        folder: String,
        index: usize,
    },
    BrowserOpen {
        #[serde(default)]
        url: Option<String>,
    },
    BrowserOpenTab,
    TerminalData {
        data: String,
    },
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
    },
    SoundEnded {
        playback: u64,
    },
    MasterVolume {
        volume: f32,
    },
    Mute {
        muted: bool,
    },
    DosOpen {
        game: String,
    },
    EmulatorStarted {
        game: String,
    },
    EmulatorFailed {
        game: String,
        stage: FailureStage,
        #[serde(default)]
        message: String,
    },
    EmulatorRetry {
        game: String,
    },
}

impl HostCommand {
    /// Parse one JSON-encoded command.
    pub fn parse(json: &str) -> Result<Self, CommandError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.get("kind").and_then(serde_json::Value::as_str).is_none() {
            return Err(CommandError::MissingKind);
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn wall_from_epoch(epoch_ms: i64, offset_minutes: i32) -> Option<NaiveDateTime> {
    let utc = DateTime::from_timestamp_millis(epoch_ms)?.naive_utc();
    utc.checked_add_signed(TimeDelta::try_minutes(i64::from(offset_minutes))?)
}

/// Platform-independent desktop runner.
#[derive(Debug)]
pub struct RunnerCore {
    desktop: Desktop,
    dispatch: tracing::Dispatch,
    capture: CaptureHandle,
    logs: VecDeque<String>,
    pointer_results: Vec<PointerDispatch>,
    last_real: Option<Instant>,
}

impl RunnerCore {
    /// Create a runner for a `width`×`height` viewport. `config_json` may be
    /// empty; invalid JSON falls back to defaults.
    pub fn new(width: i32, height: i32, seed: u64, epoch_ms: i64, offset_minutes: i32, config_json: &str) -> Self {
        let (dispatch, capture) = capture_dispatch();
        let wall = wall_from_epoch(epoch_ms, offset_minutes).unwrap_or_default();
        let desktop = tracing::dispatcher::with_default(&dispatch, || {
            let config = DesktopConfig::from_json_or_default(config_json);
            let services = Services::new(
                Viewport::new(width, height),
                HostClock::new(wall),
                Box::new(SeededRandom::new(seed)),
            );
            Desktop::new(config, services)
        });
        let mut core = Self {
            desktop,
            dispatch,
            capture,
            logs: VecDeque::new(),
            pointer_results: Vec::new(),
            last_real: None,
        };
        core.collect_logs();
        core
    }

    /// Swap in host storage. Call before [`boot`](Self::boot).
    pub fn set_storage(&mut self, session: Box<dyn StorageBackend>, local: Box<dyn StorageBackend>) {
        let services = std::mem::replace(
            &mut self.desktop.services,
            Services::new(Viewport::default(), HostClock::default(), Box::new(SeededRandom::new(0))),
        );
        self.desktop.services = services.with_session(session).with_local(local);
    }

    #[must_use]
    pub const fn desktop(&self) -> &Desktop {
        &self.desktop
    }

    /// Show the intro or bring the desktop straight up.
    pub fn boot(&mut self) -> bool {
        self.run(Desktop::boot)
    }

    /// Advance the host clock by `dt_ms` milliseconds.
    pub fn advance_time_ms(&mut self, dt_ms: f64) {
        // Host input can be noisy (NaN/inf/negative spikes).
        if !dt_ms.is_finite() || dt_ms <= 0.0 {
            return;
        }
        let secs = (dt_ms / 1000.0).min(Duration::MAX.as_secs_f64());
        let dt = Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX);
        self.run(|desktop| desktop.advance(dt));
    }

    /// Advance by the real time elapsed since the previous call.
    pub fn advance_real_time(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_real.replace(now) {
            let dt = now.saturating_duration_since(last);
            self.run(|desktop| desktop.advance(dt));
        }
    }

    /// Parse a JSON-encoded host command and apply it.
    ///
    /// Returns `true` if the command was applied, `false` if it was
    /// malformed, unknown, or rejected by the desktop.
    pub fn push_encoded_command(&mut self, json: &str) -> bool {
        match HostCommand::parse(json).and_then(|command| self.apply(command)) {
            Ok(applied) => applied,
            Err(err) => {
                self.run(|_| warn!(%err, "host command rejected"));
                false
            }
        }
    }

    /// Apply one typed command.
    pub fn apply(&mut self, command: HostCommand) -> Result<bool, CommandError> {
        let dispatch = self.dispatch.clone();
        let result = tracing::dispatcher::with_default(&dispatch, || self.apply_inner(command));
        self.collect_logs();
        result
    }

    fn apply_inner(&mut self, command: HostCommand) -> Result<bool, CommandError> {
        let desktop = &mut self.desktop;
        match command {
            HostCommand::Boot => return Ok(desktop.boot()),
            HostCommand::Login { user, password, dial_ms } => return Ok(desktop.login(&user, &password, dial_ms)),
            HostCommand::SkipIntro => return Ok(desktop.skip_intro()),
            HostCommand::ResetIntro => desktop.dialup.reset(&mut desktop.services),
            HostCommand::Resize { width, height } => desktop.resize(width, height),
            HostCommand::Tick { dt_ms } => {
                if !dt_ms.is_finite() || dt_ms < 0.0 {
                    return Ok(false);
                }
                let dt = Duration::try_from_secs_f64(dt_ms / 1000.0).unwrap_or(Duration::MAX);
                desktop.advance(dt);
            }
            HostCommand::WallClock { epoch_ms, offset_minutes } => {
                let Some(wall) = wall_from_epoch(epoch_ms, offset_minutes) else {
                    return Ok(false);
                };
                desktop.services.clock.set_wall(wall);
            }
            HostCommand::TitlePointerDown { window, pointer_id, button, x, y, on_control } => {
                let id = Self::known_window(desktop, "title_pointer_down", window)?;
                let result = desktop.services.shell.title_pointer_down(&id, pointer_id, button, Point::new(x, y), on_control);
                return Ok(self.record_pointer(result));
            }
            HostCommand::HandlePointerDown { window, handle, pointer_id, button, x, y } => {
                let id = Self::known_window(desktop, "handle_pointer_down", window)?;
                let result =
                    desktop.services.shell.handle_pointer_down(&id, handle, pointer_id, button, Point::new(x, y));
                return Ok(self.record_pointer(result));
            }
            HostCommand::PointerMove { pointer_id, x, y } => {
                let result = desktop.services.shell.pointer_move(pointer_id, Point::new(x, y));
                return Ok(self.record_pointer(result));
            }
            HostCommand::PointerUp { pointer_id, button, x, y } => {
                let result = desktop.services.shell.pointer.pointer_up(pointer_id, button, Point::new(x, y));
                return Ok(self.record_pointer(result));
            }
            HostCommand::PointerCancel { pointer_id } => {
                let result = desktop.services.shell.pointer.pointer_cancel(pointer_id);
                return Ok(self.record_pointer(result));
            }
            HostCommand::PointerLeave { pointer_id } => {
                let result = desktop.services.shell.pointer.pointer_leave(pointer_id);
                return Ok(self.record_pointer(result));
            }
            HostCommand::CaptureAcquired { pointer_id } => {
                let result = desktop.services.shell.pointer.capture_acquired(pointer_id);
                return Ok(self.record_pointer(result));
            }
            HostCommand::LostPointerCapture { pointer_id } => {
                let result = desktop.services.shell.pointer.lost_pointer_capture(pointer_id);
                return Ok(self.record_pointer(result));
            }
            HostCommand::Blur => {
                let result = desktop.services.shell.pointer.blur();
                return Ok(self.record_pointer(result));
            }
            HostCommand::WindowControl { window, button } => {
                let id = Self::known_window(desktop, "window_control", window)?;
                return Ok(desktop.window_control(&id, button));
            }
            HostCommand::FocusWindow { window } => {
                let id = Self::known_window(desktop, "focus_window", window)?;
                return Ok(desktop.focus_window(&id));
            }
            HostCommand::TaskbarClick { id } => return Ok(desktop.taskbar_click(&id)),
            HostCommand::IconClick { icon } => desktop.icons.click(icon),
            HostCommand::IconOpen { icon } => desktop.open_icon(icon),
            HostCommand::IconKey { icon, key } => match desktop.icons.key(icon, &key) {
                Some(icon) => desktop.open_icon(icon),
                None => return Ok(false),
            },
            HostCommand::DesktopClick => desktop.icons.clear_selection(),
            HostCommand::StartButton => desktop.start_button(),
            HostCommand::StartItem { item } => desktop.start_item(item),
            HostCommand::DocumentClick { inside } => desktop.document_click(inside),
            HostCommand::ChatOpen { buddy } => desktop.chat.open_chat(&mut desktop.services, &buddy, false),
            HostCommand::ChatSend { text } => return Ok(desktop.chat.send(&mut desktop.services, &text)),
            HostCommand::ChatControl { window, button } => {
                desktop.chat.handle_control(&mut desktop.services, window, button);
            }
            HostCommand::MailFolder { folder } => desktop.mail.switch_folder(&mut desktop.services, folder),
            HostCommand::MailSort { key } => desktop.mail.toggle_sort(&mut desktop.services, key),
            HostCommand::MailOpenMessage { id } => return Ok(desktop.mail.open_message(&mut desktop.services, &id)),
            HostCommand::MailToggleRead => desktop.mail.toggle_read(&mut desktop.services),
            HostCommand::MailKey { key } => desktop.mail.key_nav(&mut desktop.services, key),
            HostCommand::MailTogglePreview => desktop.mail.toggle_preview(&mut desktop.services),
            HostCommand::MailNudge { grow } => desktop.mail.nudge_list(&mut desktop.services, grow),
            HostCommand::MailSplitterDrag { start_width, pane_width, dx } => {
                desktop.mail.drag_list(start_width, pane_width, dx);
            }
            HostCommand::MailSplitterEnd => desktop.mail.end_list_drag(&mut desktop.services),
            HostCommand::MailRefresh => desktop.mail.refresh(&mut desktop.services),
            HostCommand::MailReply => return Ok(desktop.mail.reply(&mut desktop.services).is_some()),
            HostCommand::MailDelete => desktop.mail.delete(&mut desktop.services),
            HostCommand::MailCompose { to, subject, body } => {
                desktop.mail.open_compose(&mut desktop.services, &to, &subject, &body);
            }
            HostCommand::MailComposeEdit { id, edit } => return Ok(desktop.mail.edit_compose(id, edit)),
            HostCommand::MailComposeSend { id } => return Ok(desktop.mail.send_compose(&mut desktop.services, id)),
            HostCommand::MailComposeCancel { id } => desktop.mail.cancel_compose(&mut desktop.services, id),
            HostCommand::Media { event } => desktop.media.on_event(&mut desktop.services, event),
            HostCommand::MediaTransport { action } => desktop.media.transport(&mut desktop.services, action),
            HostCommand::MediaScrub { value } => desktop.media.scrub(&mut desktop.services, value),
            HostCommand::MediaScrubEnd => desktop.media.end_scrub(),
            HostCommand::MediaVolume { volume } => desktop.media.set_volume(&mut desktop.services, volume),
            HostCommand::MediaPlaylist { index } => {
                return Ok(desktop.media.select_playlist(&mut desktop.services, index));
            }
            HostCommand::PaintBase { width, height, rgba } => desktop.paint.base_loaded(width, height, rgba),
            HostCommand::PaintBaseFailed => desktop.paint.base_failed(),
            HostCommand::PaintFit { width, height } => desktop.paint.fit(width, height),
            HostCommand::PaintTool { tool } => desktop.paint.set_tool(tool),
            HostCommand::PaintColor { color } => return Ok(desktop.paint.set_color(&color)),
            HostCommand::PaintSize { size } => desktop.paint.set_size(size),
            HostCommand::PaintStroke { phase, x, y } => match phase {
                StrokePhase::Down => desktop.paint.pointer_down(x, y),
                StrokePhase::Move => desktop.paint.pointer_move(x, y),
                StrokePhase::Up => desktop.paint.pointer_up(),
            },
            HostCommand::PaintUndo => desktop.paint.undo(),
            HostCommand::PaintRedo => desktop.paint.redo(),
            HostCommand::PaintSave => match desktop.paint.save(&mut desktop.services) {
                Ok(bytes) => debug!(bytes, "paint exported"),
                Err(err) => {
                    warn!(%err, "paint export failed");
                    return Ok(false);
                }
            },
            HostCommand::SlidesNext { window } => {
                let id = Self::known_window(desktop, "slides_next", window)?;
                desktop.slides.next(&id);
            }
            HostCommand::SlidesPrev { window } => {
                let id = Self::known_window(desktop, "slides_prev", window)?;
                desktop.slides.prev(&id);
            }
            HostCommand::SlidesTitleDoubleClick { window } => {
                let id = Self::known_window(desktop, "slides_title_double_click", window)?;
                desktop.slides.title_double_click(&id);
            }
            HostCommand::SlidesExhibit { window } => {
                let id = Self::known_window(desktop, "slides_exhibit", window)?;
                desktop.slides.toggle_exhibit(&id);
            }
            HostCommand::SlidesMedia { window, link } => {
                let id = Self::known_window(desktop, "slides_media", window)?;
                return Ok(desktop.play_slide_media(&id, link));
            }
            HostCommand::ChannelTile { index } => return Ok(desktop.open_channel_tile(index).is_some()),
            HostCommand::FolderFile { folder, index } => return Ok(desktop.open_folder_file(&folder, index)),
            HostCommand::BrowserOpen { url } => desktop.browser.open(&mut desktop.services, url.as_deref()),
            HostCommand::BrowserOpenTab => desktop.browser.open_in_tab(&mut desktop.services),
            HostCommand::TerminalData { data } => desktop.terminal_input(&data),
            HostCommand::Key { key, ctrl, shift } => return Ok(desktop.key(&key, ctrl, shift)),
            HostCommand::SoundEnded { playback } => desktop.sound_ended(playback),
            HostCommand::MasterVolume { volume } => {
                let services = &mut desktop.services;
                services.audio.set_volume(volume, &mut services.effects);
            }
            HostCommand::Mute { muted } => {
                let services = &mut desktop.services;
                services.audio.set_muted(muted, &mut services.effects);
            }
            HostCommand::DosOpen { game } => return Ok(desktop.dos.open(&mut desktop.services, &game)),
            HostCommand::EmulatorStarted { game } => desktop.dos.started(&game),
            HostCommand::EmulatorFailed { game, stage, message } => {
                desktop.dos.failed(&mut desktop.services, &game, stage, &message);
            }
            HostCommand::EmulatorRetry { game } => desktop.dos.retry(&mut desktop.services, &game),
        }
        Ok(true)
    }

    fn known_window(desktop: &Desktop, kind: &'static str, window: String) -> Result<WindowId, CommandError> {
        let id = WindowId::new(window);
        if desktop.services.shell.windows.contains(&id) {
            Ok(id)
        } else {
            Err(CommandError::UnknownWindow {
                kind,
                window: id.as_str().to_string(),
            })
        }
    }

    fn record_pointer(&mut self, result: PointerDispatch) -> bool {
        let accepted = result.accepted();
        debug!(
            phase = ?result.log.phase,
            pointer_id = ?result.log.pointer_id,
            window = ?result.log.window,
            outcome = ?result.log.outcome,
            "window_pointer"
        );
        self.pointer_results.push(result);
        accepted
    }

    fn run<T>(&mut self, f: impl FnOnce(&mut Desktop) -> T) -> T {
        let desktop = &mut self.desktop;
        let result = tracing::dispatcher::with_default(&self.dispatch, || f(desktop));
        self.collect_logs();
        result
    }

    fn collect_logs(&mut self) {
        for line in self.capture.take() {
            if self.logs.len() == LOG_CAPACITY {
                self.logs.pop_front();
            }
            self.logs.push_back(line);
        }
    }

    /// The full view model as JSON.
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.desktop.snapshot())
    }

    /// Drain pending effects.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        self.desktop.take_effects()
    }

    /// Drain pending effects as a JSON array.
    pub fn take_effects_json(&mut self) -> Result<String, serde_json::Error> {
        let effects = self.take_effects();
        serde_json::to_string(&effects)
    }

    /// Drain pointer dispatch results (capture commands and geometry) as a
    /// JSON array.
    pub fn take_pointer_results_json(&mut self) -> Result<String, serde_json::Error> {
        let results = std::mem::take(&mut self.pointer_results);
        serde_json::to_string(&results)
    }

    /// Drain captured log lines.
    pub fn take_logs(&mut self) -> Vec<String> {
        self.logs.drain(..).collect()
    }
}
