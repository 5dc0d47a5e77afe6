#![forbid(unsafe_code)]

//! The desktop composition root.
//!
//! [`Desktop`] owns [`Services`] and one controller per app. It is the only
//! place that knows about more than one app: timers, sound follow-ups,
//! taskbar clicks and title-bar buttons all arrive here and are routed by the
//! [`AppRoute`] registered for the window or taskbar entry.
//!
//! Controllers are public fields so a host adapter can reach app-specific
//! operations directly; anything that spans apps goes through a method here.

use std::time::Duration;

use oxford_core::clock::format_short_time;
use oxford_core::{CancellationSource, Viewport};
use oxford_shell::{ControlButton, WindowId};
use tracing::{debug, debug_span, info, info_span};

use crate::browser::BrowserController;
use crate::channels::ChannelsController;
use crate::chat::{ChatController, ChatWindow};
use crate::config::{CLOCK_TICK_MS, DesktopConfig};
use crate::desktop_icons::{DesktopIcon, DesktopIcons};
use crate::dialup::DialupIntro;
use crate::dos::DosController;
use crate::effects::{Effect, SoundCue};
use crate::folder::FolderController;
use crate::mail::MailController;
use crate::media::MediaController;
use crate::paint::PaintController;
use crate::services::{AppRoute, Services, SoundFollowUp, TimerEvent};
use crate::slides::{SlideLibrary, SlidesController};
use crate::start_menu::{StartItem, StartMenu};
use crate::terminal::TerminalController;

#[derive(Debug)]
pub struct Desktop {
    pub services: Services,
    pub dialup: DialupIntro,
    pub icons: DesktopIcons,
    pub start_menu: StartMenu,
    pub chat: ChatController,
    pub mail: MailController,
    pub media: MediaController,
    pub paint: PaintController,
    pub slides: SlidesController,
    pub channels: ChannelsController,
    pub folders: FolderController,
    pub browser: BrowserController,
    pub dos: DosController,
    pub terminal: TerminalController,
    initialized: bool,
    clock_text: String,
    clock_ticks: CancellationSource,
}

impl Desktop {
    #[must_use]
    pub fn new(config: DesktopConfig, services: Services) -> Self {
        let services = services.with_audio(config.audio);
        let clock_text = format_short_time(services.wall_now());
        Self {
            services,
            dialup: DialupIntro::new(config.dialup),
            icons: DesktopIcons::default(),
            start_menu: StartMenu::new(config.start_menu),
            chat: ChatController::new(config.chat),
            mail: MailController::new(config.mail),
            media: MediaController::new(config.media),
            paint: PaintController::new(config.paint),
            slides: SlidesController::new(config.slides),
            channels: ChannelsController::new(config.channels, SlideLibrary::builtin()),
            folders: FolderController::new(config.folder),
            browser: BrowserController::new(config.browser),
            dos: DosController::new(config.dos),
            terminal: TerminalController::new(config.terminal),
            initialized: false,
            clock_text,
            clock_ticks: CancellationSource::new(),
        }
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Taskbar clock text, `h:mm AM/PM`.
    #[must_use]
    pub fn clock_text(&self) -> &str {
        &self.clock_text
    }

    /// Page load. Shows the sign-in screen once per session; on later loads
    /// the desktop comes up directly. Returns whether the intro is showing.
    pub fn boot(&mut self) -> bool {
        let _span = info_span!("boot").entered();
        if self.dialup.show(&mut self.services) {
            debug!("dial-up intro shown");
            return true;
        }
        self.init_apps();
        self.services.emit(Effect::RevealDesktop);
        false
    }

    /// Sign-in form submit.
    pub fn login(&mut self, user: &str, password: &str, dial_ms: Option<u64>) -> bool {
        let _span = info_span!("login").entered();
        if !self.dialup.login(&mut self.services, user, password, dial_ms) {
            return false;
        }
        self.init_apps();
        true
    }

    /// Skip button on the dial-up overlay.
    pub fn skip_intro(&mut self) -> bool {
        self.dialup.skip(&mut self.services)
    }

    /// Build the always-present pieces. Runs once.
    pub fn init_apps(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        self.start_menu.init(&mut self.services);
        self.chat.init(&mut self.services);
        self.refresh_clock();
        let token = self.clock_ticks.restart();
        self.services.schedule(CLOCK_TICK_MS, Some(token), TimerEvent::ClockTick);
        info!("desktop initialized");
    }

    fn refresh_clock(&mut self) {
        self.clock_text = format_short_time(self.services.wall_now());
    }

    // -- time ------------------------------------------------------------

    /// Move the host clock forward and run whatever fell due.
    pub fn advance(&mut self, dt: Duration) {
        let target = self.services.clock.now().saturating_add(dt);
        self.run_until(target);
    }

    /// Set the host clock and run whatever fell due.
    pub fn set_time(&mut self, now: Duration) {
        self.run_until(now);
    }

    /// Fire due timers in deadline order with the clock at each deadline, so
    /// timers chained from a handler keep their spacing under coarse ticks.
    fn run_until(&mut self, target: Duration) {
        while let Some((deadline, event)) = self.services.timers.pop_due(target) {
            self.services.clock.set(deadline);
            self.dispatch_timer(event, target);
        }
        self.services.clock.set(target);
    }

    fn dispatch_timer(&mut self, event: TimerEvent, target: Duration) {
        let _span = debug_span!("timer", ?event).entered();
        let services = &mut self.services;
        match event {
            TimerEvent::ChatShowTyping => self.chat.on_show_typing(),
            TimerEvent::ChatDeliverReply => self.chat.on_deliver_reply(services),
            TimerEvent::MailRefreshDone => self.mail.on_refresh_done(services),
            TimerEvent::MailAlert => services.play(SoundCue::Alert),
            TimerEvent::MailStatusClear { text } => self.mail.on_status_clear(&text),
            TimerEvent::MailToastHide { id } => self.mail.on_toast_hide(services, id),
            TimerEvent::MailToastRemove { id } => self.mail.on_toast_remove(id),
            TimerEvent::SoundCap { playback } => {
                if let Some(follow_up) = services.audio.cap_elapsed(playback, &mut services.effects) {
                    self.run_follow_up(follow_up);
                }
            }
            TimerEvent::Dialup(step) => self.dialup.step(services, step),
            TimerEvent::MediaFlashEnd => self.media.on_flash_end(),
            TimerEvent::ClockTick => {
                // Ticks missed by more than a period collapse into one at the target.
                let period = Duration::from_millis(CLOCK_TICK_MS);
                if self.services.clock.now().checked_add(period).is_none_or(|next| next <= target) {
                    self.services.clock.set(target);
                }
                self.refresh_clock();
                let token = self.clock_ticks.token();
                self.services.schedule(CLOCK_TICK_MS, Some(token), TimerEvent::ClockTick);
            }
        }
    }

    fn run_follow_up(&mut self, follow_up: SoundFollowUp) {
        match follow_up {
            SoundFollowUp::DialupConnected
            | SoundFollowUp::DialupWelcomeEnded
            | SoundFollowUp::DialupGotMailEnded => self.dialup.sound_finished(&mut self.services, follow_up),
        }
    }

    /// The host reports that a sample ended or failed to play.
    pub fn sound_ended(&mut self, playback: u64) {
        if let Some(follow_up) = self.services.audio.ended(playback) {
            self.run_follow_up(follow_up);
        }
    }

    // -- routing ---------------------------------------------------------

    /// A taskbar button was clicked.
    pub fn taskbar_click(&mut self, id: &str) -> bool {
        let Some(route) = self.services.shell.taskbar.click(id) else {
            return false;
        };
        debug!(entry = id, ?route, "taskbar click");
        let services = &mut self.services;
        match route {
            AppRoute::Chat => self.chat.toggle_from_taskbar(services),
            AppRoute::Mail => self.mail.toggle_from_taskbar(services),
            AppRoute::MediaPlayer => self.media.toggle_from_taskbar(services),
            AppRoute::Paint => self.paint.toggle_from_taskbar(services),
            AppRoute::Channels => self.channels.toggle_from_taskbar(services),
            AppRoute::Folder(folder) => self.folders.toggle_from_taskbar(services, &folder),
            AppRoute::Browser => self.browser.toggle_from_taskbar(services),
            AppRoute::Terminal => self.terminal.toggle_from_taskbar(services),
            AppRoute::DosLibrary => self.dos.toggle_library(services),
            AppRoute::DosGame(game) => self.dos.toggle(services, &game),
            AppRoute::Compose(_) | AppRoute::Slides | AppRoute::StartMenu => return false,
        }
        true
    }

    /// A title-bar button was clicked.
    pub fn window_control(&mut self, window: &WindowId, button: ControlButton) -> bool {
        let Some(route) = self.services.shell.owner(window).cloned() else {
            return false;
        };
        let services = &mut self.services;
        match route {
            AppRoute::Chat => {
                let Some(kind) = self.chat.window_kind(window) else {
                    return false;
                };
                self.chat.handle_control(services, kind, button);
            }
            AppRoute::Mail => self.mail.handle_control(services, button),
            AppRoute::Compose(id) => self.mail.handle_compose_control(services, id, button),
            AppRoute::MediaPlayer => self.media.handle_control(services, button),
            AppRoute::Paint => self.paint.handle_control(services, button),
            AppRoute::Channels => self.channels.handle_control(services, button),
            AppRoute::Slides => self.slides.handle_control(services, window, button),
            AppRoute::Folder(folder) => self.folders.handle_control(services, &folder, button),
            AppRoute::Browser => self.browser.handle_control(services, button),
            AppRoute::StartMenu => self.start_menu.handle_control(services, button),
            AppRoute::Terminal => self.terminal.handle_control(services, button),
            AppRoute::DosLibrary => self.dos.handle_library_control(services, button),
            AppRoute::DosGame(game) => self.dos.handle_control(services, &game, button),
        }
        true
    }

    /// Pointer down anywhere inside a window.
    pub fn focus_window(&mut self, window: &WindowId) -> bool {
        let Some(route) = self.services.shell.owner(window).cloned() else {
            return false;
        };
        let services = &mut self.services;
        match route {
            AppRoute::Chat => match self.chat.window_kind(window) {
                Some(ChatWindow::Conversation) => self.chat.activate(services),
                _ => {
                    services.shell.windows.bring_to_front(window);
                }
            },
            AppRoute::Mail => self.mail.activate(services),
            AppRoute::MediaPlayer => self.media.activate(services),
            AppRoute::Paint => self.paint.activate(services),
            AppRoute::Channels => self.channels.activate(services),
            AppRoute::Slides => self.slides.activate(services, window),
            AppRoute::Folder(folder) => self.folders.activate(services, &folder),
            AppRoute::Browser => self.browser.activate(services),
            AppRoute::Terminal => self.terminal.activate(services),
            AppRoute::DosGame(game) => self.dos.activate(services, &game),
            AppRoute::Compose(_) | AppRoute::StartMenu | AppRoute::DosLibrary => {
                services.shell.windows.bring_to_front(window);
            }
        }
        true
    }

    /// Double-click (or Enter) on a desktop icon.
    pub fn open_icon(&mut self, icon: DesktopIcon) {
        let icon = self.icons.double_click(icon);
        debug!(?icon, "desktop icon opened");
        let services = &mut self.services;
        match icon {
            DesktopIcon::Homework => self.folders.open_homework(services, &mut self.media),
            DesktopIcon::InternetExplorer => self.browser.open(services, None),
            DesktopIcon::OxfordMail => self.mail.open(services),
            DesktopIcon::Paint => self.paint.open(services),
            DesktopIcon::Channels => self.channels.open(services),
            DesktopIcon::Aim => self.chat.toggle_both(services),
            DesktopIcon::MediaPlayer => self.media.open_oxford_innovation(services, true),
        }
    }

    /// The Start button.
    pub fn start_button(&mut self) {
        self.start_menu.toggle(&mut self.services);
    }

    /// A Start menu entry.
    pub fn start_item(&mut self, item: StartItem) {
        let services = &mut self.services;
        match self.start_menu.choose(services, item) {
            StartItem::Aim => self.chat.show(services),
            StartItem::Ie => self.browser.open(services, None),
            StartItem::Mail => self.mail.open(services),
            StartItem::Paint => self.paint.open(services),
            StartItem::Channels => self.channels.open(services),
            StartItem::Dos => self.dos.open_library(services),
        }
    }

    /// A click anywhere on the page.
    pub fn document_click(&mut self, inside_menu_or_button: bool) {
        self.start_menu.document_click(&mut self.services, inside_menu_or_button);
    }

    /// Channels tile "Learn more".
    pub fn open_channel_tile(&mut self, index: usize) -> Option<WindowId> {
        self.channels.open_tile(&mut self.services, &mut self.slides, index)
    }

    /// A media link on a slide.
    pub fn play_slide_media(&mut self, window: &WindowId, link: usize) -> bool {
        let Some(request) = self.slides.media_request(window, link) else {
            return false;
        };
        self.media.open(&mut self.services, request);
        true
    }

    /// A file in a folder window.
    pub fn open_folder_file(&mut self, folder: &str, index: usize) -> bool {
        self.folders.open_file(&mut self.services, &mut self.media, folder, index)
    }

    /// Raw terminal key data.
    pub fn terminal_input(&mut self, data: &str) {
        self.terminal.input(&mut self.services, &mut self.dos, data);
    }

    /// Global keyboard shortcuts. Returns whether the key was consumed.
    pub fn key(&mut self, key: &str, ctrl: bool, shift: bool) -> bool {
        if key == "Escape" {
            return self.dialup.skip(&mut self.services);
        }
        if ctrl && matches!(key, "t" | "T") {
            self.terminal.open(&mut self.services);
            return true;
        }
        let Some(top) = self.services.shell.windows.topmost_visible().map(|w| w.id.clone()) else {
            return false;
        };
        match self.services.shell.owner(&top) {
            Some(AppRoute::Paint) => self.paint.key_shortcut(ctrl, shift, key),
            Some(AppRoute::Slides) => self.slides.key(&top, key),
            _ => false,
        }
    }

    /// The browser viewport changed size.
    pub fn resize(&mut self, width: i32, height: i32) {
        self.services.shell.windows.set_viewport(Viewport::new(width, height));
        self.start_menu.reposition(&mut self.services);
    }

    /// Drain effects for the host.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        self.services.take_effects()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialup::DialupPhase;
    use crate::services::testing::services;
    use pretty_assertions::assert_eq;

    fn desktop() -> Desktop {
        Desktop::new(DesktopConfig::default(), services())
    }

    #[test]
    fn first_boot_shows_the_intro_and_login_builds_the_apps() {
        let mut desktop = desktop();
        assert!(desktop.boot());
        assert!(!desktop.is_initialized());
        assert!(!desktop.login("neo", "", None));
        assert!(desktop.login("neo", "pw", None));
        assert!(desktop.is_initialized());
        assert_eq!(desktop.dialup.view().phase, DialupPhase::Connecting);
        assert!(desktop.services.shell.taskbar.contains("chat"));
        assert_eq!(desktop.clock_text(), "1:05 PM");
    }

    #[test]
    fn later_boots_skip_the_intro() {
        let mut desktop = desktop();
        desktop.boot();
        let services = std::mem::replace(&mut desktop.services, crate::services::testing::services());
        let mut again = Desktop::new(DesktopConfig::default(), services);
        assert!(!again.boot());
        assert!(again.is_initialized());
        assert!(again.take_effects().contains(&Effect::RevealDesktop));
    }

    #[test]
    fn clock_ticks_every_minute() {
        let mut desktop = desktop();
        desktop.init_apps();
        desktop.advance(Duration::from_secs(59));
        assert_eq!(desktop.clock_text(), "1:05 PM");
        desktop.advance(Duration::from_secs(1));
        assert_eq!(desktop.clock_text(), "1:06 PM");
        desktop.advance(Duration::from_secs(120));
        assert_eq!(desktop.clock_text(), "1:08 PM");
    }

    #[test]
    fn advancing_to_the_end_of_time_returns() {
        let mut desktop = desktop();
        desktop.init_apps();
        desktop.advance(Duration::MAX);
        assert_eq!(desktop.services.clock.now(), Duration::MAX);
        assert_eq!(desktop.services.timers.next_deadline(), None);
        desktop.advance(Duration::from_secs(60));
        assert_eq!(desktop.services.clock.now(), Duration::MAX);
    }

    #[test]
    fn missed_clock_ticks_collapse_into_one() {
        let mut desktop = desktop();
        desktop.init_apps();
        desktop.advance(Duration::from_secs(150));
        assert_eq!(desktop.clock_text(), "1:07 PM");
        assert_eq!(desktop.services.timers.next_deadline(), Some(Duration::from_secs(210)));
    }

    #[test]
    fn chained_steps_keep_their_spacing_under_one_coarse_tick() {
        let mut desktop = desktop();
        desktop.boot();
        assert!(desktop.login("neo", "pw", Some(4000)));
        desktop.advance(Duration::from_millis(5600));
        assert_eq!(desktop.dialup.view().status, "Welcome!");
        assert_eq!(desktop.services.clock.now(), Duration::from_millis(5600));
    }

    #[test]
    fn taskbar_and_controls_route_by_owner() {
        let mut desktop = desktop();
        desktop.init_apps();
        desktop.open_icon(DesktopIcon::Paint);
        let paint = desktop.paint.window_id().clone();
        assert!(desktop.services.shell.taskbar.is_active("paint"));
        assert!(desktop.taskbar_click("paint"));
        assert!(!desktop.services.shell.windows.is_visible(&paint));
        assert!(desktop.taskbar_click("paint"));
        assert!(desktop.services.shell.windows.is_visible(&paint));
        assert!(desktop.window_control(&paint, ControlButton::Close));
        assert!(!desktop.services.shell.taskbar.contains("paint"));
        assert!(!desktop.window_control(&paint, ControlButton::Close));
        assert!(!desktop.taskbar_click("nope"));
    }

    #[test]
    fn start_menu_launches_and_closes() {
        let mut desktop = desktop();
        desktop.init_apps();
        desktop.start_button();
        assert!(desktop.start_menu.is_visible(&desktop.services));
        desktop.start_item(StartItem::Dos);
        assert!(!desktop.start_menu.is_visible(&desktop.services));
        assert!(desktop.services.shell.taskbar.is_active("dos-library"));
    }

    #[test]
    fn ctrl_t_opens_the_terminal_and_escape_skips_the_intro() {
        let mut desktop = desktop();
        desktop.boot();
        desktop.login("neo", "pw", None);
        assert!(desktop.key("Escape", false, false));
        assert_eq!(desktop.dialup.view().phase, DialupPhase::Fading);
        assert!(desktop.key("t", true, false));
        assert!(desktop.terminal.is_open(&desktop.services));
        assert!(!desktop.key("Escape", false, false));
    }

    #[test]
    fn paint_shortcuts_need_paint_on_top() {
        let mut desktop = desktop();
        desktop.init_apps();
        desktop.open_icon(DesktopIcon::Paint);
        assert!(desktop.key("z", true, false));
        desktop.open_icon(DesktopIcon::InternetExplorer);
        assert!(!desktop.key("z", true, false));
    }

    #[test]
    fn resize_keeps_the_start_menu_anchored() {
        let mut desktop = desktop();
        desktop.init_apps();
        desktop.resize(800, 600);
        let rect = desktop
            .services
            .shell
            .windows
            .get(desktop.start_menu.window_id())
            .map(|w| w.rect.top);
        assert_eq!(rect, Some(270));
    }
}
