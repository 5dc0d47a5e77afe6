#![forbid(unsafe_code)]

//! Oxford Messenger: the buddy list and the instant-message window.
//!
//! Both windows exist from startup and are only ever shown or hidden. The
//! conversation shown is the current buddy; sending a line schedules one
//! scripted reply through [`ChatTurn`].

pub mod buddies;
pub mod reply;
pub mod store;
pub mod turn;

use oxford_core::clock::format_long_time;
use oxford_core::html::escape;
use oxford_core::WindowRect;
use oxford_shell::{ControlButton, ShellConfig, TaskbarOptions, WindowControls, WindowId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::effects::SoundCue;
use crate::services::{AppRoute, Services};

use self::buddies::{DEFAULT_BUDDIES, DEFAULT_COLOR, TYPING_COLOR, meta_key};
use self::reply::choose_reply;
use self::store::{ChatMessage, ChatState};
use self::turn::{ChatTurn, TurnConfig, TurnState};

pub use self::turn::ReplyPlan;

/// Name shown when no buddy is selected.
const FALLBACK_BUDDY: &str = "Friend";
const WELCOME_LINE: &str = "hey! whats going on?";
const YOU: &str = "You";

/// Messenger settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub storage_key: String,
    pub taskbar_id: String,
    pub taskbar_label: String,
    pub icon: String,
    pub chat_rect: WindowRect,
    pub buddy_rect: WindowRect,
    /// Whether the page starts with the messenger on screen.
    pub start_visible: bool,
    pub buddies: Vec<String>,
    /// Buddy the page opens on before any state exists.
    pub initial_buddy: Option<String>,
    /// Transcript shipped with the page, used when storage is empty.
    pub initial_transcript: Vec<ChatMessage>,
    pub turn: TurnConfig,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            storage_key: "aim.chat.v1".to_string(),
            taskbar_id: "chat".to_string(),
            taskbar_label: "Oxford".to_string(),
            icon: "chat-icon".to_string(),
            chat_rect: WindowRect::new(300, 60, 460, 420),
            buddy_rect: WindowRect::new(40, 60, 220, 420),
            start_visible: true,
            buddies: DEFAULT_BUDDIES.iter().map(ToString::to_string).collect(),
            initial_buddy: Some(DEFAULT_BUDDIES[0].to_string()),
            initial_transcript: Vec::new(),
            turn: TurnConfig::default(),
        }
    }
}

impl ChatConfig {
    #[must_use]
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    #[must_use]
    pub fn start_visible(mut self, visible: bool) -> Self {
        self.start_visible = visible;
        self
    }

    #[must_use]
    pub fn initial_buddy(mut self, buddy: Option<String>) -> Self {
        self.initial_buddy = buddy;
        self
    }

    #[must_use]
    pub fn initial_transcript(mut self, transcript: Vec<ChatMessage>) -> Self {
        self.initial_transcript = transcript;
        self
    }

    #[must_use]
    pub fn turn(mut self, turn: TurnConfig) -> Self {
        self.turn = turn;
        self
    }
}

/// Which of the two messenger windows a control click came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatWindow {
    Conversation,
    BuddyList,
}

/// One rendered line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    pub sender: String,
    pub color: String,
    pub time: String,
    /// Markup for the body: escaped text, or the stored markup as is.
    pub body_html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuddyView {
    pub name: String,
    pub color: String,
    pub selected: bool,
}

/// Messenger view model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatView {
    pub current_user: Option<String>,
    /// Title icon and header color of the current buddy.
    pub theme_color: String,
    pub messages: Vec<MessageView>,
    pub typing: Option<MessageView>,
    pub buddies: Vec<BuddyView>,
    pub turn: TurnState,
}

/// Messenger controller.
#[derive(Debug)]
pub struct ChatController {
    config: ChatConfig,
    state: ChatState,
    turn: ChatTurn,
    chat_id: WindowId,
    buddy_id: WindowId,
}

impl ChatController {
    #[must_use]
    pub fn new(config: ChatConfig) -> Self {
        Self {
            config,
            state: ChatState::default(),
            turn: ChatTurn::default(),
            chat_id: WindowId::new("chat-window"),
            buddy_id: WindowId::new("buddy-list"),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ChatState {
        &self.state
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&str> {
        self.state.current_user.as_deref()
    }

    #[must_use]
    pub const fn turn_state(&self) -> TurnState {
        self.turn.state()
    }

    #[must_use]
    pub const fn window_id(&self, window: ChatWindow) -> &WindowId {
        match window {
            ChatWindow::Conversation => &self.chat_id,
            ChatWindow::BuddyList => &self.buddy_id,
        }
    }

    /// Register the pre-existing windows, restore state and reopen the last
    /// conversation without sound.
    pub fn init(&mut self, services: &mut Services) {
        let visible = self.config.start_visible;
        let shell = &mut services.shell;
        shell.windows.adopt_window(
            self.buddy_id.clone(),
            ShellConfig::new("Buddy List")
                .class_tag("buddy-list")
                .rect(self.config.buddy_rect)
                .controls(WindowControls::all()),
            visible,
        );
        shell.set_owner(self.buddy_id.clone(), AppRoute::Chat);
        shell.windows.adopt_window(
            self.chat_id.clone(),
            ShellConfig::new("Instant Message")
                .class_tag("chat-window")
                .rect(self.config.chat_rect)
                .controls(WindowControls::all()),
            visible,
        );
        shell.set_owner(self.chat_id.clone(), AppRoute::Chat);
        self.register_taskbar(services);
        services.shell.taskbar.set_active(&self.config.taskbar_id, visible);

        if let Some(saved) = ChatState::load(services.session(), &self.config.storage_key) {
            self.state = saved;
        }
        if self.state.conversations.is_empty() {
            self.seed_from_transcript();
            self.save(services);
        }
        self.state.meta.ensure_colors();
        self.save(services);

        let default_user = self
            .state
            .current_user
            .clone()
            .or_else(|| self.config.initial_buddy.clone());
        if let Some(user) = default_user {
            self.open_chat(services, &user, true);
        }
        info!(conversations = self.state.conversations.len(), "messenger ready");
    }

    fn seed_from_transcript(&mut self) {
        let Some(user) = self.config.initial_buddy.clone() else {
            return;
        };
        if self.config.initial_transcript.is_empty() {
            return;
        }
        self.state
            .conversations
            .insert(user.clone(), self.config.initial_transcript.clone());
        self.state.current_user = Some(user);
    }

    fn register_taskbar(&self, services: &mut Services) {
        services.shell.taskbar.add_window(
            &self.config.taskbar_id,
            self.config.taskbar_label.clone(),
            TaskbarOptions::new(AppRoute::Chat).icon(self.config.icon.clone()),
        );
    }

    fn save(&self, services: &mut Services) {
        self.state.save(services.session_mut(), &self.config.storage_key);
    }

    fn now_stamp(services: &Services) -> String {
        format_long_time(services.wall_now())
    }

    /// Switch to `name`. Plays the receive sound unless only restoring.
    pub fn open_chat(&mut self, services: &mut Services, name: &str, restore_only: bool) {
        if !restore_only {
            services.play(SoundCue::Receive);
        }
        self.state.current_user = Some(name.to_string());
        self.turn.cancel();
        let has_history = self
            .state
            .conversations
            .get(name)
            .is_some_and(|conv| !conv.is_empty());
        if !has_history && !restore_only {
            let welcome = ChatMessage::plain(name, WELCOME_LINE, Self::now_stamp(services));
            self.state.conversations.insert(name.to_string(), vec![welcome]);
        }
        self.save(services);
        debug!(buddy = name, restore_only, "conversation opened");
        self.show(services);
    }

    /// Send the composer text to the current buddy.
    pub fn send(&mut self, services: &mut Services, text: &str) -> bool {
        let message = text.trim();
        if message.is_empty() {
            return false;
        }
        services.play(SoundCue::Send);
        if let Some(user) = self.state.current_user.clone() {
            let line = ChatMessage::plain(YOU, message, Self::now_stamp(services));
            self.state.append(&user, line);
            self.save(services);
        }

        let key = meta_key(self.state.current_user.as_deref().unwrap_or_default());
        if !key.is_empty() {
            let meta = &mut self.state.meta;
            meta.ensure_threshold(&key, services.rng());
            *meta.counters.entry(key.clone()).or_insert(0) += 1;
            self.save(services);
        }

        let total = self.config.turn.total_delay_ms(services.rng());
        self.turn.cancel();
        let plan = self.config.turn.plan(total, services.rng());
        self.turn.schedule(services, plan);
        true
    }

    /// The typing-indicator timer fired.
    pub fn on_show_typing(&mut self) {
        self.turn.show_typing();
    }

    /// The reply timer fired: append the buddy's line.
    pub fn on_deliver_reply(&mut self, services: &mut Services) {
        if !self.turn.finish() {
            return;
        }
        services.play(SoundCue::Receive);
        let name = self
            .state
            .current_user
            .clone()
            .unwrap_or_else(|| FALLBACK_BUDDY.to_string());
        let reply = choose_reply(&mut self.state.meta, &name, services.rng());
        if self.state.current_user.is_some() {
            let line = ChatMessage {
                sender: name.clone(),
                text: reply.text,
                time: Self::now_stamp(services),
                html: reply.html,
            };
            self.state.append(&name, line);
            self.save(services);
        }
        debug!(buddy = %name, html = reply.html, "chat reply delivered");
    }

    /// Show both windows, focus the conversation and restore the taskbar entry.
    pub fn show(&mut self, services: &mut Services) {
        services.shell.windows.show(&self.buddy_id);
        if services.shell.windows.show(&self.chat_id) {
            self.activate(services);
        }
        if !services.shell.taskbar.contains(&self.config.taskbar_id) {
            self.register_taskbar(services);
        }
    }

    /// Hide both windows and drop any pending reply.
    pub fn hide(&mut self, services: &mut Services) {
        services.shell.windows.hide(&self.buddy_id);
        services.shell.windows.hide(&self.chat_id);
        services.shell.taskbar.set_active(&self.config.taskbar_id, false);
        self.turn.cancel();
    }

    /// Hide and remove the taskbar entry.
    pub fn close(&mut self, services: &mut Services) {
        self.hide(services);
        services.shell.taskbar.remove(&self.config.taskbar_id);
    }

    pub fn toggle_from_taskbar(&mut self, services: &mut Services) {
        if !services.shell.windows.contains(&self.chat_id) {
            return;
        }
        if services.shell.windows.is_visible(&self.chat_id) {
            self.hide(services);
        } else {
            self.show(services);
        }
    }

    pub fn activate(&self, services: &mut Services) {
        if services.shell.windows.bring_to_front(&self.chat_id).is_some() {
            services.shell.taskbar.set_active(&self.config.taskbar_id, true);
        }
    }

    /// Desktop icon: show both windows on top, or hide both. A reply in
    /// flight keeps running.
    pub fn toggle_both(&mut self, services: &mut Services) {
        let windows = &mut services.shell.windows;
        let hidden = !windows.is_visible(&self.chat_id);
        if hidden {
            windows.restore_window(&self.buddy_id);
            windows.restore_window(&self.chat_id);
        } else {
            windows.hide(&self.buddy_id);
            windows.hide(&self.chat_id);
        }
        services.shell.taskbar.set_active(&self.config.taskbar_id, hidden);
    }

    /// Title-bar buttons of either window.
    pub fn handle_control(&mut self, services: &mut Services, window: ChatWindow, button: ControlButton) {
        match (window, button) {
            (ChatWindow::Conversation, ControlButton::Minimize) => self.hide(services),
            (ChatWindow::BuddyList, ControlButton::Minimize) => {
                services.shell.windows.hide(&self.buddy_id);
            }
            (_, ControlButton::Maximize) => self.activate(services),
            (_, ControlButton::Close) => self.close(services),
        }
    }

    /// Which messenger window `id` is, if any.
    #[must_use]
    pub fn window_kind(&self, id: &WindowId) -> Option<ChatWindow> {
        if id == &self.chat_id {
            Some(ChatWindow::Conversation)
        } else if id == &self.buddy_id {
            Some(ChatWindow::BuddyList)
        } else {
            None
        }
    }

    #[must_use]
    pub fn view(&self) -> ChatView {
        let meta = &self.state.meta;
        let current = self.state.current_user.clone();
        let buddy_key = meta_key(current.as_deref().unwrap_or_default());
        let buddy_color = meta.color(&buddy_key).to_string();
        let messages = current
            .as_ref()
            .and_then(|user| self.state.conversations.get(user))
            .map(|conv| {
                conv.iter()
                    .map(|m| MessageView {
                        sender: m.sender.clone(),
                        color: if m.sender == YOU {
                            DEFAULT_COLOR.to_string()
                        } else {
                            buddy_color.clone()
                        },
                        time: m.time.clone(),
                        body_html: if m.html { m.text.clone() } else { escape(&m.text) },
                    })
                    .collect()
            })
            .unwrap_or_default();
        let typing = self.turn.is_typing().then(|| MessageView {
            sender: current.clone().unwrap_or_else(|| FALLBACK_BUDDY.to_string()),
            color: TYPING_COLOR.to_string(),
            time: "typing".to_string(),
            body_html: "<em>is typing…</em>".to_string(),
        });
        let buddies = self
            .config
            .buddies
            .iter()
            .map(|name| BuddyView {
                name: name.clone(),
                color: meta.color(&meta_key(name)).to_string(),
                selected: current.as_deref() == Some(name.as_str()),
            })
            .collect();
        ChatView {
            current_user: current,
            theme_color: buddy_color,
            messages,
            typing,
            buddies,
            turn: self.turn.state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Effect;
    use crate::services::testing::{services, services_with};
    use crate::services::TimerEvent;
    use oxford_core::StorageBackend;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn fire_all(chat: &mut ChatController, services: &mut Services, until_ms: u64) {
        let until = Duration::from_millis(until_ms);
        while let Some((deadline, event)) = services.timers.pop_due(until) {
            services.clock.set(deadline);
            match event {
                TimerEvent::ChatShowTyping => chat.on_show_typing(),
                TimerEvent::ChatDeliverReply => chat.on_deliver_reply(services),
                _ => {}
            }
        }
        services.clock.set(until);
    }

    #[test]
    fn init_restores_without_sound_and_registers_taskbar() {
        let mut services = services();
        services.audio.init();
        let mut chat = ChatController::new(ChatConfig::default());
        chat.init(&mut services);
        assert_eq!(chat.current_user(), Some("sepinator"));
        assert!(services.take_effects().is_empty());
        assert!(services.shell.taskbar.is_active("chat"));
        assert!(services.shell.windows.is_visible(chat.window_id(ChatWindow::Conversation)));
        let view = chat.view();
        assert!(view.messages.is_empty());
        assert_eq!(view.theme_color, "#d00000");
    }

    #[test]
    fn open_chat_creates_welcome_line_once() {
        let mut services = services();
        let mut chat = ChatController::new(ChatConfig::default());
        chat.init(&mut services);
        chat.open_chat(&mut services, "selvatron", false);
        chat.open_chat(&mut services, "selvatron", false);
        let conv = chat.state().conversations.get("selvatron").cloned().unwrap_or_default();
        assert_eq!(conv.len(), 1);
        assert_eq!(conv[0].text, "hey! whats going on?");
        assert_eq!(conv[0].time, "1:05:09 PM");
    }

    #[test]
    fn blank_messages_are_ignored() {
        let mut services = services();
        let mut chat = ChatController::new(ChatConfig::default());
        chat.init(&mut services);
        assert!(!chat.send(&mut services, "   "));
        assert!(services.timers.is_empty());
    }

    #[test]
    fn send_schedules_typing_then_reply() {
        let mut services = services_with(vec![0.5]);
        let mut chat = ChatController::new(ChatConfig::default());
        chat.init(&mut services);
        assert!(chat.send(&mut services, "  hi there "));
        assert_eq!(chat.turn_state(), TurnState::PendingReply);
        fire_all(&mut chat, &mut services, 400);
        assert_eq!(chat.turn_state(), TurnState::TypingVisible);
        assert_eq!(chat.view().typing.map(|t| t.sender), Some("sepinator".to_string()));
        fire_all(&mut chat, &mut services, 1250);
        assert_eq!(chat.turn_state(), TurnState::Idle);
        let conv = chat.state().conversations.get("sepinator").cloned().unwrap_or_default();
        assert_eq!(conv.len(), 2);
        assert_eq!(conv[0].text, "hi there");
        assert_eq!(conv[1].sender, "sepinator");
        assert_eq!(chat.state().meta.counters.get("sepinator"), Some(&1));
    }

    #[test]
    fn switching_buddy_cancels_the_pending_reply() {
        let mut services = services();
        let mut chat = ChatController::new(ChatConfig::default());
        chat.init(&mut services);
        chat.send(&mut services, "hello");
        chat.open_chat(&mut services, "selvatron", false);
        fire_all(&mut chat, &mut services, 10_000);
        let selvatron = chat.state().conversations.get("selvatron").cloned().unwrap_or_default();
        assert_eq!(selvatron.len(), 1);
        let sepinator = chat.state().conversations.get("sepinator").cloned().unwrap_or_default();
        assert_eq!(sepinator.len(), 1);
    }

    #[test]
    fn hide_cancels_and_close_drops_the_taskbar_entry() {
        let mut services = services();
        let mut chat = ChatController::new(ChatConfig::default());
        chat.init(&mut services);
        chat.send(&mut services, "hello");
        chat.handle_control(&mut services, ChatWindow::Conversation, ControlButton::Minimize);
        assert_eq!(chat.turn_state(), TurnState::Idle);
        assert!(!services.shell.taskbar.is_active("chat"));
        chat.handle_control(&mut services, ChatWindow::Conversation, ControlButton::Close);
        assert!(!services.shell.taskbar.contains("chat"));
        chat.toggle_from_taskbar(&mut services);
        assert!(services.shell.taskbar.is_active("chat"));
        assert!(services.shell.windows.is_visible(chat.window_id(ChatWindow::BuddyList)));
    }

    #[test]
    fn buddy_list_minimize_hides_only_the_list() {
        let mut services = services();
        let mut chat = ChatController::new(ChatConfig::default());
        chat.init(&mut services);
        chat.handle_control(&mut services, ChatWindow::BuddyList, ControlButton::Minimize);
        assert!(!services.shell.windows.is_visible(chat.window_id(ChatWindow::BuddyList)));
        assert!(services.shell.windows.is_visible(chat.window_id(ChatWindow::Conversation)));
    }

    #[test]
    fn icon_toggle_keeps_reply_in_flight() {
        let mut services = services();
        let mut chat = ChatController::new(ChatConfig::default());
        chat.init(&mut services);
        chat.send(&mut services, "hello");
        chat.toggle_both(&mut services);
        assert!(!services.shell.windows.is_visible(chat.window_id(ChatWindow::Conversation)));
        assert_eq!(chat.turn_state(), TurnState::PendingReply);
        chat.toggle_both(&mut services);
        assert!(services.shell.taskbar.is_active("chat"));
    }

    #[test]
    fn transcript_seeds_empty_storage_and_state_persists() {
        let transcript = vec![ChatMessage::plain("sepinator", "sup", "9:00:00 PM")];
        let mut services = services();
        let mut chat = ChatController::new(ChatConfig::default().initial_transcript(transcript.clone()));
        chat.init(&mut services);
        assert_eq!(chat.state().conversations.get("sepinator"), Some(&transcript));
        let raw = services
            .session()
            .get_item("aim.chat.v1")
            .ok()
            .flatten()
            .unwrap_or_default();
        assert!(raw.contains("\"sup\""));

        let mut reloaded = ChatController::new(ChatConfig::default());
        reloaded.init(&mut services);
        assert_eq!(reloaded.state().conversations.get("sepinator"), Some(&transcript));
    }

    #[test]
    fn receive_sound_only_when_not_restoring() {
        let mut services = services();
        services.audio.init();
        let mut chat = ChatController::new(ChatConfig::default());
        chat.init(&mut services);
        chat.open_chat(&mut services, "randobrando", false);
        assert!(matches!(
            services.take_effects().as_slice(),
            [Effect::PlaySound { cue: SoundCue::Receive, .. }]
        ));
    }
}
