#![forbid(unsafe_code)]

//! Oxford Mail: a two-folder mail client with a sortable list, a reader pane,
//! compose windows and a simulated server refresh.
//!
//! The window is created on open and destroyed on close; the inbox itself
//! lives as long as the controller, so messages fetched by a refresh survive
//! a close and reopen. Read flags and layout are persisted to the local
//! backend under [`MailConfig::storage_key`].

pub mod ads;
pub mod compose;
pub mod notify;
pub mod store;

use std::collections::BTreeMap;

use oxford_core::clock::format_mail_date;
use oxford_core::{TASKBAR_HEIGHT, Viewport, WindowRect};
use oxford_shell::{AppWindow, AppWindowSpec, ControlButton, OpenOutcome, ShellConfig, WindowControls, WindowId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::services::{AppRoute, Services, TimerEvent};

use self::ads::{AdSpec, TEMPLATE_COUNT, template};
use self::compose::{ComposeDraft, ComposeEdit, compose_shell, reply_quote};
use self::notify::{MailNotices, Toast};
use self::store::{Folder, MailMessage, MailPersist, SortDir, SortKey, seed_messages, sorted};

pub const DEFAULT_LIST_RATIO: f64 = 0.42;
const MIN_LIST_RATIO: f64 = 0.2;
const MAX_LIST_RATIO: f64 = 0.8;
const RATIO_STEP: f64 = 0.05;
const MIN_LIST_PX: f64 = 140.0;
const MIN_READER_PX: f64 = 240.0;

const COLUMNS: [(SortKey, &str); 3] = [
    (SortKey::From, "From"),
    (SortKey::Subject, "Subject"),
    (SortKey::Date, "Date"),
];

/// Mail settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub storage_key: String,
    pub window_id: String,
    pub taskbar_id: String,
    pub taskbar_label: String,
    pub icon: String,
    /// Geometry used when leaving maximized state.
    pub restore_rect: WindowRect,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            storage_key: "oxmail.state.v1".to_string(),
            window_id: "mail-window".to_string(),
            taskbar_id: "mail".to_string(),
            taskbar_label: "Oxford Mail".to_string(),
            icon: "mail-icon".to_string(),
            restore_rect: WindowRect::new(180, 100, 820, 560),
        }
    }
}

impl MailConfig {
    #[must_use]
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}

/// Landscape window centered in the viewport, computed at open time.
#[must_use]
pub fn open_rect(viewport: Viewport) -> WindowRect {
    let vw = viewport.width.max(800);
    let vh = viewport.height.max(600);
    let width = (vw - 40).min(980);
    let height = (vh - 80).min(600);
    let left = ((vw - width) / 2).max(8);
    let top = ((vh - height - TASKBAR_HEIGHT) / 2).max(28);
    WindowRect::new(left, top, width, height)
}

/// `0.42` becomes `"42"`, `0.425` becomes `"42.5"`.
#[must_use]
pub fn ratio_percent(ratio: f64) -> String {
    let text = format!("{:.1}", ratio * 100.0);
    match text.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => text,
    }
}

fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() {
        ratio.clamp(MIN_LIST_RATIO, MAX_LIST_RATIO)
    } else {
        DEFAULT_LIST_RATIO
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Arrow keys in the message list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKey {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderView {
    pub name: &'static str,
    pub unread: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    pub key: SortKey,
    pub label: &'static str,
    pub sorted: Option<SortDir>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub id: String,
    pub from: String,
    pub subject: String,
    pub date: String,
    pub unread: bool,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReaderView {
    pub from: String,
    pub subject: String,
    pub date: String,
    pub html: String,
}

/// Mail view model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MailView {
    pub open: bool,
    pub visible: bool,
    pub folders: Vec<FolderView>,
    pub columns: Vec<ColumnView>,
    pub rows: Vec<RowView>,
    pub reader: Option<ReaderView>,
    pub mark_label: &'static str,
    pub mark_enabled: bool,
    pub preview_off: bool,
    pub list_ratio: f64,
    /// CSS width of the list column, e.g. `"42"` for 42%.
    pub list_width: String,
    pub status: String,
    pub toasts: Vec<Toast>,
    pub composes: Vec<ComposeDraft>,
}

/// Mail controller.
#[derive(Debug)]
pub struct MailController {
    config: MailConfig,
    app: AppWindow,
    inbox: Vec<MailMessage>,
    sent: Vec<MailMessage>,
    folder: Folder,
    current_id: Option<String>,
    preview_off: bool,
    list_ratio: f64,
    sort_key: SortKey,
    sort_dir: SortDir,
    notices: MailNotices,
    drafts: BTreeMap<u32, ComposeDraft>,
    next_compose: u32,
}

impl MailController {
    #[must_use]
    pub fn new(config: MailConfig) -> Self {
        let app = AppWindow::new(
            AppWindowSpec::new(
                config.window_id.clone(),
                ShellConfig::new("Oxford Mail")
                    .class_tag("mail-window")
                    .controls(WindowControls::all()),
            )
            .taskbar(config.taskbar_id.clone(), config.taskbar_label.clone())
            .icon(config.icon.clone())
            .restore_rect(config.restore_rect),
        );
        Self {
            config,
            app,
            inbox: seed_messages(),
            sent: Vec::new(),
            folder: Folder::Inbox,
            current_id: None,
            preview_off: false,
            list_ratio: DEFAULT_LIST_RATIO,
            sort_key: SortKey::Date,
            sort_dir: SortDir::Desc,
            notices: MailNotices::default(),
            drafts: BTreeMap::new(),
            next_compose: 0,
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
    pub const fn folder(&self) -> Folder {
        self.folder
    }

    #[must_use]
    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    #[must_use]
    pub fn messages(&self, folder: Folder) -> &[MailMessage] {
        match folder {
            Folder::Inbox => &self.inbox,
            Folder::Sent => &self.sent,
        }
    }

    fn active_list(&self) -> &[MailMessage] {
        self.messages(self.folder)
    }

    fn active_list_mut(&mut self) -> &mut Vec<MailMessage> {
        match self.folder {
            Folder::Inbox => &mut self.inbox,
            Folder::Sent => &mut self.sent,
        }
    }

    #[must_use]
    pub fn unread_count(&self, folder: Folder) -> usize {
        self.messages(folder).iter().filter(|m| !m.read).count()
    }

    #[must_use]
    pub const fn list_ratio(&self) -> f64 {
        self.list_ratio
    }

    #[must_use]
    pub fn draft(&self, id: u32) -> Option<&ComposeDraft> {
        self.drafts.get(&id)
    }

    fn current_message(&self) -> Option<&MailMessage> {
        let id = self.current_id.as_deref()?;
        self.active_list().iter().find(|m| m.id == id)
    }

    fn sorted_ids(&self) -> Vec<String> {
        sorted(self.active_list(), self.sort_key, self.sort_dir)
            .into_iter()
            .map(|m| m.id.clone())
            .collect()
    }

    // -- persistence -----------------------------------------------------

    fn load_state(&mut self, services: &Services) {
        let Some(saved) = MailPersist::load(services.local(), &self.config.storage_key) else {
            return;
        };
        saved.apply_read_flags(&mut self.inbox);
        saved.apply_read_flags(&mut self.sent);
        if let Some(folder) = saved.current_folder.as_deref() {
            self.folder = Folder::parse(folder);
        }
        if saved.current_id.is_some() {
            self.current_id = saved.current_id;
        }
        if let Some(off) = saved.preview_off {
            self.preview_off = off;
        }
        if let Some(ratio) = saved.list_ratio {
            self.list_ratio = clamp_ratio(ratio);
        }
        if let Some(key) = saved.sort_key.as_deref().and_then(SortKey::parse) {
            self.sort_key = key;
        }
        match saved.sort_dir.as_deref() {
            Some("asc") => self.sort_dir = SortDir::Asc,
            Some("desc") => self.sort_dir = SortDir::Desc,
            _ => {}
        }
    }

    fn save_state(&self, services: &mut Services) {
        let read_map = self
            .inbox
            .iter()
            .chain(&self.sent)
            .map(|m| (m.id.clone(), m.read))
            .collect();
        let persist = MailPersist {
            read_map,
            current_folder: Some(self.folder.name().to_string()),
            current_id: self.current_id.clone(),
            preview_off: Some(self.preview_off),
            list_ratio: Some(self.list_ratio),
            sort_key: Some(self.sort_key.name().to_string()),
            sort_dir: Some(self.sort_dir.name().to_string()),
        };
        persist.save(services.local_mut(), &self.config.storage_key);
    }

    // -- window lifecycle ------------------------------------------------

    /// Open the window, or show and focus it if it already exists.
    ///
    /// A fresh window restores saved state, opens the first message of the
    /// active folder and plays the new-mail sound.
    pub fn open(&mut self, services: &mut Services) {
        let config = self.app.spec().shell.clone().rect(open_rect(services.shell.viewport()));
        if self.app.open_with(&mut services.shell, AppRoute::Mail, config) == OpenOutcome::Shown {
            return;
        }
        self.load_state(services);
        if let Some(first) = self.active_list().first().map(|m| m.id.clone()) {
            self.open_message(services, &first);
        }
        services.play_mail_sound();
        info!(
            folder = self.folder.name(),
            unread = self.unread_count(Folder::Inbox),
            "mail opened"
        );
    }

    pub fn minimize(&self, services: &mut Services) {
        self.app.minimize(&mut services.shell);
    }

    pub fn toggle_maximize(&self, services: &mut Services) -> Option<bool> {
        self.app.toggle_maximize(&mut services.shell)
    }

    pub fn activate(&self, services: &mut Services) {
        if self.is_open(services) {
            self.app.activate(&mut services.shell);
        }
    }

    /// Remove the window and its taskbar entry. Pending refreshes and
    /// notices die with it.
    pub fn close(&mut self, services: &mut Services) {
        if self.app.close(&mut services.shell) {
            self.notices.reset();
            debug!("mail closed");
        }
    }

    pub fn toggle_from_taskbar(&mut self, services: &mut Services) {
        if self.is_open(services) {
            self.app.toggle_from_taskbar(&mut services.shell, AppRoute::Mail);
        } else {
            self.open(services);
        }
    }

    pub fn handle_control(&mut self, services: &mut Services, button: ControlButton) {
        match button {
            ControlButton::Minimize => self.minimize(services),
            ControlButton::Maximize => {
                self.toggle_maximize(services);
            }
            ControlButton::Close => self.close(services),
        }
    }

    // -- list and reader -------------------------------------------------

    pub fn switch_folder(&mut self, services: &mut Services, folder: Folder) {
        self.folder = folder;
        self.save_state(services);
    }

    /// Same column flips direction; a new column starts in its default one.
    pub fn toggle_sort(&mut self, services: &mut Services, key: SortKey) {
        if self.sort_key == key {
            self.sort_dir = self.sort_dir.flipped();
        } else {
            self.sort_key = key;
            self.sort_dir = key.default_dir();
        }
        self.save_state(services);
    }

    /// Show `id` in the reader and mark it read. Unknown ids are ignored.
    pub fn open_message(&mut self, services: &mut Services, id: &str) -> bool {
        let Some(message) = self.active_list_mut().iter_mut().find(|m| m.id == id) else {
            return false;
        };
        message.read = true;
        self.current_id = Some(id.to_string());
        self.save_state(services);
        true
    }

    pub fn toggle_read(&mut self, services: &mut Services) {
        let Some(id) = self.current_id.clone() else {
            return;
        };
        if let Some(message) = self.active_list_mut().iter_mut().find(|m| m.id == id) {
            message.read = !message.read;
            self.save_state(services);
        }
    }

    /// Up/Down in the sorted list; with nothing selected both land on the
    /// first row.
    pub fn key_nav(&mut self, services: &mut Services, key: ListKey) {
        let ids = self.sorted_ids();
        if ids.is_empty() {
            return;
        }
        let current = self
            .current_id
            .as_deref()
            .and_then(|id| ids.iter().position(|row| row == id));
        let next = match (key, current) {
            (ListKey::Down, Some(i)) => (i + 1).min(ids.len() - 1),
            (ListKey::Up, Some(i)) => i.saturating_sub(1),
            (_, None) => 0,
        };
        self.open_message(services, &ids[next]);
    }

    pub fn toggle_preview(&mut self, services: &mut Services) {
        self.preview_off = !self.preview_off;
        self.save_state(services);
    }

    /// Left/Right on the divider: one 5% step.
    pub fn nudge_list(&mut self, services: &mut Services, grow: bool) {
        let delta = if grow { RATIO_STEP } else { -RATIO_STEP };
        self.list_ratio = clamp_ratio(self.list_ratio + delta);
        self.save_state(services);
    }

    /// Divider drag: the list starts `start_width` px wide inside a pane of
    /// `pane_width` px and the pointer moved `dx` px.
    pub fn drag_list(&mut self, start_width: f64, pane_width: f64, dx: f64) {
        if !(pane_width.is_finite() && pane_width > 0.0) {
            return;
        }
        let max_list = MIN_LIST_PX.max(pane_width - MIN_READER_PX);
        let width = (start_width + dx).clamp(MIN_LIST_PX, max_list);
        self.list_ratio = clamp_ratio(width / pane_width);
    }

    /// Pointer released after [`drag_list`](Self::drag_list).
    pub fn end_list_drag(&self, services: &mut Services) {
        self.save_state(services);
    }

    // -- refresh ---------------------------------------------------------

    /// Start a simulated server check; the result lands 600-1299 ms later.
    pub fn refresh(&mut self, services: &mut Services) {
        if !self.is_open(services) {
            return;
        }
        self.notices.set_status(services, "Checking for new mail...", None);
        let delay = u64::from(services.rng().next_in(600, 700));
        let token = self.notices.token();
        services.schedule(delay, Some(token), TimerEvent::MailRefreshDone);
    }

    /// Prepend zero to three generated ads.
    pub fn on_refresh_done(&mut self, services: &mut Services) {
        let count = services.rng().next_below(4);
        let date = format_mail_date(services.wall_now());
        let date_ms = services.epoch_ms();
        for i in 0..count {
            let ad = template(services.rng().next_below(TEMPLATE_COUNT));
            let id = if i == 0 {
                format!("auto-{date_ms}")
            } else {
                format!("auto-{date_ms}-{i}")
            };
            self.inbox.insert(
                0,
                MailMessage {
                    id,
                    from: ad.from.to_string(),
                    subject: ad.subject.to_string(),
                    date: date.clone(),
                    preview: "New message".to_string(),
                    html: ad.html,
                    read: false,
                    date_ms: Some(date_ms),
                },
            );
        }
        if count > 0 {
            if let Some(first) = self.active_list().first().map(|m| m.id.clone()) {
                self.open_message(services, &first);
            }
            services.play_mail_sound();
            let s = plural(count);
            self.notices
                .set_status(services, &format!("{count} new message{s}."), Some(1800));
            self.notices.show_toast(services, &format!("{count} new message{s}"));
        } else {
            self.notices.set_status(services, "No new messages.", Some(1200));
        }
        info!(count, "mail refresh finished");
    }

    pub fn on_status_clear(&mut self, text: &str) {
        self.notices.clear_status_if(text);
    }

    pub fn on_toast_hide(&mut self, services: &mut Services, id: u64) {
        self.notices.hide_toast(services, id);
    }

    pub fn on_toast_remove(&mut self, id: u64) {
        self.notices.remove_toast(id);
    }

    // -- compose, reply, delete ------------------------------------------

    /// Open a compose window prefilled with the given fields.
    pub fn open_compose(&mut self, services: &mut Services, to: &str, subject: &str, body: &str) -> u32 {
        self.next_compose += 1;
        let id = self.next_compose;
        let draft = ComposeDraft::new(id, to, subject, body);
        services
            .shell
            .create_window(draft.window.clone(), compose_shell(), AppRoute::Compose(id));
        self.drafts.insert(id, draft);
        debug!(compose = id, "compose opened");
        id
    }

    pub fn edit_compose(&mut self, id: u32, edit: ComposeEdit) -> bool {
        match self.drafts.get_mut(&id) {
            Some(draft) => {
                draft.apply(edit);
                true
            }
            None => false,
        }
    }

    /// File the draft under Sent, show it and close the compose window.
    pub fn send_compose(&mut self, services: &mut Services, id: u32) -> bool {
        let Some(draft) = self.drafts.remove(&id) else {
            return false;
        };
        let message = draft.to_sent(format_mail_date(services.wall_now()), services.epoch_ms());
        let sent_id = message.id.clone();
        self.sent.insert(0, message);
        self.folder = Folder::Sent;
        self.open_message(services, &sent_id);
        services.play_mail_sound();
        if self.is_open(services) {
            self.notices.set_status(services, "Mail sent!", Some(1500));
            self.notices.show_toast(services, "Mail sent!");
        }
        services.shell.close_window(&draft.window);
        self.save_state(services);
        info!(id = %sent_id, "mail sent");
        true
    }

    pub fn cancel_compose(&mut self, services: &mut Services, id: u32) {
        if let Some(draft) = self.drafts.remove(&id) {
            services.shell.close_window(&draft.window);
        }
    }

    /// Title-bar buttons of a compose window.
    pub fn handle_compose_control(&mut self, services: &mut Services, id: u32, button: ControlButton) {
        match button {
            ControlButton::Minimize => {
                if let Some(draft) = self.drafts.get(&id) {
                    services.shell.windows.minimize_window(&draft.window);
                }
            }
            ControlButton::Close => self.cancel_compose(services, id),
            ControlButton::Maximize => {}
        }
    }

    /// Compose a reply quoting the selected message.
    pub fn reply(&mut self, services: &mut Services) -> Option<u32> {
        let original = self.current_message()?.clone();
        let subject = format!("Re: {}", original.subject);
        Some(self.open_compose(services, &original.from, &subject, &reply_quote(&original)))
    }

    /// Delete the selected message and select its neighbor.
    pub fn delete(&mut self, services: &mut Services) {
        let Some(id) = self.current_id.clone() else {
            return;
        };
        let list = self.active_list_mut();
        let Some(index) = list.iter().position(|m| m.id == id) else {
            return;
        };
        list.remove(index);
        let next = (!list.is_empty()).then(|| list[index.min(list.len() - 1)].id.clone());
        match next {
            Some(next) => {
                self.open_message(services, &next);
            }
            None => self.current_id = None,
        }
        self.save_state(services);
    }

    // -- view ------------------------------------------------------------

    #[must_use]
    pub fn view(&self, services: &Services) -> MailView {
        let folders = [Folder::Inbox, Folder::Sent]
            .into_iter()
            .map(|folder| FolderView {
                name: folder.name(),
                unread: self.unread_count(folder),
                active: folder == self.folder,
            })
            .collect();
        let columns = COLUMNS
            .iter()
            .map(|&(key, label)| ColumnView {
                key,
                label,
                sorted: (key == self.sort_key).then_some(self.sort_dir),
            })
            .collect();
        let rows = sorted(self.active_list(), self.sort_key, self.sort_dir)
            .into_iter()
            .map(|m| RowView {
                id: m.id.clone(),
                from: m.from.clone(),
                subject: m.subject.clone(),
                date: m.date.clone(),
                unread: !m.read,
                active: self.current_id.as_deref() == Some(m.id.as_str()),
            })
            .collect();
        let current = self.current_message();
        let reader = current.map(|m| ReaderView {
            from: m.from.clone(),
            subject: m.subject.clone(),
            date: m.date.clone(),
            html: reader_html(m),
        });
        MailView {
            open: self.is_open(services),
            visible: self.app.is_visible(&services.shell),
            folders,
            columns,
            rows,
            reader,
            mark_label: if current.is_some_and(|m| !m.read) {
                "Mark Read"
            } else {
                "Mark Unread"
            },
            mark_enabled: current.is_some(),
            preview_off: self.preview_off,
            list_ratio: self.list_ratio,
            list_width: ratio_percent(self.list_ratio),
            status: self.notices.status().to_string(),
            toasts: self.notices.toasts().to_vec(),
            composes: self.drafts.values().cloned().collect(),
        }
    }
}

/// Message markup, or a plain card for messages without a body.
fn reader_html(message: &MailMessage) -> String {
    if !message.html.trim().is_empty() {
        return message.html.clone();
    }
    let head = if message.subject.is_empty() {
        "(no subject)"
    } else {
        message.subject.as_str()
    };
    let from = if message.from.is_empty() {
        "unknown"
    } else {
        message.from.as_str()
    };
    let body = if message.preview.is_empty() {
        "<p>(No content)</p>".to_string()
    } else {
        format!("<p>{}</p>", oxford_core::html::escape(&message.preview))
    };
    AdSpec::new("MESSAGE", head).sub(format!("From: {from}")).body(body).render()
}
