#![forbid(unsafe_code)]

//! Serializable picture of the whole desktop.
//!
//! A host renders from this; it never reads controller state directly.

use oxford_core::Viewport;
use oxford_shell::{TaskbarEntry, WindowRecord};
use serde::Serialize;

use crate::browser::BrowserView;
use crate::channels::ChannelsView;
use crate::chat::ChatView;
use crate::desktop::Desktop;
use crate::desktop_icons::IconView;
use crate::dialup::DialupView;
use crate::dos::DosView;
use crate::folder;
use crate::mail::MailView;
use crate::media::MediaView;
use crate::paint::PaintView;
use crate::services::AppRoute;
use crate::slides::SlidesView;
use crate::start_menu::StartMenuView;
use crate::terminal::TerminalView;

#[derive(Debug, Clone, Serialize)]
pub struct DesktopSnapshot {
    pub initialized: bool,
    pub viewport: Viewport,
    pub clock: String,
    pub dialup: DialupView,
    /// Back to front.
    pub windows: Vec<WindowRecord>,
    pub taskbar: Vec<TaskbarEntry<AppRoute>>,
    pub icons: Vec<IconView>,
    pub start_menu: StartMenuView,
    pub chat: ChatView,
    pub mail: MailView,
    pub media: MediaView,
    pub paint: PaintView,
    pub channels: ChannelsView,
    pub slides: Vec<SlidesView>,
    pub folders: Vec<folder::FolderView>,
    pub browser: BrowserView,
    pub dos: DosView,
    pub terminal: TerminalView,
}

impl Desktop {
    #[must_use]
    pub fn snapshot(&self) -> DesktopSnapshot {
        let services = &self.services;
        DesktopSnapshot {
            initialized: self.is_initialized(),
            viewport: services.shell.viewport(),
            clock: self.clock_text().to_string(),
            dialup: self.dialup.view(),
            windows: services
                .shell
                .windows
                .windows_in_z_order()
                .into_iter()
                .cloned()
                .collect(),
            taskbar: services.shell.taskbar.entries().to_vec(),
            icons: self.icons.view(),
            start_menu: self.start_menu.view(services),
            chat: self.chat.view(),
            mail: self.mail.view(services),
            media: self.media.view(services),
            paint: self.paint.view(services),
            channels: self.channels.view(services),
            slides: self.slides.view(),
            folders: self.folders.view(),
            browser: self.browser.view(services),
            dos: self.dos.view(services),
            terminal: self.terminal.view(services),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DesktopConfig;
    use crate::desktop_icons::DesktopIcon;
    use crate::services::testing::services;
    use pretty_assertions::assert_eq;

    #[test]
    fn windows_come_back_to_front_and_serialize() {
        let mut desktop = Desktop::new(DesktopConfig::default(), services());
        desktop.init_apps();
        desktop.open_icon(DesktopIcon::Paint);
        desktop.open_icon(DesktopIcon::InternetExplorer);
        let snapshot = desktop.snapshot();
        let last = snapshot.windows.last().map(|w| w.id.clone());
        assert_eq!(last.as_ref(), Some(desktop.browser.window_id()));
        assert!(snapshot.taskbar.iter().any(|e| e.id == "paint"));
        assert_eq!(snapshot.icons.len(), DesktopIcon::ALL.len());

        let json = serde_json::to_value(&snapshot).expect("snapshot serializes");
        assert_eq!(json["initialized"], serde_json::json!(true));
        assert_eq!(json["viewport"]["width"], serde_json::json!(1024));
        assert!(json["taskbar"][0].get("route").is_none());
    }
}
