#![forbid(unsafe_code)]

//! Start menu.
//!
//! A small close-only shell anchored above the taskbar. It is built hidden at
//! startup and toggled by the Start button.

use oxford_core::{Viewport, WindowRect, TASKBAR_HEIGHT};
use oxford_shell::{ControlButton, ShellConfig, WindowControls, WindowId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::services::{AppRoute, Services};

/// Gap between the menu and the taskbar.
const MARGIN: i32 = 2;
const LEFT: i32 = 4;

/// Launchable entries, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartItem {
    Aim,
    Ie,
    Mail,
    Paint,
    Channels,
    Dos,
}

impl StartItem {
    pub const ALL: [Self; 6] = [Self::Aim, Self::Ie, Self::Mail, Self::Paint, Self::Channels, Self::Dos];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Aim => "Oxford Messenger",
            Self::Ie => "Internet Explorer",
            Self::Mail => "Oxford Mail",
            Self::Paint => "Oxford Paint",
            Self::Channels => "Oxford Channels",
            Self::Dos => "MS-DOS Games",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Aim => "chat-icon",
            Self::Ie => "ie-icon",
            Self::Mail => "mail-icon",
            Self::Paint => "paint-icon",
            Self::Channels => "channels-icon",
            Self::Dos => "dos-icon",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StartMenuConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for StartMenuConfig {
    fn default() -> Self {
        Self {
            width: 260,
            height: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartItemView {
    pub item: StartItem,
    pub label: &'static str,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartMenuView {
    pub visible: bool,
    pub items: Vec<StartItemView>,
}

#[derive(Debug)]
pub struct StartMenu {
    config: StartMenuConfig,
    window: WindowId,
}

impl StartMenu {
    #[must_use]
    pub fn new(config: StartMenuConfig) -> Self {
        Self {
            config,
            window: WindowId::new("start-menu"),
        }
    }

    #[must_use]
    pub const fn window_id(&self) -> &WindowId {
        &self.window
    }

    fn rect(&self, viewport: Viewport) -> WindowRect {
        let top = viewport.height - TASKBAR_HEIGHT - self.config.height - MARGIN;
        WindowRect::new(LEFT, top, self.config.width, self.config.height)
    }

    /// Build the hidden shell.
    pub fn init(&self, services: &mut Services) {
        let rect = self.rect(services.shell.viewport());
        services.shell.create_window(
            self.window.clone(),
            ShellConfig::new("Start")
                .class_tag("start-menu-window")
                .rect(rect)
                .controls(WindowControls::close_only()),
            AppRoute::StartMenu,
        );
        services.shell.windows.hide(&self.window);
    }

    #[must_use]
    pub fn is_visible(&self, services: &Services) -> bool {
        services.shell.windows.is_visible(&self.window)
    }

    /// Keep the menu anchored above the taskbar.
    pub fn reposition(&self, services: &mut Services) {
        let rect = self.rect(services.shell.viewport());
        services.shell.windows.set_rect(&self.window, rect);
    }

    /// Start button click.
    pub fn toggle(&self, services: &mut Services) {
        if self.is_visible(services) {
            self.close(services);
            return;
        }
        self.reposition(services);
        services.shell.windows.show(&self.window);
        services.shell.windows.bring_to_front(&self.window);
    }

    pub fn close(&self, services: &mut Services) {
        services.shell.windows.hide(&self.window);
    }

    /// A click anywhere. Clicks inside the menu or on the Start button are
    /// left alone.
    pub fn document_click(&self, services: &mut Services, inside_menu_or_button: bool) {
        if !inside_menu_or_button && self.is_visible(services) {
            self.close(services);
        }
    }

    /// Close the menu and hand back the chosen item for launching.
    pub fn choose(&self, services: &mut Services, item: StartItem) -> StartItem {
        debug!(?item, "start menu item chosen");
        self.close(services);
        item
    }

    pub fn handle_control(&self, services: &mut Services, button: ControlButton) {
        if button == ControlButton::Close {
            self.close(services);
        }
    }

    #[must_use]
    pub fn view(&self, services: &Services) -> StartMenuView {
        StartMenuView {
            visible: self.is_visible(services),
            items: StartItem::ALL
                .iter()
                .map(|&item| StartItemView {
                    item,
                    label: item.label(),
                    icon: item.icon(),
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

    fn menu_rect(services: &Services, menu: &StartMenu) -> Option<WindowRect> {
        services.shell.windows.get(menu.window_id()).map(|w| w.rect)
    }

    #[test]
    fn starts_hidden_above_the_taskbar() {
        let mut services = services();
        let menu = StartMenu::new(StartMenuConfig::default());
        menu.init(&mut services);
        assert!(!menu.is_visible(&services));
        assert_eq!(menu_rect(&services, &menu), Some(WindowRect::new(4, 438, 260, 300)));
    }

    #[test]
    fn toggle_shows_on_top_and_hides() {
        let mut services = services();
        let menu = StartMenu::new(StartMenuConfig::default());
        menu.init(&mut services);
        services.shell.windows.create_window(WindowId::new("other"), ShellConfig::new("Other"));
        menu.toggle(&mut services);
        assert_eq!(
            services.shell.windows.topmost_visible().map(|w| w.id.clone()),
            Some(menu.window_id().clone())
        );
        menu.toggle(&mut services);
        assert!(!menu.is_visible(&services));
    }

    #[test]
    fn outside_clicks_and_choices_close_it() {
        let mut services = services();
        let menu = StartMenu::new(StartMenuConfig::default());
        menu.init(&mut services);
        menu.toggle(&mut services);
        menu.document_click(&mut services, true);
        assert!(menu.is_visible(&services));
        menu.document_click(&mut services, false);
        assert!(!menu.is_visible(&services));
        menu.toggle(&mut services);
        assert_eq!(menu.choose(&mut services, StartItem::Dos), StartItem::Dos);
        assert!(!menu.is_visible(&services));
    }

    #[test]
    fn resize_reanchors() {
        let mut services = services();
        let menu = StartMenu::new(StartMenuConfig::default());
        menu.init(&mut services);
        services.shell.windows.set_viewport(Viewport::new(800, 600));
        menu.reposition(&mut services);
        assert_eq!(menu_rect(&services, &menu).map(|r| r.top), Some(270));
        assert_eq!(menu.view(&services).items.len(), 6);
    }
}
