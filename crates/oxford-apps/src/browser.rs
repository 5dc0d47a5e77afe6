#![forbid(unsafe_code)]

//! Internet Explorer in snapshot mode.
//!
//! The window shows a static picture of the course page. The address bar is
//! read-only and the only way out is opening the real page in a new tab.

use oxford_core::WindowRect;
use oxford_shell::{AppWindow, AppWindowSpec, ControlButton, OpenOutcome, ShellConfig, WindowControls, WindowId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::effects::Effect;
use crate::services::{AppRoute, Services};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub default_url: String,
    pub snapshot: String,
    pub taskbar_id: String,
    pub icon: String,
    pub rect: WindowRect,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            default_url: "https://lifelong-learning.ox.ac.uk/courses/emerging-technologies-for-social-innovation-and-entrepreneurship?code=O25P103COJ".to_string(),
            snapshot: "media/oxford-page.png".to_string(),
            taskbar_id: "internet-explorer".to_string(),
            icon: "ie-icon".to_string(),
            rect: WindowRect::new(140, 80, 900, 600),
        }
    }
}

impl BrowserConfig {
    #[must_use]
    pub fn default_url(mut self, url: impl Into<String>) -> Self {
        self.default_url = url.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowserView {
    pub open: bool,
    pub visible: bool,
    pub address: String,
    pub snapshot: String,
    pub snapshot_alt: &'static str,
}

#[derive(Debug)]
pub struct BrowserController {
    config: BrowserConfig,
    app: AppWindow,
    address: Option<String>,
}

impl BrowserController {
    #[must_use]
    pub fn new(config: BrowserConfig) -> Self {
        let app = AppWindow::new(
            AppWindowSpec::new(
                "ie-window",
                ShellConfig::new("Internet Explorer")
                    .class_tag("ie-window")
                    .rect(config.rect)
                    .controls(WindowControls::all()),
            )
            .taskbar(config.taskbar_id.clone(), "Internet Explorer")
            .icon(config.icon.clone()),
        );
        Self {
            config,
            app,
            address: None,
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

    /// Address shown in the bar while open.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Open at `url` (or the default page). An open window is only shown and
    /// raised; snapshot mode does not navigate.
    pub fn open(&mut self, services: &mut Services, url: Option<&str>) {
        if self.app.open(&mut services.shell, AppRoute::Browser) == OpenOutcome::Created {
            let target = url.filter(|u| !u.is_empty()).unwrap_or(&self.config.default_url);
            debug!(url = target, "browser opened");
            self.address = Some(target.to_string());
        }
    }

    /// "Open in Tab" or a click on the snapshot.
    pub fn open_in_tab(&self, services: &mut Services) {
        if let Some(url) = &self.address {
            services.emit(Effect::OpenUrl {
                url: url.clone(),
                target: "_blank".to_string(),
            });
        }
    }

    pub fn minimize(&self, services: &mut Services) {
        self.app.minimize(&mut services.shell);
    }

    pub fn activate(&self, services: &mut Services) {
        if self.is_open(services) {
            self.app.activate(&mut services.shell);
        }
    }

    pub fn close(&mut self, services: &mut Services) {
        if self.app.close(&mut services.shell) {
            self.address = None;
        }
    }

    pub fn toggle_from_taskbar(&mut self, services: &mut Services) {
        if self.is_open(services) {
            self.app.toggle_from_taskbar(&mut services.shell, AppRoute::Browser);
        } else {
            self.open(services, None);
        }
    }

    pub fn handle_control(&mut self, services: &mut Services, button: ControlButton) {
        match button {
            ControlButton::Close => self.close(services),
            other => {
                self.app.handle_control(&mut services.shell, other);
            }
        }
    }

    #[must_use]
    pub fn view(&self, services: &Services) -> BrowserView {
        BrowserView {
            open: self.is_open(services),
            visible: self.app.is_visible(&services.shell),
            address: self.address.clone().unwrap_or_default(),
            snapshot: self.config.snapshot.clone(),
            snapshot_alt: "Oxford Course Page",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::services;
    use pretty_assertions::assert_eq;

    #[test]
    fn opens_on_the_default_course_page() {
        let mut services = services();
        let mut browser = BrowserController::new(BrowserConfig::default());
        browser.open(&mut services, None);
        assert!(browser.address().is_some_and(|a| a.contains("lifelong-learning.ox.ac.uk")));
        assert!(services.shell.taskbar.is_active("internet-explorer"));
    }

    #[test]
    fn reopening_does_not_navigate() {
        let mut services = services();
        let mut browser = BrowserController::new(BrowserConfig::default());
        browser.open(&mut services, Some("https://example.com/a"));
        browser.minimize(&mut services);
        browser.open(&mut services, Some("https://example.com/b"));
        assert_eq!(browser.address(), Some("https://example.com/a"));
        assert!(browser.view(&services).visible);
    }

    #[test]
    fn open_in_tab_emits_the_address() {
        let mut services = services();
        let mut browser = BrowserController::new(BrowserConfig::default());
        browser.open_in_tab(&mut services);
        assert!(services.take_effects().is_empty());
        browser.open(&mut services, Some("https://example.com/a"));
        browser.open_in_tab(&mut services);
        assert_eq!(
            services.take_effects(),
            vec![Effect::OpenUrl {
                url: "https://example.com/a".into(),
                target: "_blank".into()
            }]
        );
    }

    #[test]
    fn close_then_taskbar_toggle_reopens_fresh() {
        let mut services = services();
        let mut browser = BrowserController::new(BrowserConfig::default().default_url("https://example.com/"));
        browser.open(&mut services, Some("https://example.com/x"));
        browser.handle_control(&mut services, ControlButton::Close);
        assert!(browser.address().is_none());
        assert!(!services.shell.taskbar.contains("internet-explorer"));
        browser.toggle_from_taskbar(&mut services);
        assert_eq!(browser.address(), Some("https://example.com/"));
    }
}
