#![forbid(unsafe_code)]

//! Window shell factory and registry.
//!
//! A shell is the title bar plus body every app window is built from. The
//! [`WindowManager`] owns one [`WindowRecord`] per open shell and the global
//! z-order counter: every create, focus, drag start, resize start and restore
//! takes the next counter value, so the most recently focused window is on
//! top and no two windows ever share a z-index.

use std::fmt;

use oxford_core::{Viewport, WindowRect};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// First value handed out by the z-order counter is `Z_INDEX_BASE + 1`.
pub const Z_INDEX_BASE: u64 = 1000;

/// Stable identifier of a window (`"mail"`, `"folder-homework"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(String);

impl WindowId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Which title-bar buttons a shell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowControls {
    pub minimize: bool,
    pub maximize: bool,
    pub close: bool,
}

impl Default for WindowControls {
    fn default() -> Self {
        Self::all()
    }
}

impl WindowControls {
    #[must_use]
    pub const fn all() -> Self {
        Self {
            minimize: true,
            maximize: true,
            close: true,
        }
    }

    #[must_use]
    pub const fn minimize_close() -> Self {
        Self {
            minimize: true,
            maximize: false,
            close: true,
        }
    }

    #[must_use]
    pub const fn close_only() -> Self {
        Self {
            minimize: false,
            maximize: false,
            close: true,
        }
    }

    /// Whether the given button is shown.
    #[must_use]
    pub const fn shows(&self, button: ControlButton) -> bool {
        match button {
            ControlButton::Minimize => self.minimize,
            ControlButton::Maximize => self.maximize,
            ControlButton::Close => self.close,
        }
    }
}

/// A title-bar control button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlButton {
    Minimize,
    Maximize,
    Close,
}

/// Where the shell was mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Desktop,
    /// No desktop surface existed; the shell went to the document root.
    DocumentRoot,
}

/// Configuration for a new shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub title: String,
    pub class_tag: String,
    pub rect: WindowRect,
    pub controls: WindowControls,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            title: "Window".to_string(),
            class_tag: String::new(),
            rect: WindowRect::new(120, 100, 600, 400),
            controls: WindowControls::all(),
        }
    }
}

impl ShellConfig {
    /// Default configuration with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn class_tag(mut self, tag: impl Into<String>) -> Self {
        self.class_tag = tag.into();
        self
    }

    #[must_use]
    pub fn rect(mut self, rect: WindowRect) -> Self {
        self.rect = rect;
        self
    }

    #[must_use]
    pub fn size(mut self, width: i32, height: i32) -> Self {
        self.rect.width = width;
        self.rect.height = height;
        self
    }

    #[must_use]
    pub fn position(mut self, left: i32, top: i32) -> Self {
        self.rect.left = left;
        self.rect.top = top;
        self
    }

    #[must_use]
    pub fn controls(mut self, controls: WindowControls) -> Self {
        self.controls = controls;
        self
    }
}

/// State of one open window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowRecord {
    pub id: WindowId,
    pub title: String,
    pub class_tag: String,
    pub rect: WindowRect,
    pub z_index: u64,
    pub visible: bool,
    pub maximized: bool,
    /// Geometry to restore when leaving the maximized state.
    pub saved_rect: Option<WindowRect>,
    pub controls: WindowControls,
    pub surface: Surface,
}

/// Registry of open windows and owner of the z-order counter.
#[derive(Debug, Clone)]
pub struct WindowManager {
    windows: Vec<WindowRecord>,
    z_counter: u64,
    viewport: Viewport,
    desktop_present: bool,
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl WindowManager {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            windows: Vec::new(),
            z_counter: Z_INDEX_BASE,
            viewport,
            desktop_present: true,
        }
    }

    /// Record whether the host page has a desktop surface to mount into.
    pub fn set_desktop_present(&mut self, present: bool) {
        self.desktop_present = present;
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Current value of the z-order counter.
    #[must_use]
    pub const fn z_counter(&self) -> u64 {
        self.z_counter
    }

    fn next_z(&mut self) -> u64 {
        self.z_counter = self.z_counter.saturating_add(1);
        self.z_counter
    }

    /// Create a shell and put it on top.
    ///
    /// An existing window with the same id is replaced, like a fresh DOM node
    /// built over a stale one.
    pub fn create_window(&mut self, id: WindowId, config: ShellConfig) -> &WindowRecord {
        let z_index = self.next_z();
        let surface = if self.desktop_present {
            Surface::Desktop
        } else {
            Surface::DocumentRoot
        };
        debug!(window = %id, z_index, ?surface, "window shell created");
        let record = WindowRecord {
            id: id.clone(),
            title: config.title,
            class_tag: config.class_tag,
            rect: config.rect,
            z_index,
            visible: true,
            maximized: false,
            saved_rect: None,
            controls: config.controls,
            surface,
        };
        let idx = match self.windows.iter().position(|w| w.id == id) {
            Some(idx) => {
                self.windows[idx] = record;
                idx
            }
            None => {
                self.windows.push(record);
                self.windows.len() - 1
            }
        };
        &self.windows[idx]
    }

    /// Register a window that exists in the page from the start (chat and
    /// buddy list). It takes a z-index like any other shell.
    pub fn adopt_window(&mut self, id: WindowId, config: ShellConfig, visible: bool) {
        self.create_window(id.clone(), config);
        if let Some(record) = self.get_mut(&id) {
            record.visible = visible;
        }
    }

    #[must_use]
    pub fn get(&self, id: &WindowId) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| &w.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &WindowId) -> Option<&mut WindowRecord> {
        self.windows.iter_mut().find(|w| &w.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &WindowId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn is_visible(&self, id: &WindowId) -> bool {
        self.get(id).is_some_and(|w| w.visible)
    }

    /// Bring a window to the front. Returns the new z-index.
    pub fn bring_to_front(&mut self, id: &WindowId) -> Option<u64> {
        if !self.contains(id) {
            return None;
        }
        let z = self.next_z();
        let record = self.get_mut(id)?;
        record.z_index = z;
        Some(z)
    }

    pub fn show(&mut self, id: &WindowId) -> bool {
        self.set_visible(id, true)
    }

    pub fn hide(&mut self, id: &WindowId) -> bool {
        self.set_visible(id, false)
    }

    fn set_visible(&mut self, id: &WindowId, visible: bool) -> bool {
        match self.get_mut(id) {
            Some(record) => {
                record.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Minimize hides the window.
    pub fn minimize_window(&mut self, id: &WindowId) -> bool {
        self.hide(id)
    }

    /// Restore shows the window and brings it to the front.
    pub fn restore_window(&mut self, id: &WindowId) -> Option<u64> {
        self.show(id);
        self.bring_to_front(id)
    }

    /// Remove a window. Returns its final record.
    pub fn close_window(&mut self, id: &WindowId) -> Option<WindowRecord> {
        let idx = self.windows.iter().position(|w| &w.id == id)?;
        debug!(window = %id, "window closed");
        Some(self.windows.remove(idx))
    }

    pub fn set_rect(&mut self, id: &WindowId, rect: WindowRect) -> bool {
        match self.get_mut(id) {
            Some(record) => {
                record.rect = rect;
                true
            }
            None => false,
        }
    }

    pub fn set_title(&mut self, id: &WindowId, title: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(record) => {
                record.title = title.into();
                true
            }
            None => false,
        }
    }

    /// Swap between the saved geometry and the full-viewport geometry.
    ///
    /// When restoring with nothing saved, `fallback` is used. Returns the new
    /// maximized flag.
    pub fn toggle_maximize(&mut self, id: &WindowId, fallback: WindowRect) -> Option<bool> {
        let maximized_rect = self.viewport.maximized_rect();
        let record = self.get_mut(id)?;
        if record.maximized {
            record.rect = record.saved_rect.take().unwrap_or(fallback);
            record.maximized = false;
        } else {
            record.saved_rect = Some(record.rect);
            record.rect = maximized_rect;
            record.maximized = true;
        }
        Some(record.maximized)
    }

    /// Windows ordered bottom to top.
    #[must_use]
    pub fn windows_in_z_order(&self) -> Vec<&WindowRecord> {
        let mut out: Vec<&WindowRecord> = self.windows.iter().collect();
        out.sort_by_key(|w| w.z_index);
        out
    }

    /// Topmost visible window.
    #[must_use]
    pub fn topmost_visible(&self) -> Option<&WindowRecord> {
        self.windows
            .iter()
            .filter(|w| w.visible)
            .max_by_key(|w| w.z_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindowRecord> + '_ {
        self.windows.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> WindowId {
        WindowId::new(s)
    }

    #[test]
    fn shell_defaults_match_classic_window() {
        let config = ShellConfig::default();
        assert_eq!(config.title, "Window");
        assert_eq!(config.rect, WindowRect::new(120, 100, 600, 400));
        assert_eq!(config.controls, WindowControls::all());
    }

    #[test]
    fn create_assigns_increasing_z() {
        let mut wm = WindowManager::default();
        let a = wm.create_window(id("a"), ShellConfig::new("A")).z_index;
        let b = wm.create_window(id("b"), ShellConfig::new("B")).z_index;
        assert_eq!(a, Z_INDEX_BASE + 1);
        assert_eq!(b, Z_INDEX_BASE + 2);
        let a2 = wm.bring_to_front(&id("a")).expect("open window");
        assert!(a2 > b);
        assert_eq!(wm.topmost_visible().map(|w| w.id.as_str()), Some("a"));
    }

    #[test]
    fn missing_desktop_falls_back_to_document_root() {
        let mut wm = WindowManager::default();
        wm.set_desktop_present(false);
        let surface = wm.create_window(id("a"), ShellConfig::default()).surface;
        assert_eq!(surface, Surface::DocumentRoot);
    }

    #[test]
    fn minimize_restore_close() {
        let mut wm = WindowManager::default();
        wm.create_window(id("a"), ShellConfig::default());
        wm.create_window(id("b"), ShellConfig::default());
        assert!(wm.minimize_window(&id("a")));
        assert!(!wm.is_visible(&id("a")));
        let z = wm.restore_window(&id("a")).expect("restored");
        assert!(wm.is_visible(&id("a")));
        assert_eq!(z, wm.z_counter());
        assert!(wm.close_window(&id("a")).is_some());
        assert!(!wm.contains(&id("a")));
        assert_eq!(wm.bring_to_front(&id("a")), None);
    }

    #[test]
    fn maximize_round_trip_restores_saved_geometry() {
        let mut wm = WindowManager::new(Viewport::new(1024, 768));
        let rect = WindowRect::new(50, 60, 500, 300);
        wm.create_window(id("m"), ShellConfig::new("M").rect(rect));
        let fallback = WindowRect::new(180, 100, 820, 560);
        assert_eq!(wm.toggle_maximize(&id("m"), fallback), Some(true));
        assert_eq!(wm.get(&id("m")).map(|w| w.rect), Some(WindowRect::new(0, 0, 1020, 736)));
        assert_eq!(wm.toggle_maximize(&id("m"), fallback), Some(false));
        assert_eq!(wm.get(&id("m")).map(|w| w.rect), Some(rect));
    }

    #[test]
    fn adopted_window_keeps_initial_visibility() {
        let mut wm = WindowManager::default();
        wm.adopt_window(id("buddy-list"), ShellConfig::new("Buddy List"), false);
        assert!(wm.contains(&id("buddy-list")));
        assert!(!wm.is_visible(&id("buddy-list")));
    }
}
