#![forbid(unsafe_code)]

//! Shared window chrome and the uniform app-window lifecycle.
//!
//! [`Shell`] bundles the window registry, the taskbar and the pointer adapter
//! so controllers receive one explicit dependency instead of reaching for
//! globals. [`AppWindow`] is the create-once lifecycle every app controller
//! follows:
//! - `open`: show and focus if already created, otherwise build the shell,
//!   register the taskbar entry and focus it;
//! - `minimize`: hide and deactivate the taskbar entry;
//! - `toggle_maximize`: swap saved geometry against full-viewport geometry;
//! - `close`: tear down the window and its taskbar entry;
//! - `toggle_from_taskbar`: show and focus if hidden or absent, hide if visible;
//! - `activate`: bring to front and mark the taskbar entry active.

use std::collections::BTreeMap;

use oxford_core::{Point, Viewport, WindowRect};

use crate::pointer::{PointerButton, PointerDispatch, ResizeHandle, WindowPointerAdapter};
use crate::taskbar::{TaskbarOptions, TaskbarRegistry};
use crate::window::{ControlButton, ShellConfig, WindowId, WindowManager, WindowRecord};

/// Window chrome services shared by every controller.
#[derive(Debug, Clone)]
pub struct Shell<R> {
    pub windows: WindowManager,
    pub taskbar: TaskbarRegistry<R>,
    pub pointer: WindowPointerAdapter,
    owners: BTreeMap<WindowId, R>,
}

impl<R: Clone> Shell<R> {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            windows: WindowManager::new(viewport),
            taskbar: TaskbarRegistry::new(),
            pointer: WindowPointerAdapter::default(),
            owners: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.windows.viewport()
    }

    /// Create a shell owned by `owner`.
    pub fn create_window(&mut self, id: WindowId, config: ShellConfig, owner: R) -> &WindowRecord {
        self.owners.insert(id.clone(), owner);
        self.windows.create_window(id, config)
    }

    /// Close a shell, dropping any gesture that targets it.
    pub fn close_window(&mut self, id: &WindowId) -> Option<WindowRecord> {
        self.pointer.forget_window(id);
        self.owners.remove(id);
        self.windows.close_window(id)
    }

    /// Controller that owns a window.
    #[must_use]
    pub fn owner(&self, id: &WindowId) -> Option<&R> {
        self.owners.get(id)
    }

    /// Register the owner of a shell that was adopted rather than created.
    pub fn set_owner(&mut self, id: WindowId, owner: R) {
        self.owners.insert(id, owner);
    }

    pub fn title_pointer_down(
        &mut self,
        id: &WindowId,
        pointer_id: u32,
        button: PointerButton,
        position: Point,
        on_control: bool,
    ) -> PointerDispatch {
        self.pointer
            .title_pointer_down(&mut self.windows, id, pointer_id, button, position, on_control)
    }

    pub fn handle_pointer_down(
        &mut self,
        id: &WindowId,
        handle: ResizeHandle,
        pointer_id: u32,
        button: PointerButton,
        position: Point,
    ) -> PointerDispatch {
        self.pointer
            .handle_pointer_down(&mut self.windows, id, handle, pointer_id, button, position)
    }

    pub fn pointer_move(&mut self, pointer_id: u32, position: Point) -> PointerDispatch {
        self.pointer
            .pointer_move(&mut self.windows, pointer_id, position)
    }
}

/// Result of [`AppWindow::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The shell was built now; the caller populates it.
    Created,
    /// The shell already existed and was shown and focused.
    Shown,
}

/// Static description of an app window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppWindowSpec {
    pub window_id: WindowId,
    /// Taskbar entry id and label; `None` for windows without an entry.
    pub taskbar: Option<(String, String)>,
    pub icon: Option<String>,
    pub shell: ShellConfig,
    /// Geometry used when leaving maximized state with nothing saved.
    pub restore_rect: WindowRect,
}

impl AppWindowSpec {
    #[must_use]
    pub fn new(window_id: impl Into<String>, shell: ShellConfig) -> Self {
        let restore_rect = shell.rect;
        Self {
            window_id: WindowId::new(window_id),
            taskbar: None,
            icon: None,
            shell,
            restore_rect,
        }
    }

    #[must_use]
    pub fn taskbar(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.taskbar = Some((id.into(), label.into()));
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn restore_rect(mut self, rect: WindowRect) -> Self {
        self.restore_rect = rect;
        self
    }
}

/// What a title-bar button click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    Minimized,
    Maximized(bool),
    Closed,
    /// The button is not shown on this window or the window is gone.
    Ignored,
}

/// Create-once lifecycle helper for one app window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppWindow {
    spec: AppWindowSpec,
}

impl AppWindow {
    #[must_use]
    pub const fn new(spec: AppWindowSpec) -> Self {
        Self { spec }
    }

    #[must_use]
    pub const fn spec(&self) -> &AppWindowSpec {
        &self.spec
    }

    #[must_use]
    pub const fn id(&self) -> &WindowId {
        &self.spec.window_id
    }

    fn taskbar_id(&self) -> Option<&str> {
        self.spec.taskbar.as_ref().map(|(id, _)| id.as_str())
    }

    #[must_use]
    pub fn is_open<R: Clone>(&self, shell: &Shell<R>) -> bool {
        shell.windows.contains(self.id())
    }

    #[must_use]
    pub fn is_visible<R: Clone>(&self, shell: &Shell<R>) -> bool {
        shell.windows.is_visible(self.id())
    }

    /// Show and focus an existing shell, or build it.
    pub fn open<R: Clone>(&self, shell: &mut Shell<R>, owner: R) -> OpenOutcome {
        self.open_with(shell, owner, self.spec.shell.clone())
    }

    /// [`open`](Self::open) with geometry computed at open time.
    pub fn open_with<R: Clone>(&self, shell: &mut Shell<R>, owner: R, config: ShellConfig) -> OpenOutcome {
        if self.is_open(shell) {
            self.show(shell);
            self.activate(shell);
            return OpenOutcome::Shown;
        }
        shell.create_window(self.id().clone(), config, owner.clone());
        self.register_taskbar(shell, owner);
        self.activate(shell);
        OpenOutcome::Created
    }

    /// Add the taskbar entry if this window has one and it is missing.
    pub fn register_taskbar<R: Clone>(&self, shell: &mut Shell<R>, owner: R) {
        if let Some((id, label)) = &self.spec.taskbar {
            let mut options = TaskbarOptions::new(owner);
            if let Some(icon) = &self.spec.icon {
                options = options.icon(icon.clone());
            }
            shell.taskbar.add_window(id, label.clone(), options);
        }
    }

    /// Bring to front and mark the taskbar entry active.
    pub fn activate<R: Clone>(&self, shell: &mut Shell<R>) {
        shell.windows.bring_to_front(self.id());
        if let Some(id) = self.taskbar_id() {
            shell.taskbar.set_active(id, true);
        }
    }

    pub fn show<R: Clone>(&self, shell: &mut Shell<R>) {
        shell.windows.show(self.id());
    }

    /// Hide and deactivate the taskbar entry.
    pub fn minimize<R: Clone>(&self, shell: &mut Shell<R>) {
        shell.windows.minimize_window(self.id());
        if let Some(id) = self.taskbar_id() {
            shell.taskbar.set_active(id, false);
        }
    }

    pub fn toggle_maximize<R: Clone>(&self, shell: &mut Shell<R>) -> Option<bool> {
        shell
            .windows
            .toggle_maximize(self.id(), self.spec.restore_rect)
    }

    /// Remove the window and its taskbar entry.
    pub fn close<R: Clone>(&self, shell: &mut Shell<R>) -> bool {
        let closed = shell.close_window(self.id()).is_some();
        if let Some(id) = self.taskbar_id() {
            shell.taskbar.remove(id);
        }
        closed
    }

    /// Show and focus if hidden or absent, hide if visible.
    ///
    /// Returns `true` when the window ended up visible. An absent window is
    /// created via [`open`](Self::open).
    pub fn toggle_from_taskbar<R: Clone>(&self, shell: &mut Shell<R>, owner: R) -> bool {
        if !self.is_open(shell) {
            self.open(shell, owner);
            return true;
        }
        if self.is_visible(shell) {
            self.minimize(shell);
            false
        } else {
            self.show(shell);
            self.activate(shell);
            true
        }
    }

    /// Default handling of the title-bar buttons.
    pub fn handle_control<R: Clone>(&self, shell: &mut Shell<R>, button: ControlButton) -> ControlOutcome {
        let Some(record) = shell.windows.get(self.id()) else {
            return ControlOutcome::Ignored;
        };
        if !record.controls.shows(button) {
            return ControlOutcome::Ignored;
        }
        match button {
            ControlButton::Minimize => {
                self.minimize(shell);
                ControlOutcome::Minimized
            }
            ControlButton::Maximize => self
                .toggle_maximize(shell)
                .map_or(ControlOutcome::Ignored, ControlOutcome::Maximized),
            ControlButton::Close => {
                self.close(shell);
                ControlOutcome::Closed
            }
        }
    }
}
