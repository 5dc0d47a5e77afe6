#![forbid(unsafe_code)]

//! Taskbar registry.
//!
//! One entry per open top-level window, in insertion order. At most one entry
//! is active: activating an entry deactivates every other one. Clicking an
//! entry yields the route token registered with it; the owning controller
//! decides what a toggle means.

use serde::Serialize;
use tracing::debug;

/// Options for a new entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskbarOptions<R> {
    /// Token returned when the entry is clicked.
    pub route: R,
    /// CSS class of the entry's icon.
    pub icon: Option<String>,
}

impl<R> TaskbarOptions<R> {
    #[must_use]
    pub const fn new(route: R) -> Self {
        Self { route, icon: None }
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// One taskbar button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskbarEntry<R> {
    pub id: String,
    pub label: String,
    pub icon: Option<String>,
    pub active: bool,
    #[serde(skip)]
    pub route: R,
}

/// Ordered set of taskbar entries.
#[derive(Debug, Clone)]
pub struct TaskbarRegistry<R> {
    entries: Vec<TaskbarEntry<R>>,
}

impl<R> Default for TaskbarRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> TaskbarRegistry<R> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<R: Clone> TaskbarRegistry<R> {
    /// Add an entry, or relabel and activate it if `id` already exists.
    ///
    /// The new entry becomes the only active one.
    pub fn add_window(
        &mut self,
        id: &str,
        label: impl Into<String>,
        options: TaskbarOptions<R>,
    ) -> &TaskbarEntry<R> {
        let label = label.into();
        if let Some(idx) = self.position(id) {
            self.set_title(id, label);
            self.set_active(id, true);
            return &self.entries[idx];
        }
        debug!(entry = id, "taskbar entry added");
        self.entries.push(TaskbarEntry {
            id: id.to_string(),
            label,
            icon: options.icon,
            active: false,
            route: options.route,
        });
        self.set_active(id, true);
        let idx = self.entries.len() - 1;
        &self.entries[idx]
    }

    /// Relabel an entry. Unknown ids are ignored.
    pub fn set_title(&mut self, id: &str, label: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.label = label.into();
                true
            }
            None => false,
        }
    }

    /// Set an entry's active flag; activating clears every other entry.
    pub fn set_active(&mut self, id: &str, active: bool) {
        if active {
            for entry in self.entries.iter_mut().filter(|e| e.id != id) {
                entry.active = false;
            }
        }
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.active = active;
        }
    }

    /// Remove an entry. Returns `true` if it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.entries.remove(idx);
                debug!(entry = id, "taskbar entry removed");
                true
            }
            None => false,
        }
    }

    /// Route token of the clicked entry.
    #[must_use]
    pub fn click(&self, id: &str) -> Option<R> {
        self.get(id).map(|e| e.route.clone())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TaskbarEntry<R>> {
        self.entries.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    #[must_use]
    pub fn is_active(&self, id: &str) -> bool {
        self.get(id).is_some_and(|e| e.active)
    }

    /// Id of the active entry, if any.
    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.entries.iter().find(|e| e.active).map(|e| e.id.as_str())
    }

    /// Entries in display order.
    #[must_use]
    pub fn entries(&self) -> &[TaskbarEntry<R>] {
        &self.entries
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }
}
