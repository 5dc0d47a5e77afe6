#![forbid(unsafe_code)]

//! Explorer-style folder windows.
//!
//! Any number of folders may be open; each has its own window and taskbar
//! entry keyed `folder-{id}`. Files open in the media player.

use std::collections::BTreeMap;

use oxford_core::html::escape;
use oxford_core::WindowRect;
use oxford_shell::{AppWindow, AppWindowSpec, ControlButton, ShellConfig, WindowControls, WindowId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::effects::MediaKind;
use crate::media::{MediaController, MediaRequest, PlaylistItem};
use crate::services::{AppRoute, Services};

pub const HOMEWORK: &str = "homework";
pub const EMPTY_FOLDER: &str = "This folder is empty. Add files later.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderFile {
    pub name: String,
    pub path: String,
    pub kind: MediaKind,
}

impl FolderFile {
    #[must_use]
    pub fn video(name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: format!("media/{name}"),
            kind: MediaKind::Video,
        }
    }

    fn playlist_item(&self) -> PlaylistItem {
        PlaylistItem {
            name: Some(self.name.clone()),
            path: self.path.clone(),
            kind: Some(self.kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FolderConfig {
    pub rect: WindowRect,
    pub icon: String,
    /// Files per folder id. Folders not listed are empty.
    pub contents: BTreeMap<String, Vec<FolderFile>>,
    /// Folders that also become the media player's playlist when opened.
    pub playlists: BTreeMap<String, String>,
}

impl Default for FolderConfig {
    fn default() -> Self {
        let homework = ["xfiles.mp4", "intro.mp4", "innovation.mp4", "end.mp4"]
            .into_iter()
            .map(FolderFile::video)
            .collect();
        Self {
            rect: WindowRect::new(180, 110, 520, 380),
            icon: "folder-icon".to_string(),
            contents: BTreeMap::from([(HOMEWORK.to_string(), homework)]),
            playlists: BTreeMap::from([(HOMEWORK.to_string(), "Homework".to_string())]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileView {
    pub name: String,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderView {
    pub id: String,
    pub window: WindowId,
    pub title: String,
    /// Escaped `C:\Desktop\{title}`.
    pub path: String,
    pub files: Vec<FileView>,
    /// Shown instead of the grid when there are no files.
    pub empty: Option<&'static str>,
}

#[derive(Debug)]
struct OpenFolder {
    app: AppWindow,
    title: String,
    files: Vec<FolderFile>,
}

#[derive(Debug)]
pub struct FolderController {
    config: FolderConfig,
    open: BTreeMap<String, OpenFolder>,
}

impl FolderController {
    #[must_use]
    pub fn new(config: FolderConfig) -> Self {
        Self {
            config,
            open: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn window_id(id: &str) -> WindowId {
        WindowId::new(format!("folder-{id}"))
    }

    #[must_use]
    pub fn is_open(&self, id: &str) -> bool {
        self.open.contains_key(id)
    }

    pub fn open_homework(&mut self, services: &mut Services, media: &mut MediaController) {
        self.open_folder(services, media, HOMEWORK, "Homework");
    }

    /// Show an open folder, or build its window.
    pub fn open_folder(&mut self, services: &mut Services, media: &mut MediaController, id: &str, title: &str) {
        let route = AppRoute::Folder(id.to_string());
        if let Some(folder) = self.open.get(id) {
            folder.app.open(&mut services.shell, route);
            return;
        }
        let window = Self::window_id(id);
        let app = AppWindow::new(
            AppWindowSpec::new(
                window.as_str(),
                ShellConfig::new(title)
                    .class_tag(format!("folder-window folder-{id}"))
                    .rect(self.config.rect)
                    .controls(WindowControls::all()),
            )
            .taskbar(window.as_str(), title)
            .icon(self.config.icon.clone()),
        );
        app.open(&mut services.shell, route);
        let files = self.config.contents.get(id).cloned().unwrap_or_default();
        if let Some(name) = self.config.playlists.get(id) {
            if !files.is_empty() {
                media.set_playlist(name, files.iter().map(FolderFile::playlist_item).collect());
            }
        }
        debug!(folder = id, files = files.len(), "folder opened");
        self.open.insert(
            id.to_string(),
            OpenFolder {
                app,
                title: title.to_string(),
                files,
            },
        );
    }

    /// Double-click or Enter on file `index`.
    pub fn open_file(&self, services: &mut Services, media: &mut MediaController, id: &str, index: usize) -> bool {
        let Some(file) = self.open.get(id).and_then(|f| f.files.get(index)) else {
            return false;
        };
        media.open(
            services,
            MediaRequest::new(file.path.clone())
                .title(file.name.clone())
                .kind(file.kind)
                .gesture(true),
        );
        true
    }

    pub fn activate(&self, services: &mut Services, id: &str) {
        if let Some(folder) = self.open.get(id) {
            folder.app.activate(&mut services.shell);
        }
    }

    pub fn toggle_from_taskbar(&self, services: &mut Services, id: &str) {
        if let Some(folder) = self.open.get(id) {
            folder.app.toggle_from_taskbar(&mut services.shell, AppRoute::Folder(id.to_string()));
        }
    }

    pub fn close(&mut self, services: &mut Services, id: &str) {
        if let Some(folder) = self.open.remove(id) {
            folder.app.close(&mut services.shell);
        }
    }

    pub fn handle_control(&mut self, services: &mut Services, id: &str, button: ControlButton) {
        match button {
            ControlButton::Close => self.close(services, id),
            other => {
                if let Some(folder) = self.open.get(id) {
                    folder.app.handle_control(&mut services.shell, other);
                }
            }
        }
    }

    #[must_use]
    pub fn view(&self) -> Vec<FolderView> {
        self.open
            .iter()
            .map(|(id, folder)| FolderView {
                id: id.clone(),
                window: folder.app.id().clone(),
                title: folder.title.clone(),
                path: format!("C:\\Desktop\\{}", escape(&folder.title)),
                files: folder
                    .files
                    .iter()
                    .map(|f| FileView {
                        name: f.name.clone(),
                        icon: match f.kind {
                            MediaKind::Video => "file-icon-video",
                            MediaKind::Audio => "file-icon-generic",
                        },
                    })
                    .collect(),
                empty: folder.files.is_empty().then_some(EMPTY_FOLDER),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{Effect, MediaCommand};
    use crate::media::MediaConfig;
    use crate::services::testing::services;
    use pretty_assertions::assert_eq;

    #[test]
    fn homework_lists_four_videos_and_sets_the_playlist() {
        let mut services = services();
        let mut media = MediaController::new(MediaConfig::default());
        let mut folders = FolderController::new(FolderConfig::default());
        folders.open_homework(&mut services, &mut media);
        let view = folders.view();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].path, "C:\\Desktop\\Homework");
        let names: Vec<_> = view[0].files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["xfiles.mp4", "intro.mp4", "innovation.mp4", "end.mp4"]);
        assert!(services.shell.taskbar.is_active("folder-homework"));
        assert_eq!(media.view(&services).playlist_name, "Homework");
    }

    #[test]
    fn unknown_folders_are_empty_and_coexist() {
        let mut services = services();
        let mut media = MediaController::new(MediaConfig::default());
        let mut folders = FolderController::new(FolderConfig::default());
        folders.open_homework(&mut services, &mut media);
        folders.open_folder(&mut services, &mut media, "notes", "Notes");
        let view = folders.view();
        assert_eq!(view.len(), 2);
        let notes = view.iter().find(|f| f.id == "notes").map(|f| f.empty);
        assert_eq!(notes, Some(Some(EMPTY_FOLDER)));
        assert!(services.shell.taskbar.is_active("folder-notes"));
        assert!(!services.shell.taskbar.is_active("folder-homework"));
    }

    #[test]
    fn opening_a_file_starts_the_player() {
        let mut services = services();
        let mut media = MediaController::new(MediaConfig::default());
        let mut folders = FolderController::new(FolderConfig::default());
        folders.open_homework(&mut services, &mut media);
        services.take_effects();
        assert!(folders.open_file(&mut services, &mut media, HOMEWORK, 1));
        assert_eq!(media.src(), Some("media/intro.mp4"));
        let effects = services.take_effects();
        assert!(effects.iter().any(|e| matches!(e, Effect::Media(MediaCommand::Load { .. }))));
        assert!(!folders.open_file(&mut services, &mut media, HOMEWORK, 9));
    }

    #[test]
    fn reopen_shows_and_close_drops_the_entry() {
        let mut services = services();
        let mut media = MediaController::new(MediaConfig::default());
        let mut folders = FolderController::new(FolderConfig::default());
        folders.open_homework(&mut services, &mut media);
        let window = FolderController::window_id(HOMEWORK);
        folders.handle_control(&mut services, HOMEWORK, ControlButton::Minimize);
        assert!(!services.shell.windows.is_visible(&window));
        folders.open_homework(&mut services, &mut media);
        assert!(services.shell.windows.is_visible(&window));
        folders.handle_control(&mut services, HOMEWORK, ControlButton::Close);
        assert!(!folders.is_open(HOMEWORK));
        assert!(!services.shell.taskbar.contains("folder-homework"));
    }
}
