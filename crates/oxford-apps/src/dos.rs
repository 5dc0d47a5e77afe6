#![forbid(unsafe_code)]

//! MS-DOS games: a library window and one emulator window per game.
//!
//! The emulator itself lives in the host. This controller picks the runtime,
//! resolves bundle URLs, and tracks each game window through loading,
//! running and error states from the host's reports.

use std::collections::BTreeMap;

use oxford_core::WindowRect;
use oxford_shell::{AppWindow, AppWindowSpec, ControlButton, ShellConfig, WindowControls, WindowId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::effects::{DosRuntime, Effect, EmulatorCommand};
use crate::services::{AppRoute, Services};

const LOADING: &str = "Loading DOS environment...";
const RUN_TIP: &str = "\nTip: Ensure vendor/jsdos/dosbox.js is present for pure-JS runtime.";
const LIBRARY_INTRO: &str = "Choose a classic to load in the DOS player. Each game opens in its own window so you can multitask like it's 1995.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    pub key: String,
    pub title: String,
    /// Bundle path, relative to the asset base unless absolute.
    pub resource: String,
}

impl GameInfo {
    fn new(key: &str, title: &str, resource: &str) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            resource: resource.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DosConfig {
    pub asset_base: String,
    pub runtime: DosRuntime,
    pub games: Vec<GameInfo>,
    pub library_rect: WindowRect,
    pub game_rect: WindowRect,
    pub icon: String,
}

impl Default for DosConfig {
    fn default() -> Self {
        Self {
            asset_base: String::new(),
            runtime: DosRuntime::Js,
            games: vec![
                GameInfo::new("civ", "Sid Meier's Civilization", "games/civ.jsdos"),
                GameInfo::new("oregon", "The Oregon Trail", "games/oregon.jsdos"),
            ],
            library_rect: WindowRect::new(260, 160, 520, 360),
            game_rect: WindowRect::new(420, 120, 680, 520),
            icon: "term-icon".to_string(),
        }
    }
}

impl DosConfig {
    #[must_use]
    pub fn asset_base(mut self, base: impl Into<String>) -> Self {
        self.asset_base = base.into();
        self
    }

    #[must_use]
    pub const fn runtime(mut self, runtime: DosRuntime) -> Self {
        self.runtime = runtime;
        self
    }
}

/// Join `path` onto `base` the way a relative URL resolves.
///
/// Absolute http(s) paths are kept. A rooted path replaces the base's path.
/// With no base the result is rooted.
#[must_use]
pub fn resolve_asset(base: &str, path: &str) -> String {
    let lower = path.to_ascii_lowercase();
    if path.is_empty() || lower.starts_with("http:") || lower.starts_with("https:") {
        return path.to_string();
    }
    if base.is_empty() {
        return if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
    }
    if let Some(rest) = path.strip_prefix('/') {
        let origin_end = match base.find("://") {
            Some(scheme) => base[scheme + 3..]
                .find('/')
                .map_or(base.len(), |slash| scheme + 3 + slash),
            None => 0,
        };
        return format!("{}/{rest}", &base[..origin_end]);
    }
    let dir_end = base.rfind('/').map_or(0, |i| i + 1);
    let dir = if base.contains("://") && base[..dir_end].ends_with("//") {
        format!("{base}/")
    } else {
        base[..dir_end].to_string()
    };
    format!("{dir}{}", path.trim_start_matches("./"))
}

/// Where a host failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// The emulator script itself could not be loaded.
    Runtime,
    /// The game bundle failed to start.
    Run,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GameStatus {
    Loading { message: &'static str },
    Running,
    Error { message: String },
}

#[derive(Debug)]
struct GameWindow {
    app: AppWindow,
    info: GameInfo,
    status: GameStatus,
    /// The host attached a command interface, so close can exit cleanly.
    attached: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryView {
    pub visible: bool,
    pub intro: &'static str,
    pub games: Vec<GameInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameView {
    pub key: String,
    pub window: WindowId,
    pub title: String,
    pub visible: bool,
    pub status: GameStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DosView {
    pub library: Option<LibraryView>,
    pub games: Vec<GameView>,
}

#[derive(Debug)]
pub struct DosController {
    config: DosConfig,
    library: AppWindow,
    runtime: DosRuntime,
    games: BTreeMap<String, GameWindow>,
    asset_cache: BTreeMap<String, String>,
}

impl DosController {
    #[must_use]
    pub fn new(config: DosConfig) -> Self {
        let library = AppWindow::new(
            AppWindowSpec::new(
                "dos-library-window",
                ShellConfig::new("MS-DOS Games")
                    .class_tag("dos-library-window")
                    .rect(config.library_rect)
                    .controls(WindowControls::minimize_close()),
            )
            .taskbar("dos-library", "MS-DOS Games")
            .icon(config.icon.clone()),
        );
        let runtime = config.runtime;
        Self {
            config,
            library,
            runtime,
            games: BTreeMap::new(),
            asset_cache: BTreeMap::new(),
        }
    }

    /// Runtime used for the next launch.
    #[must_use]
    pub const fn runtime(&self) -> DosRuntime {
        self.runtime
    }

    #[must_use]
    pub fn is_running(&self, key: &str) -> bool {
        self.games.contains_key(key)
    }

    #[must_use]
    pub fn status(&self, key: &str) -> Option<&GameStatus> {
        self.games.get(key).map(|g| &g.status)
    }

    #[must_use]
    pub fn library_window(&self) -> &WindowId {
        self.library.id()
    }

    /// Resolve through the cache.
    pub fn asset_url(&mut self, path: &str) -> String {
        if let Some(hit) = self.asset_cache.get(path) {
            return hit.clone();
        }
        let resolved = resolve_asset(&self.config.asset_base, path);
        self.asset_cache.insert(path.to_string(), resolved.clone());
        resolved
    }

    pub fn open_library(&self, services: &mut Services) {
        self.library.open(&mut services.shell, AppRoute::DosLibrary);
    }

    pub fn toggle_library(&self, services: &mut Services) {
        self.library.toggle_from_taskbar(&mut services.shell, AppRoute::DosLibrary);
    }

    pub fn close_library(&self, services: &mut Services) {
        self.library.close(&mut services.shell);
    }

    pub fn handle_library_control(&self, services: &mut Services, button: ControlButton) {
        self.library.handle_control(&mut services.shell, button);
    }

    /// Launch `key`, or bring its running window back. Unknown keys are
    /// ignored.
    pub fn open(&mut self, services: &mut Services, key: &str) -> bool {
        let Some(info) = self.config.games.iter().find(|g| g.key == key).cloned() else {
            warn!(game = key, "unknown DOS game");
            return false;
        };
        if let Some(game) = self.games.get(key) {
            game.app.open(&mut services.shell, AppRoute::DosGame(key.to_string()));
            return true;
        }
        let app = AppWindow::new(
            AppWindowSpec::new(
                format!("dos-window-{key}"),
                ShellConfig::new(info.title.clone())
                    .class_tag("dos-window")
                    .rect(self.config.game_rect)
                    .controls(WindowControls::minimize_close()),
            )
            .taskbar(format!("dos-{key}"), info.title.clone())
            .icon(self.config.icon.clone()),
        );
        app.open(&mut services.shell, AppRoute::DosGame(key.to_string()));
        self.games.insert(
            key.to_string(),
            GameWindow {
                app,
                info,
                status: GameStatus::Loading { message: LOADING },
                attached: false,
            },
        );
        self.run(services, key);
        true
    }

    fn run(&mut self, services: &mut Services, key: &str) {
        let Some(resource) = self.games.get(key).map(|g| g.info.resource.clone()) else {
            return;
        };
        let bundle_url = self.asset_url(&resource);
        let runtime = self.runtime;
        let Some(game) = self.games.get_mut(key) else {
            return;
        };
        game.status = GameStatus::Loading { message: LOADING };
        game.attached = false;
        info!(game = key, url = %bundle_url, ?runtime, "running DOS bundle");
        services.emit(Effect::Emulator(EmulatorCommand::Run {
            game: key.to_string(),
            bundle_url,
            runtime,
            window: game.app.id().as_str().to_string(),
        }));
    }

    /// The host's emulator is up and its command interface attached.
    pub fn started(&mut self, key: &str) {
        if let Some(game) = self.games.get_mut(key) {
            game.status = GameStatus::Running;
            game.attached = true;
            debug!(game = key, "DOS game started");
        }
    }

    /// The host failed to start `key`. A wasm run failure switches to the
    /// pure-JS runtime once and retries; anything else shows the error panel.
    pub fn failed(&mut self, services: &mut Services, key: &str, stage: FailureStage, message: &str) {
        if !self.games.contains_key(key) {
            return;
        }
        warn!(game = key, ?stage, error = message, "DOS game failed");
        if stage == FailureStage::Run && self.runtime == DosRuntime::Wasm {
            warn!("falling back to the pure JS runtime");
            self.runtime = DosRuntime::Js;
            self.run(services, key);
            return;
        }
        let message = match (stage, message.is_empty()) {
            (FailureStage::Runtime, true) => "Unable to load DOS runtime".to_string(),
            (FailureStage::Runtime, false) => message.to_string(),
            (FailureStage::Run, true) => format!("Unable to launch DOS program.{RUN_TIP}"),
            (FailureStage::Run, false) => format!("{message}{RUN_TIP}"),
        };
        if let Some(game) = self.games.get_mut(key) {
            game.status = GameStatus::Error { message };
        }
    }

    /// Error panel "Retry".
    pub fn retry(&mut self, services: &mut Services, key: &str) {
        if self.games.contains_key(key) {
            self.run(services, key);
        }
    }

    pub fn toggle(&mut self, services: &mut Services, key: &str) {
        match self.games.get(key) {
            Some(game) => {
                game.app.toggle_from_taskbar(&mut services.shell, AppRoute::DosGame(key.to_string()));
            }
            None => {
                self.open(services, key);
            }
        }
    }

    pub fn activate(&self, services: &mut Services, key: &str) {
        if let Some(game) = self.games.get(key) {
            game.app.activate(&mut services.shell);
        }
    }

    /// Stop the emulator and remove the window and its taskbar entry.
    pub fn close(&mut self, services: &mut Services, key: &str) {
        let Some(game) = self.games.remove(key) else {
            return;
        };
        let game_key = key.to_string();
        services.emit(Effect::Emulator(if game.attached {
            EmulatorCommand::Exit { game: game_key }
        } else {
            EmulatorCommand::Stop { game: game_key }
        }));
        game.app.close(&mut services.shell);
        debug!(game = key, "DOS game closed");
    }

    pub fn handle_control(&mut self, services: &mut Services, key: &str, button: ControlButton) {
        match button {
            ControlButton::Close => self.close(services, key),
            other => {
                if let Some(game) = self.games.get(key) {
                    game.app.handle_control(&mut services.shell, other);
                }
            }
        }
    }

    #[must_use]
    pub fn view(&self, services: &Services) -> DosView {
        DosView {
            library: self.library.is_open(&services.shell).then(|| LibraryView {
                visible: self.library.is_visible(&services.shell),
                intro: LIBRARY_INTRO,
                games: self.config.games.clone(),
            }),
            games: self
                .games
                .iter()
                .map(|(key, game)| GameView {
                    key: key.clone(),
                    window: game.app.id().clone(),
                    title: game.info.title.clone(),
                    visible: game.app.is_visible(&services.shell),
                    status: game.status.clone(),
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

    fn run_commands(effects: &[Effect]) -> Vec<(String, DosRuntime)> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Emulator(EmulatorCommand::Run { bundle_url, runtime, .. }) => {
                    Some((bundle_url.clone(), *runtime))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn assets_resolve_like_relative_urls() {
        assert_eq!(resolve_asset("", "games/civ.jsdos"), "/games/civ.jsdos");
        assert_eq!(resolve_asset("", "/games/civ.jsdos"), "/games/civ.jsdos");
        assert_eq!(
            resolve_asset("https://host.test/", "games/civ.jsdos"),
            "https://host.test/games/civ.jsdos"
        );
        assert_eq!(
            resolve_asset("https://host.test/app/index.html", "games/civ.jsdos"),
            "https://host.test/app/games/civ.jsdos"
        );
        assert_eq!(
            resolve_asset("https://host.test/app/", "/games/civ.jsdos"),
            "https://host.test/games/civ.jsdos"
        );
        assert_eq!(resolve_asset("https://host.test", "a.jsdos"), "https://host.test/a.jsdos");
        assert_eq!(resolve_asset("https://host.test/", "http://cdn.test/x"), "http://cdn.test/x");
    }

    #[test]
    fn open_creates_a_window_and_runs_the_bundle() {
        let mut services = services();
        let mut dos = DosController::new(DosConfig::default().asset_base("https://host.test/"));
        assert!(dos.open(&mut services, "civ"));
        assert!(services.shell.taskbar.is_active("dos-civ"));
        let runs = run_commands(&services.take_effects());
        assert_eq!(runs, vec![("https://host.test/games/civ.jsdos".to_string(), DosRuntime::Js)]);
        assert_eq!(dos.status("civ"), Some(&GameStatus::Loading { message: LOADING }));
        dos.started("civ");
        assert_eq!(dos.status("civ"), Some(&GameStatus::Running));
    }

    #[test]
    fn unknown_games_are_ignored() {
        let mut services = services();
        let mut dos = DosController::new(DosConfig::default());
        assert!(!dos.open(&mut services, "doom"));
        assert!(services.take_effects().is_empty());
    }

    #[test]
    fn second_open_restores_without_rerunning() {
        let mut services = services();
        let mut dos = DosController::new(DosConfig::default());
        dos.open(&mut services, "oregon");
        dos.handle_control(&mut services, "oregon", ControlButton::Minimize);
        services.take_effects();
        dos.open(&mut services, "oregon");
        assert!(run_commands(&services.take_effects()).is_empty());
        assert!(dos.view(&services).games[0].visible);
    }

    #[test]
    fn wasm_failure_falls_back_once() {
        let mut services = services();
        let mut dos = DosController::new(DosConfig::default().runtime(DosRuntime::Wasm));
        dos.open(&mut services, "civ");
        services.take_effects();
        dos.failed(&mut services, "civ", FailureStage::Run, "wasm broke");
        assert_eq!(dos.runtime(), DosRuntime::Js);
        let runs = run_commands(&services.take_effects());
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].1, DosRuntime::Js);
        dos.failed(&mut services, "civ", FailureStage::Run, "still broken");
        assert_eq!(
            dos.status("civ"),
            Some(&GameStatus::Error {
                message: format!("still broken{RUN_TIP}")
            })
        );
        dos.retry(&mut services, "civ");
        assert_eq!(run_commands(&services.take_effects()).len(), 1);
    }

    #[test]
    fn runtime_failures_show_without_the_tip() {
        let mut services = services();
        let mut dos = DosController::new(DosConfig::default());
        dos.open(&mut services, "civ");
        dos.failed(&mut services, "civ", FailureStage::Runtime, "");
        assert_eq!(
            dos.status("civ"),
            Some(&GameStatus::Error {
                message: "Unable to load DOS runtime".into()
            })
        );
    }

    #[test]
    fn close_exits_or_stops() {
        let mut services = services();
        let mut dos = DosController::new(DosConfig::default());
        dos.open(&mut services, "civ");
        dos.open(&mut services, "oregon");
        dos.started("civ");
        services.take_effects();
        dos.close(&mut services, "civ");
        dos.handle_control(&mut services, "oregon", ControlButton::Close);
        assert_eq!(
            services.take_effects(),
            vec![
                Effect::Emulator(EmulatorCommand::Exit { game: "civ".into() }),
                Effect::Emulator(EmulatorCommand::Stop { game: "oregon".into() }),
            ]
        );
        assert!(!services.shell.taskbar.contains("dos-civ"));
        assert!(dos.view(&services).games.is_empty());
    }

    #[test]
    fn library_lifecycle() {
        let mut services = services();
        let dos = DosController::new(DosConfig::default());
        assert!(dos.view(&services).library.is_none());
        dos.open_library(&mut services);
        assert!(services.shell.taskbar.is_active("dos-library"));
        dos.toggle_library(&mut services);
        assert_eq!(dos.view(&services).library.map(|l| l.visible), Some(false));
        dos.handle_library_control(&mut services, ControlButton::Maximize);
        dos.handle_library_control(&mut services, ControlButton::Close);
        assert!(dos.view(&services).library.is_none());
    }
}
