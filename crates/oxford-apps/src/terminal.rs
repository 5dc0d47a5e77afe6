#![forbid(unsafe_code)]

//! MS-DOS Prompt.
//!
//! The host's terminal widget forwards raw key data here. This module owns
//! the line discipline, the command table and the screen contents; the
//! widget only renders [`TerminalView::lines`].

use oxford_core::clock::{format_long_time, format_short_date};
use oxford_core::{StorageBackend, WindowRect};
use oxford_shell::{AppWindow, AppWindowSpec, ControlButton, ShellConfig, WindowControls, WindowId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dialup::SESSION_USER_KEY;
use crate::dos::DosController;
use crate::services::{AppRoute, Services};

pub const PROMPT: &str = "C:\\WINDOWS> ";

const BANNER: [&str; 9] = [
    "Microsoft(R) Windows 95",
    "   (C)Copyright Microsoft Corp 1981-1995.",
    "",
    "C:\\WINDOWS>_",
    "",
    "Welcome to the Oxford Terminal Simulator!",
    "Tip: type \"dos\" to browse games or launch \"civ\"/\"oregon\" directly.",
    "Type \"help\" for available commands.",
    "",
];

const HELP: [&str; 12] = [
    "Available commands:",
    "  help     - Show this help message",
    "  dir      - List directory contents",
    "  cls      - Clear screen",
    "  ver      - Show version",
    "  time     - Display current time",
    "  date     - Display current date",
    "  oxford   - Messenger status",
    "  whoami   - Display current user",
    "  civ      - Launch Sid Meier's Civilization",
    "  oregon   - Launch The Oregon Trail",
    "",
];

const DIR: [&str; 9] = [
    " Volume in drive C is WINDOWS95",
    " Directory of C:\\WINDOWS",
    "",
    "OXFORD   EXE     45,312  10-19-99  3:47p",
    "BUDDY    LST      1,024  10-19-99  2:15p",
    "CONFIG   SYS        128  10-19-99  1:00p",
    "AUTOEXEC BAT        256  10-19-99  1:00p",
    "        4 file(s)     46,720 bytes",
    "",
];

const OXFORD: [&str; 5] = [
    "Oxford Messenger Status: Connected",
    "Buddies Online: 3",
    "Screen Name: User1999",
    "Version: 4.7.2796",
    "",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub rect: WindowRect,
    pub taskbar_id: String,
    pub icon: String,
    /// `whoami` answer when nobody signed in.
    pub default_user: String,
    /// Lines kept above the prompt.
    pub scrollback: usize,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            rect: WindowRect::new(760, 100, 600, 400),
            taskbar_id: "terminal".to_string(),
            icon: "term-icon".to_string(),
            default_user: "User1999@aol.com".to_string(),
            scrollback: 500,
        }
    }
}

/// Screen contents: finished lines plus the line under the cursor.
#[derive(Debug, Clone, Default)]
struct Screen {
    lines: Vec<String>,
    current: String,
    command: String,
}

impl Screen {
    fn write(&mut self, text: &str) {
        self.current.push_str(text);
    }

    fn writeln(&mut self, text: &str) {
        self.current.push_str(text);
        self.lines.push(std::mem::take(&mut self.current));
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.current.clear();
    }

    fn trim(&mut self, keep: usize) {
        if self.lines.len() > keep {
            let excess = self.lines.len() - keep;
            self.lines.drain(..excess);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalView {
    pub open: bool,
    pub visible: bool,
    /// Every line on screen, the prompt line last.
    pub lines: Vec<String>,
}

#[derive(Debug)]
pub struct TerminalController {
    config: TerminalConfig,
    app: AppWindow,
    screen: Option<Screen>,
}

impl TerminalController {
    #[must_use]
    pub fn new(config: TerminalConfig) -> Self {
        let app = AppWindow::new(
            AppWindowSpec::new(
                "terminal-window",
                ShellConfig::new("MS-DOS Prompt")
                    .class_tag("terminal-window")
                    .rect(config.rect)
                    .controls(WindowControls::all()),
            )
            .taskbar(config.taskbar_id.clone(), "MS-DOS Prompt")
            .icon(config.icon.clone()),
        );
        Self {
            config,
            app,
            screen: None,
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

    /// Open the single terminal, or raise the existing one.
    pub fn open(&mut self, services: &mut Services) {
        self.app.open(&mut services.shell, AppRoute::Terminal);
        if self.screen.is_none() {
            let mut screen = Screen::default();
            for line in BANNER {
                screen.writeln(line);
            }
            screen.write(PROMPT);
            self.screen = Some(screen);
            debug!("terminal opened");
        }
    }

    /// Raw key data from the widget.
    pub fn input(&mut self, services: &mut Services, dos: &mut DosController, data: &str) {
        for ch in data.chars() {
            let Some(screen) = self.screen.as_mut() else {
                return;
            };
            match ch {
                ' '..='~' => {
                    screen.command.push(ch);
                    screen.current.push(ch);
                }
                '\u{7f}' | '\u{8}' => {
                    if screen.command.pop().is_some() {
                        screen.current.pop();
                    }
                }
                '\r' => {
                    screen.writeln("");
                    let command = std::mem::take(&mut screen.command);
                    self.run(services, dos, command.trim());
                    if let Some(screen) = self.screen.as_mut() {
                        screen.write(PROMPT);
                        screen.trim(self.config.scrollback);
                    }
                }
                _ => {}
            }
        }
    }

    fn current_user(&self, services: &Services) -> String {
        services
            .session()
            .get_item(SESSION_USER_KEY)
            .ok()
            .flatten()
            .map(|user| user.trim().to_string())
            .filter(|user| !user.is_empty())
            .unwrap_or_else(|| self.config.default_user.clone())
    }

    fn run(&mut self, services: &mut Services, dos: &mut DosController, command: &str) {
        let lower = command.to_lowercase();
        let mut out: Vec<String> = Vec::new();
        match lower.as_str() {
            "help" => out.extend(HELP.iter().map(ToString::to_string)),
            "dir" => out.extend(DIR.iter().map(ToString::to_string)),
            "cls" => {
                if let Some(screen) = self.screen.as_mut() {
                    screen.clear();
                }
            }
            "ver" => out.extend(["Windows 95 [Version 4.00.950]".to_string(), String::new()]),
            "time" => out.extend([
                format!("Current time is: {}", format_long_time(services.wall_now())),
                String::new(),
            ]),
            "date" => out.extend([
                format!("Current date is: {}", format_short_date(services.wall_now())),
                String::new(),
            ]),
            "oxford" => out.extend(OXFORD.iter().map(ToString::to_string)),
            "whoami" => out.extend([self.current_user(services), String::new()]),
            "dos" => {
                dos.open_library(services);
                out.extend(["Opening the MS-DOS game shelf...".to_string(), String::new()]);
            }
            "civ" | "oregon" => {
                let label = if lower == "civ" {
                    "Sid Meier's Civilization"
                } else {
                    "The Oregon Trail"
                };
                dos.open(services, &lower);
                out.extend([format!("Launching {label} in a new window..."), String::new()]);
            }
            "" => {}
            _ => out.extend([format!("Bad command or file name: {command}"), String::new()]),
        }
        if let Some(screen) = self.screen.as_mut() {
            for line in &out {
                screen.writeln(line);
            }
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
            self.screen = None;
        }
    }

    pub fn toggle_from_taskbar(&mut self, services: &mut Services) {
        if self.is_open(services) {
            self.app.toggle_from_taskbar(&mut services.shell, AppRoute::Terminal);
        } else {
            self.open(services);
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
    pub fn view(&self, services: &Services) -> TerminalView {
        let lines = self
            .screen
            .as_ref()
            .map(|screen| {
                let mut lines = screen.lines.clone();
                lines.push(screen.current.clone());
                lines
            })
            .unwrap_or_default();
        TerminalView {
            open: self.is_open(services),
            visible: self.app.is_visible(&services.shell),
            lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dos::DosConfig;
    use crate::effects::{Effect, EmulatorCommand};
    use crate::services::testing::services;
    use pretty_assertions::assert_eq;

    fn setup() -> (Services, TerminalController, DosController) {
        let mut services = services();
        let mut terminal = TerminalController::new(TerminalConfig::default());
        terminal.open(&mut services);
        (services, terminal, DosController::new(DosConfig::default()))
    }

    fn output_after(view: &TerminalView, marker: &str) -> Vec<String> {
        let start = view.lines.iter().rposition(|l| l == marker).map_or(0, |i| i + 1);
        view.lines[start..].to_vec()
    }

    #[test]
    fn banner_ends_with_the_prompt() {
        let (services, terminal, _) = setup();
        let view = terminal.view(&services);
        assert_eq!(view.lines.first().map(String::as_str), Some("Microsoft(R) Windows 95"));
        assert_eq!(view.lines.last().map(String::as_str), Some(PROMPT));
        assert!(services.shell.taskbar.is_active("terminal"));
    }

    #[test]
    fn echo_backspace_and_enter() {
        let (mut services, mut terminal, mut dos) = setup();
        terminal.input(&mut services, &mut dos, "verx");
        terminal.input(&mut services, &mut dos, "\u{7f}");
        terminal.input(&mut services, &mut dos, "\u{1b}");
        assert_eq!(terminal.view(&services).lines.last().map(String::as_str), Some("C:\\WINDOWS> ver"));
        terminal.input(&mut services, &mut dos, "\r");
        let view = terminal.view(&services);
        assert_eq!(
            output_after(&view, "C:\\WINDOWS> ver"),
            ["Windows 95 [Version 4.00.950]", "", PROMPT]
        );
    }

    #[test]
    fn unknown_commands_keep_their_case() {
        let (mut services, mut terminal, mut dos) = setup();
        terminal.input(&mut services, &mut dos, "  FORMAT C:  \r");
        let view = terminal.view(&services);
        assert_eq!(
            output_after(&view, "C:\\WINDOWS>   FORMAT C:  "),
            ["Bad command or file name: FORMAT C:", "", PROMPT]
        );
    }

    #[test]
    fn time_date_and_whoami() {
        let (mut services, mut terminal, mut dos) = setup();
        terminal.input(&mut services, &mut dos, "TIME\rdate\rwhoami\r");
        let lines = terminal.view(&services).lines;
        assert!(lines.contains(&"Current time is: 1:05:09 PM".to_string()));
        assert!(lines.contains(&"Current date is: 6/15/1999".to_string()));
        assert!(lines.contains(&"User1999@aol.com".to_string()));
        services
            .session_mut()
            .set_item(SESSION_USER_KEY, " neo ".to_string())
            .expect("memory storage");
        terminal.input(&mut services, &mut dos, "whoami\r");
        assert!(terminal.view(&services).lines.contains(&"neo".to_string()));
    }

    #[test]
    fn cls_leaves_only_the_prompt() {
        let (mut services, mut terminal, mut dos) = setup();
        terminal.input(&mut services, &mut dos, "help\rcls\r");
        assert_eq!(terminal.view(&services).lines, [PROMPT]);
    }

    #[test]
    fn game_commands_reach_the_dos_shell() {
        let (mut services, mut terminal, mut dos) = setup();
        terminal.input(&mut services, &mut dos, "oregon\rdos\r");
        assert!(dos.is_running("oregon"));
        assert!(services.shell.taskbar.contains("dos-library"));
        assert!(services
            .take_effects()
            .iter()
            .any(|e| matches!(e, Effect::Emulator(EmulatorCommand::Run { game, .. }) if game == "oregon")));
        let lines = terminal.view(&services).lines;
        assert!(lines.contains(&"Launching The Oregon Trail in a new window...".to_string()));
        assert!(lines.contains(&"Opening the MS-DOS game shelf...".to_string()));
    }

    #[test]
    fn single_instance_and_close_resets() {
        let (mut services, mut terminal, mut dos) = setup();
        terminal.input(&mut services, &mut dos, "ver\r");
        terminal.open(&mut services);
        assert!(terminal.view(&services).lines.contains(&"Windows 95 [Version 4.00.950]".to_string()));
        terminal.handle_control(&mut services, ControlButton::Close);
        assert!(!services.shell.taskbar.contains("terminal"));
        terminal.toggle_from_taskbar(&mut services);
        assert!(!terminal.view(&services).lines.contains(&"Windows 95 [Version 4.00.950]".to_string()));
    }

    #[test]
    fn scrollback_is_bounded() {
        let mut services = services();
        let mut terminal = TerminalController::new(TerminalConfig {
            scrollback: 20,
            ..TerminalConfig::default()
        });
        let mut dos = DosController::new(DosConfig::default());
        terminal.open(&mut services);
        for _ in 0..10 {
            terminal.input(&mut services, &mut dos, "dir\r");
        }
        assert_eq!(terminal.view(&services).lines.len(), 21);
    }
}
