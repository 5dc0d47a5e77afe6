#![forbid(unsafe_code)]

//! Desktop shortcut icons with single selection.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DesktopIcon {
    Homework,
    InternetExplorer,
    OxfordMail,
    Paint,
    Channels,
    Aim,
    MediaPlayer,
}

impl DesktopIcon {
    /// Display order.
    pub const ALL: [Self; 7] = [
        Self::Homework,
        Self::InternetExplorer,
        Self::OxfordMail,
        Self::Paint,
        Self::Channels,
        Self::Aim,
        Self::MediaPlayer,
    ];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Homework => "homework",
            Self::InternetExplorer => "internet-explorer",
            Self::OxfordMail => "oxford-mail",
            Self::Paint => "paint",
            Self::Channels => "channels",
            Self::Aim => "aim",
            Self::MediaPlayer => "media-player",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Homework => "Homework",
            Self::InternetExplorer => "Internet Explorer",
            Self::OxfordMail => "Oxford Mail",
            Self::Paint => "Oxford Paint",
            Self::Channels => "Oxford Channels",
            Self::Aim => "Oxford Messenger",
            Self::MediaPlayer => "OxfordInnovation.mp4",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Homework => "folder-icon",
            Self::InternetExplorer => "ie-icon",
            Self::OxfordMail => "mail-icon",
            Self::Paint => "paint-icon",
            Self::Channels => "channels-icon",
            Self::Aim => "aim-icon",
            Self::MediaPlayer => "media-icon",
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|icon| icon.id() == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IconView {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DesktopIcons {
    selected: Option<DesktopIcon>,
}

impl DesktopIcons {
    #[must_use]
    pub const fn selected(&self) -> Option<DesktopIcon> {
        self.selected
    }

    pub fn click(&mut self, icon: DesktopIcon) {
        self.selected = Some(icon);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Double-click: select and hand back the icon to launch.
    pub fn double_click(&mut self, icon: DesktopIcon) -> DesktopIcon {
        self.selected = Some(icon);
        icon
    }

    /// Enter or Space on a focused icon opens it.
    pub fn key(&mut self, icon: DesktopIcon, key: &str) -> Option<DesktopIcon> {
        matches!(key, "Enter" | " ").then(|| self.double_click(icon))
    }

    #[must_use]
    pub fn view(&self) -> Vec<IconView> {
        DesktopIcon::ALL
            .iter()
            .map(|&icon| IconView {
                id: icon.id(),
                label: icon.label(),
                icon: icon.icon(),
                selected: self.selected == Some(icon),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ids_round_trip_and_order_is_fixed() {
        let ids: Vec<_> = DesktopIcon::ALL.iter().map(|i| i.id()).collect();
        assert_eq!(
            ids,
            ["homework", "internet-explorer", "oxford-mail", "paint", "channels", "aim", "media-player"]
        );
        assert_eq!(DesktopIcon::from_id("oxford-mail"), Some(DesktopIcon::OxfordMail));
        assert_eq!(DesktopIcon::from_id("recycle-bin"), None);
    }

    #[test]
    fn selection_is_single() {
        let mut icons = DesktopIcons::default();
        icons.click(DesktopIcon::Paint);
        icons.click(DesktopIcon::Aim);
        let selected: Vec<_> = icons.view().into_iter().filter(|v| v.selected).map(|v| v.id).collect();
        assert_eq!(selected, ["aim"]);
    }

    #[test]
    fn enter_and_space_open() {
        let mut icons = DesktopIcons::default();
        assert_eq!(icons.key(DesktopIcon::Channels, "Enter"), Some(DesktopIcon::Channels));
        assert_eq!(icons.key(DesktopIcon::Paint, " "), Some(DesktopIcon::Paint));
        assert_eq!(icons.key(DesktopIcon::Homework, "a"), None);
        assert_eq!(icons.selected(), Some(DesktopIcon::Paint));
    }
}
