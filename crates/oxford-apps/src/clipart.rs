#![forbid(unsafe_code)]

//! Small CSS-box clipart snippets shared by channel tiles and slides.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipartKind {
    Faucet,
    Book,
    Bolt,
    #[default]
    #[serde(other)]
    Generic,
}

impl ClipartKind {
    /// Caption under the picture.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Faucet => "Water Saver Graphic",
            Self::Book => "Study Stack Graphic",
            Self::Bolt => "Power Burst Graphic",
            Self::Generic => "Oxford Clip Library",
        }
    }

    /// Suffix of the `clipart-theme-*` class.
    #[must_use]
    pub const fn theme(self) -> &'static str {
        match self {
            Self::Faucet => "aquatic",
            Self::Book => "print",
            Self::Bolt => "electric",
            Self::Generic => "generic",
        }
    }

    /// Case-insensitive lookup; anything unknown is generic.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "faucet" => Self::Faucet,
            "book" => Self::Book,
            "bolt" => Self::Bolt,
            _ => Self::Generic,
        }
    }

    fn figure(self) -> &'static str {
        match self {
            Self::Faucet => concat!(
                "<div class=\"clipart faucet\">",
                "<div class=\"faucet-neck\"></div>",
                "<div class=\"faucet-head\"></div>",
                "<div class=\"faucet-drop\"></div>",
                "</div>"
            ),
            Self::Book => concat!(
                "<div class=\"clipart book\">",
                "<div class=\"book-cover\"></div>",
                "<div class=\"book-pages\"></div>",
                "</div>"
            ),
            Self::Bolt => "<div class=\"clipart bolt\"><div class=\"bolt-shape\"></div></div>",
            Self::Generic => "<div class=\"clipart generic\"></div>",
        }
    }

    /// Boxed figure with its caption.
    #[must_use]
    pub fn render(self) -> String {
        format!(
            "<div class=\"clipart-box clipart-theme-{}\">{}<div class=\"clipart-label\"><span class=\"clipart-label-text\">{}</span></div></div>",
            self.theme(),
            self.figure(),
            self.label()
        )
    }
}
