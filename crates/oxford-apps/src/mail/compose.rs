#![forbid(unsafe_code)]

//! Compose windows.
//!
//! Each compose opens its own window (no taskbar entry). The host mirrors the
//! form fields into the draft; sending turns the draft into a read message at
//! the top of the Sent folder.

use oxford_core::html::escape;
use oxford_core::WindowRect;
use oxford_shell::{ShellConfig, WindowControls, WindowId};
use serde::{Deserialize, Serialize};

use super::ads::AdSpec;
use super::store::MailMessage;

pub const NO_SUBJECT: &str = "(no subject)";
pub const SENDER: &str = "You <you@example.com>";

/// Shell of a compose window.
#[must_use]
pub fn compose_shell() -> ShellConfig {
    ShellConfig::new("Compose Message")
        .class_tag("compose-window")
        .rect(WindowRect::new(220, 140, 460, 320))
        .controls(WindowControls::minimize_close())
}

/// Form contents of one compose window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposeDraft {
    pub id: u32,
    pub window: WindowId,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl ComposeDraft {
    #[must_use]
    pub fn new(id: u32, to: &str, subject: &str, body: &str) -> Self {
        Self {
            id,
            window: WindowId::new(format!("compose-{id}")),
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        }
    }

    pub fn apply(&mut self, edit: ComposeEdit) {
        if let Some(to) = edit.to {
            self.to = to;
        }
        if let Some(subject) = edit.subject {
            self.subject = subject;
        }
        if let Some(body) = edit.body {
            self.body = body;
        }
    }

    /// The message filed under Sent.
    #[must_use]
    pub fn to_sent(&self, date: String, date_ms: i64) -> MailMessage {
        let subject = if self.subject.is_empty() {
            NO_SUBJECT.to_string()
        } else {
            self.subject.clone()
        };
        let to = if self.to.is_empty() { "unknown" } else { self.to.as_str() };
        let html = AdSpec::new("SENT MESSAGE", subject.clone())
            .sub(format!("To: {to}"))
            .body(format!(
                "<pre style=\"white-space:pre-wrap\">{}</pre>",
                escape(&self.body)
            ))
            .render();
        MailMessage {
            id: format!("sent-{date_ms}"),
            from: SENDER.to_string(),
            subject,
            date,
            preview: "Sent message".to_string(),
            html,
            read: true,
            date_ms: Some(date_ms),
        }
    }
}

/// Partial update of a draft's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComposeEdit {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

/// Quoted block that starts a reply.
#[must_use]
pub fn reply_quote(original: &MailMessage) -> String {
    format!(
        "\n\n----- Original Message -----\nFrom: {}\nSubject: {}\n\n",
        original.from, original.subject
    )
}
