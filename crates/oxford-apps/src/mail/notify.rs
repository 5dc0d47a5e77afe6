#![forbid(unsafe_code)]

//! Status line and toast notifications of the mail window.

use oxford_core::{CancellationSource, CancellationToken};
use serde::Serialize;

use crate::services::{Services, TimerEvent};

/// How long a toast stays fully visible.
pub const TOAST_VISIBLE_MS: u64 = 1800;
/// Fade-out time before a hidden toast is removed.
pub const TOAST_FADE_MS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub text: String,
    /// `false` while fading out.
    pub visible: bool,
}

/// Status text and toasts, with their timers tied to the window's lifetime.
#[derive(Debug, Default)]
pub struct MailNotices {
    status: String,
    toasts: Vec<Toast>,
    next_toast: u64,
    source: CancellationSource,
}

impl MailNotices {
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    #[must_use]
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// Token shared by every timer of the current window.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.source.token()
    }

    /// Replace the status. With `temp_ms` it clears itself later, unless it
    /// was replaced in the meantime.
    pub fn set_status(&mut self, services: &mut Services, text: &str, temp_ms: Option<u64>) {
        self.status = text.to_string();
        if let Some(ms) = temp_ms {
            services.schedule(
                ms,
                Some(self.token()),
                TimerEvent::MailStatusClear {
                    text: text.to_string(),
                },
            );
        }
    }

    pub fn clear_status_if(&mut self, text: &str) {
        if self.status == text {
            self.status.clear();
        }
    }

    pub fn show_toast(&mut self, services: &mut Services, text: &str) -> u64 {
        self.next_toast += 1;
        let id = self.next_toast;
        self.toasts.push(Toast {
            id,
            text: text.to_string(),
            visible: true,
        });
        services.schedule(TOAST_VISIBLE_MS, Some(self.token()), TimerEvent::MailToastHide { id });
        id
    }

    pub fn hide_toast(&mut self, services: &mut Services, id: u64) {
        if let Some(toast) = self.toasts.iter_mut().find(|t| t.id == id) {
            toast.visible = false;
            services.schedule(TOAST_FADE_MS, Some(self.token()), TimerEvent::MailToastRemove { id });
        }
    }

    pub fn remove_toast(&mut self, id: u64) {
        self.toasts.retain(|t| t.id != id);
    }

    /// Drop everything and cancel pending timers (window closed).
    pub fn reset(&mut self) {
        self.source.restart();
        self.status.clear();
        self.toasts.clear();
    }
}
