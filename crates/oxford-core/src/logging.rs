#![forbid(unsafe_code)]

//! Structured logging.
//!
//! The desktop logs lifecycle points (windows opening and closing, chat turns
//! being scheduled and cancelled, storage failures) through `tracing`. Native
//! hosts install a formatted subscriber with [`init_subscriber`]; tests and
//! the web runner attach a [`CaptureLayer`] to collect lines in memory.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

pub use tracing::{debug, debug_span, error, info, info_span, trace, warn};

/// Install a global formatted subscriber.
///
/// `filter` uses `EnvFilter` directive syntax (for example `"oxford_apps=debug"`);
/// `RUST_LOG` wins when set. Returns `false` if a global subscriber was
/// already installed.
pub fn init_subscriber(filter: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    #[cfg(feature = "tracing-json")]
    let fmt_layer = tracing_subscriber::fmt::layer().json();
    #[cfg(not(feature = "tracing-json"))]
    let fmt_layer = tracing_subscriber::fmt::layer();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
}

/// Shared buffer of captured log lines.
#[derive(Debug, Clone, Default)]
pub struct CaptureHandle {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CaptureHandle {
    /// Remove and return every captured line.
    pub fn take(&self) -> Vec<String> {
        let mut guard = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *guard)
    }

    /// Whether any captured line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        let guard = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        guard.iter().any(|line| line.contains(needle))
    }
}

/// Layer that renders each event to `LEVEL message key=value ...`.
#[derive(Debug, Clone, Default)]
pub struct CaptureLayer {
    handle: CaptureHandle,
}

impl CaptureLayer {
    #[must_use]
    pub fn new() -> (Self, CaptureHandle) {
        let layer = Self::default();
        let handle = layer.handle.clone();
        (layer, handle)
    }
}

struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor {
            message: String::new(),
            fields: String::new(),
        };
        event.record(&mut visitor);
        let line = format!(
            "{} {}{}",
            event.metadata().level(),
            visitor.message,
            visitor.fields
        );
        let mut guard = self.handle.lines.lock().unwrap_or_else(|e| e.into_inner());
        guard.push(line);
    }
}

/// A reusable capturing dispatcher, for hosts that enter it around each call
/// with [`tracing::dispatcher::with_default`].
#[must_use]
pub fn capture_dispatch() -> (tracing::Dispatch, CaptureHandle) {
    let (layer, handle) = CaptureLayer::new();
    let dispatch = tracing::Dispatch::new(tracing_subscriber::registry().with(layer));
    (dispatch, handle)
}

/// Run `f` with a capturing subscriber installed for the current thread.
pub fn with_captured<R>(f: impl FnOnce() -> R) -> (R, CaptureHandle) {
    let (layer, handle) = CaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(layer);
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{info, warn};

    #[test]
    fn capture_layer_records_message_and_fields() {
        let ((), handle) = with_captured(|| {
            warn!(key = "aim.chat.v1", "failed to load persisted state");
        });
        let lines = handle.take();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("WARN failed to load persisted state"));
        assert!(lines[0].contains("key=aim.chat.v1"));
        assert!(handle.take().is_empty());
    }

    #[test]
    fn global_subscriber_installs_once() {
        let _ = init_subscriber("oxford_core=debug");
        assert!(!init_subscriber("info"));
    }

    #[test]
    fn capture_dispatch_is_reusable() {
        let (dispatch, handle) = capture_dispatch();
        tracing::dispatcher::with_default(&dispatch, || info!(n = 1, "first"));
        tracing::dispatcher::with_default(&dispatch, || info!(n = 2, "second"));
        let lines = handle.take();
        assert_eq!(lines, vec!["INFO first n=1".to_string(), "INFO second n=2".to_string()]);
    }
}
