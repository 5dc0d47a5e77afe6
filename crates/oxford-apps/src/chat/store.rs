#![forbid(unsafe_code)]

//! Persisted chat state.
//!
//! One JSON blob in session storage holds every conversation, the current
//! buddy and the scripted-reply bookkeeping. It is read once at startup and
//! rewritten in full after every mutation.

use std::collections::{BTreeMap, BTreeSet};

use oxford_core::storage::{load_or_warn, save_or_warn};
use oxford_core::{RandomSource, StorageBackend};
use serde::{Deserialize, Serialize};

use super::buddies::{COLORED_KEYS, COLOR_ALIASES, DEFAULT_COLOR, PALETTE, canonical_color_key};

/// One line of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub text: String,
    #[serde(default)]
    pub time: String,
    /// `text` is trusted markup rather than plain text.
    #[serde(default)]
    pub html: bool,
}

impl ChatMessage {
    #[must_use]
    pub fn plain(sender: impl Into<String>, text: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            time: time.into(),
            html: false,
        }
    }
}

/// Scripted-reply bookkeeping, keyed by normalized buddy key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatMeta {
    /// Messages the user has sent to each buddy.
    pub counters: BTreeMap<String, u32>,
    /// Send count at which the special message unlocks (3..=5).
    pub thresholds: BTreeMap<String, u32>,
    /// Special message already delivered.
    pub delivered: BTreeMap<String, bool>,
    pub last_filler_idx: BTreeMap<String, usize>,
    /// Remaining shuffled filler indexes.
    pub filler_bags: BTreeMap<String, Vec<usize>>,
    pub colors: BTreeMap<String, String>,
}

impl ChatMeta {
    /// Assign the reveal threshold once.
    pub fn ensure_threshold(&mut self, key: &str, rng: &mut dyn RandomSource) -> u32 {
        if let Some(threshold) = self.thresholds.get(key) {
            return *threshold;
        }
        let threshold = 3 + rng.next_below(3);
        self.thresholds.insert(key.to_string(), threshold);
        threshold
    }

    /// Move bookkeeping stored under a mixed-case display name to its
    /// lowercase key, unless the lowercase key already has a value.
    pub fn migrate_legacy(&mut self, name: &str, key: &str) {
        if name == key {
            return;
        }
        migrate(&mut self.thresholds, name, key);
        migrate(&mut self.counters, name, key);
        migrate(&mut self.delivered, name, key);
    }

    /// Give every known buddy a distinct palette color, once per session.
    pub fn ensure_colors(&mut self) {
        let mut used: BTreeSet<String> = self.colors.values().cloned().collect();
        let mut cursor = 0;
        for key in COLORED_KEYS {
            if self.colors.get(key).is_some_and(|c| !c.is_empty()) {
                continue;
            }
            while cursor < PALETTE.len() && used.contains(PALETTE[cursor]) {
                cursor += 1;
            }
            let color = PALETTE[cursor % PALETTE.len()].to_string();
            used.insert(color.clone());
            self.colors.insert(key.to_string(), color);
        }
        for (alias, canonical) in COLOR_ALIASES {
            if let Some(color) = self.colors.get(canonical).cloned() {
                self.colors.insert(alias.to_string(), color);
            }
        }
    }

    /// Display color for a buddy key.
    #[must_use]
    pub fn color(&self, key: &str) -> &str {
        self.colors
            .get(canonical_color_key(key))
            .map_or(DEFAULT_COLOR, String::as_str)
    }
}

fn migrate<V>(map: &mut BTreeMap<String, V>, from: &str, to: &str) {
    if map.contains_key(to) {
        return;
    }
    if let Some(value) = map.remove(from) {
        map.insert(to.to_string(), value);
    }
}

/// Everything persisted under the chat storage key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatState {
    pub conversations: BTreeMap<String, Vec<ChatMessage>>,
    pub current_user: Option<String>,
    pub meta: ChatMeta,
}

impl ChatState {
    /// Load the blob, or `None` when absent or unreadable.
    #[must_use]
    pub fn load(backend: &dyn StorageBackend, key: &str) -> Option<Self> {
        load_or_warn(backend, key)
    }

    pub fn save(&self, backend: &mut dyn StorageBackend, key: &str) -> bool {
        save_or_warn(backend, key, self)
    }

    pub fn append(&mut self, buddy: &str, message: ChatMessage) {
        self.conversations
            .entry(buddy.to_string())
            .or_default()
            .push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxford_core::{MemoryStorage, SequenceRandom};
    use pretty_assertions::assert_eq;

    #[test]
    fn thresholds_span_three_to_five_and_stick() {
        let mut meta = ChatMeta::default();
        assert_eq!(meta.ensure_threshold("a", &mut SequenceRandom::constant(0.0)), 3);
        assert_eq!(meta.ensure_threshold("b", &mut SequenceRandom::constant(0.99)), 5);
        assert_eq!(meta.ensure_threshold("a", &mut SequenceRandom::constant(0.99)), 3);
    }

    #[test]
    fn legacy_keys_move_only_when_lowercase_is_free() {
        let mut meta = ChatMeta::default();
        meta.counters.insert("SepiNator".into(), 4);
        meta.thresholds.insert("SepiNator".into(), 3);
        meta.thresholds.insert("sepinator".into(), 5);
        meta.migrate_legacy("SepiNator", "sepinator");
        assert_eq!(meta.counters.get("sepinator"), Some(&4));
        assert!(!meta.counters.contains_key("SepiNator"));
        assert_eq!(meta.thresholds.get("sepinator"), Some(&5));
        assert_eq!(meta.thresholds.get("SepiNator"), Some(&3));
    }

    #[test]
    fn colors_skip_used_entries_and_mirror_aliases() {
        let mut meta = ChatMeta::default();
        meta.colors.insert("selvatron".into(), "#d00000".into());
        meta.ensure_colors();
        assert_eq!(meta.color("sepinator"), "#0040c0");
        assert_eq!(meta.color("xmarktheneil99x"), "#008000");
        assert_eq!(meta.color("selvatron"), "#d00000");
        assert_eq!(meta.color("randobrando"), "#800080");
        assert_eq!(meta.color("randobrandon"), "#800080");
        assert_eq!(meta.colors.get("xmarktheneill99x").map(String::as_str), Some("#008000"));
        assert_eq!(meta.color("stranger"), DEFAULT_COLOR);
    }

    #[test]
    fn state_round_trips_through_storage_with_camel_case_keys() {
        let mut backend = MemoryStorage::new();
        let mut state = ChatState::default();
        state.current_user = Some("sepinator".into());
        state.append("sepinator", ChatMessage::plain("You", "hi", "1:00:00 PM"));
        state.meta.last_filler_idx.insert("sepinator".into(), 2);
        assert!(state.save(&mut backend, "aim.chat.v1"));
        let raw = backend.items().get("aim.chat.v1").cloned().unwrap_or_default();
        assert!(raw.contains("\"currentUser\":\"sepinator\""));
        assert!(raw.contains("\"lastFillerIdx\""));
        assert_eq!(ChatState::load(&backend, "aim.chat.v1"), Some(state));
    }

    #[test]
    fn corrupt_blob_loads_as_none() {
        let mut backend = MemoryStorage::new();
        backend
            .set_item("aim.chat.v1", "{not json".into())
            .expect("memory write");
        assert_eq!(ChatState::load(&backend, "aim.chat.v1"), None);
    }
}
