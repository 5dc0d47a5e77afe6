#![forbid(unsafe_code)]

//! Choosing what a buddy says next.
//!
//! A special buddy whose send counter has reached its threshold reveals a
//! profile link exactly once. Every other reply is filler drawn from a
//! shuffled bag, so each line of the pool is used once before any repeats and
//! the same line never comes twice in a row.

use oxford_core::html::{escape, escape_attr};
use oxford_core::random::shuffled_indexes;
use oxford_core::RandomSource;
use tracing::info;

use super::buddies::{LEGACY_SITES, filler_pool, meta_key, special_link};
use super::store::ChatMeta;

/// A reply ready to append to the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub html: bool,
}

/// The one-time reveal message.
#[must_use]
pub fn special_message(site: &str, link: &str) -> String {
    format!(
        "ok real talk — moving off {}. find me here: <a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
        escape(site),
        escape_attr(link),
        escape(link)
    )
}

/// Pop the next filler index for `key` from its shuffled bag.
///
/// An empty bag is refilled with a fresh shuffle. When the popped index equals
/// the previous reply and the pool has more than one line, it goes to the back
/// of the bag and the next one is used instead.
pub fn draw_filler(meta: &mut ChatMeta, key: &str, pool_len: usize, rng: &mut dyn RandomSource) -> usize {
    let bag = meta.filler_bags.entry(key.to_string()).or_default();
    if bag.is_empty() {
        *bag = shuffled_indexes(pool_len, rng);
    }
    if bag.is_empty() {
        return 0;
    }
    let mut idx = bag.remove(0);
    if pool_len > 1 && meta.last_filler_idx.get(key) == Some(&idx) {
        bag.push(idx);
        idx = bag.remove(0);
    }
    meta.last_filler_idx.insert(key.to_string(), idx);
    idx
}

/// Decide the reply from the buddy displayed as `name`.
///
/// Counters are only advanced on the send path; this side reads them.
pub fn choose_reply(meta: &mut ChatMeta, name: &str, rng: &mut dyn RandomSource) -> Reply {
    let key = meta_key(name);
    meta.migrate_legacy(name, &key);
    let threshold = meta.ensure_threshold(&key, rng);
    let count = *meta.counters.entry(key.clone()).or_insert(0);
    let delivered = meta.delivered.get(&key).copied().unwrap_or(false);

    if let Some(link) = special_link(&key).filter(|_| !delivered && count >= threshold) {
        let site = LEGACY_SITES[rng.next_below(LEGACY_SITES.len() as u32) as usize];
        meta.delivered.insert(key.clone(), true);
        info!(buddy = %key, count, threshold, "special link revealed");
        return Reply {
            text: special_message(site, link),
            html: true,
        };
    }

    let pool = filler_pool(&key);
    let idx = draw_filler(meta, &key, pool.len(), rng);
    Reply {
        text: pool.get(idx).copied().unwrap_or_default().to_string(),
        html: false,
    }
}
