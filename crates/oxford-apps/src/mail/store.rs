#![forbid(unsafe_code)]

//! Mail messages, folders, sorting and the persisted UI state.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use oxford_core::clock::parse_mail_date_ms;
use oxford_core::storage::{load_or_warn, save_or_warn};
use oxford_core::StorageBackend;
use serde::{Deserialize, Serialize};

use super::ads::{AdSpec, nintendo_ad};

/// One message in a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub id: String,
    pub from: String,
    pub subject: String,
    /// Display date, `Mon DD, YYYY h:mm AM/PM`.
    pub date: String,
    pub preview: String,
    pub html: String,
    pub read: bool,
    /// Exact timestamp for generated and sent mail.
    pub date_ms: Option<i64>,
}

impl MailMessage {
    /// Sort value of the date column: `date_ms`, else the parsed date, else 0.
    #[must_use]
    pub fn sort_ms(&self) -> i64 {
        self.date_ms
            .filter(|ms| *ms != 0)
            .or_else(|| parse_mail_date_ms(&self.date))
            .unwrap_or(0)
    }
}

fn seed(id: &str, from: &str, subject: &str, date: &str, preview: &str, html: String) -> MailMessage {
    MailMessage {
        id: id.to_string(),
        from: from.to_string(),
        subject: subject.to_string(),
        date: date.to_string(),
        preview: preview.to_string(),
        html,
        read: false,
        date_ms: None,
    }
}

/// The eight unread messages the inbox starts with.
#[must_use]
pub fn seed_messages() -> Vec<MailMessage> {
    vec![
        seed(
            "nintendo-virtualboy",
            "Nintendo <power@club.nintendo.com>",
            "SEE RED: Step into 3‑D with Virtual Boy™",
            "Aug 14, 1995 9:13 AM",
            "Hot new 3‑D tech from Nintendo Power…",
            nintendo_ad(),
        ),
        seed(
            "pepsi-stuff",
            "Pepsi <points@pepsistuff.com>",
            "PEPSI STUFF: Pop the top. Score the gear.",
            "May 02, 1998 7:41 PM",
            "Caps = Points = Jackets, CDs, and more…",
            AdSpec::new("POP • POINTS • PRIZES", "PEPSI STUFF")
                .sub("Pop the top. Score the gear.")
                .body("<p>Grab a cold Pepsi, pop the cap, and rack up <strong>Points</strong>. Trade \u{2019}em for hot swag\u{2014}starter jackets, Discman\u{00AE} players, and limited‑edition CDs.</p><p>Hop online with your trusty 56k and punch in your codes. Boom. Gear on the way.</p>")
                .bullets(["Caps = Points = Stuff", "Exclusive tour tees + CD samplers", "Mail‑in or online redemption"])
                .cta("Claim Your Stuff")
                .fine("While supplies last. Internet access may be required. Ask permission before surfing.")
                .render(),
        ),
        seed(
            "columbia-house",
            "Columbia House <club@columbiahouse.com>",
            "12 CDs for 1¢. No kidding.",
            "Mar 03, 1997 5:19 PM",
            "Stuff your binder. Pay basically nothing today…",
            AdSpec::new("MAILBOX BOOMBOX", "12 CDs FOR 1\u{00A2}")
                .sub("Stuff your binder. Pay basically nothing today.")
                .body("<p>Pick <strong>12 CDs</strong> for just <strong>1\u{00A2}</strong>. Smash Mouth? Oasis? Alanis? We got \u{2019}em.</p><p>Choose now, pay later. It\u{2019}s like your mixtape made itself.</p>")
                .bullets(["No kidding — twelve", "Chart bangers included", "Ships to your door"])
                .cta("Join the Club")
                .fine("Membership terms apply. Postage not included.")
                .render(),
        ),
        seed(
            "tamagotchi",
            "Bandai <hatch@tamagotchi.jp>",
            "Tamagotchi: The pocket pal that needs YOU",
            "Nov 22, 1997 11:06 AM",
            "Feed it. Clean it. Love it. Repeat…",
            AdSpec::new("POCKET PIXELS", "TAMAGOTCHI")
                .sub("The pocket pal that needs YOU")
                .body("<p>Your backpack just got busier. <strong>Tamagotchi</strong> lives for your attention\u{2014}feed snacks between classes, scoop pixels (ew!), and keep the beeps happy.</p><p>Clip it, flaunt it, bond with it. Friends don\u{2019}t let friends go low‑battery.</p>")
                .bullets(["Snacks, play, sleep cycles", "Keychain clip flaunt factor", "Beep notifications so you never forget"])
                .cta("Adopt One")
                .render(),
        ),
        seed(
            "blockbuster",
            "Blockbuster Video <bignight@blockbuster.com>",
            "Make it a Blockbuster night.",
            "Jan 09, 1999 8:02 PM",
            "2‑day rentals, fresh popcorn, rewind kindly…",
            AdSpec::new("FRIDAY NIGHT = MOVIE NIGHT", "BLOCKBUSTER VIDEO")
                .sub("Make it a Blockbuster night.")
                .body("<p>Grab a membership card and cruise the aisles. Pick up <em>Hot Tamales</em>, snag a VHS, and remember—<strong>Be Kind, Rewind</strong>.</p><p>Pro tip: Reserve early to beat the Friday rush.</p>")
                .bullets(["2‑day rentals", "New releases weekly", "Late fee reminder (uh oh)"])
                .cta("Rent Tonight")
                .render(),
        ),
        seed(
            "chatpal-95",
            "FutureWare <hello@futureware.com>",
            "ChatPal 95: Your floppy‑disk AI buddy",
            "Jun 07, 1996 4:12 PM",
            "Talk to your PC like it’s your pal…",
            AdSpec::new("FUTUREWARE PRESENTS", "CHATPAL 95")
                .sub("Artificial Conversation. Real Fun.")
                .body("Slip the <strong>1.44MB</strong> disk in and say hello to your PC\u{2019}s new best friend. Type a question, get a wisecrack.")
                .bullets(["Runs on 486 (Pentium screams!)", "Offline chat — save those minutes", "Personalities: Skater Dude to Study Buddy"])
                .cta("Install from Floppy")
                .render(),
        ),
        seed(
            "robohelper-2000",
            "RoboCo <beep@roboco.com>",
            "RoboHelper 2000: Your rolling desktop assistant",
            "Sep 18, 1999 10:28 AM",
            "Wheels. Sensors. Attitude. Coffee compatible…",
            AdSpec::new("ROBOCO // NEXT‑GEN HOME HELP", "ROBOHELPER 2000")
                .sub("Because chores are so last century.")
                .body("Your new motorized buddy patrols hallways, carries snacks, and beeps on command. Infrared sensors avoid socks and cats.")
                .bullets(["Auto‑dock charging", "Clap‑to‑start voice trigger", "Serial cable updates (futuristic!)"])
                .cta("Roll Out")
                .render(),
        ),
        seed(
            "neurotoast",
            "NeuroToast Labs <hot@neurotoast.com>",
            "NeuroToast 2K: A neural network for your breakfast",
            "Feb 11, 1999 6:59 AM",
            "Smarter toast via patented N.E.U.R.O. LOAF™ tech…",
            AdSpec::new("BREAKFAST // UPGRADED", "NEUROTOAST 2K")
                .sub("Deep‑crisp technology for perfect browns.")
                .body("Our countertop neural net learns your crunch curve. From lightly golden to XTREME CRISP, it remembers your vibe.")
                .bullets(["Serial‑port firmware (9‑pin included)", "Bagel Mode: edge intensity control", "Auto‑pop victory chime"])
                .cta("Get Toast Smart")
                .render(),
        ),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Folder {
    Inbox,
    Sent,
}

impl Folder {
    /// Anything but `"Sent"` means the inbox.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        if name == "Sent" { Self::Sent } else { Self::Inbox }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Inbox => "Inbox",
            Self::Sent => "Sent",
        }
    }
}

/// Sortable list column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    From,
    Subject,
    Date,
}

impl SortKey {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "from" => Some(Self::From),
            "subject" => Some(Self::Subject),
            "date" => Some(Self::Date),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::From => "from",
            Self::Subject => "subject",
            Self::Date => "date",
        }
    }

    /// Direction a column starts in when first selected.
    #[must_use]
    pub const fn default_dir(self) -> SortDir {
        match self {
            Self::Date => SortDir::Desc,
            Self::From | Self::Subject => SortDir::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

fn compare(a: &MailMessage, b: &MailMessage, key: SortKey) -> Ordering {
    match key {
        SortKey::From => a.from.to_lowercase().cmp(&b.from.to_lowercase()),
        SortKey::Subject => a.subject.to_lowercase().cmp(&b.subject.to_lowercase()),
        SortKey::Date => a.sort_ms().cmp(&b.sort_ms()),
    }
}

/// Stable sort of `messages` by one column.
#[must_use]
pub fn sorted<'a>(messages: &'a [MailMessage], key: SortKey, dir: SortDir) -> Vec<&'a MailMessage> {
    let mut rows: Vec<&MailMessage> = messages.iter().collect();
    rows.sort_by(|a, b| {
        let ord = compare(a, b, key);
        match dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });
    rows
}

/// Persisted mail UI state. Every field is optional on load.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MailPersist {
    pub read_map: BTreeMap<String, bool>,
    pub current_folder: Option<String>,
    pub current_id: Option<String>,
    pub preview_off: Option<bool>,
    pub list_ratio: Option<f64>,
    pub sort_key: Option<String>,
    pub sort_dir: Option<String>,
}

impl MailPersist {
    #[must_use]
    pub fn load(backend: &dyn StorageBackend, key: &str) -> Option<Self> {
        load_or_warn(backend, key)
    }

    pub fn save(&self, backend: &mut dyn StorageBackend, key: &str) -> bool {
        save_or_warn(backend, key, self)
    }

    /// Apply saved read flags to messages whose id is known.
    pub fn apply_read_flags(&self, messages: &mut [MailMessage]) {
        for message in messages {
            if let Some(read) = self.read_map.get(&message.id) {
                message.read = *read;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn seeds_are_unread_and_unique() {
        let seeds = seed_messages();
        assert_eq!(seeds.len(), 8);
        assert!(seeds.iter().all(|m| !m.read && m.html.contains("retro-ad")));
        let mut ids: Vec<_> = seeds.iter().map(|m| m.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn date_sort_descending_puts_newest_first() {
        let seeds = seed_messages();
        let rows = sorted(&seeds, SortKey::Date, SortDir::Desc);
        assert_eq!(rows[0].id, "robohelper-2000");
        assert_eq!(rows[7].id, "nintendo-virtualboy");
    }

    #[test]
    fn text_sort_ignores_case() {
        let seeds = seed_messages();
        let rows = sorted(&seeds, SortKey::From, SortDir::Asc);
        assert_eq!(rows[0].id, "tamagotchi");
        assert_eq!(rows[1].id, "blockbuster");
    }

    #[test]
    fn date_ms_wins_over_the_display_date() {
        let mut m = seed_messages().remove(0);
        assert!(m.sort_ms() > 0);
        m.date_ms = Some(42);
        assert_eq!(m.sort_ms(), 42);
        m.date = "garbage".into();
        m.date_ms = None;
        assert_eq!(m.sort_ms(), 0);
    }

    #[test]
    fn folder_and_sort_names_parse_leniently() {
        assert_eq!(Folder::parse("Sent"), Folder::Sent);
        assert_eq!(Folder::parse("Drafts"), Folder::Inbox);
        assert_eq!(SortKey::parse("size"), None);
        assert_eq!(SortKey::Date.default_dir(), SortDir::Desc);
    }

    #[test]
    fn read_flags_apply_by_id() {
        let mut seeds = seed_messages();
        let mut persist = MailPersist::default();
        persist.read_map.insert("tamagotchi".into(), true);
        persist.read_map.insert("gone".into(), true);
        persist.apply_read_flags(&mut seeds);
        assert_eq!(seeds.iter().filter(|m| m.read).count(), 1);
    }
}
