#![forbid(unsafe_code)]

//! Scripted buddy data: filler pools, profile links and colors.

/// Generic filler lines.
pub const RESPONSES: [&str; 10] = [
    "lol nice!",
    "yeah totally!",
    "omg really??",
    "brb mom calling",
    "a/s/l? jk jk",
    "check out my away message!",
    "cool cool",
    "haha for real",
    "ttyl gotta go",
    "sweet!",
];

/// Period-flavored filler lines.
pub const RESPONSES_90S: [&str; 10] = [
    "hold up, dial-up is lagging 😅",
    "napster's taking forever to download this track",
    "just burned a mix CD lol",
    "be right back — feeding my Tamagotchi",
    "my AIM away msg is fire rn",
    "new Geocities page just dropped 💾",
    "ICQ went bloop bloop again 😂",
    "Y2K bug? more like Y2-ok",
    "BRB mom needs the phone line 😭",
    "this Winamp skin slaps",
];

const SEPINATOR: [&str; 6] = [
    "my AIM away msg is fire rn",
    "zerg rush? kekeke",
    "LAN party later — bring your CRT",
    "installing Diablo II again lol",
    "BRB mom needs the phone line 😭",
    "custom Winamp skin looks so sick",
];

const XMARK: [&str; 6] = [
    "top 8 drama on Myspace again 😂",
    "new Geocities page — lots of iframes",
    "blink tag is a vibe",
    "switching my AIM font to Comic Sans",
    "Napster queue at 97%... for the last hour",
    "Winamp just “whips the llama’s…” you know the rest",
];

const SELVATRON: [&str; 6] = [
    "writing a bot for mIRC channels",
    "charged my PalmPilot, stylus ready",
    "TI-83 graphing weird art again lol",
    "dot-com bubble memes are back",
    "ICQ number memorized like a phone #",
    "configuring RSS in my reader",
];

const RANDOBRANDO: [&str; 6] = [
    "AOL keywords still slap",
    "can’t stop hearing the dial-up tone",
    "tamagotchi survived the day, barely",
    "burning a new mix CD",
    "3.5” floppies for the win",
    "sharing pics on Photobucket like it’s 1999",
];

/// Buddies listed at startup.
pub const DEFAULT_BUDDIES: [&str; 4] = ["sepinator", "xmarktheneil99x", "selvatron", "randobrando"];

/// Sites the special message claims to be leaving.
pub const LEGACY_SITES: [&str; 3] = ["Friendster", "Myspace", "Neopets"];

/// Palette for the per-session buddy colors.
pub const PALETTE: [&str; 6] = ["#d00000", "#0040c0", "#008000", "#800080", "#c06000", "#008080"];

/// Keys that receive a palette color, in assignment order.
pub const COLORED_KEYS: [&str; 4] = DEFAULT_BUDDIES;

/// Color for "You" and for buddies without an assigned color.
pub const DEFAULT_COLOR: &str = "#0000ff";

/// Color of the typing indicator sender.
pub const TYPING_COLOR: &str = "#ff0000";

/// Alias keys and the canonical key whose color they mirror.
pub const COLOR_ALIASES: [(&str, &str); 2] = [("xmarktheneill99x", "xmarktheneil99x"), ("randobrandon", "randobrando")];

/// Normalized meta key for a display name.
#[must_use]
pub fn meta_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Profile link revealed once by a special buddy.
#[must_use]
pub fn special_link(key: &str) -> Option<&'static str> {
    match key {
        "sepinator" => Some("https://www.linkedin.com/in/sepi-chakaveh/"),
        "selvatron" => Some("https://www.linkedin.com/in/rrselvakumar/"),
        "xmarktheneil99x" | "xmarktheneill99x" => Some("https://www.linkedin.com/in/mhneill/"),
        "randobrando" | "randobrandon" => Some("https://www.linkedin.com/in/stracos/"),
        _ => None,
    }
}

/// Personality pool for a buddy. `xmarktheneill99x` has none on purpose and
/// uses [`default_pool`].
#[must_use]
pub fn personality_pool(key: &str) -> Option<&'static [&'static str]> {
    match key {
        "sepinator" => Some(&SEPINATOR),
        "xmarktheneil99x" => Some(&XMARK),
        "selvatron" => Some(&SELVATRON),
        "randobrando" | "randobrandon" => Some(&RANDOBRANDO),
        _ => None,
    }
}

/// Period lines followed by the generic lines.
#[must_use]
pub fn default_pool() -> Vec<&'static str> {
    RESPONSES_90S.iter().chain(RESPONSES.iter()).copied().collect()
}

/// The pool a buddy's filler is drawn from.
#[must_use]
pub fn filler_pool(key: &str) -> Vec<&'static str> {
    personality_pool(key).map_or_else(default_pool, <[&str]>::to_vec)
}

/// Key whose color an alias shares.
#[must_use]
pub fn canonical_color_key(key: &str) -> &str {
    COLOR_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map_or(key, |(_, canonical)| canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_keys_are_trimmed_and_lowercased() {
        assert_eq!(meta_key("  SepiNator "), "sepinator");
    }

    #[test]
    fn double_l_alias_has_a_link_but_no_pool() {
        assert!(special_link("xmarktheneill99x").is_some());
        assert!(personality_pool("xmarktheneill99x").is_none());
        assert_eq!(filler_pool("xmarktheneill99x").len(), 20);
        assert_eq!(filler_pool("xmarktheneill99x")[0], RESPONSES_90S[0]);
        assert_eq!(filler_pool("randobrandon"), filler_pool("randobrando"));
    }

    #[test]
    fn aliases_resolve_to_canonical_color_keys() {
        assert_eq!(canonical_color_key("randobrandon"), "randobrando");
        assert_eq!(canonical_color_key("xmarktheneill99x"), "xmarktheneil99x");
        assert_eq!(canonical_color_key("someone"), "someone");
    }
}
