#![forbid(unsafe_code)]

//! Retro advertisement markup.
//!
//! Every message body in the inbox is an ad fragment produced by
//! [`AdSpec::render`]. The Virtual Boy ad is hand-built because it carries a
//! sized hero image and an extra copy paragraph.

use oxford_core::html::{escape, escape_attr};

/// Content of one ad. Empty fields are left out of the markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdSpec {
    pub banner: String,
    pub head: String,
    pub sub: String,
    /// Used as markup when it starts with `<`, otherwise wrapped in an
    /// escaped paragraph.
    pub body: String,
    pub bullets: Vec<String>,
    pub hero_src: Option<String>,
    pub hero_alt: String,
    pub cta: String,
    pub fine: String,
}

impl AdSpec {
    #[must_use]
    pub fn new(banner: impl Into<String>, head: impl Into<String>) -> Self {
        Self {
            banner: banner.into(),
            head: head.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn sub(mut self, sub: impl Into<String>) -> Self {
        self.sub = sub.into();
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn bullets<I, S>(mut self, bullets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bullets = bullets.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn hero(mut self, src: impl Into<String>, alt: impl Into<String>) -> Self {
        self.hero_src = Some(src.into());
        self.hero_alt = alt.into();
        self
    }

    #[must_use]
    pub fn cta(mut self, cta: impl Into<String>) -> Self {
        self.cta = cta.into();
        self
    }

    #[must_use]
    pub fn fine(mut self, fine: impl Into<String>) -> Self {
        self.fine = fine.into();
        self
    }

    /// The `retro-ad` fragment.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from("<div class=\"retro-ad\">");
        if !self.banner.is_empty() {
            out.push_str(&format!("<div class=\"ad-banner\">{}</div>", escape(&self.banner)));
        }
        out.push_str("<div class=\"ad-body\">");
        if !self.head.is_empty() {
            out.push_str(&format!("<h1 class=\"ad-head\">{}</h1>", escape(&self.head)));
        }
        if !self.sub.is_empty() {
            out.push_str(&format!("<h2 class=\"ad-sub\">{}</h2>", escape(&self.sub)));
        }
        if !self.body.is_empty() {
            if self.body.starts_with('<') {
                out.push_str(&self.body);
            } else {
                out.push_str(&format!("<p>{}</p>", escape(&self.body)));
            }
        }
        if !self.bullets.is_empty() {
            out.push_str("<ul class=\"ad-bullets\">");
            for bullet in &self.bullets {
                out.push_str(&format!("<li>{}</li>", escape(bullet)));
            }
            out.push_str("</ul>");
        }
        if let Some(src) = &self.hero_src {
            out.push_str(&format!(
                "<div class=\"ad-hero\"><img class=\"ad-hero-img\" src=\"{}\" alt=\"{}\"></div>",
                escape_attr(src),
                escape_attr(&self.hero_alt)
            ));
        }
        if !self.cta.is_empty() {
            out.push_str(&format!("<div class=\"ad-cta\">{}</div>", escape(&self.cta)));
        }
        if !self.fine.is_empty() {
            out.push_str(&format!("<p class=\"ad-fine\">{}</p>", escape(&self.fine)));
        }
        out.push_str("</div></div>");
        out
    }
}

/// The Virtual Boy launch ad.
#[must_use]
pub fn nintendo_ad() -> String {
    concat!(
        "<div class=\"retro-ad vboy\">",
        "<div class=\"ad-banner\">NINTENDO POWER ALERT</div>",
        "<div class=\"ad-body\">",
        "<h1 class=\"ad-head\">SEE RED. FEEL 3‑D. GET HYPED.</h1>",
        "<h2 class=\"ad-sub\">Introducing the <span class=\"ad-mark\">VIRTUAL BOY™</span></h2>",
        "<p>Strap in, hotshot. This is stereoscopic, stand‑up, head‑spinning <strong>3‑D</strong> from the crew that brought you pure fun in cartridge form. No glasses. No mercy. Just radical depth that jumps like a skateboard off a handrail.</p>",
        "<ul class=\"ad-bullets\">",
        "<li>Turbo‑charged red visuals that POP</li>",
        "<li>Plug‑and‑play setup—drop in, zone out</li>",
        "<li>Exclusive launch titles built for 3‑D speed</li>",
        "</ul>",
        "<div class=\"ad-hero\">",
        "<img class=\"ad-hero-img retro-asset\" src=\"media/virtualboy.png\" width=\"360\" loading=\"lazy\" decoding=\"async\" alt=\"Nintendo Virtual Boy console on stand with controller\" />",
        "</div>",
        "<p class=\"ad-copy\">Power up. Dial your senses to eleven. <em>Virtual Boy</em> doesn’t just play games— it <strong>warps reality</strong>. Are you game enough?</p>",
        "<div class=\"ad-cta\">Power Up Today</div>",
        "<p class=\"ad-fine\">Availability varies by region. Take breaks and play responsibly.</p>",
        "</div></div>"
    )
    .to_string()
}

/// Sender, subject and body of a generated ad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAd {
    pub from: &'static str,
    pub subject: &'static str,
    pub html: String,
}

/// Number of templates [`template`] understands.
pub const TEMPLATE_COUNT: u32 = 6;

/// Ad template `index` (wrapping), used by the inbox refresh.
#[must_use]
pub fn template(index: u32) -> GeneratedAd {
    match index % TEMPLATE_COUNT {
        0 => GeneratedAd {
            from: "CyberPet Labs <bark@cyberpet.net>",
            subject: "CyberPet Deluxe: Your screen‑tamed dino",
            html: AdSpec::new("EXTREME DIGITAL PETS", "CYBERPET DELUXE")
                .sub("Bite‑size pixels. Big personality.")
                .body("Hatch a raptor, feed it byte‑snacks, and show it off on the bus. Now with Night Mode and Sticker Sheet 2.0.")
                .bullets(["Infrared pet meetups", "Secret code mini‑games", "Comes with belt clip"])
                .cta("Hatch One")
                .render(),
        },
        1 => GeneratedAd {
            from: "AOL Keyword Squad <promo@aol.com>",
            subject: "New AOL Keywords: Type FAST, Find FASTER",
            html: AdSpec::new("AOL POWER USER TIPS", "NEW AOL KEYWORDS")
                .sub("Blink and you're there.")
                .body("Skip the click‑fest. Just type the magic word and BOOM—INSTANT ACCESS.")
                .bullets(["KEYWORD: MOVIES", "KEYWORD: GAMES", "KEYWORD: WEATHER"])
                .cta("Try a Keyword")
                .render(),
        },
        2 => GeneratedAd {
            from: "Jolt Cola <zap@jolt.com>",
            subject: "All the sugar and twice the caffeine",
            html: AdSpec::new("PULL AN ALL‑NIGHTER", "JOLT COLA")
                .sub("Code. Game. Repeat.")
                .body("When your 56k is screaming past bedtime, fuel up with fizz.")
                .bullets(["24‑pack special", "Neon can design", "LAN party approved"])
                .cta("Get Jolted")
                .render(),
        },
        3 => GeneratedAd {
            from: "Y2K Taskforce <fix@y2k-ready.gov>",
            subject: "Y2K Patch: Don't let the clock punk you",
            html: AdSpec::new("YEAR 2000 READY", "Y2K PATCH")
                .sub("Millennium‑proof your PC.")
                .body("Download the utility, flip the digits, relax. Your goldfish screensaver survives.")
                .bullets(["One‑click install", "BIOS tip sheet", "Free hotline"])
                .cta("Patch Me")
                .render(),
        },
        4 => GeneratedAd {
            from: "NetNanny Plus <safe@familyweb.net>",
            subject: "NetNanny Plus: Guard your 56k like a ninja",
            html: AdSpec::new("PARENTAL POWER‑UPS", "NETNANNY PLUS")
                .sub("Surf smart. Surf safe.")
                .body("Lock down those pop‑ups and block time‑vortex chat rooms. Configure with a single floppy.")
                .bullets(["Friendly setup wizard", "Timer limits", "Retro modem screech passthrough"])
                .cta("Install Today")
                .render(),
        },
        _ => GeneratedAd {
            from: "SnackWave <wow@snackwave.com>",
            subject: "Fruit Roll‑Up Extreme: New tie‑dye blast",
            html: AdSpec::new("BLAST OF COLOR", "FRUIT ROLL‑UP EXTREME")
                .sub("Peel. Stick. Chomp.")
                .body("Posters for your lunchbox and tongue tattoos included. Collect all 12 designs.")
                .bullets(["Limited edition tie‑dye", "Hologram wrappers", "School‑safe"])
                .cta("Taste the Blast")
                .render(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_bodies_pass_through_and_text_is_escaped() {
        let raw = AdSpec::new("B", "H").body("<p><strong>x</strong></p>").render();
        assert!(raw.contains("<p><strong>x</strong></p>"));
        let text = AdSpec::new("B", "H").body("fish & chips").render();
        assert!(text.contains("<p>fish &amp; chips</p>"));
    }

    #[test]
    fn empty_fields_are_omitted() {
        let html = AdSpec::new("", "Only Head").render();
        assert!(!html.contains("ad-banner"));
        assert!(!html.contains("ad-bullets"));
        assert!(!html.contains("ad-cta"));
        assert!(html.contains("<h1 class=\"ad-head\">Only Head</h1>"));
    }

    #[test]
    fn templates_wrap_and_differ() {
        assert_eq!(template(0), template(TEMPLATE_COUNT));
        let subjects: std::collections::BTreeSet<_> = (0..TEMPLATE_COUNT).map(|i| template(i).subject).collect();
        assert_eq!(subjects.len(), TEMPLATE_COUNT as usize);
    }

    #[test]
    fn nintendo_ad_carries_its_hero_image() {
        assert!(nintendo_ad().contains("media/virtualboy.png"));
    }
}
