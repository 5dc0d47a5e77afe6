#![forbid(unsafe_code)]

//! Slide decks and the slides viewer windows.
//!
//! Decks ship with the crate as `assets/slides.json`. Each click on a channel
//! tile opens a new viewer window (no taskbar entry) that keeps its own copy
//! of the deck and position.

use std::collections::BTreeMap;

use oxford_core::WindowRect;
use oxford_shell::{ControlButton, ShellConfig, WindowControls, WindowId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clipart::ClipartKind;
use crate::effects::MediaKind;
use crate::media::MediaRequest;
use crate::services::{AppRoute, Services};

const BUILTIN_DECKS: &str = include_str!("../assets/slides.json");
const PLAY_CLIP: &str = "Play Clip";

/// A clip a slide can hand to the media player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaLink {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub kind: Option<MediaKind>,
}

impl MediaLink {
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .filter(|l| !l.is_empty())
            .or_else(|| self.path.as_deref().filter(|p| !p.is_empty()))
            .unwrap_or(PLAY_CLIP)
    }
}

/// Show/hide button for an extra picture next to the "Exhibit A" paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageToggle {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub hide_label: Option<String>,
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub clipart: Option<ClipartKind>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_toggle: Option<ImageToggle>,
    #[serde(default)]
    pub media_links: Vec<MediaLink>,
    #[serde(default)]
    pub paragraphs: Vec<String>,
}

/// Named decks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SlideLibrary {
    decks: BTreeMap<String, Vec<Slide>>,
}

impl SlideLibrary {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Decks bundled with the crate. Empty if the bundle does not parse.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_DECKS).unwrap_or_else(|err| {
            warn!(%err, "bundled slide decks failed to parse");
            Self::default()
        })
    }

    /// Slides of `name`; empty when unknown.
    #[must_use]
    pub fn deck(&self, name: &str) -> &[Slide] {
        self.decks.get(name).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Media-player source for a slide link path.
///
/// Bare file names are taken from the media file root.
#[must_use]
pub fn media_source(path: &str) -> String {
    let lower = path.to_ascii_lowercase();
    let rooted = path.starts_with("#file:")
        || lower.starts_with("http:")
        || lower.starts_with("https:")
        || path.starts_with("media/")
        || path.starts_with('/');
    if rooted {
        path.to_string()
    } else {
        format!("#file:{path}")
    }
}

/// Whether a paragraph introduces exhibit A (`exhibit\s*a`, any case).
fn mentions_exhibit_a(paragraph: &str) -> bool {
    let lower = paragraph.to_lowercase();
    lower
        .match_indices("exhibit")
        .any(|(at, word)| lower[at + word.len()..].trim_start().starts_with('a'))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SlidesConfig {
    pub title: String,
    pub deck_title: String,
    pub logo: String,
    pub rect: WindowRect,
}

impl Default for SlidesConfig {
    fn default() -> Self {
        Self {
            title: "Innovation & You: A Survival Guide".to_string(),
            deck_title: "Innovation & You".to_string(),
            logo: "media/Oxford/logo.svg".to_string(),
            rect: WindowRect::new(90, 60, 820, 600),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaLinkView {
    pub label: String,
    /// Source handed to the player; empty links do nothing.
    pub src: String,
    pub kind: MediaKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExhibitView {
    /// Index of the paragraph the toggle follows.
    pub after_paragraph: usize,
    pub button_label: String,
    pub src: String,
    pub alt: String,
    pub shown: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideView {
    pub title: String,
    pub subtitle: Option<String>,
    pub clipart_html: Option<String>,
    pub image: Option<String>,
    pub paragraphs: Vec<String>,
    pub media: Vec<MediaLinkView>,
    pub exhibit: Option<ExhibitView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlidesView {
    pub window: WindowId,
    pub deck_title: String,
    pub logo: String,
    pub counter: String,
    /// `None` renders the "No slides available" card.
    pub slide: Option<SlideView>,
}

#[derive(Debug, Clone)]
struct Viewer {
    slides: Vec<Slide>,
    index: usize,
    exhibit_shown: bool,
}

impl Viewer {
    fn step(&mut self, forward: bool) {
        let total = self.slides.len();
        if total == 0 {
            return;
        }
        self.index = if forward {
            (self.index + 1) % total
        } else {
            (self.index + total - 1) % total
        };
        self.exhibit_shown = false;
    }

    fn counter(&self) -> String {
        if self.slides.is_empty() {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.index + 1, self.slides.len())
        }
    }

    fn slide_view(&self) -> Option<SlideView> {
        let slide = self.slides.get(self.index)?;
        let media = slide
            .media_links
            .iter()
            .map(|link| MediaLinkView {
                label: link.display_label().to_string(),
                src: link.path.clone().unwrap_or_default(),
                kind: link.kind.unwrap_or(MediaKind::Video),
            })
            .collect();
        let exhibit = slide.image_toggle.as_ref().and_then(|toggle| {
            let after = slide.paragraphs.iter().position(|p| mentions_exhibit_a(p))?;
            let show = toggle.label.clone().unwrap_or_else(|| "Show Exhibit Image".to_string());
            let hide = toggle.hide_label.clone().unwrap_or_else(|| "Hide Exhibit Image".to_string());
            Some(ExhibitView {
                after_paragraph: after,
                button_label: if self.exhibit_shown { hide } else { show.clone() },
                src: toggle.src.clone(),
                alt: toggle.alt.clone().unwrap_or(show),
                shown: self.exhibit_shown,
            })
        });
        Some(SlideView {
            title: slide.title.clone(),
            subtitle: slide.subtitle.clone().filter(|s| !s.is_empty()),
            clipart_html: slide.clipart.map(ClipartKind::render),
            image: slide.image.clone(),
            paragraphs: slide.paragraphs.clone(),
            media,
            exhibit,
        })
    }
}

/// All open slides viewers.
#[derive(Debug)]
pub struct SlidesController {
    config: SlidesConfig,
    viewers: BTreeMap<WindowId, Viewer>,
    next_viewer: u32,
}

impl SlidesController {
    #[must_use]
    pub fn new(config: SlidesConfig) -> Self {
        Self {
            config,
            viewers: BTreeMap::new(),
            next_viewer: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.viewers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.viewers.is_empty()
    }

    #[must_use]
    pub fn index(&self, window: &WindowId) -> Option<usize> {
        self.viewers.get(window).map(|v| v.index)
    }

    /// Open a new viewer on `slides`, starting at `initial` (clamped).
    pub fn open(&mut self, services: &mut Services, slides: Vec<Slide>, initial: usize) -> WindowId {
        self.next_viewer += 1;
        let window = WindowId::new(format!("slides-{}", self.next_viewer));
        let index = initial.min(slides.len().saturating_sub(1));
        services.shell.create_window(
            window.clone(),
            ShellConfig::new(self.config.title.clone())
                .class_tag("slides-window")
                .rect(self.config.rect)
                .controls(WindowControls::all()),
            AppRoute::Slides,
        );
        debug!(window = %window, index, total = slides.len(), "slides viewer opened");
        self.viewers.insert(
            window.clone(),
            Viewer {
                slides,
                index,
                exhibit_shown: false,
            },
        );
        window
    }

    pub fn next(&mut self, window: &WindowId) {
        if let Some(viewer) = self.viewers.get_mut(window) {
            viewer.step(true);
        }
    }

    pub fn prev(&mut self, window: &WindowId) {
        if let Some(viewer) = self.viewers.get_mut(window) {
            viewer.step(false);
        }
    }

    /// Title-bar double-click advances.
    pub fn title_double_click(&mut self, window: &WindowId) {
        self.next(window);
    }

    /// ArrowRight/ArrowLeft navigation. Returns whether the key was used.
    pub fn key(&mut self, window: &WindowId, key: &str) -> bool {
        match key {
            "ArrowRight" => self.next(window),
            "ArrowLeft" => self.prev(window),
            _ => return false,
        }
        true
    }

    pub fn toggle_exhibit(&mut self, window: &WindowId) {
        if let Some(viewer) = self.viewers.get_mut(window) {
            viewer.exhibit_shown = !viewer.exhibit_shown;
        }
    }

    /// What the player should open for link `link` of the current slide.
    #[must_use]
    pub fn media_request(&self, window: &WindowId, link: usize) -> Option<MediaRequest> {
        let viewer = self.viewers.get(window)?;
        let link = viewer.slides.get(viewer.index)?.media_links.get(link)?;
        let path = link.path.as_deref().filter(|p| !p.is_empty())?;
        Some(
            MediaRequest::new(media_source(path))
                .title(link.display_label())
                .kind(link.kind.unwrap_or(MediaKind::Video))
                .gesture(true),
        )
    }

    pub fn activate(&self, services: &mut Services, window: &WindowId) {
        services.shell.windows.bring_to_front(window);
    }

    /// Minimize does nothing: a viewer has no taskbar entry to come back from.
    pub fn handle_control(&mut self, services: &mut Services, window: &WindowId, button: ControlButton) {
        match button {
            ControlButton::Minimize => {}
            ControlButton::Maximize => {
                services.shell.windows.toggle_maximize(window, self.config.rect);
            }
            ControlButton::Close => self.close(services, window),
        }
    }

    pub fn close(&mut self, services: &mut Services, window: &WindowId) {
        if self.viewers.remove(window).is_some() {
            services.shell.close_window(window);
        }
    }

    #[must_use]
    pub fn view(&self) -> Vec<SlidesView> {
        self.viewers
            .iter()
            .map(|(window, viewer)| SlidesView {
                window: window.clone(),
                deck_title: self.config.deck_title.clone(),
                logo: self.config.logo.clone(),
                counter: viewer.counter(),
                slide: viewer.slide_view(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::services;
    use pretty_assertions::assert_eq;

    fn innovation() -> Vec<Slide> {
        SlideLibrary::builtin().deck("innovation").to_vec()
    }

    #[test]
    fn bundled_deck_has_ten_slides() {
        let deck = innovation();
        assert_eq!(deck.len(), 10);
        assert_eq!(deck[0].clipart, Some(ClipartKind::Faucet));
        assert!(deck[5].image_toggle.is_some());
        assert!(SlideLibrary::builtin().deck("missing").is_empty());
    }

    #[test]
    fn bare_paths_get_the_file_prefix() {
        assert_eq!(media_source("clip.mp4"), "#file:clip.mp4");
        assert_eq!(media_source("media/intro.mp4"), "media/intro.mp4");
        assert_eq!(media_source("HTTPS://x/y.mp4"), "HTTPS://x/y.mp4");
        assert_eq!(media_source("/abs.mp4"), "/abs.mp4");
        assert_eq!(media_source("#file:a.mp4"), "#file:a.mp4");
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let mut services = services();
        let mut slides = SlidesController::new(SlidesConfig::default());
        let window = slides.open(&mut services, innovation(), 99);
        assert_eq!(slides.index(&window), Some(9));
        assert!(slides.key(&window, "ArrowRight"));
        assert_eq!(slides.index(&window), Some(0));
        slides.prev(&window);
        assert_eq!(slides.view()[0].counter, "10 / 10");
        slides.title_double_click(&window);
        assert_eq!(slides.view()[0].counter, "1 / 10");
        assert!(!slides.key(&window, "Enter"));
    }

    #[test]
    fn empty_deck_shows_placeholder() {
        let mut services = services();
        let mut slides = SlidesController::new(SlidesConfig::default());
        let window = slides.open(&mut services, Vec::new(), 3);
        slides.next(&window);
        let view = &slides.view()[0];
        assert_eq!(view.counter, "0 / 0");
        assert!(view.slide.is_none());
    }

    #[test]
    fn exhibit_toggle_follows_the_exhibit_paragraph() {
        let mut services = services();
        let mut slides = SlidesController::new(SlidesConfig::default());
        let window = slides.open(&mut services, innovation(), 5);
        let exhibit = slides.view()[0].slide.clone().and_then(|s| s.exhibit);
        let Some(exhibit) = exhibit else {
            panic!("slide 6 has an exhibit toggle");
        };
        assert_eq!(exhibit.after_paragraph, 1);
        assert_eq!(exhibit.button_label, "Show Exhibit A Image");
        assert_eq!(exhibit.src, "media/virtualboy.png");
        slides.toggle_exhibit(&window);
        let label = slides.view()[0]
            .slide
            .clone()
            .and_then(|s| s.exhibit)
            .map(|e| e.button_label);
        assert_eq!(label.as_deref(), Some("Hide Exhibit A Image"));
    }

    #[test]
    fn media_links_open_with_a_gesture() {
        let mut services = services();
        let mut slides = SlidesController::new(SlidesConfig::default());
        let window = slides.open(&mut services, innovation(), 0);
        let request = slides.media_request(&window, 0);
        assert_eq!(
            request,
            Some(
                MediaRequest::new("media/intro.mp4")
                    .title("► Watch Introduction")
                    .kind(MediaKind::Video)
                    .gesture(true)
            )
        );
        assert!(slides.media_request(&window, 1).is_none());
    }

    #[test]
    fn each_open_is_a_new_window_and_close_removes_it() {
        let mut services = services();
        let mut slides = SlidesController::new(SlidesConfig::default());
        let first = slides.open(&mut services, innovation(), 0);
        let second = slides.open(&mut services, innovation(), 1);
        assert_ne!(first, second);
        assert_eq!(services.shell.owner(&second), Some(&AppRoute::Slides));
        slides.handle_control(&mut services, &first, ControlButton::Minimize);
        assert!(services.shell.windows.is_visible(&first));
        slides.handle_control(&mut services, &first, ControlButton::Close);
        assert!(!services.shell.windows.contains(&first));
        assert_eq!(slides.len(), 1);
    }
}
