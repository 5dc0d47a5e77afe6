#![forbid(unsafe_code)]

//! Oxford Channels: a grid of tiles, one per slide of a deck.

use oxford_core::WindowRect;
use oxford_shell::{AppWindow, AppWindowSpec, ControlButton, ShellConfig, WindowControls, WindowId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clipart::ClipartKind;
use crate::services::{AppRoute, Services};
use crate::slides::{Slide, SlideLibrary, SlidesController};

const SUBTITLE_CHARS: usize = 60;
const CTA: &str = "Learn more →";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChannelsConfig {
    pub deck: String,
    pub deck_pill: String,
    pub logo: String,
    pub taskbar_id: String,
    pub taskbar_label: String,
    pub icon: String,
    pub rect: WindowRect,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            deck: "innovation".to_string(),
            deck_pill: "Innovation & You".to_string(),
            logo: "media/Oxford/logo.svg".to_string(),
            taskbar_id: "channels".to_string(),
            taskbar_label: "Oxford Channels".to_string(),
            icon: "channels-icon".to_string(),
            rect: WindowRect::new(120, 70, 760, 560),
        }
    }
}

/// `tile-` plus the lowercased title with every run of other characters
/// collapsed to `-`.
#[must_use]
pub fn tile_id(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            slug.push(ch);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    format!("tile-{}", slug.trim_matches('-'))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileView {
    pub id: String,
    pub title: String,
    /// First line of the subtitle, shortened.
    pub subtitle: Option<String>,
    pub clipart: ClipartKind,
    pub clipart_html: String,
    pub cta: &'static str,
}

impl TileView {
    fn from_slide(index: usize, slide: &Slide) -> Self {
        let title = if slide.title.is_empty() {
            format!("Slide {}", index + 1)
        } else {
            slide.title.clone()
        };
        let subtitle = slide
            .subtitle
            .as_deref()
            .and_then(|s| s.split('\n').next())
            .map(|line| line.chars().take(SUBTITLE_CHARS).collect::<String>())
            .filter(|line| !line.is_empty());
        let clipart = slide.clipart.unwrap_or(if slide.image.is_some() {
            ClipartKind::Book
        } else {
            ClipartKind::Bolt
        });
        Self {
            id: tile_id(&title),
            title,
            subtitle,
            clipart,
            clipart_html: clipart.render(),
            cta: CTA,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelsView {
    pub open: bool,
    pub visible: bool,
    pub logo: String,
    pub deck_pill: String,
    pub tiles: Vec<TileView>,
}

#[derive(Debug)]
pub struct ChannelsController {
    config: ChannelsConfig,
    library: SlideLibrary,
    app: AppWindow,
}

impl ChannelsController {
    #[must_use]
    pub fn new(config: ChannelsConfig, library: SlideLibrary) -> Self {
        let app = AppWindow::new(
            AppWindowSpec::new(
                "channels-window",
                ShellConfig::new("Oxford Channels")
                    .class_tag("channels-window")
                    .rect(config.rect)
                    .controls(WindowControls::all()),
            )
            .taskbar(config.taskbar_id.clone(), config.taskbar_label.clone())
            .icon(config.icon.clone()),
        );
        Self { config, library, app }
    }

    #[must_use]
    pub fn window_id(&self) -> &WindowId {
        self.app.id()
    }

    #[must_use]
    pub fn is_open(&self, services: &Services) -> bool {
        self.app.is_open(&services.shell)
    }

    fn slides(&self) -> &[Slide] {
        self.library.deck(&self.config.deck)
    }

    #[must_use]
    pub fn tiles(&self) -> Vec<TileView> {
        self.slides()
            .iter()
            .enumerate()
            .map(|(i, slide)| TileView::from_slide(i, slide))
            .collect()
    }

    pub fn open(&self, services: &mut Services) {
        self.app.open(&mut services.shell, AppRoute::Channels);
    }

    /// Open a slides viewer on tile `index`. Unknown tiles are ignored.
    pub fn open_tile(
        &self,
        services: &mut Services,
        slides: &mut SlidesController,
        index: usize,
    ) -> Option<WindowId> {
        let deck = self.slides();
        if index >= deck.len() {
            return None;
        }
        debug!(index, deck = %self.config.deck, "channel tile opened");
        Some(slides.open(services, deck.to_vec(), index))
    }

    pub fn minimize(&self, services: &mut Services) {
        self.app.minimize(&mut services.shell);
    }

    pub fn activate(&self, services: &mut Services) {
        if self.is_open(services) {
            self.app.activate(&mut services.shell);
        }
    }

    pub fn close(&self, services: &mut Services) {
        self.app.close(&mut services.shell);
    }

    pub fn toggle_from_taskbar(&self, services: &mut Services) {
        self.app.toggle_from_taskbar(&mut services.shell, AppRoute::Channels);
    }

    pub fn handle_control(&self, services: &mut Services, button: ControlButton) {
        self.app.handle_control(&mut services.shell, button);
    }

    #[must_use]
    pub fn view(&self, services: &Services) -> ChannelsView {
        let open = self.is_open(services);
        ChannelsView {
            open,
            visible: self.app.is_visible(&services.shell),
            logo: self.config.logo.clone(),
            deck_pill: self.config.deck_pill.clone(),
            tiles: if open { self.tiles() } else { Vec::new() },
        }
    }
}
