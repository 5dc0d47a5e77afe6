#![forbid(unsafe_code)]

//! Oxford Paint.
//!
//! A transparent RGBA stroke layer sits over the base picture at the
//! picture's natural size. The host loads the picture and reports its size
//! (and optionally its decoded pixels, used when exporting). Strokes are
//! rasterized here, so undo/redo and PNG export need no canvas.

use std::fmt;
use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use oxford_core::WindowRect;
use oxford_shell::{AppWindow, AppWindowSpec, ControlButton, ShellConfig, WindowControls, WindowId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::effects::Effect;
use crate::services::{AppRoute, Services};

const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);
const MIN_SIZE: u32 = 1;
const MAX_SIZE: u32 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaintConfig {
    pub image_path: String,
    pub taskbar_id: String,
    pub taskbar_label: String,
    pub icon: String,
    pub rect: WindowRect,
    pub history_cap: usize,
    pub default_size: u32,
    pub export_name: String,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            image_path: "media/inno-paint.jpg".to_string(),
            taskbar_id: "paint".to_string(),
            taskbar_label: "Oxford Paint".to_string(),
            icon: "paint-icon".to_string(),
            rect: WindowRect::new(120, 70, 780, 560),
            history_cap: 30,
            default_size: 4,
            export_name: "OxfordPaint.png".to_string(),
        }
    }
}

impl PaintConfig {
    #[must_use]
    pub fn image_path(mut self, path: impl Into<String>) -> Self {
        self.image_path = path.into();
        self
    }

    #[must_use]
    pub const fn history_cap(mut self, cap: usize) -> Self {
        self.history_cap = cap;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Pencil,
    Eraser,
}

/// `#rrggbb` to an opaque pixel.
#[must_use]
pub fn parse_color(text: &str) -> Option<Rgba<u8>> {
    let hex = text.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, 255]))
}

/// Squared distance from `(px, py)` to the segment `a..b`.
fn segment_distance_sq(px: f64, py: f64, a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((px - a.0) * dx + (py - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    (px - cx) * (px - cx) + (py - cy) * (py - cy)
}

/// Paint every pixel whose center lies within `radius` of the segment.
/// A zero-length segment is a disc.
pub fn stroke(layer: &mut RgbaImage, a: (f64, f64), b: (f64, f64), radius: f64, color: Rgba<u8>) {
    let (w, h) = layer.dimensions();
    if w == 0 || h == 0 || !radius.is_finite() || radius <= 0.0 {
        return;
    }
    let clamp_x = |v: f64| v.clamp(0.0, f64::from(w - 1)) as u32;
    let clamp_y = |v: f64| v.clamp(0.0, f64::from(h - 1)) as u32;
    let x0 = clamp_x((a.0.min(b.0) - radius).floor());
    let x1 = clamp_x((a.0.max(b.0) + radius).ceil());
    let y0 = clamp_y((a.1.min(b.1) - radius).floor());
    let y1 = clamp_y((a.1.max(b.1) + radius).ceil());
    let r_sq = radius * radius;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let (px, py) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
            if segment_distance_sq(px, py, a, b) <= r_sq {
                layer.put_pixel(x, y, color);
            }
        }
    }
}

/// Display scale that fits the picture into the wrap without upscaling.
#[must_use]
pub fn fit_scale(wrap: (f64, f64), natural: (u32, u32)) -> Option<f64> {
    let (ww, wh) = wrap;
    let (nw, nh) = natural;
    if ww <= 0.0 || wh <= 0.0 || nw == 0 || nh == 0 {
        return None;
    }
    let scale = (ww / f64::from(nw)).min(wh / f64::from(nh));
    Some(scale.clamp(0.1, 1.0))
}

/// Undo stack of layer snapshots with a cursor.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<RgbaImage>,
    index: Option<usize>,
    cap: usize,
}

impl History {
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            index: None,
            cap: cap.max(1),
        }
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.index = None;
    }

    /// Drop the redo tail, push, and keep at most `cap` entries.
    pub fn push(&mut self, snapshot: RgbaImage) {
        let keep = self.index.map_or(0, |i| i + 1);
        self.snapshots.truncate(keep);
        self.snapshots.push(snapshot);
        if self.snapshots.len() > self.cap {
            self.snapshots.remove(0);
        }
        self.index = self.snapshots.len().checked_sub(1);
    }

    pub fn undo(&mut self) -> Option<&RgbaImage> {
        let i = self.index.filter(|i| *i > 0)? - 1;
        self.index = Some(i);
        self.snapshots.get(i)
    }

    pub fn redo(&mut self) -> Option<&RgbaImage> {
        let i = self.index? + 1;
        if i >= self.snapshots.len() {
            return None;
        }
        self.index = Some(i);
        self.snapshots.get(i)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index.is_some_and(|i| i > 0)
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index.is_some_and(|i| i + 1 < self.snapshots.len())
    }
}

/// Failure to export the picture.
#[derive(Debug)]
pub enum ExportError {
    /// No picture has been loaded yet.
    NotLoaded,
    Encode(image::ImageError),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "nothing to export: base image not loaded"),
            Self::Encode(err) => write!(f, "image encode error: {err}"),
        }
    }
}

impl std::error::Error for ExportError {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaintView {
    pub open: bool,
    pub visible: bool,
    pub image_path: String,
    pub image_alt: &'static str,
    pub natural: Option<(u32, u32)>,
    pub display: Option<(u32, u32)>,
    pub tool: Tool,
    pub color: String,
    pub size: u32,
    pub can_undo: bool,
    pub can_redo: bool,
    /// Bumped on every layer change so the host knows to repaint.
    pub revision: u64,
}

#[derive(Debug)]
pub struct PaintController {
    config: PaintConfig,
    app: AppWindow,
    tool: Tool,
    color: String,
    size: u32,
    base: Option<RgbaImage>,
    layer: Option<RgbaImage>,
    load_failed: bool,
    display_scale: f64,
    drawing: bool,
    last: (f64, f64),
    history: History,
    revision: u64,
}

impl PaintController {
    #[must_use]
    pub fn new(config: PaintConfig) -> Self {
        let app = AppWindow::new(
            AppWindowSpec::new(
                "paint-window",
                ShellConfig::new("Oxford Paint")
                    .class_tag("paint-window")
                    .rect(config.rect)
                    .controls(WindowControls::all()),
            )
            .taskbar(config.taskbar_id.clone(), config.taskbar_label.clone())
            .icon(config.icon.clone()),
        );
        let size = config.default_size.clamp(MIN_SIZE, MAX_SIZE);
        let history = History::new(config.history_cap);
        Self {
            config,
            app,
            tool: Tool::Pencil,
            color: "#000000".to_string(),
            size,
            base: None,
            layer: None,
            load_failed: false,
            display_scale: 1.0,
            drawing: false,
            last: (0.0, 0.0),
            history,
            revision: 0,
        }
    }

    #[must_use]
    pub fn window_id(&self) -> &WindowId {
        self.app.id()
    }

    #[must_use]
    pub fn is_open(&self, services: &Services) -> bool {
        self.app.is_open(&services.shell)
    }

    /// The stroke layer, once the base picture is known.
    #[must_use]
    pub const fn layer(&self) -> Option<&RgbaImage> {
        self.layer.as_ref()
    }

    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    pub fn open(&mut self, services: &mut Services) {
        self.app.open(&mut services.shell, AppRoute::Paint);
    }

    /// The host decoded the base picture. `rgba` holds its pixels when the
    /// host can provide them; they are only needed for export.
    pub fn base_loaded(&mut self, width: u32, height: u32, rgba: Option<Vec<u8>>) {
        self.base = rgba.and_then(|raw| RgbaImage::from_raw(width, height, raw));
        let layer = RgbaImage::new(width, height);
        self.history.clear();
        self.history.push(layer.clone());
        self.layer = Some(layer);
        self.load_failed = false;
        self.revision += 1;
        info!(width, height, with_pixels = self.base.is_some(), "paint base loaded");
    }

    pub fn base_failed(&mut self) {
        self.load_failed = true;
        warn!(path = %self.config.image_path, "paint base image failed to load");
    }

    /// Canvas wrap resized; keeps the picture fitted.
    pub fn fit(&mut self, wrap_width: f64, wrap_height: f64) {
        let Some(layer) = &self.layer else {
            return;
        };
        if let Some(scale) = fit_scale((wrap_width, wrap_height), layer.dimensions()) {
            self.display_scale = scale;
        }
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Ignored unless `#rrggbb`.
    pub fn set_color(&mut self, color: &str) -> bool {
        if parse_color(color).is_none() {
            return false;
        }
        self.color = color.trim().to_ascii_lowercase();
        true
    }

    /// Brush size; zero falls back to the default.
    pub fn set_size(&mut self, size: u32) {
        self.size = if size == 0 {
            self.config.default_size
        } else {
            size
        }
        .clamp(MIN_SIZE, MAX_SIZE);
    }

    fn ink(&self) -> Rgba<u8> {
        match self.tool {
            Tool::Eraser => CLEAR,
            Tool::Pencil => parse_color(&self.color).unwrap_or(Rgba([0, 0, 0, 255])),
        }
    }

    /// Display offset to layer pixels.
    fn to_layer(&self, x: f64, y: f64) -> (f64, f64) {
        (x / self.display_scale, y / self.display_scale)
    }

    /// Pointer pressed at a display offset inside the canvas.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        let point = self.to_layer(x, y);
        let radius = (f64::from(self.size) / 2.0).max(1.0);
        let ink = self.ink();
        let Some(layer) = self.layer.as_mut() else {
            return;
        };
        self.drawing = true;
        self.last = point;
        stroke(layer, point, point, radius, ink);
        self.revision += 1;
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if !self.drawing {
            return;
        }
        let point = self.to_layer(x, y);
        let radius = f64::from(self.size) / 2.0;
        let ink = self.ink();
        let last = self.last;
        if let Some(layer) = self.layer.as_mut() {
            stroke(layer, last, point, radius, ink);
            self.revision += 1;
        }
        self.last = point;
    }

    pub fn pointer_up(&mut self) {
        if !self.drawing {
            return;
        }
        self.drawing = false;
        if let Some(layer) = &self.layer {
            self.history.push(layer.clone());
        }
    }

    fn restore(&mut self, snapshot: Option<RgbaImage>) {
        if let Some(snapshot) = snapshot {
            self.layer = Some(snapshot);
            self.revision += 1;
        }
    }

    pub fn undo(&mut self) {
        let snapshot = self.history.undo().cloned();
        self.restore(snapshot);
    }

    pub fn redo(&mut self) {
        let snapshot = self.history.redo().cloned();
        self.restore(snapshot);
    }

    /// Ctrl+Z undoes; Ctrl+Y and Ctrl+Shift+Z redo.
    pub fn key_shortcut(&mut self, ctrl: bool, shift: bool, key: &str) -> bool {
        if !ctrl {
            return false;
        }
        match key {
            "z" | "Z" if shift => self.redo(),
            "z" | "Z" => self.undo(),
            "y" | "Y" => self.redo(),
            _ => return false,
        }
        true
    }

    /// Base picture (when known) under the stroke layer.
    pub fn composite(&self) -> Result<RgbaImage, ExportError> {
        let layer = self.layer.as_ref().ok_or(ExportError::NotLoaded)?;
        let mut out = match &self.base {
            Some(base) => base.clone(),
            None => RgbaImage::new(layer.width(), layer.height()),
        };
        image::imageops::overlay(&mut out, layer, 0, 0);
        Ok(out)
    }

    /// Encode the composite and hand it to the host as a download.
    pub fn save(&self, services: &mut Services) -> Result<usize, ExportError> {
        let composite = self.composite()?;
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(composite)
            .write_to(&mut out, ImageFormat::Png)
            .map_err(ExportError::Encode)?;
        let bytes = out.into_inner();
        let len = bytes.len();
        services.emit(Effect::Download {
            filename: self.config.export_name.clone(),
            bytes,
        });
        debug!(len, "paint exported");
        Ok(len)
    }

    pub fn minimize(&self, services: &mut Services) {
        self.app.minimize(&mut services.shell);
    }

    pub fn activate(&self, services: &mut Services) {
        if self.is_open(services) {
            self.app.activate(&mut services.shell);
        }
    }

    /// Close the window. The next open starts from a fresh load.
    pub fn close(&mut self, services: &mut Services) {
        if self.app.close(&mut services.shell) {
            self.layer = None;
            self.base = None;
            self.history.clear();
            self.drawing = false;
            self.load_failed = false;
        }
    }

    pub fn toggle_from_taskbar(&mut self, services: &mut Services) {
        self.app.toggle_from_taskbar(&mut services.shell, AppRoute::Paint);
    }

    pub fn handle_control(&mut self, services: &mut Services, button: ControlButton) {
        match button {
            ControlButton::Close => self.close(services),
            other => {
                self.app.handle_control(&mut services.shell, other);
            }
        }
    }

    #[must_use]
    pub fn view(&self, services: &Services) -> PaintView {
        let natural = self.layer.as_ref().map(RgbaImage::dimensions);
        let display = natural.map(|(w, h)| {
            (
                (f64::from(w) * self.display_scale).round() as u32,
                (f64::from(h) * self.display_scale).round() as u32,
            )
        });
        PaintView {
            open: self.is_open(services),
            visible: self.app.is_visible(&services.shell),
            image_path: self.config.image_path.clone(),
            image_alt: if self.load_failed {
                "Failed to load inno-paint.jpg"
            } else {
                "Base"
            },
            natural,
            display,
            tool: self.tool,
            color: self.color.clone(),
            size: self.size,
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            revision: self.revision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::services;
    use pretty_assertions::assert_eq;

    fn loaded(w: u32, h: u32) -> PaintController {
        let mut paint = PaintController::new(PaintConfig::default());
        paint.base_loaded(w, h, None);
        paint
    }

    fn painted(paint: &PaintController) -> usize {
        paint
            .layer()
            .map(|l| l.pixels().filter(|p| p.0[3] != 0).count())
            .unwrap_or(0)
    }

    #[test]
    fn colors_parse_only_six_digit_hex() {
        assert_eq!(parse_color("#ff8000"), Some(Rgba([255, 128, 0, 255])));
        assert_eq!(parse_color("red"), None);
        assert_eq!(parse_color("#fff"), None);
    }

    #[test]
    fn fit_never_upscales() {
        assert_eq!(fit_scale((2000.0, 2000.0), (100, 100)), Some(1.0));
        assert_eq!(fit_scale((50.0, 200.0), (100, 100)), Some(0.5));
        assert_eq!(fit_scale((1.0, 1.0), (100, 100)), Some(0.1));
        assert_eq!(fit_scale((0.0, 10.0), (100, 100)), None);
    }

    #[test]
    fn a_click_stamps_a_disc() {
        let mut paint = loaded(20, 20);
        paint.set_size(4);
        paint.pointer_down(10.0, 10.0);
        paint.pointer_up();
        // Radius 2 around (10,10): pixel centers within distance 2.
        assert_eq!(painted(&paint), 12);
        assert_eq!(paint.history().len(), 2);
    }

    #[test]
    fn eraser_clears_alpha() {
        let mut paint = loaded(20, 20);
        paint.set_size(8);
        paint.pointer_down(10.0, 10.0);
        paint.pointer_up();
        let before = painted(&paint);
        paint.set_tool(Tool::Eraser);
        paint.pointer_down(10.0, 10.0);
        paint.pointer_up();
        assert!(painted(&paint) < before);
    }

    #[test]
    fn moves_draw_only_while_pressed() {
        let mut paint = loaded(40, 10);
        paint.pointer_move(5.0, 5.0);
        assert_eq!(painted(&paint), 0);
        paint.set_size(2);
        paint.pointer_down(5.0, 5.0);
        paint.pointer_move(35.0, 5.0);
        paint.pointer_up();
        let layer = paint.layer().cloned().unwrap_or_default();
        assert!(layer.get_pixel(20, 4).0[3] == 255 || layer.get_pixel(20, 5).0[3] == 255);
    }

    #[test]
    fn display_offsets_are_scaled_to_layer_pixels() {
        let mut paint = loaded(200, 200);
        paint.fit(100.0, 100.0);
        paint.set_size(1);
        paint.pointer_down(50.0, 50.0);
        let layer = paint.layer().cloned().unwrap_or_default();
        assert_eq!(layer.get_pixel(99, 99).0[3], 255);
        assert_eq!(layer.get_pixel(50, 50).0[3], 0);
    }

    #[test]
    fn undo_redo_and_truncation() {
        let mut paint = loaded(10, 10);
        paint.pointer_down(2.0, 2.0);
        paint.pointer_up();
        paint.pointer_down(7.0, 7.0);
        paint.pointer_up();
        let two = painted(&paint);
        paint.undo();
        assert!(painted(&paint) < two);
        assert!(paint.key_shortcut(true, false, "y"));
        assert_eq!(painted(&paint), two);
        paint.undo();
        paint.undo();
        assert_eq!(painted(&paint), 0);
        paint.undo();
        assert_eq!(painted(&paint), 0);
        paint.pointer_down(5.0, 5.0);
        paint.pointer_up();
        assert!(!paint.view(&services()).can_redo);
        assert!(paint.key_shortcut(true, false, "Z"));
        assert_eq!(painted(&paint), 0);
        assert!(paint.key_shortcut(true, true, "Z"));
        assert!(painted(&paint) > 0);
        assert!(!paint.key_shortcut(false, false, "z"));
    }

    #[test]
    fn history_is_capped() {
        let mut history = History::new(3);
        for i in 0..5u32 {
            history.push(RgbaImage::new(i + 1, 1));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo().map(RgbaImage::width), Some(4));
        assert_eq!(history.undo().map(RgbaImage::width), Some(3));
        assert!(history.undo().is_none());
    }

    #[test]
    fn save_emits_a_png_download() {
        let mut services = services();
        let mut paint = PaintController::new(PaintConfig::default());
        assert!(matches!(paint.save(&mut services), Err(ExportError::NotLoaded)));
        paint.base_loaded(2, 1, Some(vec![255, 0, 0, 255, 0, 255, 0, 255]));
        paint.pointer_down(0.5, 0.5);
        paint.pointer_up();
        let len = paint.save(&mut services).unwrap_or_default();
        assert!(len > 0);
        let effects = services.take_effects();
        let Some(Effect::Download { filename, bytes }) = effects.first() else {
            panic!("expected a download");
        };
        assert_eq!(filename, "OxfordPaint.png");
        let decoded = image::load_from_memory(bytes).map(|i| i.to_rgba8()).unwrap_or_default();
        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(decoded.get_pixel(1, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn failed_load_changes_the_alt_text() {
        let services = services();
        let mut paint = PaintController::new(PaintConfig::default());
        paint.base_failed();
        assert_eq!(paint.view(&services).image_alt, "Failed to load inno-paint.jpg");
    }

    #[test]
    fn window_lifecycle_follows_the_taskbar() {
        let mut services = services();
        let mut paint = loaded(10, 10);
        paint.open(&mut services);
        assert!(services.shell.taskbar.is_active("paint"));
        paint.handle_control(&mut services, ControlButton::Minimize);
        assert!(!paint.view(&services).visible);
        paint.toggle_from_taskbar(&mut services);
        assert!(paint.view(&services).visible);
        paint.handle_control(&mut services, ControlButton::Close);
        assert!(paint.layer().is_none());
        assert!(!services.shell.taskbar.contains("paint"));
    }
}
