#![forbid(unsafe_code)]

//! Geometry primitives in CSS pixels.

use serde::{Deserialize, Serialize};

/// Height of the taskbar strip reserved at the bottom of the viewport.
pub const TASKBAR_HEIGHT: i32 = 28;

/// A pointer position in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Position and size of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct WindowRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl WindowRect {
    /// Create a rect from its top-left corner and size.
    #[must_use]
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.left.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.top.saturating_add(self.height)
    }

    /// Check if a point lies inside the rect.
    #[inline]
    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right() && point.y >= self.top && point.y < self.bottom()
    }

    /// Copy of this rect moved to a new top-left corner.
    #[must_use]
    pub const fn with_origin(self, left: i32, top: i32) -> Self {
        Self { left, top, ..self }
    }
}

/// The browser viewport (`innerWidth` x `innerHeight`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1024, 768)
    }
}

impl Viewport {
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Height available to windows above the taskbar.
    #[must_use]
    pub const fn usable_height(&self) -> i32 {
        self.height - TASKBAR_HEIGHT
    }

    /// Clamp a window's top-left corner so the window stays fully visible.
    ///
    /// Horizontal range is `[0, width - w]`, vertical range is
    /// `[0, height - TASKBAR_HEIGHT - h]`. When a window is larger than the
    /// available area the corner pins to `0`.
    #[must_use]
    pub fn clamp_origin(&self, left: i32, top: i32, width: i32, height: i32) -> (i32, i32) {
        let max_x = self.width - width;
        let max_y = self.usable_height() - height;
        (left.min(max_x).max(0), top.min(max_y).max(0))
    }

    /// Geometry of a maximized window: the whole viewport minus the taskbar
    /// and a small border allowance.
    #[must_use]
    pub const fn maximized_rect(&self) -> WindowRect {
        WindowRect::new(0, 0, self.width - 4, self.height - TASKBAR_HEIGHT - 4)
    }
}
