#![forbid(unsafe_code)]

//! Pointer-capture adapter for window drag and resize.
//!
//! This module turns browser pointer lifecycle signals on title bars and
//! resize handles into window geometry changes while enforcing:
//! - one active pointer at a time,
//! - explicit capture acquire/release commands for JS hosts, and
//! - cancellation on interruption paths (blur, lost capture).
//!
//! Dragging keeps the window fully inside the viewport minus the taskbar
//! strip. Resizing clamps to a minimum size, keeps the opposite edge anchored
//! for north/west handles and never grows past the viewport. Every drag or
//! resize start brings the window to the front.

use oxford_core::{Point, Viewport, WindowRect};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::window::{WindowId, WindowManager};

/// Smallest size a resize can produce (before the viewport cap).
pub const MIN_WINDOW_WIDTH: i32 = 260;
pub const MIN_WINDOW_HEIGHT: i32 = 160;

/// Pointer button as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// One of the eight edge/corner handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl ResizeHandle {
    pub const ALL: [Self; 8] = [
        Self::N,
        Self::S,
        Self::E,
        Self::W,
        Self::Ne,
        Self::Nw,
        Self::Se,
        Self::Sw,
    ];

    const fn north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    const fn south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    const fn east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    const fn west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    /// CSS cursor for the handle.
    #[must_use]
    pub const fn cursor(self) -> &'static str {
        match self {
            Self::N | Self::S => "ns-resize",
            Self::E | Self::W => "ew-resize",
            Self::Ne | Self::Sw => "nesw-resize",
            Self::Nw | Self::Se => "nwse-resize",
        }
    }
}

/// New top-left corner for a dragged window.
#[must_use]
pub fn drag_origin(viewport: Viewport, rect: WindowRect, offset: Point, pointer: Point) -> (i32, i32) {
    viewport.clamp_origin(
        pointer.x - offset.x,
        pointer.y - offset.y,
        rect.width,
        rect.height,
    )
}

/// Geometry for a resize in progress.
#[must_use]
pub fn resize_rect(
    viewport: Viewport,
    handle: ResizeHandle,
    start: WindowRect,
    start_pointer: Point,
    pointer: Point,
) -> WindowRect {
    let dx = pointer.x - start_pointer.x;
    let dy = pointer.y - start_pointer.y;
    let mut width = start.width;
    let mut height = start.height;
    let mut left = start.left;
    let mut top = start.top;

    if handle.east() {
        width = MIN_WINDOW_WIDTH.max(start.width + dx);
    }
    if handle.south() {
        height = MIN_WINDOW_HEIGHT.max(start.height + dy);
    }
    if handle.west() {
        width = MIN_WINDOW_WIDTH.max(start.width - dx);
        left = start.left + (start.width - width);
    }
    if handle.north() {
        height = MIN_WINDOW_HEIGHT.max(start.height - dy);
        top = start.top + (start.height - height);
    }

    // Pin to the top-left corner with the opposite edge anchored.
    if left < 0 {
        width += left;
        left = 0;
    }
    if top < 0 {
        height += top;
        top = 0;
    }
    width = width.min(viewport.width - left);
    height = height.min(viewport.usable_height() - top);
    WindowRect::new(left, top, width, height)
}

/// What the active pointer is doing to its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PointerGesture {
    Drag {
        offset: Point,
    },
    Resize {
        handle: ResizeHandle,
        start_pointer: Point,
        start_rect: WindowRect,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureState {
    Requested,
    Acquired,
}

impl CaptureState {
    const fn is_acquired(self) -> bool {
        matches!(self, Self::Acquired)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActivePointer {
    pointer_id: u32,
    window: WindowId,
    button: PointerButton,
    gesture: PointerGesture,
    capture_state: CaptureState,
}

/// Host command for browser pointer-capture control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PointerCaptureCommand {
    Acquire { pointer_id: u32 },
    Release { pointer_id: u32 },
}

/// Lifecycle phase recorded for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerCancel,
    PointerLeave,
    Blur,
    LostPointerCapture,
    CaptureAcquired,
}

/// Why an incoming signal was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerIgnoredReason {
    InvalidPointerId,
    ButtonNotAllowed,
    ButtonMismatch,
    ActivePointerAlreadyInProgress,
    NoActivePointer,
    PointerMismatch,
    LeaveWhileCaptured,
    /// Pointer went down on a title-bar control button.
    ControlButton,
    UnknownWindow,
}

/// Outcome category for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "reason")]
pub enum PointerLogOutcome {
    GeometryUpdated,
    GestureStarted,
    GestureEnded,
    CaptureStateUpdated,
    Ignored(PointerIgnoredReason),
}

/// Structured record of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointerLogEntry {
    pub phase: PointerPhase,
    pub sequence: Option<u64>,
    pub pointer_id: Option<u32>,
    pub window: Option<WindowId>,
    pub position: Option<Point>,
    pub capture_command: Option<PointerCaptureCommand>,
    pub outcome: PointerLogOutcome,
}

/// Result of one pointer lifecycle dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointerDispatch {
    pub capture_command: Option<PointerCaptureCommand>,
    /// Window geometry after the dispatch, when it changed.
    pub rect: Option<WindowRect>,
    pub log: PointerLogEntry,
}

impl PointerDispatch {
    /// Whether the adapter acted on the signal.
    #[must_use]
    pub const fn accepted(&self) -> bool {
        !matches!(self.log.outcome, PointerLogOutcome::Ignored(_))
    }

    fn ignored(
        phase: PointerPhase,
        reason: PointerIgnoredReason,
        pointer_id: Option<u32>,
        window: Option<WindowId>,
        position: Option<Point>,
    ) -> Self {
        Self {
            capture_command: None,
            rect: None,
            log: PointerLogEntry {
                phase,
                sequence: None,
                pointer_id,
                window,
                position,
                capture_command: None,
                outcome: PointerLogOutcome::Ignored(reason),
            },
        }
    }
}

/// Adapter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerConfig {
    /// Button required to begin a gesture.
    pub activation_button: PointerButton,
    /// If true, pointer leave cancels a gesture whose capture was requested but never acknowledged.
    pub cancel_on_leave_without_capture: bool,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            activation_button: PointerButton::Primary,
            cancel_on_leave_without_capture: true,
        }
    }
}

/// Drag/resize pointer adapter for window shells.
#[derive(Debug, Clone, Default)]
pub struct WindowPointerAdapter {
    config: PointerConfig,
    active: Option<ActivePointer>,
    next_sequence: u64,
}

impl WindowPointerAdapter {
    #[must_use]
    pub fn new(config: PointerConfig) -> Self {
        Self {
            config,
            active: None,
            next_sequence: 1,
        }
    }

    #[must_use]
    pub const fn config(&self) -> PointerConfig {
        self.config
    }

    /// Active pointer ID, if any.
    #[must_use]
    pub fn active_pointer_id(&self) -> Option<u32> {
        self.active.as_ref().map(|active| active.pointer_id)
    }

    /// Window being dragged or resized, if any.
    #[must_use]
    pub fn active_window(&self) -> Option<&WindowId> {
        self.active.as_ref().map(|active| &active.window)
    }

    /// Gesture in progress, if any.
    #[must_use]
    pub fn active_gesture(&self) -> Option<PointerGesture> {
        self.active.as_ref().map(|active| active.gesture)
    }

    /// Pointer-down on a window's title bar.
    ///
    /// `on_control` is true when the pointer landed on a title-bar button;
    /// such presses never start a drag.
    pub fn title_pointer_down(
        &mut self,
        windows: &mut WindowManager,
        window: &WindowId,
        pointer_id: u32,
        button: PointerButton,
        position: Point,
        on_control: bool,
    ) -> PointerDispatch {
        if on_control {
            return PointerDispatch::ignored(
                PointerPhase::PointerDown,
                PointerIgnoredReason::ControlButton,
                Some(pointer_id),
                Some(window.clone()),
                Some(position),
            );
        }
        self.begin(windows, window, pointer_id, button, position, |rect| {
            PointerGesture::Drag {
                offset: Point::new(position.x - rect.left, position.y - rect.top),
            }
        })
    }

    /// Pointer-down on one of a window's resize handles.
    pub fn handle_pointer_down(
        &mut self,
        windows: &mut WindowManager,
        window: &WindowId,
        handle: ResizeHandle,
        pointer_id: u32,
        button: PointerButton,
        position: Point,
    ) -> PointerDispatch {
        self.begin(windows, window, pointer_id, button, position, |rect| {
            PointerGesture::Resize {
                handle,
                start_pointer: position,
                start_rect: rect,
            }
        })
    }

    fn begin(
        &mut self,
        windows: &mut WindowManager,
        window: &WindowId,
        pointer_id: u32,
        button: PointerButton,
        position: Point,
        gesture: impl FnOnce(WindowRect) -> PointerGesture,
    ) -> PointerDispatch {
        let phase = PointerPhase::PointerDown;
        let ignored = |reason| {
            PointerDispatch::ignored(
                phase,
                reason,
                Some(pointer_id),
                Some(window.clone()),
                Some(position),
            )
        };
        if pointer_id == 0 {
            return ignored(PointerIgnoredReason::InvalidPointerId);
        }
        if button != self.config.activation_button {
            return ignored(PointerIgnoredReason::ButtonNotAllowed);
        }
        if self.active.is_some() {
            return ignored(PointerIgnoredReason::ActivePointerAlreadyInProgress);
        }
        let Some(rect) = windows.get(window).map(|w| w.rect) else {
            return ignored(PointerIgnoredReason::UnknownWindow);
        };

        windows.bring_to_front(window);
        let gesture = gesture(rect);
        self.active = Some(ActivePointer {
            pointer_id,
            window: window.clone(),
            button,
            gesture,
            capture_state: CaptureState::Requested,
        });
        let command = Some(PointerCaptureCommand::Acquire { pointer_id });
        self.forwarded(
            phase,
            pointer_id,
            window.clone(),
            Some(position),
            command,
            None,
            PointerLogOutcome::GestureStarted,
        )
    }

    /// Mark browser pointer capture as successfully acquired.
    pub fn capture_acquired(&mut self, pointer_id: u32) -> PointerDispatch {
        let phase = PointerPhase::CaptureAcquired;
        let Some(active) = self.active.as_mut() else {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::NoActivePointer,
                Some(pointer_id),
                None,
                None,
            );
        };
        if active.pointer_id != pointer_id {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::PointerMismatch,
                Some(pointer_id),
                Some(active.window.clone()),
                None,
            );
        }
        active.capture_state = CaptureState::Acquired;
        PointerDispatch {
            capture_command: None,
            rect: None,
            log: PointerLogEntry {
                phase,
                sequence: None,
                pointer_id: Some(pointer_id),
                window: Some(active.window.clone()),
                position: None,
                capture_command: None,
                outcome: PointerLogOutcome::CaptureStateUpdated,
            },
        }
    }

    /// Pointer-move during an active gesture.
    pub fn pointer_move(
        &mut self,
        windows: &mut WindowManager,
        pointer_id: u32,
        position: Point,
    ) -> PointerDispatch {
        let phase = PointerPhase::PointerMove;
        let Some(active) = self.active.clone() else {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::NoActivePointer,
                Some(pointer_id),
                None,
                Some(position),
            );
        };
        if active.pointer_id != pointer_id {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::PointerMismatch,
                Some(pointer_id),
                Some(active.window),
                Some(position),
            );
        }
        let Some(current) = windows.get(&active.window).map(|w| w.rect) else {
            self.active = None;
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::UnknownWindow,
                Some(pointer_id),
                Some(active.window),
                Some(position),
            );
        };

        let viewport = windows.viewport();
        let rect = match active.gesture {
            PointerGesture::Drag { offset } => {
                let (left, top) = drag_origin(viewport, current, offset, position);
                current.with_origin(left, top)
            }
            PointerGesture::Resize {
                handle,
                start_pointer,
                start_rect,
            } => resize_rect(viewport, handle, start_rect, start_pointer, position),
        };
        windows.set_rect(&active.window, rect);
        self.forwarded(
            phase,
            pointer_id,
            active.window,
            Some(position),
            None,
            Some(rect),
            PointerLogOutcome::GeometryUpdated,
        )
    }

    /// Pointer-up ends the gesture and releases capture.
    pub fn pointer_up(
        &mut self,
        pointer_id: u32,
        button: PointerButton,
        position: Point,
    ) -> PointerDispatch {
        let phase = PointerPhase::PointerUp;
        let Some(active) = self.active.clone() else {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::NoActivePointer,
                Some(pointer_id),
                None,
                Some(position),
            );
        };
        if active.pointer_id != pointer_id {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::PointerMismatch,
                Some(pointer_id),
                Some(active.window),
                Some(position),
            );
        }
        if active.button != button {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::ButtonMismatch,
                Some(pointer_id),
                Some(active.window),
                Some(position),
            );
        }
        self.active = None;
        let command = active
            .capture_state
            .is_acquired()
            .then_some(PointerCaptureCommand::Release { pointer_id });
        self.forwarded(
            phase,
            pointer_id,
            active.window,
            Some(position),
            command,
            None,
            PointerLogOutcome::GestureEnded,
        )
    }

    /// Browser pointer-cancel.
    pub fn pointer_cancel(&mut self, pointer_id: Option<u32>) -> PointerDispatch {
        self.cancel_active(PointerPhase::PointerCancel, pointer_id, true)
    }

    /// Pointer-leave; only cancels while capture is still unacknowledged.
    pub fn pointer_leave(&mut self, pointer_id: u32) -> PointerDispatch {
        let phase = PointerPhase::PointerLeave;
        let Some(active) = self.active.as_ref() else {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::NoActivePointer,
                Some(pointer_id),
                None,
                None,
            );
        };
        if active.pointer_id != pointer_id {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::PointerMismatch,
                Some(pointer_id),
                Some(active.window.clone()),
                None,
            );
        }
        if matches!(active.capture_state, CaptureState::Requested)
            && self.config.cancel_on_leave_without_capture
        {
            self.cancel_active(phase, Some(pointer_id), true)
        } else {
            PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::LeaveWhileCaptured,
                Some(pointer_id),
                Some(active.window.clone()),
                None,
            )
        }
    }

    /// Browser blur ends any gesture.
    pub fn blur(&mut self) -> PointerDispatch {
        self.cancel_active(PointerPhase::Blur, None, true)
    }

    /// `lostpointercapture`; the browser already released capture.
    pub fn lost_pointer_capture(&mut self, pointer_id: u32) -> PointerDispatch {
        self.cancel_active(PointerPhase::LostPointerCapture, Some(pointer_id), false)
    }

    /// Drop the gesture if it targets a window that is going away.
    pub fn forget_window(&mut self, window: &WindowId) -> bool {
        if self.active.as_ref().is_some_and(|a| &a.window == window) {
            self.active = None;
            return true;
        }
        false
    }

    fn cancel_active(
        &mut self,
        phase: PointerPhase,
        pointer_id: Option<u32>,
        release_capture: bool,
    ) -> PointerDispatch {
        let Some(active) = self.active.clone() else {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::NoActivePointer,
                pointer_id,
                None,
                None,
            );
        };
        if let Some(id) = pointer_id
            && id != active.pointer_id
        {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::PointerMismatch,
                Some(id),
                Some(active.window),
                None,
            );
        }
        self.active = None;
        let command = (release_capture && active.capture_state.is_acquired()).then_some(
            PointerCaptureCommand::Release {
                pointer_id: active.pointer_id,
            },
        );
        self.forwarded(
            phase,
            active.pointer_id,
            active.window,
            None,
            command,
            None,
            PointerLogOutcome::GestureEnded,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn forwarded(
        &mut self,
        phase: PointerPhase,
        pointer_id: u32,
        window: WindowId,
        position: Option<Point>,
        capture_command: Option<PointerCaptureCommand>,
        rect: Option<WindowRect>,
        outcome: PointerLogOutcome,
    ) -> PointerDispatch {
        let sequence = self.next_sequence();
        trace!(?phase, sequence, pointer_id, window = %window, ?outcome, "window pointer dispatch");
        PointerDispatch {
            capture_command,
            rect,
            log: PointerLogEntry {
                phase,
                sequence: Some(sequence),
                pointer_id: Some(pointer_id),
                window: Some(window),
                position,
                capture_command,
                outcome,
            },
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence.max(1);
        self.next_sequence = sequence.saturating_add(1);
        sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::ShellConfig;

    fn win() -> WindowId {
        WindowId::new("mail")
    }

    fn pos(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    fn setup() -> (WindowManager, WindowPointerAdapter) {
        let mut windows = WindowManager::new(Viewport::new(1024, 768));
        windows.create_window(
            win(),
            ShellConfig::new("Mail").rect(WindowRect::new(100, 100, 400, 300)),
        );
        windows.create_window(WindowId::new("other"), ShellConfig::new("Other"));
        (windows, WindowPointerAdapter::new(PointerConfig::default()))
    }

    #[test]
    fn title_pointer_down_brings_to_front_and_requests_capture() {
        let (mut windows, mut adapter) = setup();
        let dispatch = adapter.title_pointer_down(
            &mut windows,
            &win(),
            7,
            PointerButton::Primary,
            pos(150, 110),
            false,
        );
        assert_eq!(
            dispatch.capture_command,
            Some(PointerCaptureCommand::Acquire { pointer_id: 7 })
        );
        assert_eq!(dispatch.log.sequence, Some(1));
        assert_eq!(adapter.active_pointer_id(), Some(7));
        assert_eq!(
            adapter.active_gesture(),
            Some(PointerGesture::Drag { offset: pos(50, 10) })
        );
        assert_eq!(windows.topmost_visible().map(|w| w.id.clone()), Some(win()));
    }

    #[test]
    fn control_button_press_never_drags() {
        let (mut windows, mut adapter) = setup();
        let before = windows.get(&win()).map(|w| w.z_index);
        let dispatch = adapter.title_pointer_down(
            &mut windows,
            &win(),
            7,
            PointerButton::Primary,
            pos(480, 105),
            true,
        );
        assert_eq!(
            dispatch.log.outcome,
            PointerLogOutcome::Ignored(PointerIgnoredReason::ControlButton)
        );
        assert_eq!(adapter.active_pointer_id(), None);
        assert_eq!(windows.get(&win()).map(|w| w.z_index), before);
    }

    #[test]
    fn drag_clamps_to_viewport_minus_taskbar() {
        let (mut windows, mut adapter) = setup();
        adapter.title_pointer_down(&mut windows, &win(), 1, PointerButton::Primary, pos(110, 105), false);
        let far = adapter.pointer_move(&mut windows, 1, pos(5_000, 5_000));
        assert_eq!(far.rect, Some(WindowRect::new(624, 440, 400, 300)));
        let negative = adapter.pointer_move(&mut windows, 1, pos(-300, -300));
        assert_eq!(negative.rect, Some(WindowRect::new(0, 0, 400, 300)));
        let inside = adapter.pointer_move(&mut windows, 1, pos(210, 205));
        assert_eq!(inside.rect, Some(WindowRect::new(200, 200, 400, 300)));
    }

    #[test]
    fn pointer_move_mismatch_is_ignored_without_state_mutation() {
        let (mut windows, mut adapter) = setup();
        adapter.title_pointer_down(&mut windows, &win(), 9, PointerButton::Primary, pos(110, 110), false);
        let before = windows.get(&win()).map(|w| w.rect);
        let dispatch = adapter.pointer_move(&mut windows, 77, pos(300, 300));
        assert_eq!(
            dispatch.log.outcome,
            PointerLogOutcome::Ignored(PointerIgnoredReason::PointerMismatch)
        );
        assert_eq!(windows.get(&win()).map(|w| w.rect), before);
        assert_eq!(adapter.active_pointer_id(), Some(9));
    }

    #[test]
    fn second_pointer_is_rejected_while_active() {
        let (mut windows, mut adapter) = setup();
        adapter.title_pointer_down(&mut windows, &win(), 1, PointerButton::Primary, pos(110, 110), false);
        let dispatch = adapter.handle_pointer_down(
            &mut windows,
            &WindowId::new("other"),
            ResizeHandle::Se,
            2,
            PointerButton::Primary,
            pos(10, 10),
        );
        assert_eq!(
            dispatch.log.outcome,
            PointerLogOutcome::Ignored(PointerIgnoredReason::ActivePointerAlreadyInProgress)
        );
    }

    #[test]
    fn pointer_up_releases_only_acquired_capture() {
        let (mut windows, mut adapter) = setup();
        adapter.title_pointer_down(&mut windows, &win(), 3, PointerButton::Primary, pos(110, 110), false);
        let ack = adapter.capture_acquired(3);
        assert_eq!(ack.log.outcome, PointerLogOutcome::CaptureStateUpdated);
        let wrong = adapter.pointer_up(3, PointerButton::Secondary, pos(110, 110));
        assert_eq!(
            wrong.log.outcome,
            PointerLogOutcome::Ignored(PointerIgnoredReason::ButtonMismatch)
        );
        let up = adapter.pointer_up(3, PointerButton::Primary, pos(110, 110));
        assert_eq!(
            up.capture_command,
            Some(PointerCaptureCommand::Release { pointer_id: 3 })
        );
        assert_eq!(adapter.active_pointer_id(), None);
    }

    #[test]
    fn leave_before_ack_cancels_but_after_ack_is_ignored() {
        let (mut windows, mut adapter) = setup();
        adapter.title_pointer_down(&mut windows, &win(), 4, PointerButton::Primary, pos(110, 110), false);
        let leave = adapter.pointer_leave(4);
        assert_eq!(leave.log.outcome, PointerLogOutcome::GestureEnded);
        assert_eq!(leave.capture_command, None);
        assert_eq!(adapter.active_pointer_id(), None);

        adapter.title_pointer_down(&mut windows, &win(), 5, PointerButton::Primary, pos(110, 110), false);
        adapter.capture_acquired(5);
        let leave = adapter.pointer_leave(5);
        assert_eq!(
            leave.log.outcome,
            PointerLogOutcome::Ignored(PointerIgnoredReason::LeaveWhileCaptured)
        );
        let blur = adapter.blur();
        assert_eq!(
            blur.capture_command,
            Some(PointerCaptureCommand::Release { pointer_id: 5 })
        );
        assert_eq!(adapter.lost_pointer_capture(5).log.outcome,
            PointerLogOutcome::Ignored(PointerIgnoredReason::NoActivePointer));
    }

    #[test]
    fn resize_east_and_south_respect_minimum() {
        let vp = Viewport::new(1024, 768);
        let start = WindowRect::new(100, 100, 400, 300);
        let shrunk = resize_rect(vp, ResizeHandle::Se, start, pos(500, 400), pos(100, 100));
        assert_eq!(shrunk, WindowRect::new(100, 100, MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT));
        let grown = resize_rect(vp, ResizeHandle::Se, start, pos(500, 400), pos(5_000, 5_000));
        assert_eq!(grown, WindowRect::new(100, 100, 924, 640));
    }

    #[test]
    fn resize_north_west_anchors_opposite_edge() {
        let vp = Viewport::new(1024, 768);
        let start = WindowRect::new(100, 100, 400, 300);
        let out = resize_rect(vp, ResizeHandle::Nw, start, pos(100, 100), pos(60, 70));
        assert_eq!(out, WindowRect::new(60, 70, 440, 330));
        assert_eq!(out.right(), start.right());
        assert_eq!(out.bottom(), start.bottom());
        let clamped = resize_rect(vp, ResizeHandle::Nw, start, pos(100, 100), pos(400, 400));
        assert_eq!(clamped, WindowRect::new(240, 240, MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT));
    }

    #[test]
    fn resize_west_past_the_edge_stops_at_the_viewport() {
        let vp = Viewport::new(1024, 768);
        let start = WindowRect::new(10, 10, 1000, 400);
        let out = resize_rect(vp, ResizeHandle::W, start, pos(10, 200), pos(-200, 200));
        assert_eq!(out, WindowRect::new(0, 10, 1010, 400));
        assert_eq!(out.right(), start.right());

        let start = WindowRect::new(100, 20, 400, 700);
        let out = resize_rect(vp, ResizeHandle::N, start, pos(300, 20), pos(300, -500));
        assert_eq!(out, WindowRect::new(100, 0, 400, 720));
        assert!(out.bottom() <= vp.usable_height());
    }

    #[test]
    fn resize_via_handle_updates_window() {
        let (mut windows, mut adapter) = setup();
        adapter.handle_pointer_down(&mut windows, &win(), ResizeHandle::E, 2, PointerButton::Primary, pos(500, 200));
        let dispatch = adapter.pointer_move(&mut windows, 2, pos(560, 260));
        assert_eq!(dispatch.rect, Some(WindowRect::new(100, 100, 460, 300)));
        assert_eq!(windows.get(&win()).map(|w| w.rect), dispatch.rect);
    }

    #[test]
    fn forget_window_drops_gesture() {
        let (mut windows, mut adapter) = setup();
        adapter.title_pointer_down(&mut windows, &win(), 1, PointerButton::Primary, pos(110, 110), false);
        assert!(adapter.forget_window(&win()));
        assert_eq!(adapter.active_window(), None);
    }
}
