#![forbid(unsafe_code)]

//! Window chrome for the Oxford Online desktop.
//!
//! # Role
//! `oxford-shell` is the layer every app window is built on:
//! - **Window shells** ([`window`]): registry, visibility, maximize and the
//!   global z-order counter.
//! - **Drag/resize** ([`pointer`]): a single-pointer capture adapter that
//!   moves and resizes shells inside the viewport.
//! - **Taskbar** ([`taskbar`]): single-selection registry of window buttons.
//! - **Lifecycle** ([`app`]): the create-once open/minimize/maximize/close
//!   contract shared by app controllers.
//!
//! Nothing here renders. Hosts read the records and draw them.

pub mod app;
pub mod pointer;
pub mod taskbar;
pub mod window;

pub use app::{AppWindow, AppWindowSpec, ControlOutcome, OpenOutcome, Shell};
pub use pointer::{
    PointerButton, PointerCaptureCommand, PointerDispatch, PointerIgnoredReason, PointerLogOutcome,
    ResizeHandle, WindowPointerAdapter,
};
pub use taskbar::{TaskbarEntry, TaskbarOptions, TaskbarRegistry};
pub use window::{
    ControlButton, ShellConfig, Surface, WindowControls, WindowId, WindowManager, WindowRecord,
};
