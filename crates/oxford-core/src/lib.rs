#![forbid(unsafe_code)]

//! Core building blocks for the Oxford Online desktop.
//!
//! # Role
//! `oxford-core` owns everything the desktop needs from its host without
//! touching a display:
//! - **Geometry**: window rectangles and the viewport minus the taskbar strip.
//! - **Time**: a host-advanced monotonic clock plus wall-clock formatting.
//! - **Timers**: a deadline queue with cooperative cancellation tokens.
//! - **Randomness**: an injectable source so scripted behavior is reproducible.
//! - **Storage**: key-value backends with JSON load/save and defensive defaults.
//!
//! Higher layers (`oxford-shell`, `oxford-apps`) never read the system clock,
//! never call an RNG directly and never block.

pub mod cancellation;
pub mod clock;
pub mod geometry;
pub mod html;
pub mod logging;
pub mod random;
pub mod storage;
pub mod timer;

pub use cancellation::{CancellationSource, CancellationToken};
pub use clock::HostClock;
pub use geometry::{Point, TASKBAR_HEIGHT, Viewport, WindowRect};
pub use random::{RandomSource, SeededRandom, SequenceRandom};
pub use storage::{MemoryStorage, StorageBackend, StorageError};
pub use timer::{TimerId, TimerQueue};

// Re-export tracing macros at crate root for ergonomic use.
pub use logging::{debug, debug_span, error, info, info_span, trace, warn};
