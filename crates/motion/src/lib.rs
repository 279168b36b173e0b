//! Scroll physics and progress plumbing for the lightwell backdrop.
//!
//! Three cooperating pieces, each with its own frame discipline:
//!
//! ```text
//!   wheel events ──▶ InertiaEngine ──▶ scroll offset ──▶ ProgressPublisher
//!                         │ step() per frame                   │ on change
//!                         ▼                                    ▼
//!                   eased position                       ProgressStore
//!                                                              │ listeners
//!                                                              ▼
//!                                                    scene consumers (fades,
//!                                                    parallax, DampedValue)
//! ```
//!
//! [`InertiaEngine`] owns one scrollable region's intent state and eases the
//! displayed position toward a clamped target; its frame loop self-terminates
//! on convergence. [`ProgressStore`] is the single cross-component piece of
//! shared state: a keyed map of normalized progress values with clamp and
//! de-duplication built into the only writer path. [`DampedValue`] is the
//! building block for progress-driven visual parameters, stepped explicitly
//! once per frame rather than recomputed lazily.

mod damped;
mod inertia;
mod progress;

pub use damped::DampedValue;
pub use inertia::{
    InertiaEngine, InertiaOptions, ScrollRegion, StepOutcome, WheelDisposition, SETTLE_EPSILON,
};
pub use progress::{ProgressPublisher, ProgressStore};
