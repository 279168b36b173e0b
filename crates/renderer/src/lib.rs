//! Backdrop renderer for lightwell.
//!
//! The crate owns everything between "a scene wants a glowing pillar behind
//! it" and "pixels on a surface", including the decision not to render at
//! all. The overall flow is:
//!
//! ```text
//!   host (viewer / scene)
//!          │ PillarParams + RegionSize
//!          ▼
//!   PillarRenderer::mount ──▶ capability probe ──▶ GpuContext ──▶ pipeline
//!          │                        │ false                │ error
//!          │                        └────────┬─────────────┘
//!          ▼                                 ▼
//!   tick()/resize()/set_pointer()      HazeLayer (static fallback,
//!          │                           always present under the GPU layer)
//!          ▼
//!   unmount(): releases bindings, program, surface, in that order
//! ```
//!
//! `mount` never lets an initialisation error escape: every failure path
//! (reduced motion, no 3D acceleration, empty region, GPU throw) collapses
//! to "no session", and the caller leans on the haze layer instead. A live
//! session is exclusively owned by [`PillarRenderer`]; runtime render
//! failures tear it down in place so a scheduled frame can never touch a
//! disposed surface.

mod capability;
mod gpu;
mod haze;
mod pacing;
mod session;
mod types;

pub use capability::probe;
pub use haze::HazeLayer;
pub use pacing::FramePacer;
pub use session::{PillarRenderer, TickOutcome};
pub use types::{BlendMode, MountError, PillarParams, RegionSize};
