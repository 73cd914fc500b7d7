//! Colorbends paints a soft, slowly shifting multi-gradient backdrop.
//!
//! A fixed set of [`GradientSpot`]s (position, radius, color) is advanced by a
//! cooperative yoyo-tween driver and rasterized every frame onto a CPU pixel
//! surface sized to the host viewport. The output is meant to sit behind
//! foreground UI; [`screen_over_in_place`] provides the screen-blend
//! presentation step hosts apply to the whole frame.
//!
//! # Pipeline overview
//!
//! 1. **Advance**: [`SpotDriver`] writes tweened centers/radii into the spot set
//! 2. **Draw**: [`draw_frame`] clears the surface and paints one radial
//!    gradient per spot
//! 3. **Present** (optional): [`screen_over_in_place`] composites the frame
//!    over an opaque page color
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: motion offsets derive from a seed, so the
//!   same palette produces the same frames.
//! - **Premultiplied RGBA8** end-to-end: the surface holds premultiplied
//!   pixels.
//! - **Single-threaded and cooperative**: the driver writes, the renderer
//!   reads, interleaved on one thread; teardown cancels everything together.
#![forbid(unsafe_code)]

pub mod anim_ease;
pub mod anim_tween;
pub mod backdrop;
pub mod clock;
pub mod composite_cpu;
pub mod core;
pub mod error;
pub mod model;
pub mod render_cpu;
pub mod surface;

pub use anim_ease::Ease;
pub use anim_tween::{SpotDriver, Tween, motion_offset};
pub use backdrop::{Backdrop, CancelHandle, DriveOpts, DriveStats, drive};
pub use clock::{FrameClock, FrameTime};
pub use composite_cpu::{over, screen, screen_over_in_place};
pub use core::{Point, Rgba8, Rgba8Premul, Viewport};
pub use error::{BackdropError, BackdropResult};
pub use model::{GradientSpot, MAX_SPOTS, Palette};
pub use render_cpu::{FrameStats, draw_frame, fill_radial};
pub use surface::Surface;
