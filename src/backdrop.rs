use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use crate::{
    anim_tween::SpotDriver,
    clock::FrameClock,
    composite_cpu,
    core::Viewport,
    error::{BackdropError, BackdropResult},
    model::{GradientSpot, Palette},
    render_cpu::{self, FrameStats},
    surface::Surface,
};

/// Shared teardown flag for the drive loop.
///
/// [`Backdrop::unmount`] trips it; [`drive`] observes it every iteration, so
/// no frame callback or tween outlives the component. Clones share the flag,
/// so a host may also trip it from another context.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// The ambient backdrop component.
///
/// Owns the spot set, the tween driver and the pixel surface, and exposes the
/// mount/resize/tick/unmount lifecycle of a full-viewport visual layer. It
/// has no inputs besides the viewport and palette chosen at mount and no
/// output besides its pixels.
///
/// A backdrop whose surface could not be acquired (empty viewport) stays
/// mounted but renders nothing: every tick returns `None` and no retry is
/// attempted. This mirrors how the effect degrades in a host that refuses a
/// drawing context, without surfacing an error to the page.
#[derive(Debug)]
pub struct Backdrop {
    spots: Vec<GradientSpot>,
    driver: SpotDriver,
    surface: Option<Surface>,
    cancel: CancelHandle,
    mounted: bool,
}

impl Backdrop {
    /// Mount with the built-in three-spot palette.
    pub fn mount(viewport: Viewport) -> BackdropResult<Self> {
        Self::mount_with(viewport, Palette::default())
    }

    /// Mount with a caller-provided palette.
    ///
    /// Fails only on an invalid palette; an unacquirable surface degrades
    /// silently as described on [`Backdrop`].
    pub fn mount_with(viewport: Viewport, palette: Palette) -> BackdropResult<Self> {
        palette.validate()?;
        let driver = SpotDriver::new(&palette.spots, palette.seed)?;
        let surface = match Surface::new(viewport) {
            Ok(surface) => Some(surface),
            Err(err) => {
                tracing::warn!(%err, "backdrop surface unavailable, rendering nothing");
                None
            }
        };
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            spots = palette.spots.len(),
            "backdrop mounted"
        );
        Ok(Self {
            spots: palette.spots,
            driver,
            surface,
            cancel: CancelHandle::new(),
            mounted: true,
        })
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Handle observed by [`drive`]; cancelled on unmount.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Current spot values, as most recently written by the driver.
    pub fn spots(&self) -> &[GradientSpot] {
        &self.spots
    }

    /// The drawing surface, when one was acquired.
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Surface dimensions, when a surface was acquired.
    pub fn viewport(&self) -> Option<Viewport> {
        self.surface.as_ref().map(Surface::viewport)
    }

    /// Re-apply the surface size after a host viewport change.
    ///
    /// Ignored after unmount. An empty viewport skips the resize rather than
    /// failing; the surface keeps its previous dimensions.
    pub fn resize(&mut self, viewport: Viewport) {
        if !self.mounted {
            return;
        }
        if viewport.is_empty() {
            tracing::debug!(
                width = viewport.width,
                height = viewport.height,
                "ignoring resize to empty viewport"
            );
            return;
        }
        if let Some(surface) = self.surface.as_mut()
            && let Err(err) = surface.resize(viewport)
        {
            tracing::warn!(%err, "backdrop resize failed, keeping previous surface");
        }
    }

    /// Advance the tweens to `elapsed_s` seconds and repaint.
    ///
    /// Returns the frame's stats, or `None` when unmounted or when no surface
    /// is available.
    pub fn tick(&mut self, elapsed_s: f64) -> Option<FrameStats> {
        if !self.mounted {
            return None;
        }
        let surface = self.surface.as_mut()?;
        self.driver.advance(&mut self.spots, elapsed_s);
        Some(render_cpu::draw_frame(surface, &self.spots))
    }

    /// Screen-composite the current frame over an opaque backdrop buffer.
    ///
    /// A no-op when no surface is available.
    pub fn present_over(&self, page: &mut [u8]) -> BackdropResult<()> {
        match self.surface.as_ref() {
            Some(surface) => composite_cpu::screen_over_in_place(page, surface.data()),
            None => Ok(()),
        }
    }

    /// Tear down: stop resize handling and cancel the drive loop and tweens.
    ///
    /// Idempotent. After this, `resize` is ignored and `tick` returns `None`.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.cancel.cancel();
        tracing::debug!("backdrop unmounted");
    }
}

impl Drop for Backdrop {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Options for [`drive`].
#[derive(Clone, Copy, Debug)]
pub struct DriveOpts {
    /// Redraw cadence to aim for.
    pub target_fps: u32,
    /// Stop after this many frames; `None` runs until cancelled.
    pub max_frames: Option<u64>,
}

impl Default for DriveOpts {
    fn default() -> Self {
        Self {
            target_fps: 60,
            max_frames: None,
        }
    }
}

/// Aggregated drive-loop counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriveStats {
    pub frames: u64,
    pub spots_drawn: u64,
}

/// Redraw `backdrop` on a wall-clock loop until its cancel handle fires.
///
/// Stands in for a display-synchronized callback: each iteration ticks a
/// [`FrameClock`], redraws, then sleeps out the remainder of the frame
/// budget. Hosts with a real vsync source should call [`Backdrop::tick`]
/// from their own callback instead.
pub fn drive(backdrop: &mut Backdrop, opts: DriveOpts) -> BackdropResult<DriveStats> {
    if opts.target_fps == 0 {
        return Err(BackdropError::validation("drive target_fps must be >= 1"));
    }
    let frame_budget = Duration::from_secs_f64(1.0 / f64::from(opts.target_fps));
    let cancel = backdrop.cancel_handle();
    let mut clock = FrameClock::new();
    let mut stats = DriveStats::default();

    while !cancel.is_cancelled() {
        if let Some(max) = opts.max_frames
            && stats.frames >= max
        {
            break;
        }
        let ft = clock.tick();
        let Some(frame) = backdrop.tick(ft.elapsed) else {
            break;
        };
        stats.frames += 1;
        stats.spots_drawn += u64::from(frame.spots_drawn);

        let spent = ft.now.elapsed();
        if spent < frame_budget {
            std::thread::sleep(frame_budget - spent);
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmount_cancels_and_is_idempotent() {
        let mut b = Backdrop::mount(Viewport::new(64, 64)).unwrap();
        let handle = b.cancel_handle();
        assert!(!handle.is_cancelled());
        b.unmount();
        assert!(handle.is_cancelled());
        assert!(!b.is_mounted());
        b.unmount();
        assert!(!b.is_mounted());
    }

    #[test]
    fn drop_cancels_the_handle() {
        let handle;
        {
            let b = Backdrop::mount(Viewport::new(8, 8)).unwrap();
            handle = b.cancel_handle();
        }
        assert!(handle.is_cancelled());
    }

    #[test]
    fn empty_viewport_degrades_to_no_op() {
        let mut b = Backdrop::mount(Viewport::new(0, 0)).unwrap();
        assert!(b.is_mounted());
        assert!(b.viewport().is_none());
        assert!(b.tick(0.0).is_none());

        // No retry: a later resize does not conjure a surface.
        b.resize(Viewport::new(640, 480));
        assert!(b.viewport().is_none());
        assert!(b.tick(1.0).is_none());
    }

    #[test]
    fn invalid_palette_is_an_error() {
        let palette = Palette {
            seed: 0,
            spots: vec![],
        };
        assert!(Backdrop::mount_with(Viewport::new(64, 64), palette).is_err());
    }

    #[test]
    fn drive_stops_at_max_frames() {
        let mut b = Backdrop::mount(Viewport::new(16, 16)).unwrap();
        let stats = drive(
            &mut b,
            DriveOpts {
                target_fps: 240,
                max_frames: Some(3),
            },
        )
        .unwrap();
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.spots_drawn, 9);
    }

    #[test]
    fn drive_exits_immediately_when_cancelled() {
        let mut b = Backdrop::mount(Viewport::new(16, 16)).unwrap();
        b.cancel_handle().cancel();
        let stats = drive(&mut b, DriveOpts::default()).unwrap();
        assert_eq!(stats.frames, 0);
    }

    #[test]
    fn drive_rejects_zero_fps() {
        let mut b = Backdrop::mount(Viewport::new(16, 16)).unwrap();
        assert!(
            drive(
                &mut b,
                DriveOpts {
                    target_fps: 0,
                    max_frames: None,
                },
            )
            .is_err()
        );
    }
}
