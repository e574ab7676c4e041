//! Platform abstraction layer
//!
//! Frame scheduling is the only platform seam the simulation needs:
//! - `ManualScheduler`: virtual time, driven by tests and the headless runner
//! - `web::RafScheduler`: `requestAnimationFrame` in the browser (wasm32)

#[cfg(target_arch = "wasm32")]
pub mod web;

use glam::Vec2;

/// Requests and cancels the next frame callback
///
/// Both calls must be idempotent: requesting twice before the frame runs is a
/// single frame, cancelling with nothing pending is a no-op.
pub trait FrameScheduler {
    fn request_frame(&mut self);
    fn cancel_frame(&mut self);
}

/// Scheduler for virtual time: the driver polls `take_frame` and runs the
/// session's frame callback itself
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    pending: bool,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the pending frame, if any
    pub fn take_frame(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Total frame requests seen
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Total cancellations of a pending frame
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {
        if !self.pending {
            self.pending = true;
            self.requested += 1;
        }
    }

    fn cancel_frame(&mut self) {
        if self.pending {
            self.pending = false;
            self.cancelled += 1;
        }
    }
}

/// Display size of the host surface, unknown until the first valid resize
///
/// Pointer and touch coordinates are only meaningful relative to a known size,
/// so callers drop those events while `size` is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DisplaySurface {
    size: Option<Vec2>,
}

impl DisplaySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new size; empty or non-finite sizes are rejected and the
    /// previous size is kept
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        let valid = width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0;
        if !valid {
            log::debug!("Ignoring surface size {}x{}", width, height);
            return false;
        }
        self.size = Some(Vec2::new(width, height));
        true
    }

    pub fn size(&self) -> Option<Vec2> {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_unknown_until_resized() {
        let mut surface = DisplaySurface::new();
        assert_eq!(surface.size(), None);
        assert!(surface.resize(960.0, 1280.0));
        assert_eq!(surface.size(), Some(Vec2::new(960.0, 1280.0)));
    }

    #[test]
    fn test_surface_rejects_bad_sizes() {
        let mut surface = DisplaySurface::new();
        assert!(!surface.resize(0.0, 600.0));
        assert!(!surface.resize(800.0, -1.0));
        assert!(!surface.resize(f32::NAN, 600.0));
        assert!(!surface.resize(f32::INFINITY, 600.0));
        assert_eq!(surface.size(), None);

        surface.resize(800.0, 600.0);
        assert!(!surface.resize(0.0, 0.0));
        assert_eq!(surface.size(), Some(Vec2::new(800.0, 600.0)));
    }

    #[test]
    fn test_manual_scheduler_is_idempotent() {
        let mut scheduler = ManualScheduler::new();
        scheduler.request_frame();
        scheduler.request_frame();
        assert_eq!(scheduler.requested(), 1);
        scheduler.cancel_frame();
        scheduler.cancel_frame();
        assert_eq!(scheduler.cancelled(), 1);
        assert!(!scheduler.take_frame());
    }

    #[test]
    fn test_take_frame_consumes() {
        let mut scheduler = ManualScheduler::new();
        scheduler.request_frame();
        assert!(scheduler.take_frame());
        assert!(!scheduler.take_frame());
    }
}
