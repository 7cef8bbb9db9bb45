//! Swapchain lifecycle state machine
//!
//! Tracks the presentable-surface state driving swapchain recreation:
//!
//! ```text
//! Uninitialized → Ready ⇄ OutOfDate → Recreating → Ready
//! ```
//!
//! Staleness reported at present time is *deferred*: it only sets a flag,
//! consumed at the top of the next frame, so recreation never happens
//! mid-submission. While the surface is degenerate (0×0, e.g. minimized)
//! recreation aborts back to `OutOfDate` and the caller keeps skipping
//! frames until the surface reports a usable size again.

/// Lifecycle phase of the presentable surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacePhase {
    /// No swapchain exists yet
    Uninitialized,

    /// Swapchain matches the surface; frames may be rendered
    Ready,

    /// Acquire/present reported staleness or a resize was requested;
    /// the swapchain must be rebuilt before the next frame renders
    OutOfDate,

    /// Teardown/rebuild in progress
    Recreating,
}

/// Resize/recreation state machine for the swapchain manager
#[derive(Debug)]
pub struct SurfaceLifecycle {
    phase: SurfacePhase,
    resize_pending: bool,
}

impl SurfaceLifecycle {
    /// Start in `Uninitialized`
    pub fn new() -> Self {
        Self {
            phase: SurfacePhase::Uninitialized,
            resize_pending: false,
        }
    }

    /// Current phase
    pub fn phase(&self) -> SurfacePhase {
        self.phase
    }

    /// Whether frames may currently be rendered
    pub fn is_ready(&self) -> bool {
        self.phase == SurfacePhase::Ready
    }

    /// First swapchain build completed: `Uninitialized → Ready`
    pub fn initialized(&mut self) {
        self.phase = SurfacePhase::Ready;
    }

    /// Acquire reported out-of-date/suboptimal, or an external resize
    /// event arrived: `Ready → OutOfDate` (idempotent)
    pub fn mark_out_of_date(&mut self) {
        if self.phase != SurfacePhase::Uninitialized {
            self.phase = SurfacePhase::OutOfDate;
        }
    }

    /// Present reported staleness. Only records the request; the swapchain
    /// is rebuilt at the top of the next frame, never mid-submission.
    pub fn defer_resize(&mut self) {
        self.resize_pending = true;
    }

    /// Consume the deferred-resize request, if any.
    ///
    /// Returns `true` at most once per `defer_resize` call; the caller
    /// transitions to `OutOfDate` in response.
    pub fn take_deferred_resize(&mut self) -> bool {
        std::mem::take(&mut self.resize_pending)
    }

    /// Whether the manager needs a rebuild before the next frame
    pub fn needs_recreation(&self) -> bool {
        self.phase == SurfacePhase::OutOfDate || self.resize_pending
    }

    /// Begin a rebuild: `OutOfDate → Recreating`.
    ///
    /// Calling this from `Ready` (an external resize with no staleness
    /// signal yet) is allowed and equivalent. Returns `false` when no
    /// swapchain exists yet.
    pub fn begin_recreate(&mut self) -> bool {
        if self.phase == SurfacePhase::Uninitialized {
            return false;
        }
        self.phase = SurfacePhase::Recreating;
        true
    }

    /// Rebuild finished: `Recreating → Ready`
    pub fn finish_recreate(&mut self) {
        self.phase = SurfacePhase::Ready;
        self.resize_pending = false;
    }

    /// Rebuild aborted (degenerate surface size): back to `OutOfDate`,
    /// retried on a later frame
    pub fn abort_recreate(&mut self) {
        self.phase = SurfacePhase::OutOfDate;
    }
}

impl Default for SurfaceLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "surface_tests.rs"]
mod tests;
