//! Frame pacing bookkeeping
//!
//! CPU-side state for the multi-buffered frame protocol: which of the N
//! frame slots is being recorded, whether a frame is currently open, and
//! how many draws have been written into the frame's uniform ring. The
//! Vulkan coordinator pairs this with the actual fences and semaphores;
//! keeping the arithmetic here makes the pacing rules host-testable.

/// Number of frames the CPU may record ahead of the GPU.
///
/// The wait on frame slot K's fence at the top of `begin_frame` is the
/// backpressure bound: recording of frame K+N blocks until frame K's GPU
/// work is confirmed complete.
pub const FRAMES_IN_FLIGHT: usize = 2;

/// Slot and draw-cursor bookkeeping for frames in flight
#[derive(Debug)]
pub struct FramePacer {
    current: usize,
    frame_counter: u64,
    frame_open: bool,
    draw_cursor: u32,
    max_draws_per_frame: u32,
}

impl FramePacer {
    /// Create a pacer with the given per-frame draw capacity (the uniform
    /// ring slot count)
    pub fn new(max_draws_per_frame: u32) -> Self {
        Self {
            current: 0,
            frame_counter: 0,
            frame_open: false,
            draw_cursor: 0,
            max_draws_per_frame,
        }
    }

    /// Slot index for the frame currently being recorded (or the next one
    /// to record)
    pub fn current_slot(&self) -> usize {
        self.current
    }

    /// Total frames begun since creation
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    /// Whether a frame is open (between `begin_frame` and `end_frame`)
    pub fn is_frame_open(&self) -> bool {
        self.frame_open
    }

    /// Per-frame draw capacity
    pub fn max_draws_per_frame(&self) -> u32 {
        self.max_draws_per_frame
    }

    /// Mark the current slot's frame as open and reset the draw cursor
    pub fn open_frame(&mut self) {
        self.frame_open = true;
        self.draw_cursor = 0;
        self.frame_counter += 1;
    }

    /// Claim the next draw slot within the open frame.
    ///
    /// Returns the draw index (the uniform-ring slot for this draw), or
    /// `None` when no frame is open or the ring is full.
    pub fn claim_draw(&mut self) -> Option<u32> {
        if !self.frame_open || self.draw_cursor >= self.max_draws_per_frame {
            return None;
        }
        let index = self.draw_cursor;
        self.draw_cursor += 1;
        Some(index)
    }

    /// Number of draws recorded in the open frame so far
    pub fn draws_recorded(&self) -> u32 {
        self.draw_cursor
    }

    /// Close the frame and advance to the next slot.
    ///
    /// The slot index advances unconditionally, matching the submit path:
    /// even a frame that recorded nothing rotates its fence/semaphore set.
    pub fn close_frame(&mut self) {
        self.frame_open = false;
        self.current = (self.current + 1) % FRAMES_IN_FLIGHT;
    }

    /// Abandon an open frame without advancing (skip-frame path: the
    /// command buffer was never submitted, so the slot's sync objects are
    /// still in their pre-frame state and can be reused next tick)
    pub fn abandon_frame(&mut self) {
        self.frame_open = false;
        self.draw_cursor = 0;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
