//! Typed resource handles
//!
//! Every GPU resource owned by the render core is addressed through an
//! opaque `Handle<T>`: a slot index paired with a generation counter. The
//! generation is bumped each time a pool slot is freed, so a handle held
//! past `destroy_*` fails validation instead of silently referencing
//! whatever resource later reuses the slot.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Opaque identifier for a pooled resource of type `T`.
///
/// Handles are plain `Copy` values and cheap to pass around. A handle is
/// only meaningful to the pool (and render core instance) that issued it.
///
/// The reserved [`Handle::INVALID`] sentinel never refers to a live
/// resource; it is what failed creation paths hand back in FFI-ish
/// contexts and what default-initialized fields hold.
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Sentinel value denoting "no resource"
    pub const INVALID: Handle<T> = Handle {
        index: u32::MAX,
        generation: 0,
        _marker: PhantomData,
    };

    /// Build a handle from raw parts (pool-internal)
    pub(crate) fn from_parts(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot index in the owning pool
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation the slot had when this handle was issued
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Whether this handle is the invalid sentinel.
    ///
    /// Note: a non-sentinel handle may still be stale; only the owning
    /// pool can tell (see `ResourcePool::get`).
    pub fn is_valid(&self) -> bool {
        self.index != u32::MAX
    }
}

// Manual impls: derive would bound on T, but handles are just indices.

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::INVALID
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Handle({}v{})", self.index, self.generation)
        } else {
            write!(f, "Handle(invalid)")
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
