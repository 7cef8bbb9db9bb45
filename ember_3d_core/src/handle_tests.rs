use super::*;

struct Dummy;

// ============================================================================
// Sentinel tests
// ============================================================================

#[test]
fn test_invalid_sentinel() {
    let h: Handle<Dummy> = Handle::INVALID;
    assert!(!h.is_valid());
    assert_eq!(h.index(), u32::MAX);
}

#[test]
fn test_default_is_invalid() {
    let h: Handle<Dummy> = Handle::default();
    assert_eq!(h, Handle::INVALID);
}

#[test]
fn test_from_parts_is_valid() {
    let h: Handle<Dummy> = Handle::from_parts(3, 7);
    assert!(h.is_valid());
    assert_eq!(h.index(), 3);
    assert_eq!(h.generation(), 7);
}

// ============================================================================
// Equality and identity tests
// ============================================================================

#[test]
fn test_same_slot_different_generation_not_equal() {
    // A reused slot issues a new generation — the old handle must not
    // compare equal to the new one.
    let old: Handle<Dummy> = Handle::from_parts(0, 1);
    let new: Handle<Dummy> = Handle::from_parts(0, 2);
    assert_ne!(old, new);
}

#[test]
fn test_copy_semantics() {
    let a: Handle<Dummy> = Handle::from_parts(5, 1);
    let b = a;
    assert_eq!(a, b);
}

#[test]
fn test_handles_are_hashable() {
    let mut set = std::collections::HashSet::new();
    set.insert(Handle::<Dummy>::from_parts(1, 1));
    set.insert(Handle::<Dummy>::from_parts(1, 2));
    set.insert(Handle::<Dummy>::from_parts(1, 1)); // duplicate
    assert_eq!(set.len(), 2);
}

#[test]
fn test_debug_format() {
    let h: Handle<Dummy> = Handle::from_parts(4, 2);
    assert_eq!(format!("{:?}", h), "Handle(4v2)");
    assert_eq!(format!("{:?}", Handle::<Dummy>::INVALID), "Handle(invalid)");
}
