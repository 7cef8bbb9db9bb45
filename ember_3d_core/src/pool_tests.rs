use super::*;

// ============================================================================
// Basic insert/get tests
// ============================================================================

#[test]
fn test_insert_then_get_returns_resource() {
    let mut pool: ResourcePool<String> = ResourcePool::new();
    let h = pool.insert("vertex buffer".to_string());
    assert_eq!(pool.get(h).map(String::as_str), Some("vertex buffer"));
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_sequential_inserts_get_distinct_handles() {
    let mut pool: ResourcePool<u32> = ResourcePool::new();
    let a = pool.insert(10);
    let b = pool.insert(20);
    let c = pool.insert(30);
    assert_ne!(a, b);
    assert_ne!(b, c);
    assert_eq!(pool.get(a), Some(&10));
    assert_eq!(pool.get(b), Some(&20));
    assert_eq!(pool.get(c), Some(&30));
}

#[test]
fn test_new_pool_is_empty() {
    let pool: ResourcePool<u32> = ResourcePool::new();
    assert!(pool.is_empty());
    assert_eq!(pool.len(), 0);
    assert_eq!(pool.slot_count(), 0);
}

#[test]
fn test_invalid_sentinel_never_resolves() {
    let mut pool: ResourcePool<u32> = ResourcePool::new();
    pool.insert(1);
    assert_eq!(pool.get(Handle::INVALID), None);
    assert!(!pool.contains(Handle::INVALID));
}

#[test]
fn test_out_of_range_handle_returns_none() {
    let pool: ResourcePool<u32> = ResourcePool::new();
    let bogus: Handle<u32> = Handle::from_parts(99, 0);
    assert_eq!(pool.get(bogus), None);
}

// ============================================================================
// Remove and stale-handle tests
// ============================================================================

#[test]
fn test_remove_returns_resource_and_invalidates() {
    let mut pool: ResourcePool<u32> = ResourcePool::new();
    let h = pool.insert(7);

    assert_eq!(pool.remove(h), Some(7));
    assert_eq!(pool.get(h), None);
    assert_eq!(pool.len(), 0);

    // Double remove is a no-op
    assert_eq!(pool.remove(h), None);
}

#[test]
fn test_reused_slot_rejects_stale_handle() {
    let mut pool: ResourcePool<&str> = ResourcePool::new();
    let old = pool.insert("first");
    pool.remove(old);

    // The freed slot is recycled for the next insert...
    let new = pool.insert("second");
    assert_eq!(new.index(), old.index());

    // ...but the stale handle does not see the new occupant.
    assert_eq!(pool.get(old), None);
    assert_eq!(pool.get(new), Some(&"second"));
    assert_ne!(old, new);
}

#[test]
fn test_remove_with_stale_handle_leaves_new_occupant() {
    let mut pool: ResourcePool<u32> = ResourcePool::new();
    let old = pool.insert(1);
    pool.remove(old);
    let new = pool.insert(2);

    // A destroy through the stale handle must not evict the newcomer.
    assert_eq!(pool.remove(old), None);
    assert_eq!(pool.get(new), Some(&2));
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_slot_reuse_bounds_storage() {
    let mut pool: ResourcePool<u32> = ResourcePool::new();

    // Churn: create/destroy repeatedly — storage must not grow past the
    // peak live count.
    for round in 0..100u32 {
        let h = pool.insert(round);
        pool.remove(h);
    }
    assert_eq!(pool.slot_count(), 1);
    assert!(pool.is_empty());
}

// ============================================================================
// get_mut / drain / iter tests
// ============================================================================

#[test]
fn test_get_mut_updates_in_place() {
    let mut pool: ResourcePool<u32> = ResourcePool::new();
    let h = pool.insert(1);
    *pool.get_mut(h).unwrap() = 99;
    assert_eq!(pool.get(h), Some(&99));
}

#[test]
fn test_get_mut_rejects_stale_handle() {
    let mut pool: ResourcePool<u32> = ResourcePool::new();
    let old = pool.insert(1);
    pool.remove(old);
    pool.insert(2);
    assert!(pool.get_mut(old).is_none());
}

#[test]
fn test_drain_empties_pool_and_stales_handles() {
    let mut pool: ResourcePool<u32> = ResourcePool::new();
    let a = pool.insert(1);
    let b = pool.insert(2);

    let mut drained = pool.drain();
    drained.sort();
    assert_eq!(drained, vec![1, 2]);
    assert!(pool.is_empty());
    assert_eq!(pool.get(a), None);
    assert_eq!(pool.get(b), None);

    // Slots are reusable after a drain
    let c = pool.insert(3);
    assert_eq!(pool.get(c), Some(&3));
}

#[test]
fn test_iter_visits_only_live_entries() {
    let mut pool: ResourcePool<u32> = ResourcePool::new();
    let a = pool.insert(1);
    pool.insert(2);
    pool.insert(3);
    pool.remove(a);

    let mut live: Vec<u32> = pool.iter().copied().collect();
    live.sort();
    assert_eq!(live, vec![2, 3]);
}
