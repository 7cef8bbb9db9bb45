use super::*;

// ============================================================================
// Display formatting tests
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("queue submit failed".to_string());
    assert_eq!(format!("{}", err), "Backend error: queue submit failed");
}

#[test]
fn test_out_of_memory_display() {
    let err = Error::OutOfMemory;
    assert_eq!(format!("{}", err), "Out of GPU memory");
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("stale mesh handle".to_string());
    assert_eq!(format!("{}", err), "Invalid resource: stale mesh handle");
}

#[test]
fn test_initialization_failed_display() {
    let err = Error::InitializationFailed("no suitable GPU".to_string());
    assert_eq!(format!("{}", err), "Initialization failed: no suitable GPU");
}

// ============================================================================
// Trait tests
// ============================================================================

#[test]
fn test_error_is_std_error() {
    fn assert_std_error<E: std::error::Error>(_: &E) {}
    assert_std_error(&Error::OutOfMemory);
}

#[test]
fn test_error_is_cloneable() {
    let err = Error::InvalidResource("x".to_string());
    let cloned = err.clone();
    assert_eq!(format!("{}", err), format!("{}", cloned));
}
