//! Unit tests for debug.rs
//!
//! The counters are process-wide, so everything runs in one test.

use super::*;

#[test]
fn test_error_counters_and_offenders() {
    reset_gl_error_stats();
    assert_eq!(get_gl_error_stats().total(), 0);
    assert!(gl_error_offenders().is_empty());

    assert_eq!(record_gl_error("glBindBuffer", glow::INVALID_OPERATION), 1);
    assert_eq!(record_gl_error("glBindBuffer", glow::INVALID_OPERATION), 2);
    record_gl_error("glTexImage3D", glow::OUT_OF_MEMORY);
    record_gl_error("glEnable", 0x9999);

    let stats = get_gl_error_stats();
    assert_eq!(stats.invalid_operation, 2);
    assert_eq!(stats.out_of_memory, 1);
    assert_eq!(stats.other, 1);
    assert_eq!(stats.total(), 4);

    let offenders = gl_error_offenders();
    assert_eq!(offenders[0], ("glBindBuffer", 2));
    assert_eq!(offenders.len(), 3);

    reset_gl_error_stats();
    assert_eq!(get_gl_error_stats(), GlErrorStats::default());
    assert!(gl_error_offenders().is_empty());
}
