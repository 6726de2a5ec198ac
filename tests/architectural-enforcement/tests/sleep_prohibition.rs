//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the TUI and the assistant core MUST NOT call
//! sleep methods. Resolution delays and reveal ticks are deadlines; loops
//! wait on `sleep_until(deadline)` or on I/O.
//! **Exceptions**: test code

use architectural_enforcement::{assert_no_violations, rust_files, scan_production};

fn is_sleep_call(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(")
}

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations: Vec<_> = ["assistant/core/src", "tui/src"]
        .into_iter()
        .flat_map(rust_files)
        .flat_map(|path| scan_production(&path, is_sleep_call))
        .collect();

    assert_no_violations("Sleep calls in production code (wait on a deadline instead)", &violations);
}

#[test]
fn test_sleep_detection() {
    assert!(is_sleep_call("tokio::time::sleep(Duration::from_millis(16)).await;"));
    assert!(is_sleep_call("std::thread::sleep(d);"));
    assert!(!is_sleep_call("tokio::time::sleep_until(deadline).await"));
}
