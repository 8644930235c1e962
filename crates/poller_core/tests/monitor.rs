use poller_core::{RowCountDrift, RowCountMemory};

#[test]
fn first_observation_never_drifts() {
    let mut memory = RowCountMemory::new();

    assert_eq!(memory.observe("https://a.example", 3), None);
}

#[test]
fn count_change_reports_previous_and_current() {
    let mut memory = RowCountMemory::new();
    assert_eq!(memory.observe("https://a.example", 3), None);

    let drift = memory.observe("https://a.example", 2);

    assert_eq!(
        drift,
        Some(RowCountDrift {
            previous: 3,
            current: 2,
        })
    );
}

#[test]
fn drift_is_relative_to_the_immediately_previous_cycle() {
    let mut memory = RowCountMemory::new();
    assert_eq!(memory.observe("https://a.example", 3), None);
    assert!(memory.observe("https://a.example", 2).is_some());

    // The memory was updated to 2 even though that cycle drifted.
    assert_eq!(memory.observe("https://a.example", 2), None);
}

#[test]
fn sources_are_tracked_independently() {
    let mut memory = RowCountMemory::new();
    assert_eq!(memory.observe("https://a.example", 3), None);

    assert_eq!(memory.observe("https://b.example", 5), None);
    assert_eq!(
        memory.observe("https://a.example", 4),
        Some(RowCountDrift {
            previous: 3,
            current: 4,
        })
    );
}

#[test]
fn fresh_memory_forgets_counts_from_a_previous_run() {
    let mut memory = RowCountMemory::new();
    assert_eq!(memory.observe("https://a.example", 3), None);

    // A restart constructs a new memory; the old counts must not leak in.
    let mut restarted = RowCountMemory::new();
    assert_eq!(restarted.observe("https://a.example", 7), None);
}
