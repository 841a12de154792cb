// Admission counting tests

use statuscast::routes::{SessionGuard, try_admit};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_admits_up_to_cap_and_rejects_next() {
    let open = AtomicUsize::new(0);
    let max = 5;
    for n in 0..max {
        assert!(try_admit(&open, max), "connection {} should be admitted", n);
    }
    assert!(!try_admit(&open, max), "connection past cap must be rejected");
    assert_eq!(open.load(Ordering::Acquire), max);
}

#[test]
fn test_rejected_attempt_does_not_change_count() {
    let open = AtomicUsize::new(0);
    assert!(try_admit(&open, 1));
    assert!(!try_admit(&open, 1));
    assert!(!try_admit(&open, 1));
    assert_eq!(open.load(Ordering::Acquire), 1);
}

#[test]
fn test_guard_releases_slot_exactly_once() {
    let open = Arc::new(AtomicUsize::new(0));
    assert!(try_admit(&open, 1));
    let guard = SessionGuard::new(open.clone());
    drop(guard);
    assert_eq!(open.load(Ordering::Acquire), 0);

    // The freed slot is usable again.
    assert!(try_admit(&open, 1));
    assert_eq!(open.load(Ordering::Acquire), 1);
}

#[test]
fn test_concurrent_admission_never_exceeds_cap() {
    let open = Arc::new(AtomicUsize::new(0));
    let max = 5;
    let admitted = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let open = open.clone();
            let admitted = admitted.clone();
            std::thread::spawn(move || {
                if try_admit(&open, max) {
                    admitted.fetch_add(1, Ordering::AcqRel);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("join");
    }

    assert_eq!(admitted.load(Ordering::Acquire), max);
    assert_eq!(open.load(Ordering::Acquire), max);
}
