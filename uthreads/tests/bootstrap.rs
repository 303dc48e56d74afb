//! Spec §8 scenario 1: "Bootstrap identity."
use std::time::{Duration, Instant};
use uthreads::api;

#[test]
fn self_tid_is_zero_and_accumulates_quantums() {
    api::init(1000).expect("init failed");

    assert_eq!(api::self_tid(), 0);

    // Busy-wait long enough for several 1ms quanta to be preempted through.
    let start = Instant::now();
    while start.elapsed() < Duration::from_millis(50) {}

    assert!(api::get_quantums(0).unwrap_or(0) >= 1);
}
