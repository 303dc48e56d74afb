//! Spec §8 boundary behavior and round-trip properties not already covered
//! by the named end-to-end scenarios.
use std::os::raw::c_void;
use std::time::{Duration, Instant};

use uthreads::api;
use uthreads::error::UthreadError;
use uthreads::MAX_THREAD_NUM;

extern "C" fn park(_arg: *mut c_void) -> *mut c_void {
    api::yield_now();
    std::ptr::null_mut()
}

#[test]
fn capacity_self_join_and_idempotent_join_after_finish() {
    api::init(1000).expect("init failed");

    // Creating the (MAX_THREAD_NUM - 1)th user thread succeeds (bootstrap
    // already occupies slot 0); the next create must fail.
    let mut ids = Vec::new();
    for _ in 0..MAX_THREAD_NUM - 1 {
        ids.push(api::create(park, std::ptr::null_mut()).expect("create should succeed"));
    }
    match api::create(park, std::ptr::null_mut()) {
        Err(UthreadError::CapacityExceeded) => {}
        other => panic!("expected CapacityExceeded, got {other:?}"),
    }

    // self() differs from the id just returned by create (spec §8: "After
    // any successful create, self() returns an id different from the
    // returned new id").
    let self_before = api::self_tid();
    assert_ne!(self_before, *ids.last().unwrap());

    // join(self) is an error.
    match api::join(self_before) {
        Err(UthreadError::SelfJoin(tid)) => assert_eq!(tid, self_before),
        other => panic!("expected SelfJoin, got {other:?}"),
    }

    for tid in ids {
        api::join(tid).expect("join failed");
    }

    // yield with an empty ready queue doesn't switch and bumps quantum by 1.
    let before = api::get_quantums(api::self_tid()).unwrap();
    api::yield_now();
    let after = api::get_quantums(api::self_tid()).unwrap();
    assert_eq!(after, before + 1);

    // A finished thread's return value is delivered exactly once; a second
    // join on the same (now-reaped) tid returns success with no value.
    extern "C" fn finish_now(_arg: *mut c_void) -> *mut c_void {
        42usize as *mut c_void
    }
    let tid = api::create(finish_now, std::ptr::null_mut()).expect("create failed");
    // Give the new thread a chance to run to completion.
    let start = Instant::now();
    while start.elapsed() < Duration::from_millis(10) {
        api::yield_now();
    }
    let first = api::join(tid).expect("first join failed");
    assert_eq!(first, Some(42usize as *mut c_void));
    let second = api::join(tid).expect("second join failed");
    assert_eq!(second, None);

    // resume() on a tid that isn't suspended is a no-op success.
    api::resume(self_before).expect("resume on non-suspended tid should be a no-op");
}
