//! Spec §8 scenario 5: "Even/odd return."
use std::os::raw::c_void;

use uthreads::api;

extern "C" fn exit_test(_arg: *mut c_void) -> *mut c_void {
    let tid = api::self_tid();
    Box::into_raw(Box::new(tid % 2 == 0)) as *mut c_void
}

#[test]
fn join_returns_the_expected_parity_bool() {
    api::init(1000).expect("init failed");

    let ids: Vec<usize> = (0..12)
        .map(|_| api::create(exit_test, std::ptr::null_mut()).expect("create failed"))
        .collect();

    for tid in ids {
        let retval = api::join(tid).expect("join failed");
        let value = retval.map(|p| unsafe { *Box::from_raw(p as *mut bool) });
        assert_eq!(value, Some(tid % 2 == 0));
    }
}
