//! Spec §8 scenario 4: "Suspend/resume handshake."
//!
//! Shortened from the original driver's ~2 second wall-clock wait to a
//! short busy-wait; what's asserted is the relative ordering of the three
//! messages, not timing.
use std::os::raw::c_void;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uthreads::api;

static LOG: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

extern "C" fn suspend_test(_arg: *mut c_void) -> *mut c_void {
    LOG.lock().unwrap().push("before");
    api::suspend(api::self_tid()).expect("suspend failed");
    LOG.lock().unwrap().push("after");
    std::ptr::null_mut()
}

extern "C" fn resume_test(arg: *mut c_void) -> *mut c_void {
    let sus_tid = arg as usize;
    let start = Instant::now();
    while start.elapsed() < Duration::from_millis(20) {}
    LOG.lock().unwrap().push("between");
    api::resume(sus_tid).expect("resume failed");
    std::ptr::null_mut()
}

#[test]
fn suspended_thread_runs_again_only_after_being_resumed() {
    api::init(1000).expect("init failed");

    let sus_tid = api::create(suspend_test, std::ptr::null_mut()).expect("create failed");
    let res_tid =
        api::create(resume_test, sus_tid as *mut c_void).expect("create failed");

    api::join(sus_tid).expect("join failed");
    api::join(res_tid).expect("join failed");

    let log = LOG.lock().unwrap();
    assert_eq!(*log, vec!["before", "between", "after"]);
}
