//! Spec §8 scenario 2: "Round-robin fairness."
use std::os::raw::c_void;
use std::sync::Mutex;

use uthreads::api;

static LOG: Mutex<Vec<String>> = Mutex::new(Vec::new());

extern "C" fn yield_test(arg: *mut c_void) -> *mut c_void {
    let tid = arg as usize;
    LOG.lock().unwrap().push(format!("A({tid})"));
    api::yield_now();
    LOG.lock().unwrap().push(format!("B({tid})"));
    std::ptr::null_mut()
}

#[test]
fn no_thread_sees_back_to_back_a_b_messages() {
    api::init(1000).expect("init failed");

    let ids: Vec<usize> = (0..10)
        .map(|tid| api::create(yield_test, tid as *mut c_void).expect("create failed"))
        .collect();
    for tid in ids {
        api::join(tid).expect("join failed");
    }

    let log = LOG.lock().unwrap();
    for (i, entry) in log.iter().enumerate() {
        if let Some(k) = entry.strip_prefix('A').and_then(|s| s.strip_suffix(')')) {
            let k = &k[1..]; // drop the leading '('
            if let Some(next) = log.get(i + 1) {
                assert_ne!(
                    next,
                    &format!("B({k})"),
                    "thread {k}'s A and B messages were adjacent with nothing scheduled between"
                );
            }
        }
    }
}
