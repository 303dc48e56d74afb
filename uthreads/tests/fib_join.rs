//! Spec §8 scenario 3: "Fibonacci join."
use std::os::raw::c_void;

use uthreads::api;

fn fib(n: usize) -> u64 {
    if n < 2 {
        return n as u64;
    }
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 2..=n {
        let next = a + b;
        a = b;
        b = next;
    }
    b
}

extern "C" fn find_fib(arg: *mut c_void) -> *mut c_void {
    let offset = arg as usize;
    let n = api::self_tid() + offset;
    Box::into_raw(Box::new(fib(n))) as *mut c_void
}

#[test]
fn joining_each_thread_returns_the_correct_fibonacci_number() {
    api::init(1000).expect("init failed");

    let offset = 5usize;
    let ids: Vec<usize> = (0..8)
        .map(|_| api::create(find_fib, offset as *mut c_void).expect("create failed"))
        .collect();

    for tid in ids {
        let retval = api::join(tid).expect("join failed");
        let value = retval.map(|p| unsafe { *Box::from_raw(p as *mut u64) });
        assert_eq!(value, Some(fib(offset + tid)));
    }
}
