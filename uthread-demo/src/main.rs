//! Interactive driver for `uthreads`, reproducing the end-to-end scenarios
//! of spec.md §8. Grounded on `original_source/uthread-test.cpp`: same
//! Fibonacci-join, yield-fairness, suspend/resume-handshake, even/odd-join,
//! and main-exit scenarios, translated from the C driver's raw pointer
//! return values to Rust's opaque-pointer convention.
//!
//! Usage: `uthread-demo <fib offset> <threads> [quantum_usecs]`

use std::env;
use std::os::raw::c_void;
use std::time::{Duration, Instant};

use uthreads::api;

fn gen_fibs(n: usize) -> Vec<u64> {
    let mut fibs = vec![0u64; n.max(1)];
    if n == 0 {
        return fibs;
    }
    if n > 1 {
        fibs[1] = 1;
    }
    for i in 2..n {
        fibs[i] = fibs[i - 2] + fibs[i - 1];
    }
    fibs
}

extern "C" fn find_fib(arg: *mut c_void) -> *mut c_void {
    let offset = arg as usize;
    let n = api::self_tid() + offset;
    let mut fib = vec![0u64; n + 1];
    if n >= 1 {
        fib[1] = 1;
    }
    for i in 2..=n {
        fib[i] = fib[i - 2] + fib[i - 1];
    }
    Box::into_raw(Box::new(fib[n])) as *mut c_void
}

extern "C" fn yield_test(_arg: *mut c_void) -> *mut c_void {
    let tid = api::self_tid();
    eprintln!("(A) Thread ID: {tid}");
    api::yield_now();
    eprintln!("(B) Thread ID: {tid}");
    std::ptr::null_mut()
}

extern "C" fn suspend_test(_arg: *mut c_void) -> *mut c_void {
    let tid = api::self_tid();
    eprintln!("\nThread ID: {tid} is suspending itself");
    if let Err(err) = api::suspend(tid) {
        eprintln!("uthread_suspend failed: {err}");
        std::process::exit(1);
    }
    eprintln!("\nThread ID: {tid} is running again");
    std::ptr::null_mut()
}

extern "C" fn resume_test(arg: *mut c_void) -> *mut c_void {
    let sus_tid = arg as usize;
    let tid = api::self_tid();
    eprintln!("\nThread ID: {tid} will loop for 2 seconds before resuming thread {sus_tid}");
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(2) {}
    eprintln!("\nThread ID: {tid} is resuming thread {sus_tid}");
    if let Err(err) = api::resume(sus_tid) {
        eprintln!("uthread_resume failed: {err}");
        std::process::exit(1);
    }
    std::ptr::null_mut()
}

extern "C" fn exit_test(_arg: *mut c_void) -> *mut c_void {
    let tid = api::self_tid();
    Box::into_raw(Box::new(tid % 2 == 0)) as *mut c_void
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <fib offset> <threads> [quantum_usecs]", args[0]);
        std::process::exit(1);
    }
    let quantum_usecs: i64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(1000);
    let fib_offset: usize = args[1].parse().expect("fib offset must be a number");
    let num_threads: usize = args[2].parse().expect("thread count must be a number");

    let fibs = gen_fibs(fib_offset + uthreads::MAX_THREAD_NUM);

    eprintln!("{}", "+".repeat(80));
    eprintln!("Testing init and self_tid\n");

    if let Err(err) = api::init(quantum_usecs) {
        eprintln!("init failed: {err}");
        std::process::exit(1);
    }

    let main_tid = api::self_tid();
    eprintln!("Expected thread ID: 0\t\tself_tid: {main_tid}");
    assert_eq!(main_tid, 0);
    eprintln!("{}", "-".repeat(80));

    eprintln!("{}", "+".repeat(80));
    eprintln!("Testing get_total_quantums and get_quantums\n");
    eprintln!("Looping for 2 seconds (in real time) to build up quantums\n");
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(2) {}
    let quantums = api::get_quantums(api::self_tid()).unwrap_or(0);
    let total_quantums = api::get_total_quantums();
    eprintln!("Main thread quantums: {quantums}\t\ttotal quantums: {total_quantums}");
    eprintln!("{}", "-".repeat(80));

    eprintln!("{}", "+".repeat(80));
    eprintln!("Testing create and join\n");
    eprintln!("Creating {num_threads} threads");
    let thread_ids: Vec<usize> = (0..num_threads)
        .map(|_| api::create(find_fib, fib_offset as *mut c_void).expect("create failed"))
        .collect();

    for &tid in &thread_ids {
        let n = fib_offset + tid;
        let retval = api::join(tid).expect("join failed");
        let fib_res = retval.map(|p| unsafe { *Box::from_raw(p as *mut u64) });
        eprintln!(
            "Thread ID: {tid}          fib({n}) = {:?}          Expected: {}",
            fib_res, fibs[n]
        );
    }
    eprintln!("{}", "-".repeat(80));

    eprintln!("{}", "+".repeat(80));
    eprintln!("Testing yield\n");
    eprintln!(
        "There should be no back-to-back (A) (B) messages from the same thread \
         \nwithout another thread's message in between:\n"
    );
    let yield_ids: Vec<usize> = (0..10)
        .map(|_| {
            let tid = api::create(yield_test, std::ptr::null_mut()).expect("create failed");
            eprintln!("Created thread");
            tid
        })
        .collect();
    for tid in yield_ids {
        api::join(tid).expect("join failed");
    }
    eprintln!("{}", "-".repeat(80));

    eprintln!("{}", "+".repeat(80));
    eprintln!("Testing suspend and resume");
    eprintln!("\nCreating 2 new threads\n");
    eprintln!(
        "One thread will suspend itself while another resumes the\nsuspended thread 2 seconds later"
    );
    let sus_tid = api::create(suspend_test, std::ptr::null_mut()).expect("create failed");
    let res_tid =
        api::create(resume_test, sus_tid as *mut c_void).expect("create failed");
    for tid in [sus_tid, res_tid] {
        api::join(tid).expect("join failed");
    }
    eprintln!("{}", "-".repeat(80));

    eprintln!("{}", "+".repeat(80));
    eprintln!("Testing exit\n");
    eprintln!(
        "Expecting threads with an even tid to return true\nand threads with odd tid to return false\n"
    );
    let exit_ids: Vec<usize> = (0..num_threads)
        .map(|_| api::create(exit_test, std::ptr::null_mut()).expect("create failed"))
        .collect();
    for tid in exit_ids {
        let retval = api::join(tid).expect("join failed");
        let result = retval.map(|p| unsafe { *Box::from_raw(p as *mut bool) });
        eprintln!("Thread ID: {tid}          return value: {:?}", result);
    }

    eprintln!(
        "\nWe will now call exit on the main thread after printing\n\
         11 numbers in an otherwise infinite loop:"
    );
    for i in 1.. {
        eprintln!("  {i}");
        if i == 11 {
            api::exit(std::ptr::null_mut());
        }
    }
}
