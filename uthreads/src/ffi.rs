//! Raw `extern "C"` compatibility layer matching spec.md §6's external
//! interfaces table and §9's "preserve this opacity at the ABI of the core"
//! guidance. A thin, error-swallowing-to-`-1` wrapper around [`crate::api`];
//! callers who want the `Result` are better served going through `api`
//! directly.

use std::os::raw::{c_int, c_void};

use crate::api;

/// Returns 0 on success, -1 on signal/timer setup failure.
#[no_mangle]
pub extern "C" fn uthread_init(quantum_usecs: c_int) -> c_int {
    match api::init(quantum_usecs as i64) {
        Ok(()) => 0,
        Err(err) => {
            log::error!("uthread_init failed: {err}");
            -1
        }
    }
}

/// Returns the new tid (>= 1) on success, -1 if capacity is exceeded.
#[no_mangle]
pub extern "C" fn uthread_create(
    start_routine: extern "C" fn(*mut c_void) -> *mut c_void,
    arg: *mut c_void,
) -> c_int {
    match api::create(start_routine, arg) {
        Ok(tid) => tid as c_int,
        Err(err) => {
            log::error!("uthread_create failed: {err}");
            -1
        }
    }
}

#[no_mangle]
pub extern "C" fn uthread_yield() -> c_int {
    api::yield_now();
    0
}

/// On success, `*retval` is set to the target's return value unless the
/// target's slot was already empty, in which case `*retval` is left
/// untouched (spec.md §9's second open question).
///
/// # Safety
/// `retval` must be a valid, writable `*mut c_void` pointer.
#[no_mangle]
pub unsafe extern "C" fn uthread_join(tid: c_int, retval: *mut *mut c_void) -> c_int {
    if tid < 0 {
        log::error!("uthread_join failed: tid does not exist");
        return -1;
    }
    match api::join(tid as usize) {
        Ok(Some(value)) => {
            if !retval.is_null() {
                *retval = value;
            }
            0
        }
        Ok(None) => 0,
        Err(err) => {
            log::error!("uthread_join failed: {err}");
            -1
        }
    }
}

/// Never returns.
#[no_mangle]
pub extern "C" fn uthread_exit(retval: *mut c_void) -> ! {
    api::exit(retval)
}

#[no_mangle]
pub extern "C" fn uthread_suspend(tid: c_int) -> c_int {
    if tid < 0 {
        return -1;
    }
    match api::suspend(tid as usize) {
        Ok(()) => 0,
        Err(err) => {
            log::error!("uthread_suspend failed: {err}");
            -1
        }
    }
}

#[no_mangle]
pub extern "C" fn uthread_resume(tid: c_int) -> c_int {
    if tid < 0 {
        return -1;
    }
    match api::resume(tid as usize) {
        Ok(()) => 0,
        Err(err) => {
            log::error!("uthread_resume failed: {err}");
            -1
        }
    }
}

#[no_mangle]
pub extern "C" fn uthread_self() -> c_int {
    api::self_tid() as c_int
}

#[no_mangle]
pub extern "C" fn uthread_get_quantums(tid: c_int) -> c_int {
    if tid < 0 {
        return -1;
    }
    api::get_quantums(tid as usize)
        .map(|q| q as c_int)
        .unwrap_or(-1)
}

#[no_mangle]
pub extern "C" fn uthread_get_total_quantums() -> c_int {
    api::get_total_quantums() as c_int
}
