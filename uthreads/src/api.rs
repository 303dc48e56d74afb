//! Public thread-lifecycle API (spec §4.9, §6).
//!
//! This is the safe, `Result`-returning surface; [`crate::ffi`] layers the
//! raw-integer ABI of spec.md's external-interfaces table on top of it.

use std::os::raw::c_void;

use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::tcb::Tid;

/// User-supplied thread entry point: takes and returns an opaque pointer,
/// matching spec §9 ("Raw callback + opaque pointer entry").
pub type EntryFn = extern "C" fn(*mut c_void) -> *mut c_void;

/// Construct the runtime: allocate the bootstrap thread (tid 0, RUNNING),
/// install the preemption signal handler, arm the interval timer, and
/// enable interrupts. Must be the first call into the library; calling any
/// other operation beforehand is undefined (spec §4.9).
pub fn init(quantum_usecs: i64) -> Result<()> {
    Scheduler::init(quantum_usecs)
}

/// Create a new thread running `entry(arg)`. Does not context-switch: the
/// caller keeps running (spec §4.4).
pub fn create(entry: EntryFn, arg: *mut c_void) -> Result<usize> {
    Scheduler::create(entry, arg).map(Tid::get)
}

/// Voluntarily relinquish the CPU to the next ready thread, or take another
/// quantum immediately if none are ready (spec §4.5).
pub fn yield_now() {
    Scheduler::yield_now()
}

/// Block until `tid` finishes, or reap it immediately if it already has.
/// `Ok(None)` means the slot was already empty (never existed, or already
/// reaped) — no return value is produced (spec §4.6, §9).
pub fn join(tid: usize) -> Result<Option<*mut c_void>> {
    Scheduler::join(tid)
}

/// Terminate the calling thread with `retval`. Terminates the whole process
/// if called on the bootstrap thread. Never returns (spec §4.8).
pub fn exit(retval: *mut c_void) -> ! {
    Scheduler::exit(retval)
}

/// Move `tid` to the suspend table, switching away if `tid` is the running
/// thread (spec §4.7).
pub fn suspend(tid: usize) -> Result<()> {
    Scheduler::suspend(tid)
}

/// Move `tid` from the suspend table back onto the ready queue. A no-op
/// success if `tid` was not suspended (spec §4.9).
pub fn resume(tid: usize) -> Result<()> {
    Scheduler::resume(tid)
}

/// The running thread's id. Non-blocking, needs no masking (spec §4.9).
pub fn self_tid() -> usize {
    Scheduler::self_tid().get()
}

/// `tid`'s quantum counter, or `None` if no such live thread (spec §4.9).
pub fn get_quantums(tid: usize) -> Option<u64> {
    Scheduler::get_quantums(tid)
}

/// Sum of quantum counters across all live threads (spec §4.9).
pub fn get_total_quantums() -> u64 {
    Scheduler::get_total_quantums()
}
