//! Interrupt discipline: the virtual-time interval timer and the
//! `SIGVTALRM` masking that protects all shared scheduler state (spec §4.2).
//!
//! `interrupts_enabled` is a debugging invariant, not a lock — on a single
//! kernel thread, blocking the signal *is* the mutual exclusion. Grounded on
//! `original_source/uthread.cpp`'s `startInterruptTimer`/`disableInterrupts`/
//! `enableInterrupts`, translated from raw `sigaction`/`setitimer` calls to
//! their `libc` crate equivalents.

use std::cell::Cell;
use std::mem::MaybeUninit;

use crate::error::{Result, UthreadError};

thread_local! {
    // Single kernel thread in practice, but a thread_local (rather than a
    // plain static) keeps this sound without extra synchronization and
    // documents that the invariant is per-kernel-thread.
    static INTERRUPTS_ENABLED: Cell<bool> = Cell::new(false);
}

static mut QUANTUM_USECS: i64 = 0;

/// Install the `SIGVTALRM` handler. Does not arm the timer or touch the
/// enabled flag; call `start_timer` and `unmask` separately (done together
/// by `scheduler::init`).
pub fn install_handler(quantum_usecs: i64) -> Result<()> {
    unsafe {
        QUANTUM_USECS = quantum_usecs;

        let mut action: libc::sigaction = MaybeUninit::zeroed().assume_init();
        action.sa_sigaction = timer_handler as usize;
        action.sa_flags = 0;
        if libc::sigemptyset(&mut action.sa_mask) == -1 {
            return Err(UthreadError::PlatformError(std::io::Error::last_os_error()));
        }
        if libc::sigaction(libc::SIGVTALRM, &action, std::ptr::null_mut()) == -1 {
            log::error!("failed to install SIGVTALRM handler");
            return Err(UthreadError::PlatformError(std::io::Error::last_os_error()));
        }
    }
    Ok(())
}

extern "C" fn timer_handler(_signo: libc::c_int) {
    // Preempt the running thread as if it had called yield itself.
    crate::api::yield_now();
}

/// (Re)arm the interval timer for one fresh quantum.
pub fn start_timer() -> Result<()> {
    unsafe {
        let usecs = QUANTUM_USECS;
        let it = libc::itimerval {
            it_interval: libc::timeval {
                tv_sec: usecs / 1_000_000,
                tv_usec: usecs % 1_000_000,
            },
            it_value: libc::timeval {
                tv_sec: usecs / 1_000_000,
                tv_usec: usecs % 1_000_000,
            },
        };
        if libc::setitimer(libc::ITIMER_VIRTUAL, &it, std::ptr::null_mut()) == -1 {
            log::error!("failed to set interrupt timer");
            return Err(UthreadError::PlatformError(std::io::Error::last_os_error()));
        }
    }
    Ok(())
}

/// Block `SIGVTALRM`. Panics (debug-only assertion) if interrupts were
/// already masked, catching nested entry into the critical-section
/// discipline (spec §4.2 step 1).
pub fn mask() {
    INTERRUPTS_ENABLED.with(|enabled| {
        debug_assert!(enabled.get(), "mask() called while already masked");
        enabled.set(false);
    });
    unsafe {
        let mut set: libc::sigset_t = MaybeUninit::zeroed().assume_init();
        libc::sigemptyset(&mut set);
        libc::sigaddset(&mut set, libc::SIGVTALRM);
        if libc::sigprocmask(libc::SIG_BLOCK, &set, std::ptr::null_mut()) == -1 {
            log::error!("failed to disable SIGVTALRM");
        }
    }
}

/// Unblock `SIGVTALRM`. Called by every API operation's post-switch tail,
/// and by the entry-stub trampoline for freshly created threads (spec
/// §4.2's resolved post-switch-tail convention).
pub fn unmask() {
    INTERRUPTS_ENABLED.with(|enabled| {
        debug_assert!(!enabled.get(), "interrupts already unmasked");
        enabled.set(true);
    });
    unsafe {
        let mut set: libc::sigset_t = MaybeUninit::zeroed().assume_init();
        libc::sigemptyset(&mut set);
        libc::sigaddset(&mut set, libc::SIGVTALRM);
        if libc::sigprocmask(libc::SIG_UNBLOCK, &set, std::ptr::null_mut()) == -1 {
            log::error!("failed to enable SIGVTALRM");
        }
    }
}

/// Debugging invariant check: interrupts must be enabled at the entry of
/// every public operation (spec §4.2 step 1), catching re-entrant calls.
pub fn assert_enabled() {
    INTERRUPTS_ENABLED.with(|enabled| {
        debug_assert!(enabled.get(), "uthreads API re-entered while masked");
    });
}

pub fn enabled() -> bool {
    INTERRUPTS_ENABLED.with(|enabled| enabled.get())
}
