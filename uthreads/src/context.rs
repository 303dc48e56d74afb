//! Machine context and the `switch_threads` register-level primitive
//! (spec §4.1, §4.3).
//!
//! Grounded on `stackfull-coroutine`'s naked-function `switch` and
//! `a-stack-swap`'s stack-priming trick, extended to thread the user's
//! entry function pointer and opaque argument through to a freshly spawned
//! thread's first activation (the original C library gets this for free
//! from `makecontext(&ctx, stub, 2, start_routine, arg)`; here it is done by
//! parking `entry`/`arg` in two callee-saved registers that `switch` loads
//! as part of the normal context restore).
#![allow(clippy::missing_safety_doc)]

use std::os::raw::c_void;

pub use crate::api::EntryFn;

/// Opaque machine context sufficient to resume a thread at a saved
/// instruction pointer on its own stack.
///
/// Holds the callee-saved register set (System V x86-64 ABI) plus the
/// stack pointer. Caller-saved registers do not need to survive a call, so
/// `switch` does not touch them; the compiler is told about this via
/// `clobber_abi("C")` at the call site in `scheduler::switch_threads`.
#[cfg(all(target_arch = "x86_64", target_family = "unix"))]
#[repr(C)]
#[derive(Debug, Default)]
pub struct ThreadContext {
    rsp: u64,
    r15: u64,
    r14: u64,
    r13: u64,
    r12: u64,
    rbx: u64,
    rbp: u64,
}

/// Prime a freshly allocated stack so that switching into it for the first
/// time enters the trampoline, with `entry` and `arg` threaded through the
/// r12/r13 slots of the restored context.
///
/// The stack must be at least `tcb::STACK_SIZE` bytes and is aligned down
/// to a 16-byte boundary per the platform ABI (spec §5, "stack sizing").
#[cfg(all(target_arch = "x86_64", target_family = "unix"))]
pub fn prime(stack: &mut [u8], entry: EntryFn, arg: *mut c_void) -> ThreadContext {
    unsafe {
        let stack_top = stack.as_mut_ptr().add(stack.len());
        // Round down to 16 bytes, then carve out one 8-byte slot for the
        // return address `switch`'s `ret` will pop.
        let aligned = (stack_top as usize & !0xf) as *mut u8;
        let sp = aligned.offset(-16) as *mut u64;
        std::ptr::write(sp, trampoline_shim as usize as u64);

        ThreadContext {
            rsp: sp as u64,
            r12: entry as usize as u64,
            r13: arg as u64,
            ..Default::default()
        }
    }
}

/// Save `old`'s callee-saved registers and stack pointer, then load `new`'s.
///
/// # Safety
///
/// Caller must hold the interrupt mask and must ensure `old` and `new` are
/// distinct, valid contexts belonging to stacks that remain allocated for
/// the duration of the call.
#[cfg(all(target_arch = "x86_64", target_family = "unix"))]
pub unsafe fn switch(old: *mut ThreadContext, new: *const ThreadContext) {
    std::arch::asm!(
        "call {switch_asm}",
        switch_asm = sym switch_asm,
        in("rdi") old,
        in("rsi") new,
        clobber_abi("C"),
    );
}

// rdi = &mut old context, rsi = &new context. Field offsets mirror the
// `ThreadContext` layout above exactly; keep the two in sync.
#[cfg(all(target_arch = "x86_64", target_family = "unix"))]
#[naked]
unsafe extern "C" fn switch_asm() {
    std::arch::asm!(
        "mov [rdi + 0x00], rsp",
        "mov [rdi + 0x08], r15",
        "mov [rdi + 0x10], r14",
        "mov [rdi + 0x18], r13",
        "mov [rdi + 0x20], r12",
        "mov [rdi + 0x28], rbx",
        "mov [rdi + 0x30], rbp",
        "mov rsp, [rsi + 0x00]",
        "mov r15, [rsi + 0x08]",
        "mov r14, [rsi + 0x10]",
        "mov r13, [rsi + 0x18]",
        "mov r12, [rsi + 0x20]",
        "mov rbx, [rsi + 0x28]",
        "mov rbp, [rsi + 0x30]",
        "ret",
        options(noreturn)
    );
}

/// Naked shim that moves the entry/arg pair parked in r12/r13 by `prime`
/// into the argument registers of the System V calling convention and
/// jumps into the real (non-naked) trampoline.
///
/// `switch_asm`'s `ret` lands here with `rsp % 16 == 8`, the standard
/// function-entry parity, and the `mov`s above don't touch `rsp`. Without
/// adjustment the `call` below would fire at `rsp % 16 == 8` instead of the
/// ABI-required 0, entering `trampoline` (and the user entry it invokes) one
/// word off; the `sub rsp, 8` restores call-site alignment first.
#[cfg(all(target_arch = "x86_64", target_family = "unix"))]
#[naked]
unsafe extern "C" fn trampoline_shim() {
    std::arch::asm!(
        "mov rdi, r12",
        "mov rsi, r13",
        "sub rsp, 8",
        "call {trampoline}",
        trampoline = sym trampoline,
        options(noreturn)
    );
}

/// Entry stub (spec §4.3): unmask interrupts, run the user entry function,
/// forward its return value to `exit`. Never returns.
#[cfg(all(target_arch = "x86_64", target_family = "unix"))]
extern "C" fn trampoline(entry: EntryFn, arg: *mut c_void) -> ! {
    crate::interrupts::unmask();
    let retval = entry(arg);
    crate::api::exit(retval);
    unreachable!("uthreads::api::exit never returns")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priming_writes_the_trampoline_entry_point() {
        let mut stack = vec![0_u8; crate::tcb::STACK_SIZE];
        extern "C" fn noop(arg: *mut c_void) -> *mut c_void {
            arg
        }
        let ctx = prime(&mut stack, noop, std::ptr::null_mut());
        assert_eq!(ctx.r12, noop as usize as u64);
        assert_eq!(ctx.r13, 0);
        assert_eq!(ctx.rsp % 16, 0);
    }
}
