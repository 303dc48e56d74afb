//! `uthreads` — a user-space cooperative-preemptive green-thread scheduler.
//!
//! Many application-level threads are multiplexed onto a single kernel
//! thread. A virtual-time interval timer preempts the running thread at
//! fixed quanta; an explicit context-switch primitive transfers control.
//! Scheduling policy is strictly round-robin FIFO. There is no true
//! parallelism: at most one thread runs at any instant.
//!
//! See [`api`] for the safe lifecycle operations (`init`, `create`,
//! `yield_now`, `join`, `exit`, `suspend`, `resume`, `self_tid`,
//! `get_quantums`, `get_total_quantums`) and [`ffi`] for the raw
//! `extern "C"` ABI.
//!
//! Linux/x86_64 only: the context switch is hand-written inline assembly
//! and the preemption timer is `SIGVTALRM`/`setitimer`.
#![cfg_attr(
    all(target_arch = "x86_64", target_family = "unix"),
    feature(naked_functions)
)]

mod context;
mod interrupts;
mod pool;
mod scheduler;
mod tcb;

pub mod api;
pub mod error;
pub mod ffi;

pub use error::{Result, UthreadError};
pub use pool::MAX_THREAD_NUM;
pub use tcb::STACK_SIZE;
