//! Process-wide runtime state: ready queue, joiner/suspend/finished tables,
//! the TCB array, and the `switch_threads` context-switch primitive
//! (spec §2, §4.1).
//!
//! Grounded on `original_source/uthread.cpp`'s `uthread_info_t` plus its
//! four book-keeping structures (`ready_queue`, `finished_map`, `join_map`,
//! `suspend_map`), and on the teacher's `Runtime` (`stackfull-coroutine`)
//! for the in-process singleton and the `t_yield`/`switchThreads` shape of
//! the context switch.

use std::collections::{HashMap, VecDeque};
use std::os::raw::c_void;

use crate::context::{self, EntryFn};
use crate::error::{Result, UthreadError};
use crate::interrupts;
use crate::pool::{IdPool, MAX_THREAD_NUM};
use crate::tcb::{State, Tcb, Tid};

/// Wraps a raw return-value pointer so it can live in a `HashMap` without
/// accidentally implementing `Send`/`Sync` semantics we don't rely on —
/// the runtime is strictly single-kernel-thread (spec §5).
#[derive(Clone, Copy)]
struct RetVal(*mut c_void);

pub struct Scheduler {
    threads: Vec<Option<Tcb>>,
    id_pool: IdPool,
    ready_queue: VecDeque<Tid>,
    /// target tid -> return value, until a joiner consumes it.
    finished: HashMap<Tid, RetVal>,
    /// target tid -> the single tid blocked awaiting it.
    joiners: HashMap<Tid, Tid>,
    /// suspended tid -> membership marker (the TCB itself lives in `threads`).
    suspended: std::collections::HashSet<Tid>,
    running: Tid,
    num_threads: usize,
}

// Single process-wide instance (spec §9 "Global mutable state"), mirroring
// the teacher's `static mut RUNTIME: usize` singleton but holding the whole
// scheduler rather than a raw pointer cast.
static mut SCHEDULER: Option<Scheduler> = None;

fn with_scheduler<R>(f: impl FnOnce(&mut Scheduler) -> R) -> R {
    unsafe {
        let sched = SCHEDULER
            .as_mut()
            .expect("uthreads API called before init()");
        f(sched)
    }
}

impl Scheduler {
    /// `init` (spec §4.9): construct global state, allocate the bootstrap
    /// TCB, install the preemption handler, arm the timer, enable
    /// interrupts. Must be the first call into the library.
    pub fn init(quantum_usecs: i64) -> Result<()> {
        let mut threads: Vec<Option<Tcb>> = (0..MAX_THREAD_NUM).map(|_| None).collect();
        threads[0] = Some(Tcb::bootstrap());

        let sched = Scheduler {
            threads,
            id_pool: IdPool::new(),
            ready_queue: VecDeque::new(),
            finished: HashMap::new(),
            joiners: HashMap::new(),
            suspended: std::collections::HashSet::new(),
            running: Tid::BOOTSTRAP,
            num_threads: 1,
        };

        unsafe {
            SCHEDULER = Some(sched);
        }

        interrupts::install_handler(quantum_usecs)?;
        interrupts::start_timer()?;
        interrupts::unmask();
        Ok(())
    }

    fn slot(&self, tid: Tid) -> Option<&Tcb> {
        self.threads.get(tid.get()).and_then(|s| s.as_ref())
    }

    fn slot_mut(&mut self, tid: Tid) -> Option<&mut Tcb> {
        self.threads.get_mut(tid.get()).and_then(|s| s.as_mut())
    }

    fn is_valid_tid(tid: usize) -> bool {
        tid < MAX_THREAD_NUM
    }

    /// `create` (spec §4.4).
    pub fn create(entry: EntryFn, arg: *mut c_void) -> Result<Tid> {
        interrupts::assert_enabled();
        interrupts::mask();
        let result = with_scheduler(|s| {
            if s.num_threads >= MAX_THREAD_NUM {
                log::error!("there are already MAX_THREAD_NUM threads running");
                return Err(UthreadError::CapacityExceeded);
            }
            let tid = s.id_pool.allocate().expect("pool and num_threads disagree");
            let tcb = Tcb::spawn(tid, entry, arg);
            s.threads[tid.get()] = Some(tcb);
            s.num_threads += 1;
            s.ready_queue.push_back(tid);
            Ok(tid)
        });
        interrupts::unmask();
        result
    }

    /// `yield` (spec §4.5). Invoked both by user code and by the
    /// preemption signal handler.
    pub fn yield_now() {
        interrupts::assert_enabled();
        interrupts::mask();
        with_scheduler(|s| {
            let current = s.running;
            if let Some(next) = s.ready_queue.pop_front() {
                s.slot_mut(current).unwrap().set_state(State::Ready);
                s.ready_queue.push_back(current);
                s.switch_threads(current, next);
                s.slot_mut(current).unwrap().set_state(State::Running);
            } else {
                let tcb = s.slot_mut(current).unwrap();
                tcb.increment_quantum();
                interrupts::start_timer().ok();
            }
        });
        interrupts::unmask();
    }

    /// `join` (spec §4.6).
    pub fn join(tid: usize) -> Result<Option<*mut c_void>> {
        interrupts::assert_enabled();
        interrupts::mask();

        if !Self::is_valid_tid(tid) {
            interrupts::unmask();
            log::error!("tid {tid} does not exist");
            return Err(UthreadError::InvalidId(tid));
        }
        let target = Tid(tid);

        let outcome = with_scheduler(|s| -> Result<JoinOutcome> {
            if s.slot(target).is_none() {
                // Already terminated and reaped, or never existed.
                return Ok(JoinOutcome::AlreadyGone);
            }
            if target == s.running {
                return Err(UthreadError::SelfJoin(tid));
            }
            if s.joiners.contains_key(&target) {
                return Err(UthreadError::AlreadyAwaited(tid));
            }
            if s.finished.contains_key(&target) {
                return Ok(JoinOutcome::ReapNow);
            }
            if s.ready_queue.is_empty() {
                return Err(UthreadError::WouldDeadlock);
            }

            let self_tid = s.running;
            s.joiners.insert(target, self_tid);
            s.slot_mut(self_tid).unwrap().set_state(State::Block);
            let next = s.ready_queue.pop_front().unwrap();
            s.switch_threads(self_tid, next);
            s.slot_mut(self_tid).unwrap().set_state(State::Running);
            // By the post-condition of exit(), target is now in `finished`.
            Ok(JoinOutcome::ReapNow)
        });

        let result = match outcome {
            Err(e) => Err(e),
            Ok(JoinOutcome::AlreadyGone) => Ok(None),
            Ok(JoinOutcome::ReapNow) => Ok(Some(with_scheduler(|s| s.reap(target)))),
        };

        interrupts::unmask();
        result
    }

    fn reap(&mut self, target: Tid) -> *mut c_void {
        let retval = self
            .finished
            .remove(&target)
            .expect("reap called without a finished entry")
            .0;
        self.threads[target.get()] = None;
        self.id_pool.release(target);
        self.num_threads -= 1;
        retval
    }

    /// `exit` (spec §4.8). Never returns.
    pub fn exit(retval: *mut c_void) -> ! {
        interrupts::assert_enabled();
        interrupts::mask();

        let tid = with_scheduler(|s| s.running);
        if tid == Tid::BOOTSTRAP {
            std::process::exit(0);
        }

        with_scheduler(|s| {
            if let Some(joiner) = s.joiners.remove(&tid) {
                s.slot_mut(joiner).unwrap().set_state(State::Ready);
                s.ready_queue.push_back(joiner);
            }
            s.slot_mut(tid).unwrap().set_state(State::Finished);
            s.finished.insert(tid, RetVal(retval));

            debug_assert!(
                !s.ready_queue.is_empty(),
                "exit with no ready thread left to run"
            );
            let next = s.ready_queue.pop_front().unwrap();
            s.switch_threads(tid, next);
        });
        unreachable!("a finished thread is never scheduled again");
    }

    /// `suspend` (spec §4.7).
    pub fn suspend(tid: usize) -> Result<()> {
        interrupts::assert_enabled();
        if !Self::is_valid_tid(tid) {
            log::error!("invalid tid");
            return Err(UthreadError::InvalidId(tid));
        }
        let target = Tid(tid);
        interrupts::mask();

        let result = with_scheduler(|s| -> Result<()> {
            let is_self = target == s.running;
            if is_self {
                if s.ready_queue.is_empty() {
                    return Err(UthreadError::WouldDeadlock);
                }
            } else if !s.remove_from_ready_queue(target) {
                return Err(UthreadError::NotSuspendable(tid));
            }

            s.slot_mut(target).unwrap().set_state(State::Block);
            s.suspended.insert(target);

            if is_self {
                let next = s.ready_queue.pop_front().unwrap();
                s.switch_threads(target, next);
                s.slot_mut(target).unwrap().set_state(State::Running);
            }
            // Target was some other, non-running thread: it has already
            // been removed from the ready queue above, and no switch is
            // needed.
            Ok(())
        });

        interrupts::unmask();
        result
    }

    fn remove_from_ready_queue(&mut self, tid: Tid) -> bool {
        if let Some(pos) = self.ready_queue.iter().position(|&t| t == tid) {
            self.ready_queue.remove(pos);
            true
        } else {
            false
        }
    }

    /// `resume` (spec §4.9).
    pub fn resume(tid: usize) -> Result<()> {
        interrupts::assert_enabled();
        if !Self::is_valid_tid(tid) {
            return Err(UthreadError::InvalidId(tid));
        }
        interrupts::mask();
        with_scheduler(|s| {
            let target = Tid(tid);
            if s.suspended.remove(&target) {
                s.slot_mut(target).unwrap().set_state(State::Ready);
                s.ready_queue.push_back(target);
            }
        });
        interrupts::unmask();
        Ok(())
    }

    pub fn self_tid() -> Tid {
        with_scheduler(|s| s.running)
    }

    pub fn get_quantums(tid: usize) -> Option<u64> {
        interrupts::assert_enabled();
        interrupts::mask();
        let result = if !Self::is_valid_tid(tid) {
            None
        } else {
            with_scheduler(|s| s.slot(Tid(tid)).map(|t| t.quantum()))
        };
        interrupts::unmask();
        result
    }

    pub fn get_total_quantums() -> u64 {
        interrupts::assert_enabled();
        interrupts::mask();
        let total = with_scheduler(|s| {
            s.threads
                .iter()
                .filter_map(|slot| slot.as_ref())
                .map(|t| t.quantum())
                .sum()
        });
        interrupts::unmask();
        total
    }

    /// Context switch primitive (spec §4.1). Preconditions: interrupts are
    /// masked, `new != old`. Increments `old`'s quantum, saves `old`'s
    /// context, updates `running`, restarts the timer for `new`'s fresh
    /// quantum, and restores `new`'s context. Returns only when some later
    /// switch brings `old` back in.
    fn switch_threads(&mut self, old: Tid, new: Tid) {
        debug_assert!(!interrupts::enabled(), "switch_threads requires masking");
        debug_assert_ne!(old, new, "switch_threads requires distinct threads");

        self.slot_mut(old).unwrap().increment_quantum();

        let old_ctx = self.slot_mut(old).unwrap().context_mut() as *mut _;
        let new_ctx = self.slot(new).unwrap().context() as *const _;

        self.running = new;
        interrupts::start_timer().ok();

        unsafe {
            context::switch(old_ctx, new_ctx);
        }
        // Resumes here only when a later switch brings `old` back in.
    }
}

enum JoinOutcome {
    AlreadyGone,
    ReapNow,
}
