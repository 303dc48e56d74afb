//! Identifier pool: a finite set of reusable small integer ids in
//! `[0, MAX_THREAD_NUM)` (spec §2.2, §3 "Global invariants").

use std::collections::VecDeque;

use crate::tcb::Tid;

pub const MAX_THREAD_NUM: usize = 100;

/// Holds the ids currently *not* in use. Tid 0 is reserved for the
/// bootstrap thread and is never placed in the pool.
pub struct IdPool {
    available: VecDeque<usize>,
}

impl IdPool {
    pub fn new() -> Self {
        IdPool {
            available: (1..MAX_THREAD_NUM).collect(),
        }
    }

    /// Allocate the smallest available id, if any remain.
    pub fn allocate(&mut self) -> Option<Tid> {
        self.available.pop_front().map(Tid)
    }

    /// Return an id to the pool after its TCB has been reaped.
    pub fn release(&mut self, tid: Tid) {
        debug_assert_ne!(tid, Tid::BOOTSTRAP, "tid 0 is never returned to the pool");
        self.available.push_back(tid.get());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_smallest_first_and_excludes_bootstrap() {
        let mut pool = IdPool::new();
        assert_eq!(pool.allocate(), Some(Tid(1)));
        assert_eq!(pool.allocate(), Some(Tid(2)));
    }

    #[test]
    fn exhausts_after_max_minus_one_allocations() {
        let mut pool = IdPool::new();
        let mut seen = Vec::new();
        while let Some(tid) = pool.allocate() {
            seen.push(tid.get());
        }
        assert_eq!(seen.len(), MAX_THREAD_NUM - 1);
        assert_eq!(*seen.first().unwrap(), 1);
        assert_eq!(*seen.last().unwrap(), MAX_THREAD_NUM - 1);
    }

    #[test]
    fn released_id_is_reusable_in_fifo_order() {
        let mut pool = IdPool::new();
        let first = pool.allocate().unwrap();
        let second = pool.allocate().unwrap();
        pool.release(first);
        // `second` was already taken; the next allocation must not
        // re-allocate it, and `first` only comes back once its turn in
        // FIFO order arrives.
        let mut rest = Vec::new();
        while let Some(tid) = pool.allocate() {
            rest.push(tid);
        }
        assert!(!rest.contains(&second));
        assert!(rest.contains(&first));
    }
}
