//! Error kinds reported by the public API (spec §7).

use thiserror::Error;

/// Errors surfaced by `uthreads` public operations.
///
/// Every variant corresponds to one of the negative-return-code error kinds
/// of the original C library; callers get a `Result` instead of an `errno`
/// style out-of-band code.
#[derive(Debug, Error)]
pub enum UthreadError {
    #[error("tid {0} does not exist")]
    InvalidId(usize),

    #[error("there are already MAX_THREAD_NUM threads running")]
    CapacityExceeded,

    #[error("thread {0} tried to join itself")]
    SelfJoin(usize),

    #[error("another thread is already waiting to join tid {0}")]
    AlreadyAwaited(usize),

    #[error("tid {0} is already blocked or finished and cannot be suspended")]
    NotSuspendable(usize),

    #[error("operation would block with no ready thread to run")]
    WouldDeadlock,

    #[error("platform setup failed: {0}")]
    PlatformError(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, UthreadError>;
