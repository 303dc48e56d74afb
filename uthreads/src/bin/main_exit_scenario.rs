//! Spec §8 scenario 6, as its own process: print 11 numbers, then the
//! bootstrap thread calls `exit`, which must terminate the process with
//! status 0 before a 12th line is printed. Driven from
//! `tests/main_exit.rs` via `Command`, since calling `exit` on the
//! bootstrap thread would otherwise kill the test harness itself.
use uthreads::api;

fn main() {
    api::init(1000).expect("init failed");
    for i in 1.. {
        println!("{i}");
        if i == 11 {
            api::exit(std::ptr::null_mut());
        }
    }
}
