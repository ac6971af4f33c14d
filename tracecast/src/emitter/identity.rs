//! Process and thread identity capture for emitted events.

pub(crate) fn process_id() -> u32 {
    std::process::id()
}

#[cfg(target_os = "linux")]
pub(crate) fn thread_id() -> u64 {
    // Kernel tids are positive, so the widening cast is lossless.
    (unsafe { libc::gettid() }) as u64
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn thread_id() -> u64 {
    use std::hash::{Hash, Hasher};

    // No portable numeric tid off Linux; a stable per-thread hash keeps the
    // field distinct between threads of one process.
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::{process_id, thread_id};

    #[test]
    fn identity_is_stable_within_a_thread() {
        assert_eq!(process_id(), std::process::id());
        assert_eq!(thread_id(), thread_id());
    }

    #[test]
    fn spawned_threads_report_a_different_thread_id() {
        let here = thread_id();
        let there = std::thread::spawn(thread_id).join().expect("join probe thread");
        assert_ne!(here, there);
    }
}
