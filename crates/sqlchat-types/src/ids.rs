use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

static LAST_THREAD_MILLIS: AtomicU64 = AtomicU64::new(0);

/// Time-based thread id: epoch milliseconds, strictly increasing within the process.
///
/// When two ids are requested inside the same millisecond the second one is
/// bumped past the first, so ids also encode creation order.
pub fn next_thread_id() -> String {
    let now = Utc::now().timestamp_millis().max(0) as u64;
    let mut prev = LAST_THREAD_MILLIS.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST_THREAD_MILLIS.compare_exchange_weak(
            prev,
            next,
            Ordering::AcqRel,
            Ordering::Relaxed,
        ) {
            Ok(_) => return next.to_string(),
            Err(actual) => prev = actual,
        }
    }
}

pub fn next_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
