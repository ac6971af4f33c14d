//! Wall-clock capture seam for the emitter.

use std::time::{SystemTime, UNIX_EPOCH};

/// One captured wall-clock instant, split the way the wire carries it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallTime {
    pub secs: i64,
    pub millis: u32,
}

/// Timestamp strategy injected into [`crate::Emitter`].
pub trait Clock: Send + Sync {
    fn now(&self) -> WallTime;
}

/// Production clock reading the system time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> WallTime {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => WallTime {
                secs: elapsed.as_secs() as i64,
                millis: elapsed.subsec_millis(),
            },
            // A pre-epoch clock has nothing sensible to report.
            Err(_) => WallTime { secs: 0, millis: 0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, SystemClock};

    #[test]
    fn system_clock_reports_a_bounded_millisecond_remainder() {
        let stamp = SystemClock.now();
        assert!(stamp.secs > 0);
        assert!(stamp.millis < 1000);
    }
}
