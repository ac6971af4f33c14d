//! Trace-event data model shared by every wire peer.

use std::fmt;
use std::fmt::{Display, Formatter};

/// Severity of a [`TraceEvent`].
///
/// The wire carries levels as bare numeric codes. Codes outside the four
/// defined values decode to [`TraceLevel::Unknown`], which keeps the original
/// code so a packet relayed through decode/encode is lossless; a packet is
/// never rejected over its level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TraceLevel {
    Trace,
    Debug,
    Warn,
    Error,
    Unknown(u32),
}

impl TraceLevel {
    /// Maps a wire code to a level. Codes above 3 are preserved as `Unknown`.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => TraceLevel::Trace,
            1 => TraceLevel::Debug,
            2 => TraceLevel::Warn,
            3 => TraceLevel::Error,
            n => TraceLevel::Unknown(n),
        }
    }

    /// The numeric code written on the wire.
    pub fn code(&self) -> u32 {
        match self {
            TraceLevel::Trace => 0,
            TraceLevel::Debug => 1,
            TraceLevel::Warn => 2,
            TraceLevel::Error => 3,
            TraceLevel::Unknown(n) => *n,
        }
    }

    /// Display form used by line-oriented sinks.
    pub fn as_str(&self) -> &'static str {
        match self {
            TraceLevel::Trace => "trace",
            TraceLevel::Debug => "debug",
            TraceLevel::Warn => "warn",
            TraceLevel::Error => "error",
            TraceLevel::Unknown(_) => "<unknown>",
        }
    }
}

impl Default for TraceLevel {
    fn default() -> Self {
        TraceLevel::Trace
    }
}

impl Display for TraceLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One trace event as produced by an emitter and reconstructed by a
/// subscriber.
///
/// An event is built fresh for every emission, serialized immediately, and
/// discarded; the subscriber side rebuilds one per received line and hands it
/// to a sink. Instances are never shared or persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraceEvent {
    /// Producing process name.
    pub program: String,
    /// Producing process id.
    pub pid: u32,
    /// OS thread id of the emitting thread.
    pub tid: u64,
    pub level: TraceLevel,
    /// Epoch seconds at emission.
    pub timestamp_secs: i64,
    /// Millisecond remainder, 0-999.
    pub timestamp_millis: u32,
    /// Free-form short category.
    pub tag: String,
    pub module: String,
    pub function: String,
    /// Formatted message text; trailing whitespace is trimmed on decode.
    pub message: String,
}
