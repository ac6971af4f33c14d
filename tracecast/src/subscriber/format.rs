//! Default timestamp rendering for line-oriented sinks.

use crate::wire::TraceEvent;
use chrono::{Local, TimeZone};

/// Renders the event's timestamp as local `YYYY-MM-DD HH:MM:SS.mmm`.
///
/// An out-of-range timestamp falls back to the raw epoch seconds rather
/// than failing; sinks still get one printable token.
pub fn default_time_format(event: &TraceEvent) -> String {
    match Local.timestamp_opt(event.timestamp_secs, 0).single() {
        Some(stamp) => format!(
            "{}.{:03}",
            stamp.format("%Y-%m-%d %H:%M:%S"),
            event.timestamp_millis
        ),
        None => format!("{}.{:03}", event.timestamp_secs, event.timestamp_millis),
    }
}

#[cfg(test)]
mod tests {
    use super::default_time_format;
    use crate::wire::TraceEvent;

    #[test]
    fn renders_a_dated_token_with_zero_padded_millis() {
        let event = TraceEvent {
            timestamp_secs: 5555,
            timestamp_millis: 42,
            ..TraceEvent::default()
        };

        // The date digits depend on the local zone; pin the shape only.
        let token = default_time_format(&event);
        assert!(token.ends_with(".042"));
        assert_eq!(token.len(), "YYYY-MM-DD HH:MM:SS.mmm".len());
    }
}
