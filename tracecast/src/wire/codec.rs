//! Packet encode/decode for the single-line trace wire format.

use crate::wire::event::{TraceEvent, TraceLevel};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::str::FromStr;

lazy_static! {
    // Key:value extraction. The value class excludes the characters that
    // delimit pairs and close the packet; the grammar has no escaping, so a
    // value containing one of them truncates there (see `decode`).
    static ref PAIR_PATTERN: Regex =
        Regex::new(r"(\w+):([^,|^}]+)").expect("pair pattern is valid");
}

/// Encodes an event as one line of ASCII, without the trailing newline.
///
/// Keys are written in a fixed order; values are written verbatim with no
/// escaping. Callers must keep `,`, `|`, `^` and `}` out of every field but
/// the last if the packet is to survive a decode intact.
pub fn encode(event: &TraceEvent) -> String {
    format!(
        "{{ pn:{}, pid:{}, tid:{}, tl:{}, tm:{}, millis:{}, tag:{}, mod:{}, fn:{}, msg:{} }}",
        event.program,
        event.pid,
        event.tid,
        event.level.code(),
        event.timestamp_secs,
        event.timestamp_millis,
        event.tag,
        event.module,
        event.function,
        event.message,
    )
}

/// Decodes one wire line into an event. Never fails.
///
/// Scans for `key:value` pairs anywhere in the input (field order does not
/// matter, repeated keys keep the last occurrence) and reads out the ten
/// known keys by name. A missing or unparsable numeric field decodes to 0, a
/// missing string field to the empty string, so a missing level code yields
/// [`TraceLevel::Trace`]. The message field is trimmed of trailing
/// whitespace only.
pub fn decode(line: &str) -> TraceEvent {
    let mut pairs: HashMap<&str, &str> = HashMap::new();
    for caps in PAIR_PATTERN.captures_iter(line) {
        if let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) {
            pairs.insert(key.as_str(), value.as_str());
        }
    }

    TraceEvent {
        program: text(&pairs, "pn"),
        pid: numeric(&pairs, "pid"),
        tid: numeric(&pairs, "tid"),
        level: TraceLevel::from_code(numeric(&pairs, "tl")),
        timestamp_secs: numeric(&pairs, "tm"),
        timestamp_millis: numeric(&pairs, "millis"),
        tag: text(&pairs, "tag"),
        module: text(&pairs, "mod"),
        function: text(&pairs, "fn"),
        message: pairs
            .get("msg")
            .map(|value| value.trim_end())
            .unwrap_or_default()
            .to_string(),
    }
}

fn text(pairs: &HashMap<&str, &str>, key: &str) -> String {
    pairs.get(key).copied().unwrap_or_default().to_string()
}

fn numeric<T>(pairs: &HashMap<&str, &str>, key: &str) -> T
where
    T: FromStr + Default,
{
    pairs
        .get(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};
    use crate::wire::event::{TraceEvent, TraceLevel};

    fn sample_event() -> TraceEvent {
        TraceEvent {
            program: "svcA".to_string(),
            pid: 100,
            tid: 7,
            level: TraceLevel::Warn,
            timestamp_secs: 5555,
            timestamp_millis: 42,
            tag: "db".to_string(),
            module: "pool".to_string(),
            function: "acquire".to_string(),
            message: "timeout after 30ms".to_string(),
        }
    }

    #[test]
    fn encode_writes_the_documented_key_order() {
        assert_eq!(
            encode(&sample_event()),
            "{ pn:svcA, pid:100, tid:7, tl:2, tm:5555, millis:42, tag:db, mod:pool, fn:acquire, msg:timeout after 30ms }"
        );
    }

    #[test]
    fn decode_reconstructs_every_field_of_the_documented_packet() {
        let event = decode(
            "{ pn:svcA, pid:100, tid:7, tl:2, tm:5555, millis:42, tag:db, mod:pool, fn:acquire, msg:timeout after 30ms }",
        );
        assert_eq!(event, sample_event());
    }

    #[test]
    fn decode_round_trips_an_encoded_event() {
        let event = sample_event();
        assert_eq!(decode(&encode(&event)), event);
    }

    #[test]
    fn decode_is_insensitive_to_pair_order() {
        let reordered =
            "{ msg:timeout after 30ms, fn:acquire, mod:pool, tag:db, millis:42, tm:5555, tl:2, tid:7, pid:100, pn:svcA }";
        assert_eq!(decode(reordered), sample_event());
    }

    #[test]
    fn decode_defaults_missing_fields_to_zero_or_empty() {
        let event = decode("{ pn:svcA, tl:3 }");
        assert_eq!(event.program, "svcA");
        assert_eq!(event.level, TraceLevel::Error);
        assert_eq!(event.pid, 0);
        assert_eq!(event.tid, 0);
        assert_eq!(event.timestamp_secs, 0);
        assert_eq!(event.timestamp_millis, 0);
        assert_eq!(event.tag, "");
        assert_eq!(event.module, "");
        assert_eq!(event.function, "");
        assert_eq!(event.message, "");
    }

    #[test]
    fn decode_of_an_empty_line_yields_all_defaults() {
        assert_eq!(decode(""), TraceEvent::default());
    }

    #[test]
    fn decode_maps_an_unrecognized_level_code_to_the_unknown_sentinel() {
        let event = decode("{ pn:svcA, tl:9 }");
        assert_eq!(event.level, TraceLevel::Unknown(9));
        assert!(encode(&event).contains("tl:9"));
    }

    #[test]
    fn decode_trims_only_trailing_whitespace_from_the_message() {
        let event = decode("{ msg:  padded text   }");
        assert_eq!(event.message, "  padded text");
    }

    #[test]
    fn decode_ignores_extra_keys_from_a_newer_producer() {
        let event = decode("{ pn:svcA, pid:100, seq:9, host:box1, tl:1 }");
        assert_eq!(event.program, "svcA");
        assert_eq!(event.pid, 100);
        assert_eq!(event.level, TraceLevel::Debug);
    }

    #[test]
    fn repeated_keys_keep_the_last_occurrence() {
        let event = decode("{ pn:first, pn:second, tag:x }");
        assert_eq!(event.program, "second");
    }

    #[test]
    fn a_delimiter_inside_the_message_truncates_but_never_fails() {
        // Known grammar limitation: no escaping. The comma ends the msg value
        // and the remainder is scanned as further pairs.
        let event = decode("{ pn:svcA, msg:before, after }");
        assert_eq!(event.message, "before");
        assert_eq!(event.program, "svcA");
    }
}
