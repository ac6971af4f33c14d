/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Wire layer.
//!
//! Owns the trace-event data model and the single-line textual packet
//! representation exchanged between emitters, the relay, and subscribers.
//! Encoding writes a fixed key order; decoding is order-independent and
//! total, so a newer producer emitting extra keys never breaks an older
//! consumer.
//!
//! ```
//! use tracecast::wire;
//! use tracecast::{TraceEvent, TraceLevel};
//!
//! let event = TraceEvent {
//!     program: "svcA".to_string(),
//!     pid: 100,
//!     tid: 7,
//!     level: TraceLevel::Warn,
//!     timestamp_secs: 5555,
//!     timestamp_millis: 42,
//!     tag: "db".to_string(),
//!     module: "pool".to_string(),
//!     function: "acquire".to_string(),
//!     message: "timeout after 30ms".to_string(),
//! };
//!
//! let line = wire::encode(&event);
//! assert_eq!(wire::decode(&line), event);
//! ```

mod codec;
mod event;

pub use codec::{decode, encode};
pub use event::{TraceEvent, TraceLevel};
