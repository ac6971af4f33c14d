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

//! # tracecast
//!
//! `tracecast` distributes structured trace events from many producing
//! processes to many observing consumers over TCP, in real time, with no
//! requirement that a consumer is present when an event is emitted.
//!
//! The crate owns the wire protocol and the broadcast relay; viewers and
//! writers are thin consumers built on [`SubscriberClient`]. Delivery is
//! best-effort: there is no persistence, no authentication, and no ordering
//! across independent producers — only per-connection ordering.
//!
//! ## Wire format
//!
//! One event is one ASCII line:
//!
//! ```text
//! { pn:svcA, pid:100, tid:7, tl:2, tm:5555, millis:42, tag:db, mod:pool, fn:acquire, msg:timeout after 30ms }
//! ```
//!
//! Decoding is order-independent and total: unknown keys are ignored,
//! missing keys default to zero/empty, and an unrecognized level code maps
//! to an `<unknown>` sentinel. The grammar has no escaping; the delimiter
//! characters `,`, `|`, `^`, `}` must be kept out of field values.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tracecast::{Emitter, Relay, RelayConfig, SubscriberClient, TraceEvent, TraceLevel, TraceSink};
//!
//! struct Console;
//!
//! #[async_trait]
//! impl TraceSink for Console {
//!     async fn on_event(&self, event: TraceEvent) {
//!         println!("{}: {}", event.program, event.message);
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let relay = Relay::bind(RelayConfig::default()).await.unwrap();
//! let ingest_addr = relay.ingest_addr();
//! let subscribe_addr = relay.subscribe_addr();
//! let handle = relay.spawn();
//!
//! let mut viewer = SubscriberClient::connect(subscribe_addr, Arc::new(Console)).await.unwrap();
//!
//! let emitter = Emitter::connect("svcA", ingest_addr).await;
//! tracecast::trace_event!(emitter, TraceLevel::Warn, "db", "pool", "acquire",
//!     "timeout after {}ms", 30).await;
//!
//! emitter.close().await;
//! viewer.disconnect();
//! handle.shutdown().await;
//! # });
//! ```
//!
//! ## Internal architecture map
//!
//! - Wire: trace-event model and packet encode/decode
//! - Emitter: producer-side client with injected send/timestamp strategies
//! - Relay: listening endpoints, connection-role dispatch, subscriber
//!   registry and fan-out
//! - Subscriber: consumer-side client feeding caller-supplied sinks
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events. Library code emits
//! events/spans and does not unconditionally initialize a global
//! subscriber. Binaries and tests are responsible for one-time
//! `tracing_subscriber` initialization at process boundaries.

mod config;
pub use config::{
    RelayConfig, DEFAULT_INGEST_PORT, DEFAULT_SUBSCRIBER_QUEUE_DEPTH, DEFAULT_SUBSCRIBE_PORT,
};

mod emitter;
pub use emitter::{Clock, Emitter, PacketSink, RelaySink, SystemClock, WallTime};

#[doc(hidden)]
pub mod observability;

mod relay;
pub use relay::{Relay, RelayError, RelayHandle};

mod subscriber;
pub use subscriber::{
    default_time_format, SubscriberClient, SubscriberError, TraceSink, DEFAULT_CONNECT_TIMEOUT,
};

pub mod wire;
pub use wire::{TraceEvent, TraceLevel};
