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

//! Subscriber layer.
//!
//! The consumer-side client: connects to a relay's subscription endpoint
//! under a bounded connect timeout, then waits indefinitely, decoding each
//! received line and handing the event to a caller-supplied [`TraceSink`].
//! Sinks (console, file, UI) own their own formatting and persistence
//! policy.

mod client;
mod format;

pub use client::{SubscriberClient, SubscriberError, TraceSink, DEFAULT_CONNECT_TIMEOUT};
pub use format::default_time_format;
