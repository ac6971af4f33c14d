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

//! Relay layer.
//!
//! The broadcast daemon core: two listening endpoints, a subscriber
//! registry owned by the relay context, and best-effort ordered fan-out of
//! every ingested line to every live subscriber. Producer connections are
//! classified at accept time and never join the subscriber set, so their
//! teardown needs no registry cleanup.
//!
//! Delivery is decoupled per subscriber: each one owns a bounded queue
//! drained by its own writer task, so a slow or dead subscriber drops its
//! own lines without holding up the ingestion reader or its peers.

mod connection;
mod registry;
mod server;

pub use server::{Relay, RelayError, RelayHandle};
