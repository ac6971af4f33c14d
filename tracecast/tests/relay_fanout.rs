//! Socket-level behavior of the relay, emitter and subscriber client
//! working together on loopback with OS-assigned ports.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracecast::{
    Emitter, Relay, RelayConfig, RelayHandle, SubscriberClient, TraceEvent, TraceLevel, TraceSink,
};

const WAIT_STEP: Duration = Duration::from_millis(10);
const WAIT_LIMIT: Duration = Duration::from_secs(5);

async fn start_relay() -> RelayHandle {
    let config = RelayConfig {
        ingest_addr: "127.0.0.1:0".parse().expect("loopback ingest addr"),
        subscribe_addr: "127.0.0.1:0".parse().expect("loopback subscribe addr"),
        ..RelayConfig::default()
    };
    Relay::bind(config).await.expect("bind relay").spawn()
}

async fn wait_for_subscribers(relay: &RelayHandle, expected: usize) {
    let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
    while relay.subscriber_count().await != expected {
        assert!(
            tokio::time::Instant::now() < deadline,
            "relay never reached {expected} subscribers"
        );
        tokio::time::sleep(WAIT_STEP).await;
    }
}

async fn read_line(lines: &mut tokio::io::Lines<BufReader<TcpStream>>) -> Option<String> {
    tokio::time::timeout(WAIT_LIMIT, lines.next_line())
        .await
        .expect("timed out waiting for a broadcast line")
        .expect("read broadcast line")
}

#[tokio::test]
async fn every_subscriber_receives_all_lines_in_producer_order() {
    let relay = start_relay().await;

    let mut subscribers = Vec::new();
    for _ in 0..3 {
        let stream = TcpStream::connect(relay.subscribe_addr())
            .await
            .expect("connect subscriber");
        subscribers.push(BufReader::new(stream).lines());
    }
    wait_for_subscribers(&relay, 3).await;

    let mut producer = TcpStream::connect(relay.ingest_addr())
        .await
        .expect("connect producer");
    let sent: Vec<String> = (0..5)
        .map(|n| format!("{{ pn:svcA, pid:100, tid:7, tl:1, msg:line {n} }}"))
        .collect();
    for line in &sent {
        producer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .expect("send line");
    }

    for lines in &mut subscribers {
        for expected in &sent {
            assert_eq!(read_line(lines).await.as_ref(), Some(expected));
        }
    }

    relay.shutdown().await;
}

#[tokio::test]
async fn a_mid_stream_disconnect_neither_stalls_nor_poisons_the_relay() {
    let relay = start_relay().await;

    let leaver = TcpStream::connect(relay.subscribe_addr())
        .await
        .expect("connect leaving subscriber");
    let stayer = TcpStream::connect(relay.subscribe_addr())
        .await
        .expect("connect staying subscriber");
    let mut stayer_lines = BufReader::new(stayer).lines();
    wait_for_subscribers(&relay, 2).await;

    let mut producer = TcpStream::connect(relay.ingest_addr())
        .await
        .expect("connect producer");
    producer
        .write_all(b"{ pn:svcA, msg:before }\n")
        .await
        .expect("send first line");
    assert_eq!(
        read_line(&mut stayer_lines).await.as_deref(),
        Some("{ pn:svcA, msg:before }")
    );

    // Disconnect one subscriber; the registry must drop it and keep
    // delivering to the rest.
    drop(leaver);
    wait_for_subscribers(&relay, 1).await;

    for n in 0..3 {
        producer
            .write_all(format!("{{ pn:svcA, msg:after {n} }}\n").as_bytes())
            .await
            .expect("send later line");
    }
    for n in 0..3 {
        assert_eq!(
            read_line(&mut stayer_lines).await,
            Some(format!("{{ pn:svcA, msg:after {n} }}"))
        );
    }

    relay.shutdown().await;
}

#[tokio::test]
async fn producer_connections_are_never_registered_as_subscribers() {
    let relay = start_relay().await;

    let _producer = TcpStream::connect(relay.ingest_addr())
        .await
        .expect("connect producer");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(relay.subscriber_count().await, 0);

    relay.shutdown().await;
}

#[tokio::test]
async fn tracing_with_no_reachable_relay_is_a_no_op() {
    // Bind then drop a listener to get a port nothing is listening on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("listener addr");
    drop(listener);

    let emitter = Emitter::connect("svcA", addr).await;
    emitter
        .trace(TraceLevel::Error, "db", "pool", "acquire", "nobody home")
        .await;
    emitter.close().await;
}

struct RecordingSink {
    events: StdMutex<Vec<TraceEvent>>,
}

impl RecordingSink {
    fn new() -> Self {
        Self {
            events: StdMutex::new(Vec::new()),
        }
    }

    fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().expect("lock recorded events").clone()
    }
}

#[async_trait]
impl TraceSink for RecordingSink {
    async fn on_event(&self, event: TraceEvent) {
        self.events
            .lock()
            .expect("lock recorded events")
            .push(event);
    }
}

#[tokio::test]
async fn an_emitted_event_reaches_a_subscriber_client_intact() {
    let relay = start_relay().await;

    let sink = Arc::new(RecordingSink::new());
    let mut viewer = SubscriberClient::connect(relay.subscribe_addr(), sink.clone())
        .await
        .expect("subscribe viewer");
    wait_for_subscribers(&relay, 1).await;

    let emitter = Emitter::connect("svcA", relay.ingest_addr()).await;
    tracecast::trace_event!(
        emitter,
        TraceLevel::Warn,
        "db",
        "pool",
        "acquire",
        "timeout after {}ms",
        30
    )
    .await;

    let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
    while sink.events().is_empty() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "event never reached the subscriber sink"
        );
        tokio::time::sleep(WAIT_STEP).await;
    }

    let event = sink.events().remove(0);
    assert_eq!(event.program, "svcA");
    assert_eq!(event.pid, std::process::id());
    assert_eq!(event.level, TraceLevel::Warn);
    assert_eq!(event.tag, "db");
    assert_eq!(event.module, "pool");
    assert_eq!(event.function, "acquire");
    assert_eq!(event.message, "timeout after 30ms");
    assert!(event.timestamp_secs > 0);

    emitter.close().await;
    viewer.disconnect();
    relay.shutdown().await;
}

#[tokio::test]
async fn shutdown_closes_live_subscriber_connections() {
    let relay = start_relay().await;

    let stream = TcpStream::connect(relay.subscribe_addr())
        .await
        .expect("connect subscriber");
    let mut lines = BufReader::new(stream).lines();
    wait_for_subscribers(&relay, 1).await;

    relay.shutdown().await;

    // The relay side is gone; the read must terminate rather than wait
    // forever.
    let ended = tokio::time::timeout(WAIT_LIMIT, lines.next_line()).await;
    match ended {
        Ok(Ok(None)) | Ok(Err(_)) => {}
        Ok(Ok(Some(line))) => panic!("unexpected line after shutdown: {line}"),
        Err(_) => panic!("subscriber read did not end after relay shutdown"),
    }
}
