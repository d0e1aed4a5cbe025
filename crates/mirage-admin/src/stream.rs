// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Live statistics stream.
//!
//! Each connected observer gets its own [`StatsStreamer`]:
//! - waits for the observer's first frame (only a liveness trigger)
//! - then flushes the counter once per interval and pushes
//!   `{"stats": ...}` using the trigger's frame type
//! - keeps reading inbound frames while pushing, so a close frame or a dead
//!   socket ends the loop promptly; other frames are ignored
//!
//! A failed write ends the stream. Nothing is buffered or retried.

use crate::stats::{Counter, StatsSnapshot};
use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default push period.
pub const DEFAULT_STATS_INTERVAL: Duration = Duration::from_secs(1);

/// JSON body shared by `GET /stats` and the stream frames.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub stats: StatsSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Text,
    Binary,
}

/// Why a stream stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// Observer went away before sending its first frame.
    ClosedBeforeTrigger,
    /// Observer closed the connection.
    Closed,
    ReadError(String),
    WriteFailed(String),
    EncodeFailed(String),
}

/// Summary of a finished stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutcome {
    pub frames_sent: u64,
    pub end: StreamEnd,
}

/// Pushes counter snapshots to one observer.
pub struct StatsStreamer {
    counter: Arc<Counter>,
    period: Duration,
    session_id: String,
}

impl StatsStreamer {
    pub fn new(counter: Arc<Counter>, period: Duration) -> Self {
        let session_id = Uuid::new_v4().to_string()[..8].to_string();
        debug!("[{}] New stats stream", session_id);

        Self {
            counter,
            period,
            session_id,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Run until the observer disconnects or a write fails.
    pub async fn run<Tx, Rx, E>(self, mut tx: Tx, mut rx: Rx) -> StreamOutcome
    where
        Tx: Sink<Message> + Unpin,
        Tx::Error: Display,
        Rx: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
    {
        let kind = match self.wait_for_trigger(&mut rx).await {
            Ok(kind) => kind,
            Err(end) => {
                return StreamOutcome {
                    frames_sent: 0,
                    end,
                }
            }
        };

        let mut frames_sent = 0u64;
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let end = loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let response = StatsResponse { stats: self.counter.flush() };
                    let frame = match encode_frame(kind, &response) {
                        Ok(frame) => frame,
                        Err(e) => break StreamEnd::EncodeFailed(e.to_string()),
                    };

                    if let Err(e) = tx.send(frame).await {
                        warn!("[{}] Got error when writing message: {}", self.session_id, e);
                        break StreamEnd::WriteFailed(e.to_string());
                    }
                    frames_sent += 1;
                }
                inbound = rx.next() => match inbound {
                    Some(Ok(Message::Close(_))) | None => {
                        info!("[{}] Observer closed connection", self.session_id);
                        break StreamEnd::Closed;
                    }
                    Some(Ok(_)) => {
                        debug!("[{}] Ignoring inbound frame while streaming", self.session_id);
                    }
                    Some(Err(e)) => {
                        debug!("[{}] Read error while streaming: {}", self.session_id, e);
                        break StreamEnd::ReadError(e.to_string());
                    }
                },
            }
        };

        StreamOutcome { frames_sent, end }
    }

    async fn wait_for_trigger<Rx, E>(&self, rx: &mut Rx) -> Result<FrameKind, StreamEnd>
    where
        Rx: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
    {
        loop {
            match rx.next().await {
                Some(Ok(Message::Text(text))) => {
                    info!(body = %text, "[{}] Got message...", self.session_id);
                    return Ok(FrameKind::Text);
                }
                Some(Ok(Message::Binary(data))) => {
                    info!(bytes = data.len(), "[{}] Got message...", self.session_id);
                    return Ok(FrameKind::Binary);
                }
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(Message::Close(_))) | None => return Err(StreamEnd::ClosedBeforeTrigger),
                Some(Err(e)) => return Err(StreamEnd::ReadError(e.to_string())),
            }
        }
    }
}

fn encode_frame(kind: FrameKind, response: &StatsResponse) -> Result<Message, serde_json::Error> {
    Ok(match kind {
        FrameKind::Text => Message::Text(serde_json::to_string(response)?),
        FrameKind::Binary => Message::Binary(serde_json::to_vec(response)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Mode;
    use futures::channel::mpsc;
    use std::io;

    type Inbound = mpsc::UnboundedSender<Result<Message, io::Error>>;
    type Outbound = mpsc::UnboundedReceiver<Message>;

    fn spawn_stream(
        counter: Arc<Counter>,
    ) -> (Inbound, Outbound, tokio::task::JoinHandle<StreamOutcome>) {
        let (in_tx, in_rx) = mpsc::unbounded();
        let (out_tx, out_rx) = mpsc::unbounded();
        let streamer = StatsStreamer::new(counter, DEFAULT_STATS_INTERVAL);
        let handle = tokio::spawn(streamer.run(out_tx, in_rx));
        (in_tx, out_rx, handle)
    }

    fn frame_json(frame: &Message) -> serde_json::Value {
        match frame {
            Message::Text(text) => serde_json::from_str(text).unwrap(),
            Message::Binary(data) => serde_json::from_slice(data).unwrap(),
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_before_trigger() {
        let counter = Arc::new(Counter::new());
        let (in_tx, _out_rx, handle) = spawn_stream(Arc::clone(&counter));

        drop(in_tx);
        let outcome = handle.await.unwrap();

        assert_eq!(outcome.frames_sent, 0);
        assert_eq!(outcome.end, StreamEnd::ClosedBeforeTrigger);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_error_before_trigger() {
        let counter = Arc::new(Counter::new());
        let (in_tx, _out_rx, handle) = spawn_stream(counter);

        in_tx
            .unbounded_send(Err(io::Error::other("reset by peer")))
            .unwrap();
        let outcome = handle.await.unwrap();

        assert_eq!(outcome.frames_sent, 0);
        assert!(matches!(outcome.end, StreamEnd::ReadError(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_error_while_streaming() {
        let counter = Arc::new(Counter::new());
        let (in_tx, mut out_rx, handle) = spawn_stream(Arc::clone(&counter));

        in_tx
            .unbounded_send(Ok(Message::Text("start".to_string())))
            .unwrap();
        counter.count(Mode::Modify);

        let first = out_rx.next().await.unwrap();
        assert_eq!(frame_json(&first)["stats"]["counters"]["modify"], 1);

        in_tx
            .unbounded_send(Err(io::Error::other("reset by peer")))
            .unwrap();
        let outcome = handle.await.unwrap();

        assert_eq!(outcome.end, StreamEnd::ReadError("reset by peer".to_string()));
        assert_eq!(outcome.frames_sent, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pushes_flushed_snapshots_as_text() {
        let counter = Arc::new(Counter::new());
        let (in_tx, mut out_rx, handle) = spawn_stream(Arc::clone(&counter));

        in_tx
            .unbounded_send(Ok(Message::Text("hello".to_string())))
            .unwrap();
        counter.count(Mode::Capture);
        counter.count(Mode::Capture);

        let first = out_rx.next().await.unwrap();
        assert!(matches!(first, Message::Text(_)));
        assert_eq!(frame_json(&first)["stats"]["counters"]["capture"], 2);

        // The first push flushed the counter.
        let second = out_rx.next().await.unwrap();
        assert_eq!(frame_json(&second)["stats"]["counters"]["capture"], 0);

        in_tx.unbounded_send(Ok(Message::Close(None))).unwrap();
        let outcome = handle.await.unwrap();
        assert_eq!(outcome.end, StreamEnd::Closed);
        assert!(outcome.frames_sent >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_binary_trigger_gets_binary_frames() {
        let counter = Arc::new(Counter::new());
        let (in_tx, mut out_rx, handle) = spawn_stream(Arc::clone(&counter));

        in_tx
            .unbounded_send(Ok(Message::Binary(vec![1, 2, 3])))
            .unwrap();
        counter.count(Mode::Virtualize);

        let frame = out_rx.next().await.unwrap();
        assert!(matches!(frame, Message::Binary(_)));
        assert_eq!(frame_json(&frame)["stats"]["counters"]["virtualize"], 1);

        drop(in_tx);
        assert_eq!(handle.await.unwrap().end, StreamEnd::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pings_do_not_trigger() {
        let counter = Arc::new(Counter::new());
        let (in_tx, _out_rx, handle) = spawn_stream(counter);

        in_tx.unbounded_send(Ok(Message::Ping(vec![]))).unwrap();
        in_tx.unbounded_send(Ok(Message::Close(None))).unwrap();

        let outcome = handle.await.unwrap();
        assert_eq!(outcome.end, StreamEnd::ClosedBeforeTrigger);
    }

    #[tokio::test(start_paused = true)]
    async fn test_extra_inbound_frames_are_ignored() {
        let counter = Arc::new(Counter::new());
        let (in_tx, mut out_rx, handle) = spawn_stream(counter);

        in_tx
            .unbounded_send(Ok(Message::Text("start".to_string())))
            .unwrap();
        in_tx
            .unbounded_send(Ok(Message::Text("again".to_string())))
            .unwrap();

        let frame = out_rx.next().await.unwrap();
        assert!(matches!(frame, Message::Text(_)));

        drop(in_tx);
        let outcome = handle.await.unwrap();
        assert_eq!(outcome.end, StreamEnd::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_failure_ends_stream() {
        let counter = Arc::new(Counter::new());
        let (in_tx, out_rx, handle) = spawn_stream(counter);

        drop(out_rx);
        in_tx
            .unbounded_send(Ok(Message::Text("start".to_string())))
            .unwrap();

        let outcome = handle.await.unwrap();
        assert_eq!(outcome.frames_sent, 0);
        assert!(matches!(outcome.end, StreamEnd::WriteFailed(_)));
        // Keep the inbound side open so only the write can end the stream.
        drop(in_tx);
    }
}
