//! Streaming voice session over WebSocket
//!
//! Binary frames carry audio to the backend while the connection is open;
//! JSON text frames carry partial and final results back. The session ends
//! when the backend closes the socket after its final result, or locally
//! on a send failure. The socket lifecycle is tracked explicitly:
//!
//! `Connecting -> Open -> AwaitingFinal -> Closed`
//!
//! Audio that arrives while the socket is not `Open` is dropped, never
//! buffered: a late chunk belongs to an utterance the backend has already
//! started finalizing.

use crate::net::protocol::{normalize_tts_url, ClientEvent, ServerMessage};
use crate::net::ServerEvent;
use crossbeam_channel::Sender;
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};
use url::Url;

/// Connection lifecycle of one streaming session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreamState {
    /// Handshake in progress
    #[default]
    Connecting,
    /// Established; audio frames may be sent
    Open,
    /// End-of-stream signal sent; waiting for the backend's final result
    AwaitingFinal,
    /// Terminal; nothing may be sent
    Closed,
}

impl StreamState {
    /// Audio frames are forwarded only in the Open state
    pub fn can_send_audio(&self) -> bool {
        matches!(self, StreamState::Open)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, StreamState::Closed)
    }
}

impl std::fmt::Display for StreamState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamState::Connecting => write!(f, "Connecting"),
            StreamState::Open => write!(f, "Open"),
            StreamState::AwaitingFinal => write!(f, "AwaitingFinal"),
            StreamState::Closed => write!(f, "Closed"),
        }
    }
}

/// Commands sent into the session worker
#[derive(Debug)]
enum SessionCommand {
    /// One captured audio chunk (PCM bytes)
    Audio(Vec<u8>),
    /// No more audio will be captured for this utterance
    Finish,
}

/// Handle to a streaming session worker.
///
/// The worker owns its own tokio runtime on a dedicated thread and
/// reports back over a crossbeam channel polled by the UI, so the caller
/// never blocks. Dropping the handle ends the worker.
pub struct StreamingSession {
    command_tx: mpsc::Sender<SessionCommand>,
}

impl StreamingSession {
    /// Open a session to the given WebSocket endpoint.
    ///
    /// Connection failures are reported through `event_tx` as an `Error`
    /// followed by `Closed`; this constructor itself cannot fail.
    pub fn connect(url: Url, event_tx: Sender<ServerEvent>) -> Self {
        let (command_tx, command_rx) = mpsc::channel(64);

        std::thread::spawn(move || {
            let runtime = match Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to create tokio runtime: {}", e);
                    let _ = event_tx
                        .send(ServerEvent::Error(format!("Runtime creation failed: {}", e)));
                    let _ = event_tx.send(ServerEvent::Closed);
                    return;
                }
            };

            runtime.block_on(run_session(url, command_rx, event_tx));
        });

        Self { command_tx }
    }

    /// Forward one audio chunk. Never blocks; if the worker cannot keep
    /// up or has exited, the chunk is dropped.
    pub fn send_chunk(&self, data: Vec<u8>) {
        if let Err(e) = self.command_tx.try_send(SessionCommand::Audio(data)) {
            debug!("Dropping audio chunk: {}", e);
        }
    }

    /// Signal end-of-stream. The socket stays open until the backend has
    /// delivered its final result and closed from its side.
    pub fn finish(&self) {
        if let Err(e) = self.command_tx.try_send(SessionCommand::Finish) {
            warn!("Could not signal end of stream: {}", e);
        }
    }
}

async fn run_session(
    url: Url,
    mut command_rx: mpsc::Receiver<SessionCommand>,
    event_tx: Sender<ServerEvent>,
) {
    let mut state = StreamState::Connecting;
    info!(%url, state = %state, "Opening streaming session");

    let ws = match connect_async(url.as_str()).await {
        Ok((ws, _response)) => ws,
        Err(e) => {
            error!("WebSocket connect failed: {}", e);
            let _ = event_tx.send(ServerEvent::Error(format!("Connection failed: {}", e)));
            let _ = event_tx.send(ServerEvent::Closed);
            return;
        }
    };

    // Chunks captured while the handshake was still in flight are
    // discarded, not delivered late.
    let mut dropped = 0usize;
    let mut pending_finish = false;
    while let Ok(cmd) = command_rx.try_recv() {
        match cmd {
            SessionCommand::Audio(_) => dropped += 1,
            SessionCommand::Finish => pending_finish = true,
        }
    }
    if dropped > 0 {
        debug!(dropped, "Discarded audio captured before the socket opened");
    }

    state = StreamState::Open;
    let _ = event_tx.send(ServerEvent::Connected);

    let (mut sink, mut stream) = ws.split();
    let mut closed_sent = false;

    if pending_finish {
        // The user stopped before the handshake finished.
        match send_end_signal(&mut sink).await {
            Ok(()) => state = StreamState::AwaitingFinal,
            Err(e) => {
                let _ = event_tx.send(ServerEvent::Error(e));
                state = StreamState::Closed;
            }
        }
    }

    while !state.is_closed() {
        tokio::select! {
            cmd = command_rx.recv() => match cmd {
                Some(SessionCommand::Audio(bytes)) => {
                    if state.can_send_audio() {
                        if let Err(e) = sink.send(Message::Binary(bytes)).await {
                            error!("Failed to send audio frame: {}", e);
                            let _ = event_tx.send(ServerEvent::Error(format!("Send failed: {}", e)));
                            state = StreamState::Closed;
                        }
                    } else {
                        debug!(state = %state, "Dropping audio chunk outside Open state");
                    }
                }
                Some(SessionCommand::Finish) => {
                    if state == StreamState::Open {
                        match send_end_signal(&mut sink).await {
                            Ok(()) => state = StreamState::AwaitingFinal,
                            Err(e) => {
                                let _ = event_tx.send(ServerEvent::Error(e));
                                state = StreamState::Closed;
                            }
                        }
                    } else {
                        debug!(state = %state, "Ignoring end-of-stream signal");
                    }
                }
                None => {
                    // The UI dropped its handle; shut the worker down.
                    debug!("Command channel closed, ending session worker");
                    state = StreamState::Closed;
                }
            },
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => handle_text_frame(&text, &event_tx),
                Some(Ok(Message::Close(_))) | None => {
                    info!("Backend closed the streaming session");
                    state = StreamState::Closed;
                    closed_sent = true;
                    let _ = event_tx.send(ServerEvent::Closed);
                }
                Some(Ok(_)) => {} // ping/pong and stray binary frames
                Some(Err(e)) => {
                    error!("WebSocket receive error: {}", e);
                    let _ = event_tx.send(ServerEvent::Error(format!("Receive failed: {}", e)));
                    state = StreamState::Closed;
                }
            },
        }
    }

    if !closed_sent {
        let _ = event_tx.send(ServerEvent::Closed);
    }
    info!("Streaming session worker exiting");
}

async fn send_end_signal<S>(sink: &mut S) -> std::result::Result<(), String>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let text = serde_json::to_string(&ClientEvent::End)
        .map_err(|e| format!("Failed to encode end signal: {}", e))?;
    sink.send(Message::Text(text)).await.map_err(|e| {
        error!("Failed to send end signal: {}", e);
        format!("Send failed: {}", e)
    })
}

fn handle_text_frame(text: &str, event_tx: &Sender<ServerEvent>) {
    match serde_json::from_str::<ServerMessage>(text) {
        Ok(ServerMessage::Partial { partial_transcript }) => {
            let _ = event_tx.send(ServerEvent::Partial(partial_transcript));
        }
        Ok(ServerMessage::Final {
            final_transcript,
            response,
            tts_audio_url,
        }) => {
            let _ = event_tx.send(ServerEvent::Final {
                transcript: final_transcript,
                reply: response,
                tts_audio_url: normalize_tts_url(tts_audio_url),
            });
        }
        Ok(ServerMessage::Error { error }) => {
            warn!("Backend reported an error: {}", error);
            let _ = event_tx.send(ServerEvent::Error(error));
        }
        Err(e) => {
            warn!("Unparseable frame from backend ({}): {}", e, text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_audio_allowed_only_while_open() {
        assert!(!StreamState::Connecting.can_send_audio());
        assert!(StreamState::Open.can_send_audio());
        assert!(!StreamState::AwaitingFinal.can_send_audio());
        assert!(!StreamState::Closed.can_send_audio());
    }

    #[test]
    fn test_partial_frame_dispatch() {
        let (tx, rx) = unbounded();
        handle_text_frame(r#"{"partial_transcript":"hello"}"#, &tx);
        assert_eq!(rx.try_recv().unwrap(), ServerEvent::Partial("hello".to_string()));
    }

    #[test]
    fn test_final_frame_dispatch_normalizes_empty_url() {
        let (tx, rx) = unbounded();
        handle_text_frame(
            r#"{"final_transcript":"hi","response":"hello","tts_audio_url":""}"#,
            &tx,
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ServerEvent::Final {
                transcript: "hi".to_string(),
                reply: "hello".to_string(),
                tts_audio_url: None,
            }
        );
    }

    #[test]
    fn test_garbage_frame_produces_no_event() {
        let (tx, rx) = unbounded();
        handle_text_frame("not json", &tx);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_connect_failure_reports_error_then_closed() {
        let (tx, rx) = unbounded();
        // Nothing listens on this port; the handshake must fail fast.
        let url = Url::parse("ws://127.0.0.1:1/ws/audio").unwrap();
        let _session = StreamingSession::connect(url, tx);

        let first = rx
            .recv_timeout(std::time::Duration::from_secs(10))
            .expect("expected an error event");
        assert!(matches!(first, ServerEvent::Error(_)));

        let second = rx
            .recv_timeout(std::time::Duration::from_secs(10))
            .expect("expected a closed event");
        assert_eq!(second, ServerEvent::Closed);
    }
}
