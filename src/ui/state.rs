//! UI-side session orchestration
//!
//! `AppState` owns the session state store plus the worker handles for the
//! current recording session. All mutation happens from the UI thread:
//! worker threads only post to channels, which are drained once per frame
//! by `poll_events`.

use crate::audio::RecorderEvent;
#[cfg(feature = "audio-io")]
use crate::audio::{input::Recorder, playback};
use crate::config::{Config, TransportMode};
use crate::net::{http, ServerEvent, StreamingSession};
use crate::session::{Phase, SessionEvent, SessionState};
use crate::utils::SessionChannels;
use std::collections::VecDeque;
use tracing::{debug, error, warn};

const STATUS_LOG_CAPACITY: usize = 50;

/// Central application state
pub struct AppState {
    /// Conversation state store
    pub session: SessionState,

    /// Client configuration
    pub config: Config,

    /// Channels for the current recording session
    channels: SessionChannels,

    /// Active streaming transport, if any
    stream: Option<StreamingSession>,

    /// Active capture session, if any
    #[cfg(feature = "audio-io")]
    recorder: Option<Recorder>,

    /// Recent status lines shown in the footer
    pub status_log: VecDeque<String>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            session: SessionState::new(),
            config,
            channels: SessionChannels::default(),
            stream: None,
            #[cfg(feature = "audio-io")]
            recorder: None,
            status_log: VecDeque::with_capacity(STATUS_LOG_CAPACITY),
        }
    }

    fn log_status(&mut self, message: impl Into<String>) {
        if self.status_log.len() >= STATUS_LOG_CAPACITY {
            self.status_log.pop_front();
        }
        self.status_log.push_back(message.into());
    }

    /// The user accepted the disclosure; unlock the rest of the UI
    pub fn accept_disclosure(&mut self) {
        self.session.apply(SessionEvent::ConsentAccepted);
        self.log_status("Consent recorded".to_string());
    }

    /// The single record toggle: start when idle, stop when recording
    pub fn toggle_recording(&mut self) {
        if self.session.can_stop() {
            self.stop_recording();
        } else if self.session.can_start() {
            self.start_recording();
        } else {
            debug!(phase = %self.session.phase, "Toggle pressed in inert phase");
        }
    }

    fn start_recording(&mut self) {
        self.session.apply(SessionEvent::StartRequested);
        if self.session.phase != Phase::Starting {
            return;
        }

        // Fresh channels per session so stale events cannot leak into a
        // new conversation turn.
        self.channels = SessionChannels::default();

        if self.config.transport == TransportMode::Streaming {
            match self.config.ws_url() {
                Ok(url) => {
                    self.stream = Some(StreamingSession::connect(
                        url,
                        self.channels.server_tx.clone(),
                    ));
                }
                Err(e) => {
                    error!("Cannot derive WebSocket endpoint: {}", e);
                    self.log_status(e.user_message());
                    self.session.apply(SessionEvent::SendFailed);
                    return;
                }
            }
        }

        self.begin_capture();
    }

    #[cfg(feature = "audio-io")]
    fn begin_capture(&mut self) {
        let recorder_tx = self.channels.recorder_tx.clone();
        let result = Recorder::new().and_then(|mut recorder| {
            match self.config.transport {
                TransportMode::Streaming => {
                    recorder.start_streaming(self.config.chunk_interval_ms, recorder_tx)?
                }
                TransportMode::SingleShot => recorder.start_single_shot(recorder_tx)?,
            }
            Ok(recorder)
        });

        match result {
            Ok(recorder) => {
                self.recorder = Some(recorder);
                self.session.apply(SessionEvent::CaptureStarted);
            }
            Err(e) => {
                error!("Could not start capture: {}", e);
                self.log_status(e.user_message());
                self.session.apply(SessionEvent::PermissionDenied);
                // Abandon the just-opened transport; the worker exits when
                // its command channel is dropped.
                self.stream = None;
            }
        }
    }

    #[cfg(not(feature = "audio-io"))]
    fn begin_capture(&mut self) {
        warn!("Built without audio-io; capture unavailable");
        self.log_status("Audio capture is unavailable in this build".to_string());
        self.session.apply(SessionEvent::PermissionDenied);
        self.stream = None;
    }

    fn stop_recording(&mut self) {
        self.session.apply(SessionEvent::StopRequested);

        #[cfg(feature = "audio-io")]
        if let Some(mut recorder) = self.recorder.take() {
            if let Err(e) = recorder.stop() {
                warn!("Failed to stop capture cleanly: {}", e);
            }
        }

        // Deliver everything capture produced before signaling end of
        // stream, so the backend sees the full utterance.
        self.drain_recorder();

        if self.config.transport == TransportMode::Streaming {
            if let Some(stream) = &self.stream {
                stream.finish();
            }
        }
    }

    /// Pump worker events into the state store. Called once per frame.
    pub fn poll_events(&mut self) {
        self.drain_recorder();

        let events: Vec<ServerEvent> = self.channels.server_rx.try_iter().collect();
        for event in events {
            self.handle_server_event(event);
        }
    }

    fn drain_recorder(&mut self) {
        let events: Vec<RecorderEvent> = self.channels.recorder_rx.try_iter().collect();
        for event in events {
            self.handle_recorder_event(event);
        }
    }

    fn handle_recorder_event(&mut self, event: RecorderEvent) {
        match event {
            RecorderEvent::Chunk(bytes) => {
                if let Some(stream) = &self.stream {
                    stream.send_chunk(bytes);
                } else {
                    debug!("No active stream; dropping captured chunk");
                }
            }
            RecorderEvent::Clip(wav_bytes) => match self.config.voice_url() {
                Ok(url) => {
                    http::send_utterance(url, wav_bytes, self.channels.server_tx.clone());
                }
                Err(e) => {
                    error!("Cannot derive voice endpoint: {}", e);
                    self.log_status(e.user_message());
                    self.session.apply(SessionEvent::SendFailed);
                }
            },
            RecorderEvent::Stopped => {
                debug!("Capture fully ceased");
            }
        }
    }

    fn handle_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Connected => {
                debug!("Streaming transport open");
            }
            ServerEvent::Partial(text) => {
                self.session.apply(SessionEvent::PartialReceived(text));
            }
            ServerEvent::Final {
                transcript,
                reply,
                tts_audio_url,
            } => {
                self.session
                    .apply(SessionEvent::FinalReceived { transcript, reply });
                if let Some(url) = tts_audio_url {
                    self.play_reply(url);
                }
            }
            ServerEvent::Error(message) => {
                warn!("Session error: {}", message);
                self.log_status(message);
                self.session.apply(SessionEvent::SendFailed);
                // If the transport died mid-recording, stop capture too.
                #[cfg(feature = "audio-io")]
                if let Some(mut recorder) = self.recorder.take() {
                    let _ = recorder.stop();
                }
            }
            ServerEvent::Closed => {
                self.stream = None;
                self.session.apply(SessionEvent::StreamClosed);
            }
        }
    }

    #[cfg(feature = "audio-io")]
    fn play_reply(&self, url: String) {
        playback::play(url);
    }

    #[cfg(not(feature = "audio-io"))]
    fn play_reply(&self, url: String) {
        debug!("Built without audio-io; skipping playback of {}", url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Speaker;

    fn recording_state() -> AppState {
        let mut state = AppState::new(Config::default());
        state.session.apply(SessionEvent::ConsentAccepted);
        state.session.apply(SessionEvent::StartRequested);
        state.session.apply(SessionEvent::CaptureStarted);
        state
    }

    #[test]
    fn test_partial_event_updates_caption() {
        let mut state = recording_state();
        state
            .channels
            .server_tx
            .send(ServerEvent::Partial("hello".to_string()))
            .unwrap();
        state.poll_events();
        assert_eq!(state.session.visible_caption(), Some("hello"));
    }

    #[test]
    fn test_final_event_appends_pair_and_clears_caption() {
        let mut state = recording_state();
        state
            .channels
            .server_tx
            .send(ServerEvent::Partial("hel".to_string()))
            .unwrap();
        state
            .channels
            .server_tx
            .send(ServerEvent::Final {
                transcript: "hello there".to_string(),
                reply: "Hi, how are you?".to_string(),
                tts_audio_url: None,
            })
            .unwrap();
        state.poll_events();

        let entries = state.session.transcript.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].speaker, Speaker::User);
        assert_eq!(entries[1].speaker, Speaker::Bot);
        assert_eq!(state.session.partial_caption, None);
    }

    #[test]
    fn test_closed_event_returns_to_idle() {
        let mut state = recording_state();
        state.session.apply(SessionEvent::StopRequested);
        state.channels.server_tx.send(ServerEvent::Closed).unwrap();
        state.poll_events();
        assert_eq!(state.session.phase, Phase::Idle);
        assert!(state.session.can_start());
    }

    #[test]
    fn test_error_event_abandons_session() {
        let mut state = recording_state();
        state
            .channels
            .server_tx
            .send(ServerEvent::Error("boom".to_string()))
            .unwrap();
        state.poll_events();
        assert_eq!(state.session.phase, Phase::Idle);
        assert!(state.session.last_error.is_some());
        assert!(state.status_log.iter().any(|s| s.contains("boom")));
    }
}
