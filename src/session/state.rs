//! Session state machine
//!
//! All conversation state lives in one store mutated through a single
//! transition function, so the rules that govern the consent gate, the
//! record toggle, and the live caption can be tested without any audio
//! hardware or network in the loop.

use crate::session::transcript::{Speaker, Transcript, TranscriptEntry};
use tracing::{debug, warn};

/// Lifecycle of one recording session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// No session in progress
    #[default]
    Idle,
    /// Start requested, waiting for the microphone to confirm capture
    Starting,
    /// Capture confirmed, audio flowing
    Recording,
    /// Stop requested, waiting for the backend's final result
    Draining,
}

impl Phase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Phase::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Phase::Recording)
    }

    /// Check if a session is in flight in any form
    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Starting => write!(f, "Starting"),
            Phase::Recording => write!(f, "Recording"),
            Phase::Draining => write!(f, "Draining"),
        }
    }
}

/// Discrete events that drive the session state machine
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// User accepted the disclosure; irreversible for the process lifetime
    ConsentAccepted,
    /// User pressed the toggle while idle
    StartRequested,
    /// Microphone capture actually began
    CaptureStarted,
    /// User pressed the toggle while recording
    StopRequested,
    /// Interim transcription for the in-progress utterance
    PartialReceived(String),
    /// Confirmed utterance plus assistant reply
    FinalReceived { transcript: String, reply: String },
    /// Microphone access was denied or the device failed to open
    PermissionDenied,
    /// A chunk or control message could not be written to the transport
    SendFailed,
    /// The transport reached its terminal state
    StreamClosed,
}

/// Central conversation state
#[derive(Clone, Debug)]
pub struct SessionState {
    /// Whether the user has accepted the disclosure
    pub consent_given: bool,
    /// Whether the disclosure gate is the only thing on screen
    pub disclosure_visible: bool,
    /// Recording session lifecycle
    pub phase: Phase,
    /// Live caption for the utterance currently being spoken
    pub partial_caption: Option<String>,
    /// Append-only conversation log
    pub transcript: Transcript,
    /// Most recent user-facing error, if any
    pub last_error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            consent_given: false,
            disclosure_visible: true,
            phase: Phase::Idle,
            partial_caption: None,
            transcript: Transcript::new(),
            last_error: None,
        }
    }

    /// Whether the record toggle currently means "start"
    pub fn can_start(&self) -> bool {
        self.consent_given && self.phase.is_idle()
    }

    /// Whether the record toggle currently means "stop"
    pub fn can_stop(&self) -> bool {
        self.phase.is_recording()
    }

    /// Whether the record toggle should be interactable at all
    pub fn toggle_enabled(&self) -> bool {
        self.consent_given && matches!(self.phase, Phase::Idle | Phase::Recording)
    }

    /// Caption to render, if any. The caption is only ever shown while
    /// audio is actively being captured.
    pub fn visible_caption(&self) -> Option<&str> {
        if self.phase.is_recording() {
            self.partial_caption.as_deref()
        } else {
            None
        }
    }

    /// Apply one event to the state store.
    ///
    /// Events that are not legal in the current phase are ignored (with a
    /// log line) rather than treated as errors; the transport and recorder
    /// workers deliver events asynchronously and a late message must never
    /// corrupt the session.
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::ConsentAccepted => {
                self.consent_given = true;
                self.disclosure_visible = false;
            }
            SessionEvent::StartRequested => {
                if !self.consent_given {
                    warn!("Start requested before consent; ignoring");
                    return;
                }
                if !self.phase.is_idle() {
                    // A previous session still draining keeps the toggle
                    // inert until the backend closes the stream.
                    warn!(phase = %self.phase, "Start requested while session active; ignoring");
                    return;
                }
                self.phase = Phase::Starting;
                self.partial_caption = None;
                self.last_error = None;
            }
            SessionEvent::CaptureStarted => {
                if self.phase == Phase::Starting {
                    self.phase = Phase::Recording;
                } else {
                    debug!(phase = %self.phase, "Capture confirmation in unexpected phase");
                }
            }
            SessionEvent::StopRequested => {
                if self.phase == Phase::Recording {
                    self.phase = Phase::Draining;
                } else {
                    debug!(phase = %self.phase, "Stop requested while not recording; ignoring");
                }
            }
            SessionEvent::PartialReceived(text) => {
                // Partials can still arrive while draining; they update the
                // stored caption, but visible_caption hides it once the
                // microphone is off.
                if matches!(self.phase, Phase::Recording | Phase::Draining) {
                    self.partial_caption = Some(text);
                } else {
                    debug!("Dropping partial transcript outside a session");
                }
            }
            SessionEvent::FinalReceived { transcript, reply } => {
                // Exactly two entries per final result, user before bot.
                self.transcript
                    .append(TranscriptEntry::new(Speaker::User, transcript));
                self.transcript.append(TranscriptEntry::new(Speaker::Bot, reply));
                self.partial_caption = None;
            }
            SessionEvent::PermissionDenied => {
                // The reference UI left the recording flag set here; we
                // return to Idle so the toggle stays truthful.
                self.phase = Phase::Idle;
                self.partial_caption = None;
                self.last_error = Some(
                    "Microphone access was denied. Please allow microphone use and try again."
                        .to_string(),
                );
            }
            SessionEvent::SendFailed => {
                self.phase = Phase::Idle;
                self.partial_caption = None;
                self.last_error =
                    Some("Could not reach the assistant service. Please try again.".to_string());
            }
            SessionEvent::StreamClosed => {
                self.phase = Phase::Idle;
                self.partial_caption = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consented() -> SessionState {
        let mut state = SessionState::new();
        state.apply(SessionEvent::ConsentAccepted);
        state
    }

    fn recording() -> SessionState {
        let mut state = consented();
        state.apply(SessionEvent::StartRequested);
        state.apply(SessionEvent::CaptureStarted);
        state
    }

    #[test]
    fn test_disclosure_blocks_everything() {
        let state = SessionState::new();
        assert!(state.disclosure_visible);
        assert!(!state.consent_given);
        assert!(!state.toggle_enabled());
        assert!(!state.can_start());
    }

    #[test]
    fn test_start_ignored_without_consent() {
        let mut state = SessionState::new();
        state.apply(SessionEvent::StartRequested);
        assert_eq!(state.phase, Phase::Idle);
    }

    #[test]
    fn test_consent_is_irreversible_and_unlocks_toggle() {
        let state = consented();
        assert!(state.consent_given);
        assert!(!state.disclosure_visible);
        assert!(state.can_start());
        assert!(!state.can_stop());
    }

    #[test]
    fn test_recording_flag_waits_for_capture_confirmation() {
        let mut state = consented();
        state.apply(SessionEvent::StartRequested);
        assert_eq!(state.phase, Phase::Starting);
        assert!(!state.can_stop());

        state.apply(SessionEvent::CaptureStarted);
        assert_eq!(state.phase, Phase::Recording);
        assert!(state.can_stop());
        assert!(!state.can_start());
    }

    #[test]
    fn test_permission_denied_returns_to_idle() {
        let mut state = consented();
        state.apply(SessionEvent::StartRequested);
        state.apply(SessionEvent::PermissionDenied);
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.last_error.is_some());
        assert!(state.can_start());
    }

    #[test]
    fn test_caption_tracks_latest_partial_until_final() {
        let mut state = recording();

        state.apply(SessionEvent::PartialReceived("hel".to_string()));
        assert_eq!(state.visible_caption(), Some("hel"));

        state.apply(SessionEvent::PartialReceived("hello".to_string()));
        assert_eq!(state.visible_caption(), Some("hello"));

        state.apply(SessionEvent::FinalReceived {
            transcript: "hello there".to_string(),
            reply: "Hi, how are you?".to_string(),
        });
        assert_eq!(state.partial_caption, None);
        assert_eq!(state.visible_caption(), None);
    }

    #[test]
    fn test_caption_never_shown_once_recording_stops() {
        let mut state = recording();
        state.apply(SessionEvent::PartialReceived("hello".to_string()));
        state.apply(SessionEvent::StopRequested);

        // Still stored while draining, but never rendered.
        assert!(state.partial_caption.is_some());
        assert_eq!(state.visible_caption(), None);
    }

    #[test]
    fn test_final_appends_exactly_two_entries_user_first() {
        let mut state = recording();
        state.apply(SessionEvent::FinalReceived {
            transcript: "hello there".to_string(),
            reply: "Hi, how are you?".to_string(),
        });

        let entries = state.transcript.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].speaker, Speaker::User);
        assert_eq!(entries[0].text, "hello there");
        assert_eq!(entries[1].speaker, Speaker::Bot);
        assert_eq!(entries[1].text, "Hi, how are you?");
    }

    #[test]
    fn test_final_never_touches_prior_entries() {
        let mut state = recording();
        state.apply(SessionEvent::FinalReceived {
            transcript: "first".to_string(),
            reply: "one".to_string(),
        });
        let before: Vec<_> = state
            .transcript
            .entries()
            .iter()
            .map(|e| (e.id, e.text.clone()))
            .collect();

        state.apply(SessionEvent::FinalReceived {
            transcript: "second".to_string(),
            reply: "two".to_string(),
        });

        let after = state.transcript.entries();
        assert_eq!(after.len(), 4);
        for (i, (id, text)) in before.iter().enumerate() {
            assert_eq!(after[i].id, *id);
            assert_eq!(after[i].text, *text);
        }
    }

    #[test]
    fn test_start_rejected_while_draining() {
        let mut state = recording();
        state.apply(SessionEvent::StopRequested);
        assert_eq!(state.phase, Phase::Draining);
        assert!(!state.toggle_enabled());

        state.apply(SessionEvent::StartRequested);
        assert_eq!(state.phase, Phase::Draining);
    }

    #[test]
    fn test_stream_closed_allows_new_session() {
        let mut state = recording();
        state.apply(SessionEvent::StopRequested);
        state.apply(SessionEvent::StreamClosed);
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.can_start());
    }

    #[test]
    fn test_send_failure_abandons_session() {
        let mut state = recording();
        state.apply(SessionEvent::PartialReceived("hel".to_string()));
        state.apply(SessionEvent::SendFailed);
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.partial_caption, None);
        assert!(state.last_error.is_some());
    }

    #[test]
    fn test_stop_is_noop_when_idle() {
        let mut state = consented();
        state.apply(SessionEvent::StopRequested);
        assert_eq!(state.phase, Phase::Idle);
    }

    #[test]
    fn test_partial_dropped_when_idle() {
        let mut state = consented();
        state.apply(SessionEvent::PartialReceived("ghost".to_string()));
        assert_eq!(state.partial_caption, None);
    }
}
