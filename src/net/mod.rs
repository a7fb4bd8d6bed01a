pub mod http;
pub mod protocol;
pub mod ws;

pub use protocol::{ClientEvent, ServerMessage, VoiceResponse};
pub use ws::{StreamState, StreamingSession};

/// Events delivered to the UI by either transport.
///
/// Both the streaming worker and the single-shot worker speak this one
/// vocabulary, so the UI handles a recording session the same way
/// regardless of transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// The transport is ready to carry audio (streaming only)
    Connected,
    /// Interim transcription of the in-progress utterance
    Partial(String),
    /// Finalized utterance and assistant reply
    Final {
        transcript: String,
        reply: String,
        tts_audio_url: Option<String>,
    },
    /// The exchange ended; no further events will arrive for this session
    Closed,
    /// The exchange failed; a Closed event follows
    Error(String),
}
