pub mod state;
pub mod transcript;

pub use state::{Phase, SessionEvent, SessionState};
pub use transcript::{Speaker, Transcript, TranscriptEntry};
