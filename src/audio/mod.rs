#[cfg(feature = "audio-io")]
pub mod input;
#[cfg(feature = "audio-io")]
pub mod playback;
pub mod wav;

#[cfg(feature = "audio-io")]
pub use input::Recorder;
pub use wav::{encode_wav, samples_to_pcm16};

/// Events emitted by a capture session.
///
/// A session produces either a series of `Chunk`s (streaming mode) or a
/// single `Clip` (single-shot mode), always terminated by exactly one
/// `Stopped`. Nothing is emitted after `Stopped`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// One time slice of captured audio as raw PCM (s16le, mono)
    Chunk(Vec<u8>),
    /// The whole utterance as a WAV payload, emitted on stop
    Clip(Vec<u8>),
    /// Capture has fully ceased
    Stopped,
}
