//! Synthesized speech playback
//!
//! Fire-and-forget: each call fetches the audio resource and plays it on
//! its own thread. Failures are logged and never reach the transcript or
//! session state. Overlapping playback is allowed; nothing is queued.

use crate::{HiwarError, Result};
use std::io::Cursor;
use tracing::{debug, warn};

/// Asynchronously fetch and play a remote audio resource.
///
/// Returns immediately; the outcome is observable only in the logs.
pub fn play(url: String) {
    std::thread::spawn(move || {
        debug!("Fetching synthesized speech from {}", url);
        if let Err(e) = fetch_and_play(&url) {
            warn!("Playback of {} failed: {}", url, e);
        }
    });
}

fn fetch_and_play(url: &str) -> Result<()> {
    let bytes = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| HiwarError::PlaybackError(format!("Fetch failed: {}", e)))?
        .bytes()
        .map_err(|e| HiwarError::PlaybackError(format!("Read failed: {}", e)))?;

    let (_stream, handle) = rodio::OutputStream::try_default()
        .map_err(|e| HiwarError::PlaybackError(format!("No output device: {}", e)))?;
    let sink = rodio::Sink::try_new(&handle)
        .map_err(|e| HiwarError::PlaybackError(format!("Failed to open sink: {}", e)))?;
    let source = rodio::Decoder::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| HiwarError::PlaybackError(format!("Failed to decode audio: {}", e)))?;

    sink.append(source);
    sink.sleep_until_end();

    debug!("Playback of {} finished", url);
    Ok(())
}
