//! Single-shot voice exchange
//!
//! One multipart POST per recording session, sent only after the recorder
//! has finalized the whole utterance. There is no retry; a failed exchange
//! is reported and the user starts over by pressing the toggle again.

use crate::net::protocol::{normalize_tts_url, VoiceResponse};
use crate::net::ServerEvent;
use crate::{HiwarError, Result};
use crossbeam_channel::Sender;
use tokio::runtime::Runtime;
use tracing::{debug, error, info};
use url::Url;

/// Send one finalized utterance to the backend.
///
/// Runs on its own worker thread and reports the outcome through
/// `event_tx`: either `Final` or `Error`, always followed by `Closed`.
pub fn send_utterance(endpoint: Url, wav_bytes: Vec<u8>, event_tx: Sender<ServerEvent>) {
    std::thread::spawn(move || {
        let runtime = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                error!("Failed to create tokio runtime: {}", e);
                let _ = event_tx.send(ServerEvent::Error(format!("Runtime creation failed: {}", e)));
                let _ = event_tx.send(ServerEvent::Closed);
                return;
            }
        };

        info!(bytes = wav_bytes.len(), "Sending utterance to {}", endpoint);

        match runtime.block_on(exchange(endpoint, wav_bytes)) {
            Ok(reply) => {
                debug!("Voice exchange complete: \"{}\"", reply.transcript);
                let _ = event_tx.send(ServerEvent::Final {
                    transcript: reply.transcript,
                    reply: reply.response,
                    tts_audio_url: normalize_tts_url(reply.tts_audio_url),
                });
            }
            Err(e) => {
                error!("Voice exchange failed: {}", e);
                let _ = event_tx.send(ServerEvent::Error(e.user_message()));
            }
        }

        // Exactly one exchange per session; the worker always ends here.
        let _ = event_tx.send(ServerEvent::Closed);
    });
}

async fn exchange(endpoint: Url, wav_bytes: Vec<u8>) -> Result<VoiceResponse> {
    let part = reqwest::multipart::Part::bytes(wav_bytes)
        .file_name("audio.wav")
        .mime_str("audio/wav")
        .map_err(|e| HiwarError::TransportError(format!("Failed to build upload: {}", e)))?;
    let form = reqwest::multipart::Form::new().part("audio", part);

    let response = reqwest::Client::new()
        .post(endpoint)
        .multipart(form)
        .send()
        .await
        .map_err(|e| HiwarError::TransportError(format!("Request failed: {}", e)))?
        .error_for_status()
        .map_err(|e| HiwarError::TransportError(format!("Server rejected request: {}", e)))?;

    response
        .json::<VoiceResponse>()
        .await
        .map_err(|e| HiwarError::ProtocolError(format!("Invalid response body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_failed_exchange_reports_error_then_closed() {
        let (tx, rx) = unbounded();
        // Nothing listens on this port; the request must fail fast and
        // without retrying.
        let url = Url::parse("http://127.0.0.1:1/api/voice").unwrap();
        send_utterance(url, vec![0u8; 64], tx);

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
