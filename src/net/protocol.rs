//! Wire format shared by both transports
//!
//! The backend speaks JSON: one response object per single-shot exchange,
//! and a sequence of text frames on the streaming socket. Audio always
//! travels in the other direction as raw bytes (binary frames or a
//! multipart upload), never as JSON.

use serde::{Deserialize, Serialize};

/// Response body of `POST /api/voice` (single-shot exchange)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceResponse {
    pub transcript: String,
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tts_audio_url: Option<String>,
}

/// Inbound text frame on the streaming socket.
///
/// Frames are distinguished by which fields they carry; a final result
/// always has both the transcript and the reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Final {
        final_transcript: String,
        response: String,
        #[serde(default)]
        tts_audio_url: Option<String>,
    },
    Partial {
        partial_transcript: String,
    },
    Error {
        error: String,
    },
}

/// Outbound control frame on the streaming socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ClientEvent {
    /// No more audio will arrive for the current utterance. The socket
    /// stays open so the backend can deliver its final result.
    End,
}

/// The backend sends an empty string when no speech was synthesized;
/// treat that the same as an absent URL.
pub fn normalize_tts_url(url: Option<String>) -> Option<String> {
    url.filter(|u| !u.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial() {
        let msg: ServerMessage = serde_json::from_str(r#"{"partial_transcript":"hello"}"#).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Partial {
                partial_transcript: "hello".to_string()
            }
        );
    }

    #[test]
    fn test_parse_final_with_audio() {
        let text = r#"{"final_transcript":"hello there","response":"Hi, how are you?","tts_audio_url":"https://x/1.mp3"}"#;
        let msg: ServerMessage = serde_json::from_str(text).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Final {
                final_transcript: "hello there".to_string(),
                response: "Hi, how are you?".to_string(),
                tts_audio_url: Some("https://x/1.mp3".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_final_without_audio() {
        let text = r#"{"final_transcript":"hi","response":"hello"}"#;
        match serde_json::from_str::<ServerMessage>(text).unwrap() {
            ServerMessage::Final { tts_audio_url, .. } => assert_eq!(tts_audio_url, None),
            other => panic!("expected final, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_backend_error() {
        let msg: ServerMessage =
            serde_json::from_str(r#"{"error":"Audio conversion failed."}"#).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Error {
                error: "Audio conversion failed.".to_string()
            }
        );
    }

    #[test]
    fn test_end_signal_wire_format() {
        let text = serde_json::to_string(&ClientEvent::End).unwrap();
        assert_eq!(text, r#"{"event":"end"}"#);
    }

    #[test]
    fn test_voice_response_defaults() {
        let body: VoiceResponse =
            serde_json::from_str(r#"{"transcript":"a","response":"b"}"#).unwrap();
        assert_eq!(body.tts_audio_url, None);
    }

    #[test]
    fn test_normalize_tts_url() {
        assert_eq!(normalize_tts_url(None), None);
        assert_eq!(normalize_tts_url(Some(String::new())), None);
        assert_eq!(normalize_tts_url(Some("  ".to_string())), None);
        assert_eq!(
            normalize_tts_url(Some("https://x/1.mp3".to_string())),
            Some("https://x/1.mp3".to_string())
        );
    }
}
