//! PCM conversion and in-memory WAV encoding
//!
//! The streaming transport carries bare s16le PCM; the single-shot
//! transport uploads a complete WAV file. Both start from the f32 samples
//! cpal delivers.

use crate::{HiwarError, Result};
use std::io::Cursor;

fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Convert f32 samples to little-endian 16-bit PCM bytes
pub fn samples_to_pcm16(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|&s| f32_to_i16(s).to_le_bytes())
        .collect()
}

/// Encode mono f32 samples as a complete WAV file in memory
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| HiwarError::IOError(format!("Failed to create WAV writer: {}", e)))?;
        for &sample in samples {
            writer
                .write_sample(f32_to_i16(sample))
                .map_err(|e| HiwarError::IOError(format!("Failed to write sample: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| HiwarError::IOError(format!("Failed to finalize WAV: {}", e)))?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm16_conversion() {
        let bytes = samples_to_pcm16(&[0.0, 1.0, -1.0]);
        assert_eq!(bytes.len(), 6);
        assert_eq!(i16::from_le_bytes([bytes[0], bytes[1]]), 0);
        assert_eq!(i16::from_le_bytes([bytes[2], bytes[3]]), i16::MAX);
    }

    #[test]
    fn test_pcm16_clamps_out_of_range() {
        let bytes = samples_to_pcm16(&[2.0, -2.0]);
        assert_eq!(i16::from_le_bytes([bytes[0], bytes[1]]), i16::MAX);
        assert_eq!(i16::from_le_bytes([bytes[2], bytes[3]]), -i16::MAX);
    }

    #[test]
    fn test_encode_wav_header() {
        let samples: Vec<f32> = (0..16000)
            .map(|i| (i as f32 * 440.0 * 2.0 * std::f32::consts::PI / 16000.0).sin() * 0.5)
            .collect();
        let wav = encode_wav(&samples, 16000).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        // 44-byte header plus two bytes per sample
        assert_eq!(wav.len(), 44 + samples.len() * 2);
    }

    #[test]
    fn test_encode_wav_round_trip() {
        let samples = vec![0.0f32, 0.25, -0.25, 0.5];
        let wav = encode_wav(&samples, 16000).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        assert_eq!(reader.spec().sample_rate, 16000);
        assert_eq!(reader.spec().channels, 1);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded.len(), samples.len());
        assert_eq!(decoded[0], 0);
    }
}
