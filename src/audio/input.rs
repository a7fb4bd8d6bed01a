//! Microphone capture
//!
//! Two capture modes on top of one cpal input stream: single-shot
//! accumulates the whole utterance and emits one WAV clip on stop,
//! streaming emits fixed-interval PCM chunks while recording. Chunks are
//! delivered in capture order and nothing is emitted after `Stopped`.

use crate::audio::wav::{encode_wav, samples_to_pcm16};
use crate::audio::RecorderEvent;
use crate::{HiwarError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug)]
enum CaptureMode {
    SingleShot,
    Streaming { chunk_samples: usize },
}

/// Number of mono samples in one streaming chunk
fn chunk_size(sample_rate: u32, interval_ms: u64) -> usize {
    ((sample_rate as u64 * interval_ms) / 1000).max(1) as usize
}

/// Average interleaved frames down to mono
fn downmix(data: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        data.to_vec()
    } else {
        data.chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    }
}

pub struct Recorder {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    mode: Option<CaptureMode>,
    event_tx: Option<Sender<RecorderEvent>>,
    pending: Arc<Mutex<Vec<f32>>>,
    is_capturing: Arc<Mutex<bool>>,
}

impl Recorder {
    /// Create a recorder on the default input device.
    ///
    /// Fails when no input device exists or the platform refuses access.
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| HiwarError::AudioDeviceError("No input device available".into()))?;

        info!(
            "Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_input_config()
            .map_err(|e| HiwarError::AudioDeviceError(format!("Failed to get input config: {}", e)))?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
            mode: None,
            event_tx: None,
            pending: Arc::new(Mutex::new(Vec::new())),
            is_capturing: Arc::new(Mutex::new(false)),
        })
    }

    /// Get the sample rate of the input device
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Get the number of channels
    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Start capturing for one single-shot session. The whole utterance
    /// is delivered as one `Clip` when `stop` is called.
    pub fn start_single_shot(&mut self, event_tx: Sender<RecorderEvent>) -> Result<()> {
        self.start(CaptureMode::SingleShot, event_tx)
    }

    /// Start capturing for one streaming session, emitting a `Chunk` per
    /// `interval_ms` of audio for every non-empty slice.
    pub fn start_streaming(
        &mut self,
        interval_ms: u64,
        event_tx: Sender<RecorderEvent>,
    ) -> Result<()> {
        let chunk_samples = chunk_size(self.sample_rate(), interval_ms);
        self.start(CaptureMode::Streaming { chunk_samples }, event_tx)
    }

    fn start(&mut self, mode: CaptureMode, event_tx: Sender<RecorderEvent>) -> Result<()> {
        if self.stream.is_some() {
            warn!("Already capturing");
            return Ok(());
        }

        self.pending.lock().clear();

        let channels = self.config.channels as usize;
        let is_capturing = Arc::clone(&self.is_capturing);
        let pending = Arc::clone(&self.pending);
        let tx = event_tx.clone();
        let streaming_chunk = match mode {
            CaptureMode::Streaming { chunk_samples } => Some(chunk_samples),
            CaptureMode::SingleShot => None,
        };

        let err_fn = |err| {
            warn!("Audio input stream error: {}", err);
        };

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if !*is_capturing.lock() {
                        return;
                    }

                    let samples = downmix(data, channels);
                    let mut buf = pending.lock();
                    buf.extend_from_slice(&samples);

                    if let Some(chunk_samples) = streaming_chunk {
                        while buf.len() >= chunk_samples {
                            let chunk: Vec<f32> = buf.drain(..chunk_samples).collect();
                            if let Err(e) = tx.try_send(RecorderEvent::Chunk(samples_to_pcm16(&chunk))) {
                                debug!("Failed to deliver audio chunk: {}", e);
                            }
                        }
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| HiwarError::PermissionDenied(format!("Failed to open input stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| HiwarError::AudioDeviceError(format!("Failed to start input stream: {}", e)))?;

        *self.is_capturing.lock() = true;
        self.stream = Some(stream);
        self.mode = Some(mode);
        self.event_tx = Some(event_tx);

        info!("Started audio capture");
        Ok(())
    }

    /// Stop capturing. Calling this on an inactive recorder is a no-op.
    ///
    /// Streaming sessions flush any remaining partial chunk; single-shot
    /// sessions finalize the accumulated samples into one WAV clip.
    /// `Stopped` is delivered exactly once, after everything else.
    pub fn stop(&mut self) -> Result<()> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };

        *self.is_capturing.lock() = false;
        // Dropping the stream stops the device callback; nothing can be
        // appended to `pending` after this point.
        drop(stream);

        let mode = self.mode.take();
        let event_tx = self.event_tx.take();
        let remainder: Vec<f32> = std::mem::take(&mut *self.pending.lock());

        if let (Some(mode), Some(tx)) = (mode, event_tx) {
            match mode {
                CaptureMode::Streaming { .. } => {
                    if !remainder.is_empty() {
                        if let Err(e) = tx.try_send(RecorderEvent::Chunk(samples_to_pcm16(&remainder))) {
                            debug!("Failed to deliver final chunk: {}", e);
                        }
                    }
                }
                CaptureMode::SingleShot => {
                    let clip = encode_wav(&remainder, self.sample_rate())?;
                    if let Err(e) = tx.try_send(RecorderEvent::Clip(clip)) {
                        warn!("Failed to deliver recorded clip: {}", e);
                    }
                }
            }
            let _ = tx.try_send(RecorderEvent::Stopped);
        }

        info!("Stopped audio capture");
        Ok(())
    }

    /// Check if currently capturing
    pub fn is_capturing(&self) -> bool {
        *self.is_capturing.lock()
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
