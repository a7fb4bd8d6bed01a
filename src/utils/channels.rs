use crate::audio::RecorderEvent;
use crate::net::ServerEvent;
use crossbeam_channel::{bounded, Receiver, Sender};

/// Channel bundle for one recording session.
///
/// The recorder callback and the transport worker produce on the `tx`
/// sides; the UI drains both `rx` sides from its update loop, so every
/// state mutation happens on the one control thread.
pub struct SessionChannels {
    pub recorder_tx: Sender<RecorderEvent>,
    pub recorder_rx: Receiver<RecorderEvent>,
    pub server_tx: Sender<ServerEvent>,
    pub server_rx: Receiver<ServerEvent>,
}

impl SessionChannels {
    pub fn new(buffer_size: usize) -> Self {
        let (recorder_tx, recorder_rx) = bounded(buffer_size);
        let (server_tx, server_rx) = bounded(buffer_size);

        Self {
            recorder_tx,
            recorder_rx,
            server_tx,
            server_rx,
        }
    }
}

impl Default for SessionChannels {
    fn default() -> Self {
        Self::new(64)
    }
}
