//! Scoped audio playback.
//!
//! An [`AudioOutput`] starts a clip and hands back a [`PlaybackGuard`]. The
//! guard owns the clip: dropping it stops playback, so a session that ends
//! early (error, Ctrl-C, dismissed) never leaves audio running.

use crate::errors::AudioError;
use std::time::Duration;

const WAIT_POLL: Duration = Duration::from_millis(50);

/// A clip that is currently playing.
pub trait Playback: Send + Sync {
    fn stop(&self);
    fn is_finished(&self) -> bool;
}

/// Somewhere WAV bytes can be played.
pub trait AudioOutput: Send + Sync {
    fn start(&self, wav: Vec<u8>) -> Result<PlaybackGuard, AudioError>;
}

/// Stops its clip when dropped.
pub struct PlaybackGuard {
    inner: Box<dyn Playback>,
}

impl PlaybackGuard {
    pub fn new(inner: impl Playback + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Resolve once the clip has played to the end.
    pub async fn wait(&self) {
        while !self.inner.is_finished() {
            tokio::time::sleep(WAIT_POLL).await;
        }
    }
}

impl Drop for PlaybackGuard {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

impl std::fmt::Debug for PlaybackGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackGuard")
            .field("finished", &self.inner.is_finished())
            .finish()
    }
}

/// The default output device, if this build can play audio.
pub fn default_output() -> Result<Box<dyn AudioOutput>, AudioError> {
    #[cfg(feature = "playback")]
    {
        Ok(Box::new(device::DeviceOutput))
    }
    #[cfg(not(feature = "playback"))]
    {
        Err(AudioError::Unavailable)
    }
}

#[cfg(feature = "playback")]
pub use device::DeviceOutput;

#[cfg(feature = "playback")]
mod device {
    use super::{AudioOutput, Playback, PlaybackGuard};
    use crate::errors::AudioError;
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use std::io::Cursor;
    use std::sync::OnceLock;

    /// Process-wide handle to the default device. The stream itself is
    /// `!Send`, so it lives on a parked thread until the process exits.
    static DEVICE: OnceLock<Result<OutputStreamHandle, String>> = OnceLock::new();

    fn device_handle() -> Result<OutputStreamHandle, AudioError> {
        DEVICE
            .get_or_init(open_device)
            .clone()
            .map_err(AudioError::Device)
    }

    fn open_device() -> Result<OutputStreamHandle, String> {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::Builder::new()
            .name("daybrief-audio".to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    let _ = tx.send(Ok(handle));
                    let _stream = stream;
                    loop {
                        std::thread::park();
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e.to_string()));
                }
            })
            .map_err(|e| format!("failed to start audio thread: {}", e))?;

        rx.recv()
            .map_err(|_| "audio thread exited before opening a device".to_string())?
    }

    impl Playback for Sink {
        fn stop(&self) {
            Sink::stop(self);
        }

        fn is_finished(&self) -> bool {
            self.empty()
        }
    }

    /// Plays through the default output device via `rodio`.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct DeviceOutput;

    impl AudioOutput for DeviceOutput {
        fn start(&self, wav: Vec<u8>) -> Result<PlaybackGuard, AudioError> {
            let handle = device_handle()?;
            let sink = Sink::try_new(&handle).map_err(|e| AudioError::Device(e.to_string()))?;
            let source =
                Decoder::new(Cursor::new(wav)).map_err(|e| AudioError::InvalidWav(e.to_string()))?;
            sink.append(source);
            tracing::debug!("audio playback started");
            Ok(PlaybackGuard::new(sink))
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub(crate) struct ClipState {
        pub stopped: Arc<AtomicBool>,
        pub finished: Arc<AtomicBool>,
    }

    struct RecordedClip(ClipState);

    impl Playback for RecordedClip {
        fn stop(&self) {
            self.0.stopped.store(true, Ordering::SeqCst);
        }

        fn is_finished(&self) -> bool {
            self.0.finished.load(Ordering::SeqCst) || self.0.stopped.load(Ordering::SeqCst)
        }
    }

    /// Records every clip it is asked to play.
    #[derive(Default)]
    pub(crate) struct RecordingOutput {
        pub played: Mutex<Vec<Vec<u8>>>,
        pub clip: ClipState,
    }

    impl AudioOutput for RecordingOutput {
        fn start(&self, wav: Vec<u8>) -> Result<PlaybackGuard, AudioError> {
            self.played.lock().unwrap().push(wav);
            Ok(PlaybackGuard::new(RecordedClip(self.clip.clone())))
        }
    }
}
