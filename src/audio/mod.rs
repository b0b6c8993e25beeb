//! Speech audio: PCM to WAV wrapping and scoped playback.

mod playback;
pub mod wav;

#[cfg(test)]
pub(crate) use playback::testing;

#[cfg(feature = "playback")]
pub use playback::DeviceOutput;
pub use playback::{AudioOutput, Playback, PlaybackGuard, default_output};
pub use wav::{WavHeader, WavSpec, pcm_to_wav};
