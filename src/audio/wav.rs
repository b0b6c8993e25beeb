//! Minimal WAV container for raw PCM.

use crate::errors::AudioError;

/// Length of the canonical PCM WAV header.
pub const HEADER_LEN: usize = 44;

const PCM_FORMAT: u16 = 1;

/// Layout of the PCM samples inside a WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl WavSpec {
    /// Single-channel 16-bit PCM, the speech service's output format.
    pub fn mono16(sample_rate: u32) -> Self {
        Self {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
        }
    }

    /// Bytes per sample frame. Saturates for layouts a header cannot hold.
    pub fn block_align(&self) -> u16 {
        self.checked_block_align().unwrap_or(u16::MAX)
    }

    /// Bytes per second. Saturates for layouts a header cannot hold.
    pub fn byte_rate(&self) -> u32 {
        self.checked_byte_rate().unwrap_or(u32::MAX)
    }

    /// Whether block align and byte rate fit their header fields.
    pub fn is_representable(&self) -> bool {
        self.checked_byte_rate().is_some()
    }

    fn checked_block_align(&self) -> Option<u16> {
        u16::try_from(u32::from(self.channels) * u32::from(self.bits_per_sample) / 8).ok()
    }

    fn checked_byte_rate(&self) -> Option<u32> {
        self.sample_rate
            .checked_mul(u32::from(self.checked_block_align()?))
    }
}

/// Prefix `pcm` with a 44-byte little-endian RIFF/WAVE header.
pub fn pcm_to_wav(pcm: &[u8], spec: WavSpec) -> Vec<u8> {
    let data_len = pcm.len() as u32;
    let mut wav = Vec::with_capacity(HEADER_LEN + pcm.len());

    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    wav.extend_from_slice(&spec.channels.to_le_bytes());
    wav.extend_from_slice(&spec.sample_rate.to_le_bytes());
    wav.extend_from_slice(&spec.byte_rate().to_le_bytes());
    wav.extend_from_slice(&spec.block_align().to_le_bytes());
    wav.extend_from_slice(&spec.bits_per_sample.to_le_bytes());

    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(pcm);

    wav
}

/// Parsed header of a canonical PCM WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub spec: WavSpec,
    pub data_len: u32,
}

impl WavHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self, AudioError> {
        if bytes.len() < HEADER_LEN {
            return Err(AudioError::InvalidWav(format!(
                "expected at least {} bytes, got {}",
                HEADER_LEN,
                bytes.len()
            )));
        }

        expect_tag(bytes, 0, b"RIFF")?;
        expect_tag(bytes, 8, b"WAVE")?;
        expect_tag(bytes, 12, b"fmt ")?;
        expect_tag(bytes, 36, b"data")?;

        let format = read_u16(bytes, 20);
        if format != PCM_FORMAT {
            return Err(AudioError::InvalidWav(format!(
                "unsupported format code {}",
                format
            )));
        }

        let spec = WavSpec {
            channels: read_u16(bytes, 22),
            sample_rate: read_u32(bytes, 24),
            bits_per_sample: read_u16(bytes, 34),
        };
        if spec.channels == 0 || spec.bits_per_sample == 0 || spec.bits_per_sample % 8 != 0 {
            return Err(AudioError::InvalidWav(format!(
                "invalid sample layout: {} channels, {} bits",
                spec.channels, spec.bits_per_sample
            )));
        }
        if !spec.is_representable() {
            return Err(AudioError::InvalidWav(format!(
                "sample layout overflows the header: {} channels, {} bits, {} Hz",
                spec.channels, spec.bits_per_sample, spec.sample_rate
            )));
        }

        let data_len = read_u32(bytes, 40);
        if data_len as usize > bytes.len() - HEADER_LEN {
            return Err(AudioError::InvalidWav(format!(
                "data chunk claims {} bytes but only {} follow the header",
                data_len,
                bytes.len() - HEADER_LEN
            )));
        }

        Ok(Self { spec, data_len })
    }

    /// Samples per channel.
    pub fn sample_count(&self) -> u32 {
        self.data_len / u32::from(self.spec.block_align().max(1))
    }

    /// Playback length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.sample_count() as f64 / self.spec.sample_rate.max(1) as f64
    }
}

fn expect_tag(bytes: &[u8], offset: usize, tag: &[u8; 4]) -> Result<(), AudioError> {
    if &bytes[offset..offset + 4] != tag {
        return Err(AudioError::InvalidWav(format!(
            "missing '{}' chunk at offset {}",
            String::from_utf8_lossy(tag),
            offset
        )));
    }
    Ok(())
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
