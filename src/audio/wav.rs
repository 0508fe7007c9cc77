// WAV (RIFF, linear PCM) encoder
//
// Produces a complete in-memory file: the canonical 44-byte header followed
// by little-endian samples. Writing the bytes somewhere durable is the
// caller's job.

use thiserror::Error;

/// Size of the canonical RIFF/WAVE header in bytes
pub const WAV_HEADER_LEN: usize = 44;

const PCM_FORMAT_TAG: u16 = 1;
const FMT_CHUNK_LEN: u32 = 16;

/// Format parameters written into the `fmt ` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channels: u16,
    /// Bits per sample (the payload is always i16, so 16 in practice)
    pub bits_per_sample: u16,
}

impl PcmFormat {
    pub fn new(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.channels as u32 * self.bits_per_sample as u32 / 8
    }

    pub fn block_align(&self) -> u16 {
        self.channels * self.bits_per_sample / 8
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self::new(16000, 1, 16)
    }
}

#[derive(Debug, Error)]
pub enum WavError {
    #[error("payload of {bytes} bytes does not fit a RIFF size field")]
    PayloadTooLarge { bytes: usize },
}

/// Encode 16-bit samples into a WAV file image.
pub fn encode(samples: &[i16], format: PcmFormat) -> Result<Vec<u8>, WavError> {
    let payload_len = samples.len() * 2;

    // RIFF size is total - 8, which must also fit
    let data_len = u32::try_from(payload_len)
        .ok()
        .filter(|len| len.checked_add(WAV_HEADER_LEN as u32 - 8).is_some())
        .ok_or(WavError::PayloadTooLarge { bytes: payload_len })?;
    let riff_len = data_len + WAV_HEADER_LEN as u32 - 8;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + payload_len);

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_len.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    out.extend_from_slice(&PCM_FORMAT_TAG.to_le_bytes());
    out.extend_from_slice(&format.channels.to_le_bytes());
    out.extend_from_slice(&format.sample_rate.to_le_bytes());
    out.extend_from_slice(&format.byte_rate().to_le_bytes());
    out.extend_from_slice(&format.block_align().to_le_bytes());
    out.extend_from_slice(&format.bits_per_sample.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }

    Ok(out)
}
