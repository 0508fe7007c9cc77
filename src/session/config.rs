use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::audio::{PcmFormat, WAV_HEADER_LEN};
use crate::error::{CaptureError, Result};

/// Configuration for a recording session, read once at start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of audio channels (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Bit depth; only 16-bit PCM is supported
    pub bits_per_sample: u16,

    /// Length of each scored chunk
    /// Default: 10 seconds
    pub chunk_duration_secs: u32,

    /// How many of the loudest chunks to keep (N)
    /// Default: 3
    pub snippet_count: usize,

    /// Directory that snippet files are written to
    pub output_dir: PathBuf,
}

impl SessionConfig {
    /// Reject configurations the capture loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.snippet_count < 1 {
            return Err(CaptureError::InvalidConfiguration(
                "snippet count must be at least 1".to_string(),
            ));
        }
        if self.chunk_duration_secs == 0 {
            return Err(CaptureError::InvalidConfiguration(
                "chunk duration must be positive".to_string(),
            ));
        }
        if self.sample_rate == 0 {
            return Err(CaptureError::InvalidConfiguration(
                "sample rate must be positive".to_string(),
            ));
        }
        if self.channels == 0 {
            return Err(CaptureError::InvalidConfiguration(
                "channel count must be at least 1".to_string(),
            ));
        }
        if self.bits_per_sample != 16 {
            return Err(CaptureError::InvalidConfiguration(format!(
                "unsupported sample format: {}-bit (only 16-bit PCM)",
                self.bits_per_sample
            )));
        }

        // Both RIFF size fields are u32
        let riff_len = self.chunk_payload_bytes() + (WAV_HEADER_LEN as u64 - 8);
        if riff_len > u32::MAX as u64 {
            return Err(CaptureError::InvalidConfiguration(format!(
                "{}s chunks of {}Hz/{}ch audio are too large for a WAV file",
                self.chunk_duration_secs, self.sample_rate, self.channels
            )));
        }
        Ok(())
    }

    /// Encoded payload size of one chunk in bytes
    pub fn chunk_payload_bytes(&self) -> u64 {
        self.chunk_duration_secs as u64
            * self.sample_rate as u64
            * self.channels as u64
            * (self.bits_per_sample as u64 / 8)
    }

    /// Interleaved samples in one chunk
    pub fn samples_per_chunk(&self) -> usize {
        self.chunk_duration_secs as usize * self.sample_rate as usize * self.channels as usize
    }

    pub fn pcm_format(&self) -> PcmFormat {
        PcmFormat::new(self.sample_rate, self.channels, self.bits_per_sample)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            bits_per_sample: 16,
            chunk_duration_secs: 10,
            snippet_count: 3,
            output_dir: PathBuf::from("recordings"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.samples_per_chunk(), 160_000);
    }

    #[test]
    fn test_stereo_chunk_length_counts_both_channels() {
        let config = SessionConfig {
            sample_rate: 100,
            channels: 2,
            chunk_duration_secs: 3,
            ..SessionConfig::default()
        };
        assert_eq!(config.samples_per_chunk(), 600);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let cases = [
            SessionConfig { snippet_count: 0, ..SessionConfig::default() },
            SessionConfig { chunk_duration_secs: 0, ..SessionConfig::default() },
            SessionConfig { sample_rate: 0, ..SessionConfig::default() },
            SessionConfig { channels: 0, ..SessionConfig::default() },
            SessionConfig { bits_per_sample: 24, ..SessionConfig::default() },
            SessionConfig {
                sample_rate: 48000,
                channels: 2,
                chunk_duration_secs: 30_000,
                ..SessionConfig::default()
            },
        ];

        for config in cases {
            assert!(
                matches!(config.validate(), Err(CaptureError::InvalidConfiguration(_))),
                "{:?} should be rejected",
                config
            );
        }
    }

    #[test]
    fn test_largest_chunk_that_fits_a_wav_file() {
        // 16-bit mono at 1 Hz: payload 2 bytes per second
        let max_secs = ((u32::MAX as u64 - 36) / 2) as u32;
        let fits = SessionConfig {
            sample_rate: 1,
            chunk_duration_secs: max_secs,
            ..SessionConfig::default()
        };
        assert!(fits.validate().is_ok());
        assert_eq!(fits.chunk_payload_bytes() + 36, u32::MAX as u64 - 1);

        let too_long = SessionConfig {
            chunk_duration_secs: max_secs + 1,
            ..fits
        };
        assert!(matches!(
            too_long.validate(),
            Err(CaptureError::InvalidConfiguration(_))
        ));
    }
}
