// Loudness analysis for 16-bit PCM buffers
//
// Chunks are ranked by root-mean-square energy of the samples normalized to
// [-1.0, 1.0]. The decibel conversion exists for display only.

/// Calculate the RMS loudness of a PCM buffer.
///
/// RMS = sqrt(sum(sample²) / n), with each sample divided by `i16::MAX`.
/// An empty buffer has a loudness of `0.0`.
pub fn rms(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum: f64 = samples
        .iter()
        .map(|&s| {
            let normalized = s as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();

    (sum / samples.len() as f64).sqrt()
}

/// Calculate RMS from little-endian 16-bit PCM bytes.
///
/// A trailing odd byte is ignored.
pub fn rms_from_le_bytes(bytes: &[u8]) -> f64 {
    if bytes.len() < 2 {
        return 0.0;
    }

    let samples: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    rms(&samples)
}

/// Convert an RMS value to decibels full scale: 20 * log10(rms).
///
/// Returns negative infinity for silence.
pub fn rms_to_decibels(rms: f64) -> f64 {
    if rms <= 0.0 {
        return f64::NEG_INFINITY;
    }
    20.0 * rms.log10()
}
