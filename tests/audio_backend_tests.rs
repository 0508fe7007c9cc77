// Unit tests for audio backend abstractions
//
// These tests verify the core audio types and the channel-fed backend.

use anyhow::Result;
use snippet_keeper::audio::{
    AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame, AudioSource, ChannelBackend,
};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_audio_frame_creation() {
    let frame = AudioFrame::new(vec![100, 200, 300], 16000, 1, 1000);

    assert_eq!(frame.samples.len(), 3);
    assert_eq!(frame.sample_rate, 16000);
    assert_eq!(frame.channels, 1);
    assert_eq!(frame.timestamp_ms, 1000);
}

#[test]
fn test_audio_frame_duration() {
    // 100ms at 16kHz mono
    let mono = AudioFrame::new(vec![0i16; 1600], 16000, 1, 0);
    assert_eq!(mono.duration_ms(), 100);

    // Stereo audio is interleaved [L, R, L, R, ...]: 4800 samples is 50ms at 48kHz
    let stereo = AudioFrame::new(vec![0i16; 4800], 48000, 2, 0);
    assert_eq!(stereo.duration_ms(), 50);

    let broken = AudioFrame::new(vec![0i16; 10], 0, 1, 0);
    assert_eq!(broken.duration_ms(), 0);
}

#[test]
fn test_audio_backend_config_default() {
    let config = AudioBackendConfig::default();

    assert_eq!(config.sample_rate, 16000);
    assert_eq!(config.channels, 1, "Default should be mono");
    assert_eq!(config.buffer_duration_ms, 100, "Default buffer should be 100ms");
    assert!(config.realtime);
    assert_eq!(config.samples_per_frame(), 1600);
}

#[test]
fn test_samples_per_frame_is_interleaved() {
    let config = AudioBackendConfig {
        sample_rate: 48000,
        channels: 2,
        buffer_duration_ms: 50,
        realtime: false,
    };
    assert_eq!(config.samples_per_frame(), 4800);

    // Never zero, even for a tiny buffer
    let tiny = AudioBackendConfig {
        sample_rate: 100,
        channels: 1,
        buffer_duration_ms: 1,
        realtime: false,
    };
    assert_eq!(tiny.samples_per_frame(), 1);
}

#[test]
fn test_audio_source_from_input() {
    assert_eq!(AudioSource::from_input(None), AudioSource::Generator);
    assert_eq!(AudioSource::from_input(Some("")), AudioSource::Generator);
    assert_eq!(
        AudioSource::from_input(Some("/tmp/input.wav")),
        AudioSource::File(PathBuf::from("/tmp/input.wav"))
    );
}

#[tokio::test]
async fn test_channel_backend_forwards_frames() -> Result<()> {
    let (tx, mut backend) = ChannelBackend::channel(8);
    assert_eq!(backend.name(), "channel");
    assert!(!backend.is_capturing());

    let mut rx = backend.start().await?;
    assert!(backend.is_capturing());

    tx.send(AudioFrame::new(vec![1, 2, 3], 16000, 1, 0)).await?;
    drop(tx);

    let frame = rx.recv().await.expect("frame should arrive");
    assert_eq!(frame.samples, vec![1, 2, 3]);
    assert!(rx.recv().await.is_none(), "closed sender ends the stream");

    backend.stop().await?;
    assert!(!backend.is_capturing());
    Ok(())
}

#[tokio::test]
async fn test_channel_backend_starts_once() -> Result<()> {
    let (_tx, mut backend) = ChannelBackend::channel(1);
    let _rx = backend.start().await?;
    assert!(backend.start().await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_factory_generator_streams_configured_format() -> Result<()> {
    let config = AudioBackendConfig {
        sample_rate: 8000,
        channels: 2,
        buffer_duration_ms: 20,
        realtime: true,
    };

    let mut backend = AudioBackendFactory::create(AudioSource::Generator, config)?;
    let mut rx = backend.start().await?;

    let frame = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await?
        .expect("generator should produce frames");
    assert_eq!(frame.sample_rate, 8000);
    assert_eq!(frame.channels, 2);
    assert_eq!(frame.samples.len(), 320);

    backend.stop().await?;
    Ok(())
}

#[test]
fn test_factory_rejects_missing_file() {
    let result = AudioBackendFactory::create(
        AudioSource::File(PathBuf::from("/nonexistent/recording.wav")),
        AudioBackendConfig::default(),
    );
    assert!(result.is_err());
}
