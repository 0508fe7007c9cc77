pub mod backend;
pub mod chunk;
pub mod file;
pub mod generator;
pub mod loudness;
pub mod wav;

pub use backend::{
    AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame, AudioSource, ChannelBackend,
};
pub use chunk::ChunkAssembler;
pub use file::{AudioFile, FileBackend};
pub use generator::GeneratorBackend;
pub use loudness::{rms, rms_from_le_bytes, rms_to_decibels};
pub use wav::{encode, PcmFormat, WavError, WAV_HEADER_LEN};
