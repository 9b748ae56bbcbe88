pub mod config;
pub mod error;
pub mod range;
pub mod timeline;
pub mod timestamp;
pub mod video;
pub mod waveform;
