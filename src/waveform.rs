mod analyzer;
mod decode;
mod profile;
mod slot;
mod source;

pub use analyzer::WaveformAnalyzer;
pub use decode::{AudioDecoder, SymphoniaDecoder};
pub use profile::WaveformProfile;
pub use slot::{SourceId, WaveformSlot, WaveformStatus};
pub use source::{ByteSource, ConfiguredSource, FileByteSource, HttpByteSource};
