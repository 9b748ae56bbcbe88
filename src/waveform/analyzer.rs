use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::EngineConfig;
use crate::error::WaveformError;

use super::decode::{AudioDecoder, SymphoniaDecoder};
use super::source::{ByteSource, ConfiguredSource};
use super::WaveformProfile;

#[derive(Debug)]
pub struct WaveformAnalyzer<S, D> {
    source: S,
    decoder: Arc<D>,
    buckets: usize,
}

impl WaveformAnalyzer<ConfiguredSource, SymphoniaDecoder> {
    pub fn from_config(config: &EngineConfig) -> Self {
        WaveformAnalyzer::new(
            ConfiguredSource::from_config(config),
            SymphoniaDecoder,
            config.waveform_buckets,
        )
    }
}

impl<S: ByteSource, D: AudioDecoder> WaveformAnalyzer<S, D> {
    pub fn new(source: S, decoder: D, buckets: usize) -> Self {
        WaveformAnalyzer {
            source,
            decoder: Arc::new(decoder),
            buckets,
        }
    }

    #[instrument(skip(self))]
    pub async fn analyze(&self, locator: &str) -> Result<WaveformProfile, WaveformError> {
        let bytes = self.source.fetch(locator).await?;

        let decoder = Arc::clone(&self.decoder);
        let samples = tokio::task::spawn_blocking(move || decoder.decode_first_channel(bytes))
            .await
            .map_err(WaveformError::decode)??;

        let profile = WaveformProfile::from_samples(&samples, self.buckets);
        debug!(buckets = profile.len(), "waveform ready");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::source::FileByteSource;

    fn write_ramp(path: &std::path::Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..4000 {
            let amplitude = if i < 2000 { 4000i16 } else { 16000i16 };
            let sign = if i % 2 == 0 { 1 } else { -1 };
            writer.write_sample(amplitude * sign).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[tokio::test]
    async fn profile_follows_loudness() {
        let dir = tempfile::tempdir().unwrap();
        write_ramp(&dir.path().join("ramp.wav"));

        let source = FileByteSource::with_root(dir.path());
        let analyzer = WaveformAnalyzer::new(source, SymphoniaDecoder, 4);
        let profile = analyzer.analyze("ramp.wav").await.unwrap();

        let values = profile.values();
        assert_eq!(values.len(), 4);
        assert!((values[0] - 0.25).abs() < 1e-3);
        assert!((values[3] - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn unreachable_source_fails_fetch() {
        let analyzer = WaveformAnalyzer::new(FileByteSource::new(), SymphoniaDecoder, 200);
        let err = analyzer
            .analyze("/nonexistent/video.mp4")
            .await
            .unwrap_err();

        assert!(matches!(err, WaveformError::Fetch { .. }));
    }
}
