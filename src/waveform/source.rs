use std::future::Future;
use std::path::PathBuf;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::WaveformError;

/// Characters left alone by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub trait ByteSource {
    fn fetch(&self, locator: &str) -> impl Future<Output = Result<Vec<u8>, WaveformError>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct FileByteSource {
    root: Option<PathBuf>,
}

impl FileByteSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        FileByteSource {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, locator: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(locator),
            None => PathBuf::from(locator),
        }
    }
}

impl ByteSource for FileByteSource {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, WaveformError> {
        let path = self.resolve(locator);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| WaveformError::fetch(locator, e))?;
        debug!(?path, len = bytes.len(), "read media bytes");
        Ok(bytes)
    }
}

#[derive(Debug, Clone)]
pub struct HttpByteSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpByteSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpByteSource {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, locator: &str) -> String {
        format!(
            "{}/video/{}",
            self.base_url.trim_end_matches('/'),
            utf8_percent_encode(locator, COMPONENT)
        )
    }
}

impl ByteSource for HttpByteSource {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, WaveformError> {
        let url = self.url_for(locator);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| WaveformError::fetch(locator, e))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| WaveformError::fetch(locator, e))?;
        debug!(%url, len = bytes.len(), "fetched media bytes");
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Clone)]
pub enum ConfiguredSource {
    File(FileByteSource),
    Http(HttpByteSource),
}

impl ConfiguredSource {
    pub fn from_config(config: &EngineConfig) -> Self {
        match &config.media_server_url {
            Some(url) => ConfiguredSource::Http(HttpByteSource::new(url.clone())),
            None => ConfiguredSource::File(FileByteSource::new()),
        }
    }
}

impl ByteSource for ConfiguredSource {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, WaveformError> {
        match self {
            ConfiguredSource::File(source) => source.fetch(locator).await,
            ConfiguredSource::Http(source) => source.fetch(locator).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_source_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        std::fs::write(path, b"RIFF").unwrap();

        let source = FileByteSource::with_root(dir.path());
        assert_eq!(source.fetch("clip.wav").await.unwrap(), b"RIFF");
    }

    #[tokio::test]
    async fn missing_file_is_a_fetch_error() {
        let source = FileByteSource::new();
        let err = source.fetch("/nonexistent/clip.mp4").await.unwrap_err();

        assert!(matches!(
            err,
            WaveformError::Fetch { ref locator, .. } if locator == "/nonexistent/clip.mp4"
        ));
    }

    #[test]
    fn http_locator_is_component_encoded() {
        let source = HttpByteSource::new("http://localhost:34115/");

        assert_eq!(
            source.url_for("/home/me/My Clip (1).mp4"),
            "http://localhost:34115/video/%2Fhome%2Fme%2FMy%20Clip%20(1).mp4"
        );
    }

    #[test]
    fn server_url_selects_http_source() {
        let mut config = EngineConfig::default();
        assert!(matches!(
            ConfiguredSource::from_config(&config),
            ConfiguredSource::File(_)
        ));

        config.media_server_url = Some("http://localhost:34115".to_string());
        assert!(matches!(
            ConfiguredSource::from_config(&config),
            ConfiguredSource::Http(_)
        ));
    }
}
