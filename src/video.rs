use std::path::{Path, PathBuf};

pub mod export;
#[cfg(feature = "gst")]
pub mod player;
pub mod simulated;

#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    MetadataLoaded { duration: f64 },
    TimeAdvanced(f64),
    PlaybackStarted,
    PlaybackStopped,
    EndReached,
    PlayRejected(String),
    DecodeError(String),
}

pub trait MediaCapability {
    fn load(&mut self, locator: &str);

    fn play(&mut self);

    fn pause(&mut self);

    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, seconds: f64);

    fn duration(&self) -> Option<f64>;

    fn set_muted(&mut self, muted: bool);

    fn poll_event(&mut self) -> Option<MediaEvent>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub name: String,
    pub id: String,
    pub path: PathBuf,
    pub size_bytes: Option<u64>,
}

impl SourceInfo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        SourceInfo {
            id: name.clone(),
            name,
            path,
            size_bytes: None,
        }
    }

    pub fn from_local_path(path: &Path) -> Self {
        let mut info = SourceInfo::new(path);
        info.size_bytes = std::fs::metadata(path).ok().map(|meta| meta.len());
        info
    }

    pub fn locator(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    pub fn default_title(&self) -> String {
        let stem = self
            .path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "clip".to_string());
        format!("{stem}_clip")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LibraryEvent {
    FileCreated(PathBuf),
    FileChanged(PathBuf),
    FileRemoved(PathBuf),
    ThumbnailReady(String),
}

impl LibraryEvent {
    pub fn requests_reload(&self) -> bool {
        match self {
            LibraryEvent::FileCreated(_)
            | LibraryEvent::FileChanged(_)
            | LibraryEvent::FileRemoved(_)
            | LibraryEvent::ThumbnailReady(_) => true,
        }
    }
}
