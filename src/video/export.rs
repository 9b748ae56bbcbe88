use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::ExportSettings;
use crate::error::ExportError;
use crate::range::TrimRange;
use crate::video::SourceInfo;

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub source_path: PathBuf,
    pub title: String,
    pub trim_start: f64,
    pub trim_end: f64,
    pub format: String,
    pub resolution: String,
    pub codec: String,
    pub bitrate: String,
}

impl ExportRequest {
    pub fn new(
        source: &SourceInfo,
        trim: TrimRange,
        settings: &ExportSettings,
        title: &str,
    ) -> Self {
        let title = match title.trim() {
            "" => source.default_title(),
            title => title.to_string(),
        };

        ExportRequest {
            source_path: source.path.clone(),
            title,
            trim_start: trim.start,
            trim_end: trim.end,
            format: settings.format.clone(),
            resolution: settings.resolution.clone(),
            codec: settings.codec.clone(),
            bitrate: settings.bitrate.clone(),
        }
    }

    pub fn span(&self) -> f64 {
        self.trim_end - self.trim_start
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.title, self.format)
    }
}

pub trait ExportCollaborator {
    fn export(
        &self,
        request: ExportRequest,
    ) -> impl Future<Output = Result<PathBuf, ExportError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipSummary {
    pub duration: f64,
    pub estimated_bytes: Option<u64>,
}

impl ClipSummary {
    pub fn new(span: f64, source_duration: f64, source_bytes: Option<u64>) -> Self {
        let estimated_bytes = source_bytes
            .filter(|_| source_duration > 0.0)
            .map(|bytes| (span / source_duration * bytes as f64).round())
            .map(|bytes| bytes as u64);

        ClipSummary {
            duration: span,
            estimated_bytes,
        }
    }

    pub fn estimated_megabytes(&self) -> Option<f64> {
        self.estimated_bytes
            .map(|bytes| bytes as f64 / (1024.0 * 1024.0))
    }
}

#[derive(Debug, Clone)]
pub struct FfmpegExporter {
    save_dir: PathBuf,
}

impl FfmpegExporter {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        FfmpegExporter {
            save_dir: save_dir.into(),
        }
    }

    pub fn from_settings(settings: &ExportSettings) -> Self {
        let save_dir = settings
            .save_dir
            .clone()
            .or_else(dirs::video_dir)
            .or_else(|| dirs::home_dir().map(|home| home.join("Videos")))
            .unwrap_or_else(|| PathBuf::from("."));

        FfmpegExporter::new(save_dir)
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }
}

impl ExportCollaborator for FfmpegExporter {
    async fn export(&self, request: ExportRequest) -> Result<PathBuf, ExportError> {
        if request.span() <= 0.0 {
            return Err(ExportError::EmptyRange {
                start: request.trim_start,
                end: request.trim_end,
            });
        }

        let ffmpeg = which::which("ffmpeg").map_err(|_| ExportError::FfmpegMissing)?;

        tokio::fs::create_dir_all(&self.save_dir)
            .await
            .map_err(|source| ExportError::Io {
                path: self.save_dir.clone(),
                source,
            })?;

        let output_path = self.save_dir.join(request.file_name());
        let args = ffmpeg_args(&request, &output_path);
        debug!(?ffmpeg, ?args, "running export");

        let output = Command::new(ffmpeg)
            .args(&args)
            .output()
            .await
            .map_err(|e| ExportError::Failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr.lines().last().unwrap_or("ffmpeg exited with an error");
            warn!(status = %output.status, "ffmpeg export failed");
            return Err(ExportError::Failed(reason.to_string()));
        }

        info!(path = ?output_path, "clip exported");
        Ok(output_path)
    }
}

fn scale_filter(resolution: &str) -> Option<String> {
    let resolution = resolution.trim().to_ascii_lowercase();
    match resolution.as_str() {
        "" | "source" | "original" => None,
        preset if preset.ends_with('p') => preset
            .trim_end_matches('p')
            .parse::<u32>()
            .ok()
            .map(|height| format!("scale=-2:{height}")),
        size => {
            let (width, height) = size.split_once('x')?;
            let width = width.parse::<u32>().ok()?;
            let height = height.parse::<u32>().ok()?;
            Some(format!("scale={width}:{height}"))
        }
    }
}

fn ffmpeg_args(request: &ExportRequest, output_path: &Path) -> Vec<String> {
    let mut args = vec![
        "-i".to_string(),
        request.source_path.to_string_lossy().into_owned(),
        "-ss".to_string(),
        format!("{:.2}", request.trim_start),
        "-t".to_string(),
        format!("{:.2}", request.span()),
    ];

    if let Some(filter) = scale_filter(&request.resolution) {
        args.extend(["-vf".to_string(), filter]);
    }

    args.extend(
        [
            "-c:v",
            request.codec.as_str(),
            "-preset",
            "medium",
            "-c:a",
            "aac",
            "-b:a",
            request.bitrate.as_str(),
            "-y",
        ]
        .map(str::to_string),
    );
    args.push(output_path.to_string_lossy().into_owned());
    args
}
