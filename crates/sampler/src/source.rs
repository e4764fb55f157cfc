//! Video decode sources.
//!
//! A [`VideoSource`] only has to report how many frames it can decode and
//! write a given set of frame indices as images. [`FfmpegSource`] shells out to
//! the `ffprobe`/`ffmpeg` binaries; tests substitute in-memory sources.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::config::{SamplerConfig, SamplerError};

/// Access to the decodable frames of a single video.
pub trait VideoSource: Send + Sync {
    /// Human-readable identifier used in logs and errors.
    fn describe(&self) -> String;

    /// Total number of decodable frames.
    fn frame_count(&self) -> Result<u64, SamplerError>;

    /// Decode the frames at `indices` (strictly increasing) into `dest`, one
    /// image file per index, returning the written paths in index order.
    fn extract_frames(&self, indices: &[u64], dest: &Path) -> Result<Vec<PathBuf>, SamplerError>;
}

/// Decode source backed by the `ffprobe` and `ffmpeg` command line tools.
#[derive(Debug, Clone)]
pub struct FfmpegSource {
    path: PathBuf,
    ffmpeg_bin: String,
    ffprobe_bin: String,
}

impl FfmpegSource {
    pub fn new(path: impl Into<PathBuf>, cfg: &SamplerConfig) -> Self {
        Self {
            path: path.into(),
            ffmpeg_bin: cfg.ffmpeg_bin.clone(),
            ffprobe_bin: cfg.ffprobe_bin.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run(&self, tool: &str, args: &[String]) -> Result<Output, SamplerError> {
        Command::new(tool)
            .args(args)
            .output()
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                    SamplerError::ToolUnavailable {
                        tool: tool.to_string(),
                        reason: err.to_string(),
                    }
                }
                _ => SamplerError::WorkArea(err),
            })
    }

    fn ensure_exists(&self) -> Result<(), SamplerError> {
        if self.path.is_file() {
            Ok(())
        } else {
            Err(SamplerError::unreadable(
                self.describe(),
                "file does not exist or is not a regular file",
            ))
        }
    }
}

impl VideoSource for FfmpegSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn frame_count(&self) -> Result<u64, SamplerError> {
        self.ensure_exists()?;
        let args = vec![
            "-v".to_string(),
            "error".to_string(),
            "-select_streams".to_string(),
            "v:0".to_string(),
            "-count_packets".to_string(),
            "-show_entries".to_string(),
            "stream=nb_read_packets".to_string(),
            "-of".to_string(),
            "csv=p=0".to_string(),
            self.path.display().to_string(),
        ];
        let output = self.run(&self.ffprobe_bin, &args)?;
        if !output.status.success() {
            return Err(SamplerError::unreadable(
                self.describe(),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        parse_frame_count(&String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| SamplerError::unreadable(self.describe(), "no video stream found"))
    }

    fn extract_frames(&self, indices: &[u64], dest: &Path) -> Result<Vec<PathBuf>, SamplerError> {
        if indices.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure_exists()?;

        let pattern = dest.join("frame_%04d.png");
        let args = vec![
            "-v".to_string(),
            "error".to_string(),
            "-i".to_string(),
            self.path.display().to_string(),
            "-vf".to_string(),
            select_filter(indices),
            "-fps_mode".to_string(),
            "vfr".to_string(),
            "-frames:v".to_string(),
            indices.len().to_string(),
            pattern.display().to_string(),
        ];
        let output = self.run(&self.ffmpeg_bin, &args)?;
        if !output.status.success() {
            return Err(SamplerError::unreadable(
                self.describe(),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let mut written: Vec<PathBuf> = fs::read_dir(dest)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("frame_") && n.ends_with(".png"))
            })
            .collect();
        written.sort();
        Ok(written)
    }
}

/// Parse the `nb_read_packets` value printed by `ffprobe`.
fn parse_frame_count(stdout: &str) -> Option<u64> {
    stdout
        .lines()
        .map(|line| line.trim().trim_end_matches(','))
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse::<u64>().ok())
}

/// Build an ffmpeg `select` filter keeping exactly the given frame indices.
fn select_filter(indices: &[u64]) -> String {
    let terms: Vec<String> = indices.iter().map(|i| format!("eq(n\\,{i})")).collect();
    format!("select={}", terms.join("+"))
}
