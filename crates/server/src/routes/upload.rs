//! `POST /upload`: multipart video upload.
//!
//! Form fields:
//! - `video` (file, required)
//! - `corpus` (text, optional): `{"videos":[{"fingerprint","owner"}],"current_user"}`
//! - `current_user` (text, optional): overrides `corpus.current_user`
//!
//! The upload is written into a request-scoped work area that is removed once
//! the report has been built, whether or not processing succeeded.

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use vidcred::{AnalysisReport, WorkArea};

pub const COMPLETED_MESSAGE: &str = "Processing completed!";

/// Upload response: the analysis report plus a status message.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

#[derive(Debug, Default)]
struct UploadForm {
    video: Option<PathBuf>,
    corpus: Option<String>,
    current_user: Option<String>,
}

/// Keep only a short alphanumeric extension from the client's file name.
fn stored_name(file_name: Option<&str>) -> String {
    let ext = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()));
    match ext {
        Some(ext) => format!("upload.{}", ext.to_ascii_lowercase()),
        None => "upload".to_string(),
    }
}

async fn read_form(multipart: &mut Multipart, work: &WorkArea) -> ServerResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video" => {
                let path = work.join(stored_name(field.file_name()));
                let mut file = tokio::fs::File::create(&path).await?;
                let mut written = 0usize;
                while let Some(chunk) = field.chunk().await? {
                    written += chunk.len();
                    file.write_all(&chunk).await?;
                }
                file.flush().await?;
                tracing::debug!(bytes = written, path = %path.display(), "stored upload");
                if written > 0 {
                    form.video = Some(path);
                }
            }
            "corpus" => form.corpus = Some(field.text().await?),
            "current_user" => {
                let user = field.text().await?;
                form.current_user = Some(user.trim().to_string()).filter(|u| !u.is_empty());
            }
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok(form)
}

/// Process one uploaded video.
pub async fn upload_video(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> ServerResult<Json<UploadResponse>> {
    let work = WorkArea::new(state.config.upload_root.as_deref(), "upload")?;
    let form = read_form(&mut multipart, &work).await?;
    let video = form.video.ok_or(ServerError::MissingVideo)?;

    let parsed = state
        .pipeline
        .parse_corpus(form.corpus.as_deref().unwrap_or_default());
    let uploader = form.current_user.or(parsed.current_user);

    let source = (state.sources)(video);
    let report = state
        .pipeline
        .process(source, &parsed.corpus, uploader.as_deref())
        .await?
        .with_leading_warnings(parsed.warnings);
    drop(work);

    Ok(Json(UploadResponse {
        message: COMPLETED_MESSAGE.to_string(),
        report,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_name_keeps_safe_extension() {
        assert_eq!(stored_name(Some("Lecture 1.MP4")), "upload.mp4");
        assert_eq!(stored_name(Some("../../etc/passwd")), "upload");
        assert_eq!(stored_name(Some("clip.we!rd")), "upload");
        assert_eq!(stored_name(None), "upload");
    }
}
