//! VidCred Server - HTTP upload endpoint for the video credit engine
//!
//! Wraps a single, shared [`vidcred::Pipeline`] in an Axum application:
//!
//! - **Upload**: multipart video upload returning the analysis report
//! - **Health & Metrics**: liveness/readiness probes and Prometheus metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics
//! - `POST /upload`, `POST /api/v1/upload` - Analyse an uploaded video
//!
//! # Errors
//!
//! Failures are returned as `{"error": {"code", "message"}}`. An unreadable
//! video is `422 UNREADABLE_VIDEO`; a missing `video` field is
//! `400 MISSING_VIDEO`; an unreachable analysis service is
//! `503 ANALYSIS_UNAVAILABLE` when analysis is required.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::{ffmpeg_sources, PrometheusMetrics, ServerState, SourceFactory};
