use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vidcred::{ParsedCorpus, load_pipeline};

/// Fingerprint a video, check it against prior uploads and score credits.
#[derive(Debug, Parser)]
#[command(name = "vidcred", version, about)]
struct Cli {
    /// Video file to analyse.
    video: PathBuf,

    /// JSON corpus of prior uploads: `{"videos":[{"fingerprint","owner"}],"current_user"}`.
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Uploader identifier; overrides `current_user` from the corpus file.
    #[arg(long, env = "VIDCRED_USER")]
    user: Option<String>,

    /// YAML pipeline configuration.
    #[arg(long, env = "VIDCRED_CONFIG")]
    config: Option<PathBuf>,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vidcred=info,warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let pipeline = load_pipeline(cli.config.as_deref()).context("failed to build pipeline")?;

    let parsed = match &cli.corpus {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read corpus {}", path.display()))?;
            pipeline.parse_corpus(&text)
        }
        None => ParsedCorpus::default(),
    };
    let uploader = cli.user.or(parsed.current_user);

    let report = pipeline
        .process_file(&cli.video, &parsed.corpus, uploader.as_deref())
        .await
        .with_context(|| format!("failed to process {}", cli.video.display()))?
        .with_leading_warnings(parsed.warnings);

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}
