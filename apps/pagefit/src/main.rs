use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pagefit::{layout_batch, CompressionController, Config, LayoutError, LayoutRequest, LayoutResult, PdfRenderer};

/// Lay out résumés as PDFs that fit a page limit.
#[derive(Parser)]
#[command(name = "pagefit", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out one request and write the PDF.
    Render {
        /// Request JSON: {name, contact_line, content, keywords, max_pages}
        request: PathBuf,
        /// Where to write the PDF.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Lay out several requests in parallel.
    Batch {
        #[arg(required = true)]
        requests: Vec<PathBuf>,
        /// Directory for the PDFs, one per request, named after the request file.
        #[arg(long)]
        out_dir: PathBuf,
        /// Per-request time budget in milliseconds. Overrides PAGEFIT_TIME_BUDGET_MS.
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Logs go to stderr; stdout carries the JSON summary.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting pagefit v{}", env!("CARGO_PKG_VERSION"));
    info!(
        min_font_pt = config.layout.min_font_pt,
        min_margin_in = config.layout.min_margin_in,
        max_attempts = config.layout.max_attempts,
        "Layout config loaded"
    );

    let controller = Arc::new(CompressionController::new(config.layout.clone(), PdfRenderer::new()));

    let all_succeeded = match cli.command {
        Commands::Render { request, output } => render_one(controller, &request, &output).await?,
        Commands::Batch {
            requests,
            out_dir,
            timeout_ms,
        } => render_batch(controller, &requests, &out_dir, timeout_ms.map(Duration::from_millis)).await?,
    };

    if !all_succeeded {
        std::process::exit(1);
    }
    Ok(())
}

async fn render_one(
    controller: Arc<CompressionController<PdfRenderer>>,
    request_path: &Path,
    output: &Path,
) -> Result<bool> {
    let request = load_request(request_path).await?;

    // CPU-bound: keep rendering off the async executor.
    let outcome = tokio::task::spawn_blocking(move || controller.layout(&request))
        .await
        .context("spawn_blocking failed in render")?;

    let (report, succeeded) = report_outcome(outcome, output).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(succeeded)
}

async fn render_batch(
    controller: Arc<CompressionController<PdfRenderer>>,
    request_paths: &[PathBuf],
    out_dir: &Path,
    timeout: Option<Duration>,
) -> Result<bool> {
    let mut requests = Vec::with_capacity(request_paths.len());
    for path in request_paths {
        requests.push(load_request(path).await?);
    }
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let outcomes = layout_batch(controller, requests, timeout).await;

    let mut reports = Vec::with_capacity(outcomes.len());
    let mut all_succeeded = true;
    for (path, outcome) in request_paths.iter().zip(outcomes) {
        let output = output_path_for(path, out_dir);
        let (mut report, succeeded) = report_outcome(outcome, &output).await?;
        report["request"] = json!(path.display().to_string());
        all_succeeded &= succeeded;
        reports.push(report);
    }
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(all_succeeded)
}

/// Writes the artifact on success and builds the JSON report line.
async fn report_outcome(
    outcome: Result<LayoutResult, LayoutError>,
    output: &Path,
) -> Result<(serde_json::Value, bool)> {
    match outcome {
        Ok(result) => {
            tokio::fs::write(output, &result.artifact)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(
                output = %output.display(),
                pages = result.page_count.pages(),
                "PDF written"
            );
            if result.overflowed {
                warn!(output = %output.display(), "Minimal layout still exceeds the page limit");
            }
            let report = json!({
                "output": output.display().to_string(),
                "result": result.summary(),
            });
            Ok((report, result.succeeded))
        }
        Err(e) => {
            let report = json!({
                "error": { "code": e.code(), "message": format!("{e:#}") },
            });
            Ok((report, false))
        }
    }
}

async fn load_request(path: &Path) -> Result<LayoutRequest> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read request {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid request JSON in {}", path.display()))
}

fn output_path_for(request_path: &Path, out_dir: &Path) -> PathBuf {
    let stem = request_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "resume".to_string());
    out_dir.join(format!("{stem}.pdf"))
}
