use anyhow::{Context, Result};
use newsfold::{run_batch, PipelineConfig};
use std::{env, path::Path};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) load batch config ────────────────────────────────────────
    let config = match env::args().nth(1) {
        Some(path) => PipelineConfig::from_yaml_file(Path::new(&path))
            .with_context(|| format!("loading config {}", path))?,
        None => {
            info!("no config given; using built-in archive batch");
            PipelineConfig::builtin()
        }
    };
    info!(sources = config.sources.len(), output_dir = %config.output_dir.display(), "config ready");

    // ─── 3) run ──────────────────────────────────────────────────────
    let report = run_batch(&config)?;

    if env::var_os("NEWSFOLD_REPORT_JSON").is_some() {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    info!("all done");
    Ok(())
}
