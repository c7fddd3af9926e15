use anyhow::Context;
use clap::Parser;
use image_enhancer::batch;
use image_enhancer::config::{Args, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::try_from(args).context("Invalid configuration")?;

    tracing::info!("Starting image-enhancer v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Parameters: {:?}", config.params);

    let summary = batch::run(&config).with_context(|| {
        format!(
            "Failed to enhance images in {}",
            config.input_dir.display()
        )
    })?;

    tracing::info!(
        "Done in {}ms: {} enhanced, {} skipped, {} total",
        summary.elapsed_ms,
        summary.processed_count(),
        summary.skipped_count(),
        summary.total
    );
    for skipped in &summary.skipped {
        tracing::warn!("Skipped {}: {}", skipped.file, skipped.reason);
    }

    if let Some(path) = &config.report {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    if config.fail_on_skip && summary.skipped_count() > 0 {
        anyhow::bail!("{} file(s) could not be enhanced", summary.skipped_count());
    }

    Ok(())
}
