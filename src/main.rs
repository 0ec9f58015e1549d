use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tumblr_photo_dl::cli::Args;
use tumblr_photo_dl::{CollectorConfig, HttpTransport, ResumableCollector, RunOutcome};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tumblr_photo_dl=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = CollectorConfig::from(&args);

    let transport = HttpTransport::new(&config).context("Failed to build HTTP client")?;
    let mut collector = ResumableCollector::initialize(&args.blog, config, transport)
        .with_context(|| format!("Failed to prepare storage for {}", args.blog))?;

    println!(
        "Downloading {} into {}",
        args.blog,
        collector.storage_dir().display()
    );

    match collector.run().await.context("Download aborted")? {
        RunOutcome::Complete => println!("All files loaded"),
        RunOutcome::Partial { broken } => println!(
            "Some files did not load: {} broken links kept in {}",
            broken,
            collector.checkpoint_path().display()
        ),
    }

    Ok(())
}
