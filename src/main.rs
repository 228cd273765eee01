// Entry point: loads config, applies CLI overrides and runs the analysis.
use std::error::Error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tau_align::cli::Args;
use tau_align::config::AppConfig;
use tau_align::pipeline;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let mut cfg = AppConfig::load_or_default(&args.config);
    args.apply(&mut cfg);

    let report = pipeline::run(&cfg)?;
    for path in &report.outputs {
        println!("{}", path.display());
    }
    Ok(())
}
