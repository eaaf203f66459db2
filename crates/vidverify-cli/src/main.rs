//! vidverify binary.

use clap::Parser;
use tracing::{error, info};

use vidverify_cli::{init_tracing, Analyzer, AppConfig, Args, PipelineResult};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("Failed to install rustls crypto provider");
        std::process::exit(1);
    }

    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => println!("\n🎉 Analysis completed successfully!"),
        Err(e) => {
            error!("Analysis failed: {}", e);
            println!("\n❌ Analysis failed: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(args: Args) -> PipelineResult<()> {
    let config = AppConfig::from_args(args)?;
    info!("Run config: {:?}", config);

    let analyzer = Analyzer::new(config)?;
    analyzer.analyze().await?;
    Ok(())
}
