use anyhow::Result;
use clap::Parser;
use nexo_generator::config::{Config, CredentialReport};
use nexo_generator::models::ContentStatus;
use nexo_generator::pipeline::Pipeline;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "nexo-generator")]
#[command(about = "Generate an Instagram content package")]
struct CliArgs {
    /// Optional topic. Drawn from the built-in catalog when omitted.
    #[arg(value_name = "TOPIC")]
    topic: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nexo_generator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting nexo-generator");

    let args = CliArgs::parse();

    let config = Config::from_env();
    let credentials = CredentialReport::probe(&config).await;
    let pipeline = Pipeline::new(&config, credentials);

    let package = pipeline.run(args.topic.as_deref()).await;
    println!("{}", serde_json::to_string_pretty(&package)?);

    if package.status == ContentStatus::Error {
        error!(
            "Generation failed: {}",
            package.error.as_deref().unwrap_or("unknown error")
        );
        std::process::exit(1);
    }

    info!("Generation completed successfully");
    Ok(())
}
