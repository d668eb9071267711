use clap::Parser;
use miette::{IntoDiagnostic, Result};
use paygate::application::router::TransactionRouter;
use paygate::infrastructure::http::HttpTransport;
use paygate::infrastructure::random::ThreadRngRotation;
use paygate::interfaces::cli::Cli;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.router_config().into_diagnostic()?;
    config.validate().into_diagnostic()?;

    let transport =
        HttpTransport::new(Duration::from_secs(config.connect_timeout_secs)).into_diagnostic()?;
    let router = TransactionRouter::new(config, transport, ThreadRngRotation);

    let mut request = cli.request();
    let response = cli.verb.run(&router, &mut request).await;

    println!(
        "{}",
        serde_json::to_string_pretty(&response).into_diagnostic()?
    );
    Ok(())
}
