//! PromptEnhance service entrypoint.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pe_server::ServiceConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // A local .env is a convenience; real environment variables win.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServiceConfig::from_env()?;
    info!(
        port = config.port,
        environment = %config.environment,
        model = %config.provider.model,
        "starting PromptEnhance backend"
    );

    pe_server::serve(config).await
}
