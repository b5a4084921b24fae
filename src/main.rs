use anyhow::Result;
use market_i18n::{config, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("market_i18n=info".parse()?),
        )
        .init();

    info!("Starting market i18n service");

    let config = config::Config::from_env()?;
    info!(
        "Locales: {:?} (default '{}'), catalogs at {}",
        config.supported_locales,
        config.default_locale,
        config.catalog_dir.display()
    );

    server::serve(config).await
}
