//! Check catalogs binary - loads every configured catalog and reports problems
//!
//! Usage:
//!   cargo run --bin check-catalogs
//!
//! Reads the same environment as the service:
//! - I18N_LANGUAGES (defaults to en)
//! - I18N_DEFAULT_LOCALE (defaults to en)
//! - I18N_TRANSLATIONS_DIR (defaults to ./translations)
//!
//! Exits with status 1 when a catalog fails to load or has errors.

use anyhow::Result;
use market_i18n::config::Config;
use market_i18n::i18n::{load_catalogs, CatalogValidator};
use tracing::info;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("market_i18n=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let source = config.catalog_source();
    info!("Checking catalogs under {}", source.dir.display());

    let outcome = load_catalogs(&source);
    for (locale, error) in &outcome.failures {
        println!("FAILED  [{}] {}", locale, error);
    }

    let report = CatalogValidator::validate(&outcome.set);
    for error in &report.errors {
        println!("ERROR   {}", error);
    }
    for warning in &report.warnings {
        println!("WARNING {}", warning);
    }

    println!(
        "\n{} catalogs, {} load failures, {} errors, {} warnings",
        outcome.set.catalogs().count(),
        outcome.failures.len(),
        report.errors.len(),
        report.warnings.len()
    );

    if !outcome.failures.is_empty() || report.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
