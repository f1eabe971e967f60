//! demo-content - import or remove the bundled demonstration content
//!
//! Usage: `demo-content <import|delete> [--config <path>]`

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use demo_content::{config::Config, db, services::ContentImporter};

const DEFAULT_CONFIG: &str = "config.yml";
const USAGE: &str = "usage: demo-content <import|delete> [--config <path>]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Import,
    Delete,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<(Command, PathBuf)> {
    let mut command = None;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG);

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "import" if command.is_none() => command = Some(Command::Import),
            "delete" if command.is_none() => command = Some(Command::Delete),
            "--config" | "-c" => {
                let path = args.next().context("--config requires a path")?;
                config_path = PathBuf::from(path);
            }
            other => bail!("unexpected argument '{}'\n{}", other, USAGE),
        }
    }

    match command {
        Some(command) => Ok((command, config_path)),
        None => bail!("{}", USAGE),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let (command, config_path) = parse_args(std::env::args().skip(1))?;

    // Load configuration
    let config = Config::load_with_env(&config_path)?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Configuration loaded from {}", config_path.display());

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    let applied = db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed ({} applied)", applied);

    let importer = ContentImporter::from_pool(pool.clone(), &config.content);

    match command {
        Command::Import => {
            let report = importer.import_content().await?;
            for warning in &report.warnings {
                eprintln!("warning: {}", warning);
            }
            for source in &report.skipped_sources {
                eprintln!("skipped: {}", source.display());
            }
            println!("{}", report);
        }
        Command::Delete => {
            let report = importer.delete_imported_content().await?;
            for (uuid, type_name) in &report.unknown {
                eprintln!("left in place: {} ({})", uuid, type_name);
            }
            println!("{}", report);
        }
    }

    pool.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_import_with_default_config() {
        let (command, path) = parse_args(args(&["import"])).unwrap();
        assert_eq!(command, Command::Import);
        assert_eq!(path, PathBuf::from(DEFAULT_CONFIG));
    }

    #[test]
    fn test_parse_delete_with_config() {
        let (command, path) = parse_args(args(&["--config", "demo.yml", "delete"])).unwrap();
        assert_eq!(command, Command::Delete);
        assert_eq!(path, PathBuf::from("demo.yml"));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["import", "delete"])).is_err());
        assert!(parse_args(args(&["import", "--config"])).is_err());
        assert!(parse_args(args(&["export"])).is_err());
    }
}
