//! # Discovery Configuration Validator
//!
//! Command-line tool for checking a discovery configuration before a run. Loads the YAML
//! file for an environment, validates it and resolves the update provider and watermark
//! store it names.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use watermark_discovery::config::{ConfigManager, DiscoveryConfig};
use watermark_discovery::providers::UpdateProviderRegistry;
use watermark_discovery::watermark::store_from_config;

#[derive(Parser)]
#[command(name = "config-validator")]
#[command(about = "Validate discovery configuration files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration directory path (default: config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Environment to validate (development, test, production); detected when omitted
    #[arg(short, long)]
    environment: Option<String>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .try_init();

    match validate(&cli) {
        Ok(()) => {
            info!("Configuration validation completed successfully");
            process::exit(0);
        }
        Err(e) => {
            error!("Configuration validation failed: {:#}", e);
            println!("❌ {:#}", e);
            process::exit(1);
        }
    }
}

fn validate(cli: &Cli) -> anyhow::Result<()> {
    let environment = cli
        .environment
        .clone()
        .unwrap_or_else(ConfigManager::detect_environment);

    println!("🔧 Validating Discovery Configuration");
    println!("Environment: {}", environment);
    if let Some(config_dir) = &cli.config_dir {
        println!("Config Directory: {}", config_dir.display());
    }
    println!();

    let manager = ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), &environment)
        .context("failed to load configuration")?;
    println!("✅ Loaded {}", manager.config_directory().display());

    let config = manager.config();
    validate_update_provider(config)?;
    validate_watermark_store(config)?;
    show_walk_settings(config);

    println!("\n🎉 All configuration validation checks passed!");
    Ok(())
}

fn validate_update_provider(config: &DiscoveryConfig) -> anyhow::Result<()> {
    println!("🕒 Validating Update Provider...");

    let registry = UpdateProviderRegistry::with_defaults();
    let provider = registry
        .resolve(&config.update_provider)
        .with_context(|| format!("update provider '{}'", config.update_provider.kind))?;

    println!("   ✅ Provider: {}", provider.name());
    match &config.update_provider.location_root {
        Some(root) => println!("   ✅ Location root: {}", root),
        None => println!("   ℹ️  Location root not set (locations used as given)"),
    }

    Ok(())
}

fn validate_watermark_store(config: &DiscoveryConfig) -> anyhow::Result<()> {
    println!("💧 Validating Watermark Store...");

    store_from_config(&config.watermark, Vec::new())
        .with_context(|| format!("watermark store '{}'", config.watermark.store))?;
    println!("   ✅ Store: {}", config.watermark.store);

    Ok(())
}

fn show_walk_settings(config: &DiscoveryConfig) {
    println!("🚶 Walk Settings...");
    println!(
        "   ✅ Lookup concurrency: {}{}",
        config.discovery.lookup_concurrency,
        if config.is_concurrent() { "" } else { " (sequential)" }
    );

    if config.events.enabled {
        println!(
            "   ✅ Events enabled (prefix: {}, capacity: {})",
            config.events.prefix, config.events.channel_capacity
        );
    } else {
        println!("   ℹ️  Events disabled");
    }
}
