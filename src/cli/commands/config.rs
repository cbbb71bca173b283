//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{DandelionError, DandelionResult};
use console::style;

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> DandelionResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, config, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> DandelionResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> DandelionResult<()> {
    let path = manager.path();

    if path.exists() && !force {
        eprintln!(
            "{} Config already exists at {}",
            style("!").yellow(),
            path.display()
        );
        eprintln!("  Use --force to overwrite");
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    eprintln!(
        "{} Configuration initialized at {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> DandelionResult<()> {
    let mut config = config.clone();
    let invalid = |reason: String| DandelionError::ConfigInvalid {
        path: manager.path().to_path_buf(),
        reason,
    };

    let parts: Vec<&str> = key.split('.').collect();
    match parts.as_slice() {
        ["general", "verbose"] => config.general.verbose = parse_bool(value).map_err(invalid)?,
        ["general", "log_format"] => config.general.log_format = value.to_string(),

        ["asset", "url_prefix"] => config.asset.url_prefix = value.to_string(),
        ["asset", "locations_resolution_strategy"] => {
            config.asset.locations_resolution_strategy = parse_list(value)
        }
        ["asset", "processors"] => config.asset.processors = parse_list(value),
        ["asset", "processors_encoding"] => config.asset.processors_encoding = value.to_string(),
        ["asset", "minification"] => config.asset.minification = parse_bool(value).map_err(invalid)?,
        ["asset", "caching"] => config.asset.caching = parse_bool(value).map_err(invalid)?,
        ["asset", "merging"] => config.asset.merging = value.to_string(),
        ["asset", "js_excludes"] => config.asset.js_excludes = parse_list(value),
        ["asset", "css_excludes"] => config.asset.css_excludes = parse_list(value),
        ["asset", "webapp_root"] => config.asset.webapp_root = value.to_string(),
        ["asset", "remote_timeout_ms"] => {
            config.asset.remote_timeout_ms = value
                .parse()
                .map_err(|_| invalid(format!("invalid number: {value}")))?
        }

        ["asset", "versioning", "enabled"] => {
            config.asset.versioning.enabled = parse_bool(value).map_err(invalid)?
        }
        ["asset", "versioning", "strategy"] => config.asset.versioning.strategy = value.to_string(),
        ["asset", "versioning", "fixed_type"] => {
            config.asset.versioning.fixed_type = value.to_string()
        }
        ["asset", "versioning", "fixed_value"] => {
            config.asset.versioning.fixed_value = value.to_string()
        }
        ["asset", "versioning", "date_format"] => {
            config.asset.versioning.date_format = value.to_string()
        }

        ["cache", "storage"] => config.cache.storage = value.to_string(),
        ["cache", "asset_max_size"] => {
            config.cache.asset_max_size = value
                .parse()
                .map_err(|_| invalid(format!("invalid number: {value}")))?
        }

        _ => return Err(invalid(format!("unknown config key: {key}"))),
    }

    // Reject settings the asset context would refuse at startup
    crate::context::AssetContext::new(config.clone())?;

    manager.save(&config).await?;
    eprintln!("{} Set {} = {}", style("✓").green(), key, value);
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(format!("invalid boolean value: {value}. Use true/false")),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
