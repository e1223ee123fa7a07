use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use dialoguer::{Confirm, Input};
use owo_colors::OwoColorize;
use popcorn_config::{Config, PathManager, API_KEY_ENV, PLACEHOLDER_API_KEY};
use serde_json::json;

pub fn run_config(cmd: ConfigCommands, paths: &PathManager, config: Config, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, paths, &config, output),
        ConfigCommands::Init { api_key, force } => init_config(api_key, force, paths, output),
        ConfigCommands::Path => {
            if output.is_human() {
                println!("{}", paths.config_file().display());
            } else {
                output.json(&json!({
                    "config_file": paths.config_file().display().to_string(),
                    "log_dir": paths.log_dir().display().to_string(),
                }));
            }
            Ok(())
        }
    }
}

fn show_config(full: bool, paths: &PathManager, config: &Config, output: &Output) -> Result<()> {
    let config_file = paths.config_file();
    let api_key = if full {
        config.catalog.api_key.clone()
    } else {
        mask_api_key(&config.catalog.api_key)
    };

    match output.format() {
        OutputFormat::Human => {
            if !config_file.exists() {
                output.warn(format!("No configuration file at {}, showing defaults", config_file.display()));
                output.info("Run 'popcorn config init' to create one.");
            }

            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Setting").add_attribute(Attribute::Bold),
                Cell::new("Value").add_attribute(Attribute::Bold),
            ]);
            table.add_row(vec![Cell::new("Config file"), Cell::new(config_file.display())]);
            table.add_row(vec![Cell::new("catalog.api_key").fg(Color::Cyan), Cell::new(api_key)]);
            table.add_row(vec![Cell::new("catalog.base_url").fg(Color::Cyan), Cell::new(&config.catalog.base_url)]);
            table.add_row(vec![
                Cell::new("catalog.timeout_secs").fg(Color::Cyan),
                Cell::new(config.catalog.timeout_secs),
            ]);
            table.add_row(vec![
                Cell::new("session.default_query").fg(Color::Cyan),
                Cell::new(&config.session.default_query),
            ]);
            table.add_row(vec![Cell::new("session.app_title").fg(Color::Cyan), Cell::new(&config.session.app_title)]);
            table.add_row(vec![Cell::new("logging.level").fg(Color::Cyan), Cell::new(&config.logging.level)]);
            table.add_row(vec![
                Cell::new("logging.file").fg(Color::Cyan),
                Cell::new(
                    config
                        .logging
                        .file
                        .as_ref()
                        .map(|path| path.display().to_string())
                        .unwrap_or_else(|| "<stderr>".to_string()),
                ),
            ]);
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", table);

            match config.validate() {
                Ok(()) => output.success("Configuration is valid"),
                Err(e) => output.warn(e.to_string()),
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "exists": config_file.exists(),
                "valid": config.validate().is_ok(),
                "catalog": {
                    "api_key": api_key,
                    "base_url": config.catalog.base_url,
                    "timeout_secs": config.catalog.timeout_secs,
                },
                "session": config.session,
                "logging": config.logging,
            }));
        }
    }

    Ok(())
}

fn init_config(api_key: Option<String>, force: bool, paths: &PathManager, output: &Output) -> Result<()> {
    let config_file = paths.config_file();

    // Start from what is on disk so only the key changes; env overrides are not persisted
    let mut config = if config_file.exists() {
        if !force {
            let overwrite = Confirm::new()
                .with_prompt(format!("{} exists. Update its API key?", config_file.display()))
                .default(false)
                .interact()
                .map_err(|e| eyre!("Failed to read input: {}", e))?;
            if !overwrite {
                output.info("Left the configuration unchanged.");
                return Ok(());
            }
        }
        Config::load_from_file(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?
    } else {
        Config::default()
    };

    let api_key = match api_key {
        Some(key) => key,
        None => {
            output.info(format!(
                "Get a free key at {}. You can also set {} instead.",
                "https://www.omdbapi.com/apikey.aspx".underline(),
                API_KEY_ENV
            ));
            Input::<String>::new()
                .with_prompt("OMDb API key")
                .interact_text()
                .map_err(|e| eyre!("Failed to read input: {}", e))?
        }
    };
    config.catalog.api_key = api_key.trim().to_string();

    config.validate().map_err(|e| eyre!("{}", e))?;

    paths.ensure_directories().map_err(|e| eyre!("{}", e))?;
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("Configuration saved to {}", config_file.display()));
    Ok(())
}

fn mask_api_key(key: &str) -> String {
    if key.is_empty() || key == PLACEHOLDER_API_KEY {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key(""), "<not set>");
        assert_eq!(mask_api_key(PLACEHOLDER_API_KEY), "<not set>");
        assert_eq!(mask_api_key("abcd"), "****");
        assert_eq!(mask_api_key("f84fc31d"), "f8***1d");
    }
}
