//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");

    ctx.output.info("");
    ctx.output.info("[api]");
    ctx.output.kv("base_url", &ctx.config.api.base_url);
    if let Some(ms) = ctx.config.api.timeout_ms {
        ctx.output.kv("timeout_ms", &ms.to_string());
    }

    ctx.output.info("");
    ctx.output.info("[storage]");
    ctx.output
        .kv("path", &ctx.storage_path().display().to_string());

    ctx.output.info("");
    ctx.output.info("[cart]");
    ctx.output.kv("storage_key", &ctx.config.cart.storage_key);
    ctx.output.kv("locale", ctx.config.cart.locale.as_str());
    ctx.output
        .kv("persistence", ctx.config.cart.persistence.as_str());

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output
        .success(&format!("Created {}", config_path.display()));

    Ok(())
}
