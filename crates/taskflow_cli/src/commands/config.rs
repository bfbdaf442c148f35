//! `taskflow config` subcommands.

use anyhow::Result;
use taskflow_core::config::{self, AppConfig};

use crate::cli::ConfigAction;
use crate::output;

pub async fn handle(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show(),
        ConfigAction::Path => path(),
        ConfigAction::Check => check(),
    }
}

fn show() -> Result<()> {
    let config = AppConfig::load()?;

    if output::is_json() {
        output::data("config", &config);
        return Ok(());
    }

    output::header("Configuration");
    output::kv("region", &config.region);
    output::kv("userPoolId", &config.user_pool_id);
    output::kv("userPoolClientId", &config.user_pool_client_id);
    output::kv("apiGatewayUrl", &config.api_gateway_url);
    Ok(())
}

fn path() -> Result<()> {
    let candidates = config::candidate_paths();
    let session = config::config_dir().map(|dir| dir.join("session.json"));

    if output::is_json() {
        let paths: Vec<_> = candidates
            .iter()
            .map(|p| {
                serde_json::json!({
                    "path": p.display().to_string(),
                    "found": p.exists(),
                })
            })
            .collect();
        output::data(
            "paths",
            &serde_json::json!({
                "config": paths,
                "session": session.map(|p| p.display().to_string()),
            }),
        );
        return Ok(());
    }

    output::header("Config search order");
    for path in &candidates {
        if path.exists() {
            output::success(&path.display().to_string());
        } else {
            output::dim(&format!("{} (not found)", path.display()));
        }
    }
    if let Some(session) = session {
        output::kv("session cache", &session.display().to_string());
    }
    Ok(())
}

fn check() -> Result<()> {
    let config = AppConfig::load()?;
    config.validate()?;
    output::success("Deployment is provisioned");
    output::kv("apiGatewayUrl", &config.api_gateway_url);
    Ok(())
}
