/*!
shared.rs - helpers used by several subcommands.

  - ServerArgs / connect: global server options -> GitLab client
  - parse_params / load_param_file: KEY=VALUE and JSON/YAML parameter sources
  - output_error: JSON or boxed error output, then bail
*/

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji};
use crate::config::Overrides;
use crate::gitlab::GitLab;

/// Server options collected from global flags.
#[derive(Debug, Clone, Default)]
pub struct ServerArgs {
    pub url: Option<String>,
    pub token: Option<String>,
    pub config: Option<PathBuf>,
    pub debug: bool,
}

/// Resolve configuration (flags > env > file) and build the HTTP client.
/// `call_token` stands in for the default token when none is configured.
pub fn connect(server: &ServerArgs, call_token: Option<&str>) -> Result<GitLab> {
    let config = Overrides {
        url: server.url.clone(),
        token: server.token.clone(),
        api_version: None,
        config: server.config.clone(),
        debug: server.debug,
        call_token: call_token.map(str::to_string),
    }
    .with_env()
    .load()
    .context("failed to load GitLab configuration")?;
    tracing::debug!(url = %config.base_url, version = %config.api_version, "configuration loaded");
    GitLab::connect(&config).context("failed to initialise HTTP transport")
}

/// Split repeated `KEY=VALUE` flags, keeping their order.
pub fn parse_params(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|kv| -> Result<(String, String)> {
            let (k, v) = kv
                .split_once('=')
                .with_context(|| format!("invalid --param (expected KEY=VALUE): {kv}"))?;
            let key = k.trim();
            if key.is_empty() {
                anyhow::bail!("invalid --param (empty key): {kv}");
            }
            Ok((key.to_string(), v.to_string()))
        })
        .collect()
}

/// Merge a JSON or YAML object file into `provided`; existing keys win.
pub fn load_param_file(path: &str, provided: &mut Vec<(String, String)>) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read param file: {path}"))?;
    let lower = path.to_ascii_lowercase();

    let value: serde_json::Value = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&raw).context("failed to parse YAML param file")?;
        serde_json::to_value(yaml).context("failed to convert YAML to JSON")?
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON param file")?
    };

    let obj = value
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("param file root must be an object"))?;

    for (k, v) in obj {
        if provided.iter().any(|(pk, _)| pk == k) {
            continue;
        }
        // Nested values (e.g. commit actions) are passed on as JSON text.
        let s = match v {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        provided.push((k.clone(), s));
    }
    Ok(())
}

/// Print an error (JSON object or boxed text) and return it as `Err`.
pub fn output_error(json: bool, title: &str, msg: &str) -> Result<()> {
    if json {
        let err = serde_json::json!({ "status": "error", "error": msg });
        println!(
            "{}",
            serde_json::to_string_pretty(&err).unwrap_or_else(|_| err.to_string())
        );
    } else {
        let style = StyleOptions::detect();
        let header = box_header(
            format!("{} {title}", emoji("error", &style)),
            Some(color(Role::Error, msg, &style)),
            &style,
        );
        println!("{header}");
    }
    anyhow::bail!(msg.to_string())
}
