use crate::client::GristClient;
use crate::commands::{CmdMessage, CmdResult, Output};
use crate::config::{validate_url, GristConfig};
use crate::error::{GristError, Result};
use crate::gateway::Gateway;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Connection {
    Connected { orgs: usize },
    Failed { reason: String },
    NotConfigured,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigReport {
    pub path: PathBuf,
    pub url: Option<String>,
    pub token: String,
    pub connection: Connection,
}

/// Current settings plus a live connection test (`GET orgs`). Pass `None` when no
/// client could be built from `config`.
pub fn show<G: Gateway>(
    client: Option<&GristClient<G>>,
    config: &GristConfig,
    path: &Path,
) -> CmdResult {
    let connection = match client {
        None => Connection::NotConfigured,
        Some(client) => match client.orgs() {
            Ok(orgs) => Connection::Connected { orgs: orgs.len() },
            Err(e) => Connection::Failed {
                reason: e.to_string(),
            },
        },
    };

    let mut result = CmdResult::default();
    match &connection {
        Connection::Connected { orgs } => result.add_message(CmdMessage::success(format!(
            "Connected to Grist, {} organization(s) visible",
            orgs
        ))),
        Connection::Failed { reason } => {
            result.add_message(CmdMessage::error(format!("Connection failed: {}", reason)))
        }
        Connection::NotConfigured => result.add_message(CmdMessage::warning(
            "Not configured, run `gristctl config --url <URL> --token <TOKEN>`",
        )),
    }

    let report = ConfigReport {
        path: path.to_path_buf(),
        url: config.url.clone(),
        token: config.masked_token(),
        connection,
    };
    result.with_output(Output::Config(report))
}

/// Validate and persist new connection settings, keeping the other values of `current`.
pub fn update(
    current: &GristConfig,
    url: &str,
    token: &str,
    path: &Path,
) -> Result<GristConfig> {
    let url = url.trim();
    let token = token.trim();
    validate_url(url)?;
    if token.is_empty() {
        return Err(GristError::InvalidInput("token must not be empty".into()));
    }

    let mut config = current.clone();
    config.url = Some(url.to_string());
    config.token = Some(token.to_string());
    config.save(path)?;
    Ok(config)
}
