use crate::error::{GristError, Result};
use directories::BaseDirs;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = ".gristctl";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const URL_VAR: &str = "GRIST_URL";
const TOKEN_VAR: &str = "GRIST_TOKEN";
const TIMEOUT_VAR: &str = "GRIST_TIMEOUT";

/// Connection parameters, resolved once at startup and handed to the gateway.
///
/// Environment variables take precedence over the `~/.gristctl` dotfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GristConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GristConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GristConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            token: Some(token.into()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Location of the dotfile in the user's home directory.
    pub fn default_path() -> Result<PathBuf> {
        BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
            .ok_or_else(|| GristError::Config("Could not determine home directory".into()))
    }

    /// Load from the dotfile at `path` (if present) overlaid with the process environment.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_vars = read_dotfile(path.as_ref())?;
        Ok(Self::from_sources(file_vars, |key| std::env::var(key).ok()))
    }

    /// Build a config from dotfile pairs and an environment lookup. Environment wins.
    pub fn from_sources<I, E>(file_vars: I, env: E) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
        E: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        for (key, value) in file_vars {
            config.apply(&key, value);
        }
        for key in [URL_VAR, TOKEN_VAR, TIMEOUT_VAR] {
            if let Some(value) = env(key) {
                config.apply(key, value);
            }
        }
        config
    }

    fn apply(&mut self, key: &str, value: String) {
        if value.trim().is_empty() {
            return;
        }
        match key {
            URL_VAR => self.url = Some(value.trim().to_string()),
            TOKEN_VAR => self.token = Some(value.trim().to_string()),
            TIMEOUT_VAR => match value.trim().parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => tracing::warn!("Ignoring non-numeric {}: {}", TIMEOUT_VAR, value),
            },
            _ => {}
        }
    }

    /// Write the dotfile, creating the parent directory if needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut content = String::new();
        if let Some(url) = &self.url {
            content.push_str(&format!("{}=\"{}\"\n", URL_VAR, escape(url)));
        }
        if let Some(token) = &self.token {
            content.push_str(&format!("{}=\"{}\"\n", TOKEN_VAR, escape(token)));
        }
        if self.timeout_secs != DEFAULT_TIMEOUT_SECS {
            content.push_str(&format!("{}={}\n", TIMEOUT_VAR, self.timeout_secs));
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<&str> {
        self.url
            .as_deref()
            .ok_or_else(|| GristError::Config(format!("{} is not set (run `gristctl config`)", URL_VAR)))
    }

    pub fn token(&self) -> Result<&str> {
        self.token.as_deref().ok_or_else(|| {
            GristError::Config(format!("{} is not set (run `gristctl config`)", TOKEN_VAR))
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The token with every character replaced by a bullet.
    pub fn masked_token(&self) -> String {
        self.token
            .as_deref()
            .map(|t| "•".repeat(t.chars().count()))
            .unwrap_or_default()
    }
}

/// Accepts `http://…` or `https://…` URLs without a trailing slash.
pub fn validate_url(url: &str) -> Result<()> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !url.ends_with('/') => Ok(()),
        _ => Err(GristError::InvalidInput(format!(
            "URL must start with http:// or https:// and must not end with '/': {}",
            url
        ))),
    }
}

fn read_dotfile(path: &Path) -> Result<Vec<(String, String)>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let iter = dotenvy::from_path_iter(path)
        .map_err(|e| GristError::Config(format!("reading {}: {}", path.display(), e)))?;
    iter.map(|item| {
        item.map_err(|e| GristError::Config(format!("parsing {}: {}", path.display(), e)))
    })
    .collect()
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
