use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::api::DEFAULT_API_URL;
use crate::app::Page;

/// Environment variable consulted when no API URL is configured.
pub const API_URL_ENV: &str = "RESORT_ADMIN_API_URL";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub api_url: Option<String>,
    pub page: Option<Page>,
    pub log_file: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub demo: bool,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            api_url: other.api_url.clone().or_else(|| self.api_url.clone()),
            page: other.page.or(self.page),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
            timeout: other.timeout.or(self.timeout),
            demo: self.demo || other.demo,
        }
    }

    /// The backend URL: configured value, then `env_value`, then the default.
    pub fn api_url_or(&self, env_value: Option<String>) -> String {
        self.api_url
            .clone()
            .or(env_value)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS).max(1))
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("resort-admin").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("resort-admin")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("resort-admin").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("resort-admin")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".resortadminrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# resort-admin defaults (saved with --save)".to_string());
    if let Some(url) = &flags.api_url {
        lines.push(format!("--api-url {url}"));
    }
    if let Some(page) = flags.page {
        lines.push(format!("--page {}", page.as_str()));
    }
    if let Some(path) = &flags.log_file {
        lines.push(format!("--log-file {}", path.display()));
    }
    if let Some(secs) = flags.timeout {
        lines.push(format!("--timeout {secs}"));
    }
    if flags.demo {
        lines.push("--demo".to_string());
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of a token list.
///
/// Accepts both `--flag value` and `--flag=value`; unknown tokens and
/// unparsable values are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let takes_value = matches!(name, "--api-url" | "--page" | "--log-file" | "--timeout");
        let value = if !takes_value {
            None
        } else if inline.is_some() {
            inline
        } else {
            i += 1;
            tokens.get(i).map(String::as_str)
        };
        match (name, value) {
            ("--demo", _) => flags.demo = true,
            ("--api-url", Some(url)) => flags.api_url = Some(url.to_string()),
            ("--page", Some(page)) => flags.page = Page::parse(page).or(flags.page),
            ("--log-file", Some(path)) => flags.log_file = Some(PathBuf::from(path)),
            ("--timeout", Some(secs)) => flags.timeout = secs.parse().ok().or(flags.timeout),
            _ => {}
        }
        i += 1;
    }
    flags
}
