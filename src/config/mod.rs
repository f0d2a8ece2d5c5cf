//! config
//!
//! Configuration schema, file reading, and per-operation validation.
//!
//! # Overview
//!
//! Gangway reads a shell-sourceable `KEY=value` file and validates it
//! against the requested operation before any network call is made:
//!
//! - base keys (always required): `API_KEY`, `ACCOUNT`, `ORG`, `APP_NAME`
//! - app creation: `TEMPLATE_NAME`, `APP_VISIBILITY`, `APP_DESCRIPTION`
//!   (plus optional `TEMPLATE_GLOBAL`, default `false`)
//! - environment setup: `GIT_USERNAME`, `GIT_TOKEN`, `GIT_EMAIL`
//!
//! # File Locations
//!
//! Searched in order:
//! 1. `--config <path>` if given
//! 2. `$GANGWAY_CONFIG` if set
//! 3. `./gangway.env`
//! 4. `~/.gangway.env`
//!
//! # Example
//!
//! ```no_run
//! use gangway::config::{self, Operation};
//!
//! let config = config::load(None, Operation::CreateApp).unwrap();
//! println!("onboarding {} into {}", config.app_name, config.org);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable naming an explicit config file location.
pub const CONFIG_ENV_VAR: &str = "GANGWAY_CONFIG";

/// Config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "gangway.env";

/// Default platform API endpoint; override with `API_BASE`.
pub const DEFAULT_API_BASE: &str = "https://api.gangway.dev";

/// Default host for environment repositories; override with `GIT_BASE`.
pub const DEFAULT_GIT_BASE: &str = "https://github.com";

const API_KEY_PREFIX: &str = "gwk_";
const API_KEY_TOKEN_LEN: usize = 40;

const BASE_KEYS: &[&str] = &["API_KEY", "ACCOUNT", "ORG", "APP_NAME"];
const TEMPLATE_KEYS: &[&str] = &["TEMPLATE_NAME", "APP_VISIBILITY", "APP_DESCRIPTION"];
const GITOPS_KEYS: &[&str] = &["GIT_USERNAME", "GIT_TOKEN", "GIT_EMAIL"];

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "no config file found; pass --config, set ${CONFIG_ENV_VAR}, \
         or create ./{CONFIG_FILE_NAME} or ~/.{CONFIG_FILE_NAME}"
    )]
    NotFound,

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config file '{path}' line {line}: expected KEY=value")]
    ParseError { path: PathBuf, line: usize },

    #[error("missing required settings for {operation}: {keys}")]
    MissingKeys { operation: Operation, keys: String },

    #[error("API_KEY must be '{API_KEY_PREFIX}' followed by {API_KEY_TOKEN_LEN} letters or digits")]
    MalformedApiKey,

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// The operation the configuration is being validated for.
///
/// Each operation requires the base keys plus its own set; validation
/// happens before any network call so a broken config fails fast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Template catalog listing and lookup.
    Templates,
    /// App creation from a template.
    CreateApp,
    /// Per-environment GitOps repository setup.
    SetupEnvironments,
    /// App creation followed by environment setup.
    Onboard,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Templates => write!(f, "templates"),
            Operation::CreateApp => write!(f, "create"),
            Operation::SetupEnvironments => write!(f, "setup"),
            Operation::Onboard => write!(f, "onboard"),
        }
    }
}

/// Settings required for app creation.
#[derive(Debug, Clone)]
pub struct TemplateSettings {
    /// Template to scaffold from.
    pub name: String,
    /// Whether the template is platform-provided rather than account-scoped.
    pub global: bool,
    /// Visibility of the created repositories.
    pub visibility: String,
    /// Description of the created app.
    pub description: String,
}

/// The GitOps credential triad used for environment repositories.
#[derive(Debug, Clone)]
pub struct GitOpsSettings {
    pub username: String,
    pub token: String,
    pub email: String,
}

/// Validated configuration, passed explicitly to every component.
#[derive(Clone)]
pub struct Config {
    /// Platform API key (`gwk_` + 40 alphanumerics).
    pub api_key: String,
    /// Platform API endpoint.
    pub api_base: String,
    /// Account slug.
    pub account: String,
    /// Organization the app belongs to.
    pub org: String,
    /// Name of the app being onboarded.
    pub app_name: String,
    /// App-creation settings; present when validated for create/onboard.
    pub template: Option<TemplateSettings>,
    /// GitOps credentials; present when validated for setup/onboard.
    pub gitops: Option<GitOpsSettings>,
    /// Host serving the environment repositories.
    pub git_base: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_base", &self.api_base)
            .field("account", &self.account)
            .field("org", &self.org)
            .field("app_name", &self.app_name)
            .field("template", &self.template)
            .field("has_gitops", &self.gitops.is_some())
            .field("git_base", &self.git_base)
            .finish()
    }
}

/// Load and validate configuration for an operation.
///
/// Reads the first config file found in the search order, then applies the
/// operation's key requirements. All failures here are fatal and occur
/// before any network call.
pub fn load(path_override: Option<&Path>, operation: Operation) -> Result<Config, ConfigError> {
    let path = discover(path_override)?;
    let map = read_file(&path)?;
    Config::from_map(map, operation)
}

/// Find the config file per the documented search order.
fn discover(path_override: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path_override {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Ok(local);
    }
    if let Some(home) = dirs::home_dir() {
        let fallback = home.join(format!(".{CONFIG_FILE_NAME}"));
        if fallback.is_file() {
            return Ok(fallback);
        }
    }
    Err(ConfigError::NotFound)
}

/// Read a shell-sourceable `KEY=value` file into a map.
///
/// Blank lines and `#` comments are skipped; an `export ` prefix and
/// single or double quotes around values are tolerated so the same file
/// can be sourced by the bootstrap scripts.
pub fn read_file(path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let mut map = BTreeMap::new();
    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
        let (key, value) = line.split_once('=').ok_or_else(|| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: index + 1,
        })?;
        let key = key.trim();
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::ParseError {
                path: path.to_path_buf(),
                line: index + 1,
            });
        }
        map.insert(key.to_string(), unquote(value.trim()).to_string());
    }
    Ok(map)
}

/// Strip one matched pair of surrounding quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

impl Config {
    /// Validate a raw key-value map for an operation.
    pub fn from_map(
        map: BTreeMap<String, String>,
        operation: Operation,
    ) -> Result<Self, ConfigError> {
        require_keys(&map, operation, BASE_KEYS)?;
        if matches!(operation, Operation::CreateApp | Operation::Onboard) {
            require_keys(&map, operation, TEMPLATE_KEYS)?;
        }
        if matches!(operation, Operation::SetupEnvironments | Operation::Onboard) {
            require_keys(&map, operation, GITOPS_KEYS)?;
        }

        let api_key = map["API_KEY"].clone();
        if !api_key_is_valid(&api_key) {
            return Err(ConfigError::MalformedApiKey);
        }

        let template = if matches!(operation, Operation::CreateApp | Operation::Onboard) {
            Some(TemplateSettings {
                name: map["TEMPLATE_NAME"].clone(),
                global: parse_bool(map.get("TEMPLATE_GLOBAL"))?,
                visibility: map["APP_VISIBILITY"].clone(),
                description: map["APP_DESCRIPTION"].clone(),
            })
        } else {
            None
        };

        let gitops = if matches!(operation, Operation::SetupEnvironments | Operation::Onboard) {
            Some(GitOpsSettings {
                username: map["GIT_USERNAME"].clone(),
                token: map["GIT_TOKEN"].clone(),
                email: map["GIT_EMAIL"].clone(),
            })
        } else {
            None
        };

        Ok(Config {
            api_key,
            api_base: map
                .get("API_BASE")
                .cloned()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            account: map["ACCOUNT"].clone(),
            org: map["ORG"].clone(),
            app_name: map["APP_NAME"].clone(),
            template,
            gitops,
            git_base: map
                .get("GIT_BASE")
                .cloned()
                .unwrap_or_else(|| DEFAULT_GIT_BASE.to_string()),
        })
    }
}

fn require_keys(
    map: &BTreeMap<String, String>,
    operation: Operation,
    keys: &[&str],
) -> Result<(), ConfigError> {
    let missing: Vec<&str> = keys
        .iter()
        .copied()
        .filter(|key| map.get(*key).map_or(true, |value| value.is_empty()))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingKeys {
            operation,
            keys: missing.join(", "),
        })
    }
}

fn api_key_is_valid(key: &str) -> bool {
    match key.strip_prefix(API_KEY_PREFIX) {
        Some(token) => {
            token.len() == API_KEY_TOKEN_LEN && token.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

fn parse_bool(value: Option<&String>) -> Result<bool, ConfigError> {
    match value.map(|v| v.as_str()) {
        None | Some("") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
        Some(other) => Err(ConfigError::InvalidValue(format!(
            "TEMPLATE_GLOBAL must be true or false, got '{other}'"
        ))),
    }
}
