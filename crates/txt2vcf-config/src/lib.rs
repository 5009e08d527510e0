use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "txt2vcf";
const CONFIG_FILENAME: &str = "config.toml";
const DOTENV_FILENAME: &str = ".env";

pub const DEFAULT_TXT_DIR: &str = "./phone_numbers";
pub const DEFAULT_VCF_DIR: &str = "./vcf_files";
pub const DEFAULT_RUN_FILE_PATH: &str = "./.run";
pub const DEFAULT_APPROVED_MARKER_PATH: &str = "./.approved";

pub const ENV_TXT_DIR: &str = "TXT_DIR";
pub const ENV_VCF_DIR: &str = "VCF_DIR";
pub const ENV_RUN_FILE_PATH: &str = "RUN_FILE_PATH";
pub const ENV_POLICY_URL: &str = "POLICY_URL";
pub const ENV_APPROVED_MARKER_PATH: &str = "APPROVED_MARKER_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub txt_dir: PathBuf,
    pub vcf_dir: PathBuf,
    pub run_file_path: PathBuf,
    pub policy: Option<PolicyConfig>,
}

/// Remote run policy; absent means only the local run file is consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    pub url: String,
    pub approved_marker_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            txt_dir: PathBuf::from(DEFAULT_TXT_DIR),
            vcf_dir: PathBuf::from(DEFAULT_VCF_DIR),
            run_file_path: PathBuf::from(DEFAULT_RUN_FILE_PATH),
            policy: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("invalid policy url: value is empty")]
    EmptyPolicyUrl,
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to read env file {path}: {source}")]
    Dotenv {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    txt_dir: Option<PathBuf>,
    vcf_dir: Option<PathBuf>,
    run_file_path: Option<PathBuf>,
    policy: Option<PolicyFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyFile {
    url: Option<String>,
    approved_marker_path: Option<PathBuf>,
}

/// Loads defaults, then the config file, then the environment. Entries of a
/// `.env` file in the working directory fill in variables the process
/// environment does not set.
pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    load_with_dotenv(config_path, Path::new(DOTENV_FILENAME), |key| {
        env::var(key).ok()
    })
}

pub fn load_with_dotenv<F>(
    config_path: Option<PathBuf>,
    dotenv_path: &Path,
    lookup: F,
) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let dotenv = read_dotenv(dotenv_path)?;
    load_with_env(config_path, |key| {
        lookup(key).or_else(|| dotenv.get(key).cloned())
    })
}

pub fn load_with_env<F>(config_path: Option<PathBuf>, lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let required = config_path.is_some();
    let parsed = match resolve_config_path(config_path) {
        Ok(path) => load_at_path(&path, required)?.unwrap_or_default(),
        Err(ConfigError::MissingHomeDir) if !required => ConfigFile::default(),
        Err(ConfigError::InvalidConfigPath(_)) if !required => ConfigFile::default(),
        Err(err) => return Err(err),
    };
    let merged = merge_env(parsed, lookup);
    build_config(merged)
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<ConfigFile>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(parsed))
}

/// Parses a dotenv file without touching the process environment. A missing
/// file yields no entries.
pub fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    let dotenv_error = |source: dotenvy::Error| ConfigError::Dotenv {
        path: path.to_path_buf(),
        source,
    };
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(err) if err.not_found() => return Ok(HashMap::new()),
        Err(err) => return Err(dotenv_error(err)),
    };
    entries
        .map(|entry| entry.map_err(dotenv_error))
        .collect()
}

fn merge_env<F>(mut parsed: ConfigFile, lookup: F) -> ConfigFile
where
    F: Fn(&str) -> Option<String>,
{
    let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(dir) = value(ENV_TXT_DIR) {
        parsed.txt_dir = Some(PathBuf::from(dir));
    }
    if let Some(dir) = value(ENV_VCF_DIR) {
        parsed.vcf_dir = Some(PathBuf::from(dir));
    }
    if let Some(path) = value(ENV_RUN_FILE_PATH) {
        parsed.run_file_path = Some(PathBuf::from(path));
    }
    if let Some(url) = value(ENV_POLICY_URL) {
        parsed.policy.get_or_insert_with(PolicyFile::default).url = Some(url);
    }
    if let Some(path) = value(ENV_APPROVED_MARKER_PATH) {
        parsed
            .policy
            .get_or_insert_with(PolicyFile::default)
            .approved_marker_path = Some(PathBuf::from(path));
    }
    parsed
}

fn build_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(dir) = parsed.txt_dir {
        config.txt_dir = dir;
    }
    if let Some(dir) = parsed.vcf_dir {
        config.vcf_dir = dir;
    }
    if let Some(path) = parsed.run_file_path {
        config.run_file_path = path;
    }

    if let Some(policy) = parsed.policy {
        // A marker path alone does not enable the remote check.
        if let Some(url) = policy.url {
            let url = url.trim();
            if url.is_empty() {
                return Err(ConfigError::EmptyPolicyUrl);
            }
            config.policy = Some(PolicyConfig {
                url: url.to_string(),
                approved_marker_path: policy
                    .approved_marker_path
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_APPROVED_MARKER_PATH)),
            });
        }
    }

    Ok(config)
}
