use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use stockchat::ask_ai::{AnalysisConfig, DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use stockchat::services::CredentialsSource;

const DEFAULT_CREDENTIALS_PATH: &str = "03-config/pw-config.ini";
const DEFAULT_DATA_PATH: &str = "01-data/Sample.csv";
const DEFAULT_TICKERS: &str = "AAPL,MSFT";
const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_PORT: u16 = 8080;

// YAML-serializable configuration structure; every field may be omitted
#[derive(Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct ConfigYaml {
    pub environment: String,
    pub credentials_path: PathBuf,
    pub data_path: PathBuf,
    pub tickers: Vec<String>,
    pub host: IpAddr,
    pub port: u16,
    pub model: String,
    pub api_base: String,
    pub request_timeout_secs: u64,
}

impl Default for ConfigYaml {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            tickers: parse_tickers(DEFAULT_TICKERS),
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// Holds application-wide settings
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: String,
    pub credentials_path: PathBuf,
    pub data_path: PathBuf,
    pub tickers: Vec<String>,
    pub host: IpAddr,
    pub port: u16,
    pub model: String,
    pub api_base: String,
    pub request_timeout: Duration,
}

impl From<ConfigYaml> for AppConfig {
    fn from(yaml: ConfigYaml) -> Self {
        Self {
            environment: yaml.environment,
            credentials_path: yaml.credentials_path,
            data_path: yaml.data_path,
            tickers: normalize_tickers(yaml.tickers),
            host: yaml.host,
            port: yaml.port,
            model: yaml.model,
            api_base: yaml.api_base,
            request_timeout: Duration::from_secs(yaml.request_timeout_secs),
        }
    }
}

impl AppConfig {
    // Load configuration from YAML file or environment variables
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(config_file) = env::var("CONFIG_FILE") {
            Self::from_yaml(&config_file)
        } else {
            Ok(Self::from_env())
        }
    }

    pub fn from_yaml(file_path: &str) -> anyhow::Result<Self> {
        let yaml_content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read config file {}", file_path))?;

        let yaml_config: ConfigYaml = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse YAML config {}", file_path))?;

        Ok(yaml_config.into())
    }

    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build from a variable lookup; unset or unparsable values fall back to defaults
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ConfigYaml::default();

        let tickers = var("TICKERS")
            .map(|s| parse_tickers(&s))
            .unwrap_or(defaults.tickers);

        let host = var("HOST")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.host);

        let port = var("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let request_timeout_secs = var("REQUEST_TIMEOUT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.request_timeout_secs);

        ConfigYaml {
            environment: var("ENVIRONMENT").unwrap_or(defaults.environment),
            credentials_path: var("CREDENTIALS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.credentials_path),
            data_path: var("DATA_FILE").map(PathBuf::from).unwrap_or(defaults.data_path),
            tickers,
            host,
            port,
            model: var("OPENAI_MODEL").unwrap_or(defaults.model),
            api_base: var("OPENAI_API_BASE").unwrap_or(defaults.api_base),
            request_timeout_secs,
        }
        .into()
    }

    /// Address the dashboard binds to; loopback unless `HOST` says otherwise
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn credentials_source(&self) -> CredentialsSource {
        CredentialsSource::new(&self.credentials_path)
    }

    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            model: self.model.clone(),
            api_base: self.api_base.clone(),
            timeout: self.request_timeout,
            ..Default::default()
        }
    }
}

fn parse_tickers(list: &str) -> Vec<String> {
    normalize_tickers(list.split(',').map(String::from).collect())
}

fn normalize_tickers(tickers: Vec<String>) -> Vec<String> {
    tickers
        .into_iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}
