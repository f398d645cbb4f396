use crate::utils::Logger;
use config::{Config, ConfigError, File, FileFormat};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_SECTION: &str = "chatanalyst";
pub const DEFAULT_KEY: &str = "api_key";

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("credentials file {0} not found")]
    NotFound(PathBuf),
    #[error("failed to read credentials from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
    #[error("no value for '{key}' in section [{section}]")]
    MissingKey { section: String, key: String },
}

/// API key for the chat-completion service
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Where to find the API key inside an INI file
#[derive(Debug, Clone)]
pub struct CredentialsSource {
    pub path: PathBuf,
    pub section: String,
    pub key: String,
}

impl CredentialsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            section: DEFAULT_SECTION.to_string(),
            key: DEFAULT_KEY.to_string(),
        }
    }

    pub fn load(&self) -> Result<Credentials, CredentialsError> {
        let logger = Logger::new("CREDENTIALS");
        logger.debug(&format!("Reading [{}] from {}", self.section, self.path.display()));

        if !self.path.is_file() {
            return Err(CredentialsError::NotFound(self.path.clone()));
        }

        let settings = Config::builder()
            .add_source(File::from(self.path.as_path()).format(FileFormat::Ini))
            .build()
            .map_err(|source| CredentialsError::Read {
                path: self.path.clone(),
                source,
            })?;

        // Option names ignore case
        let section = match settings.get_table(&self.section) {
            Ok(section) => section,
            Err(ConfigError::NotFound(_)) => Default::default(),
            Err(source) => {
                return Err(CredentialsError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let api_key = match section
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&self.key))
        {
            Some((_, value)) => value
                .into_string()
                .map_err(|source| CredentialsError::Read {
                    path: self.path.clone(),
                    source,
                })?
                .trim()
                .to_string(),
            None => String::new(),
        };

        if api_key.is_empty() {
            return Err(CredentialsError::MissingKey {
                section: self.section.clone(),
                key: self.key.clone(),
            });
        }

        logger.info(&format!("Loaded API key from {}", self.path.display()));
        Ok(Credentials::new(api_key))
    }
}

/// Load the API key from `[chatanalyst] api_key` in an INI file
pub fn load_credentials(path: impl AsRef<Path>) -> Result<Credentials, CredentialsError> {
    CredentialsSource::new(path.as_ref()).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn ini_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_key_from_section() {
        let file = ini_file("[other]\napi_key = wrong\n\n[chatanalyst]\napi_key = sk-test-123\n");
        let credentials = load_credentials(file.path()).unwrap();
        assert_eq!(credentials.api_key(), "sk-test-123");
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let file = ini_file("[chatanalyst]\nmodel = gpt-4\n");
        let err = load_credentials(file.path()).unwrap_err();
        assert!(matches!(err, CredentialsError::MissingKey { .. }));
    }

    #[test]
    fn test_option_name_is_case_insensitive() {
        let file = ini_file("[chatanalyst]\nAPI_KEY = sk-up\n");
        assert_eq!(load_credentials(file.path()).unwrap().api_key(), "sk-up");

        let file = ini_file("[chatanalyst]\nApi_Key = sk-mixed\n");
        assert_eq!(load_credentials(file.path()).unwrap().api_key(), "sk-mixed");
    }

    #[test]
    fn test_missing_section_is_an_error() {
        let file = ini_file("[other]\napi_key = sk-test-123\n");
        let err = load_credentials(file.path()).unwrap_err();
        assert!(matches!(err, CredentialsError::MissingKey { .. }));
    }

    #[test]
    fn test_empty_value_is_an_error() {
        let file = ini_file("[chatanalyst]\napi_key =\n");
        let err = load_credentials(file.path()).unwrap_err();
        assert!(matches!(err, CredentialsError::MissingKey { .. }));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_credentials(dir.path().join("pw-config.ini")).unwrap_err();
        assert!(matches!(err, CredentialsError::NotFound(_)));
    }

    #[test]
    fn test_custom_section_and_key() {
        let file = ini_file("[openai]\ntoken = abc\n");
        let source = CredentialsSource {
            path: file.path().to_path_buf(),
            section: "openai".to_string(),
            key: "token".to_string(),
        };
        assert_eq!(source.load().unwrap().api_key(), "abc");
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", Credentials::new("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
    }
}
