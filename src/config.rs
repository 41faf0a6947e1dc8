use std::{fmt, path::PathBuf};

use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 10000;
const DEFAULT_CREDENTIALS_FILE: &str = "serviceAccountKey.json";

#[derive(Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub firebase_credentials: Option<String>,

    #[serde(default = "default_credentials_file")]
    pub firebase_credentials_file: PathBuf,
}

/// Where the service-account key comes from. Exactly one source is used.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Inline(String),
    File(PathBuf),
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Self>(vars)
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))
    }

    pub fn credential_source(&self) -> CredentialSource {
        match self.firebase_credentials.as_deref() {
            Some(json) if !json.trim().is_empty() => CredentialSource::Inline(json.to_string()),
            _ => CredentialSource::File(self.firebase_credentials_file.clone()),
        }
    }
}

impl CredentialSource {
    pub fn kind(&self) -> &'static str {
        match self {
            CredentialSource::Inline(_) => "environment",
            CredentialSource::File(_) => "file",
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field(
                "firebase_credentials",
                &self.firebase_credentials.as_ref().map(|_| "<redacted>"),
            )
            .field("firebase_credentials_file", &self.firebase_credentials_file)
            .finish()
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Inline(_) => f.write_str("Inline(<redacted>)"),
            CredentialSource::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_credentials_file() -> PathBuf {
    PathBuf::from(DEFAULT_CREDENTIALS_FILE)
}
