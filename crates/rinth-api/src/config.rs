use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::AuthToken;
use crate::persist::{PersistError, PersistedEntity};
use crate::transport::{HttpTransport, TransportError};

/// Client settings, persisted as YAML in [`Config::FILE_PATH`].
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(default)]
#[must_use]
pub struct Config {
    pub base_url: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<AuthToken>,
}

impl PersistedEntity for Config {
    const FILE_PATH: &'static str = "rinth.yml";
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: Some(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: None,
            token: None,
        }
    }
}

impl Config {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Reads the config in `directory`, falling back to the defaults when
    /// there is no config file.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn load_or_default(directory: &Path) -> Result<Self, PersistError> {
        match Self::read_from(directory) {
            Ok(config) => Ok(config),
            Err(error) if error.is_not_found() => Ok(Self::default()),
            Err(error) => Err(error),
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Builds the HTTP transport described by this config.
    ///
    /// # Errors
    ///
    /// See [`HttpTransport::new`].
    pub fn transport(&self) -> Result<HttpTransport, TransportError> {
        HttpTransport::new(
            self.base_url.clone(),
            self.user_agent.as_deref(),
            self.timeout(),
        )
    }
}

fn default_base_url() -> Url {
    Url::parse(HttpTransport::DEFAULT_BASE_URL).expect("The default base URL is valid")
}
