//! KeyAuth application configuration loaded via OrthoConfig.

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::lenient::optional_string;

/// Default KeyAuth API endpoint.
pub const DEFAULT_API_URL: &str = "https://keyauth.win/api/1.2/";

/// Default KeyAuth request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const DEFAULT_VERSION: &str = "1.0";
const PROGRAM_NAME: &str = "auth-bridge";

// Packaged builds bake the application identity in at compile time.
const EMBEDDED_NAME: Option<&str> = option_env!("AUTH_BRIDGE_EMBEDDED_KEYAUTH_NAME");
const EMBEDDED_OWNERID: Option<&str> = option_env!("AUTH_BRIDGE_EMBEDDED_KEYAUTH_OWNERID");

const PLACEHOLDERS: &[&str] = &["changeme", "change-me", "todo", "xxx", "placeholder"];

/// Raw configuration values for the KeyAuth application.
///
/// Text fields accept values the environment layer reads as numbers, so
/// `KEYAUTH_VERSION=1.0` and all-digit owner ids load as written. Such
/// values pass through a number first: `1.10` reads back as `1.1` unless
/// quoted (`KEYAUTH_VERSION='"1.10"'`).
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "KEYAUTH")]
pub struct BridgeSettings {
    /// KeyAuth application name.
    #[serde(default, deserialize_with = "optional_string")]
    pub name: Option<String>,
    /// KeyAuth owner identifier.
    #[serde(default, deserialize_with = "optional_string")]
    pub ownerid: Option<String>,
    /// Application version reported to KeyAuth.
    #[ortho_config(cli_long = "app-version")]
    #[serde(default, deserialize_with = "optional_string")]
    pub version: Option<String>,
    /// Override for the KeyAuth API endpoint.
    pub api_url: Option<String>,
    /// Override for the machine's hardware identifier.
    #[serde(default, deserialize_with = "optional_string")]
    pub hwid: Option<String>,
    /// Timeout for each KeyAuth request, in seconds.
    #[ortho_config(default = 10)]
    pub timeout_secs: u64,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            name: None,
            ownerid: None,
            version: None,
            api_url: None,
            hwid: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl BridgeSettings {
    /// Loads settings from the environment and configuration files.
    ///
    /// Command-line arguments are not consulted; they carry credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a configuration layer is malformed.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from(PROGRAM_NAME)]).map_err(|err| ConfigError::Load {
            message: err.to_string(),
        })
    }

    /// Validates the settings into the identity used by the client.
    ///
    /// Name and owner id fall back to compile-time embedded values when
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when name or owner id is missing or a
    /// placeholder, when the API URL does not parse, or when the timeout is
    /// zero.
    ///
    /// # Example
    ///
    /// ```
    /// use auth_bridge::BridgeSettings;
    ///
    /// let settings = BridgeSettings {
    ///     name: Some("PMDF".to_owned()),
    ///     ownerid: Some("a1b2c3d4e5".to_owned()),
    ///     ..BridgeSettings::default()
    /// };
    /// let credentials = settings.resolve().expect("settings are complete");
    ///
    /// assert_eq!(credentials.version(), "1.0");
    /// ```
    pub fn resolve(&self) -> Result<AppCredentials, ConfigError> {
        self.resolve_with_embedded(EMBEDDED_NAME, EMBEDDED_OWNERID)
    }

    fn resolve_with_embedded(
        &self,
        embedded_name: Option<&str>,
        embedded_ownerid: Option<&str>,
    ) -> Result<AppCredentials, ConfigError> {
        let name = required(self.name.as_deref(), embedded_name, "KEYAUTH_NAME")?;
        let owner_id = required(self.ownerid.as_deref(), embedded_ownerid, "KEYAUTH_OWNERID")?;
        let version = self
            .version
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_VERSION)
            .to_owned();
        let raw_url = self.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
        let api_url = Url::parse(raw_url).map_err(|err| ConfigError::InvalidUrl {
            value: raw_url.to_owned(),
            message: err.to_string(),
        })?;
        let hwid_override = self
            .hwid
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(AppCredentials {
            name,
            owner_id,
            version,
            api_url,
            hwid_override,
            request_timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

/// Validated KeyAuth application identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppCredentials {
    name: String,
    owner_id: String,
    version: String,
    api_url: Url,
    hwid_override: Option<String>,
    request_timeout: Duration,
}

impl AppCredentials {
    /// KeyAuth application name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// KeyAuth owner identifier.
    #[must_use]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Application version reported to KeyAuth.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// KeyAuth API endpoint.
    #[must_use]
    pub const fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Configured hardware identifier, if any.
    #[must_use]
    pub fn hwid_override(&self) -> Option<&str> {
        self.hwid_override.as_deref()
    }

    /// Timeout applied to each KeyAuth request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

fn required(
    configured: Option<&str>,
    embedded: Option<&str>,
    key: &'static str,
) -> Result<String, ConfigError> {
    let value = configured
        .or(embedded)
        .ok_or(ConfigError::Missing { key })?
        .trim();
    if is_placeholder(value) {
        return Err(ConfigError::Placeholder {
            key,
            value: value.to_owned(),
        });
    }
    Ok(value.to_owned())
}

/// Whether `value` is empty or still a template placeholder.
///
/// # Example
///
/// ```
/// use auth_bridge::config::is_placeholder;
///
/// assert!(is_placeholder("your_owner_id"));
/// assert!(is_placeholder("<app name>"));
/// assert!(!is_placeholder("a1b2c3d4e5"));
/// ```
#[must_use]
pub fn is_placeholder(value: &str) -> bool {
    let lowered = value.trim().to_ascii_lowercase();
    lowered.is_empty()
        || lowered.starts_with("your_")
        || lowered.starts_with("your-")
        || lowered.starts_with('<')
        || PLACEHOLDERS.contains(&lowered.as_str())
}
