//! Layered configuration for the Planboard client.
//!
//! Settings come from `planboard.toml` in the client home directory, then
//! environment variables, then CLI flags.
//!
//! ```toml
//! [api]
//! base_url = "https://planboard.example.com/api"
//! timeout_secs = 30
//!
//! [auth]
//! session_ttl_secs = 30
//! login_url = "https://planboard.example.com/login"
//! open_browser = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Base URL used when neither the environment nor the file sets one.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_LOGIN_URL: &str = "http://localhost:3000/login";

/// Environment variables consulted for the base URL, in priority order.
pub const BASE_URL_ENV_VARS: &[&str] = &["PLANBOARD_API_BASE_URL", "NEXT_PUBLIC_API_BASE_URL"];

pub const HOME_ENV_VAR: &str = "PLANBOARD_HOME";
pub const CONFIG_FILE_NAME: &str = "planboard.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSection {
    /// How long a fetched session is reused
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Where the user is sent after a sign-out
    #[serde(default = "default_login_url")]
    pub login_url: String,
    /// Open the login page in a browser on sign-out
    #[serde(default)]
    pub open_browser: bool,
}

fn default_session_ttl_secs() -> u64 {
    30
}

fn default_login_url() -> String {
    DEFAULT_LOGIN_URL.to_string()
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl_secs(),
            login_url: default_login_url(),
            open_browser: false,
        }
    }
}

/// Contents of `planboard.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanboardToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub auth: AuthSection,
}

impl PlanboardToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse planboard.toml")
    }

    /// Returns the default configuration if the file doesn't exist.
    pub fn load_or_default(home: &Path) -> Result<Self> {
        let config_path = home.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize planboard.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Base URL: environment → file → built-in default.
    pub fn base_url(&self) -> String {
        let env = BASE_URL_ENV_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()));
        let url = env
            .or_else(|| self.api.base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        url.trim_end_matches('/').to_string()
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(url) = &self.api.base_url
            && !is_http_url(url)
        {
            warnings.push(format!(
                "Invalid api.base_url '{}': should start with http:// or https://",
                url
            ));
        }
        if !is_http_url(&self.auth.login_url) {
            warnings.push(format!(
                "Invalid auth.login_url '{}': should start with http:// or https://",
                self.auth.login_url
            ));
        }
        if self.api.timeout_secs == 0 {
            warnings.push("api.timeout_secs is 0; requests would fail immediately".to_string());
        }
        if self.auth.session_ttl_secs == 0 {
            warnings.push(
                "auth.session_ttl_secs is 0; every request will hit the session provider"
                    .to_string(),
            );
        }

        warnings
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Resolved settings the API client is built from.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(default_timeout_secs()),
            user_agent: user_agent(),
        }
    }
}

fn user_agent() -> String {
    format!("planboard/{}", env!("CARGO_PKG_VERSION"))
}

/// Configuration used throughout the client.
///
/// Merges settings from:
/// 1. planboard.toml
/// 2. Environment variables
/// 3. CLI arguments
#[derive(Debug, Clone)]
pub struct PlanboardConfig {
    pub home: PathBuf,
    pub toml: PlanboardToml,
    pub verbose: bool,
    /// CLI override for the base URL
    pub cli_base_url: Option<String>,
}

impl PlanboardConfig {
    /// Load configuration from `home`, or the default home when `None`.
    pub fn new(home: Option<PathBuf>) -> Result<Self> {
        let home = match home {
            Some(dir) => dir,
            None => default_home()?,
        };
        let toml = PlanboardToml::load_or_default(&home)?;

        Ok(Self {
            home,
            toml,
            verbose: false,
            cli_base_url: None,
        })
    }

    pub fn with_cli_args(
        home: Option<PathBuf>,
        verbose: bool,
        base_url: Option<String>,
    ) -> Result<Self> {
        let mut config = Self::new(home)?;
        config.verbose = verbose;
        config.cli_base_url = base_url;
        Ok(config)
    }

    /// Base URL (CLI → env → file → default).
    pub fn base_url(&self) -> String {
        match &self.cli_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => self.toml.base_url(),
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.toml.auth.session_ttl_secs)
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url(),
            timeout: Duration::from_secs(self.toml.api.timeout_secs),
            user_agent: user_agent(),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.home.join(CONFIG_FILE_NAME)
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.home.join("credentials.json")
    }

    pub fn tenant_file(&self) -> PathBuf {
        self.home.join("tenant.json")
    }

    pub fn ensure_home(&self) -> Result<()> {
        std::fs::create_dir_all(&self.home).with_context(|| {
            format!("Failed to create planboard home: {}", self.home.display())
        })
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}

/// `$PLANBOARD_HOME`, else the platform config directory.
pub fn default_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(HOME_ENV_VAR)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|dir| dir.join("planboard"))
        .context("Could not determine a config directory; set PLANBOARD_HOME")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn clear_base_url_env() -> Vec<(&'static str, Option<String>)> {
        let saved = BASE_URL_ENV_VARS
            .iter()
            .map(|var| (*var, std::env::var(var).ok()))
            .collect();
        for var in BASE_URL_ENV_VARS {
            unsafe { std::env::remove_var(var) };
        }
        saved
    }

    fn restore_env(saved: Vec<(&'static str, Option<String>)>) {
        for (var, value) in saved {
            match value {
                Some(v) => unsafe { std::env::set_var(var, v) },
                None => unsafe { std::env::remove_var(var) },
            }
        }
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let toml = PlanboardToml::parse("").unwrap();
        assert!(toml.api.base_url.is_none());
        assert_eq!(toml.api.timeout_secs, 30);
        assert_eq!(toml.auth.session_ttl_secs, 30);
        assert_eq!(toml.auth.login_url, DEFAULT_LOGIN_URL);
        assert!(!toml.auth.open_browser);
    }

    #[test]
    fn test_parse_sections() {
        let content = r#"
[api]
base_url = "https://pm.example.com/api/"
timeout_secs = 10

[auth]
session_ttl_secs = 5
login_url = "https://pm.example.com/login"
open_browser = true
"#;
        let toml = PlanboardToml::parse(content).unwrap();
        assert_eq!(toml.api.timeout_secs, 10);
        assert_eq!(toml.auth.session_ttl_secs, 5);
        assert!(toml.auth.open_browser);
    }

    #[test]
    fn test_base_url_priority() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let saved = clear_base_url_env();

        // Default
        assert_eq!(PlanboardToml::default().base_url(), DEFAULT_API_BASE_URL);

        // File, trailing slash trimmed
        let toml =
            PlanboardToml::parse("[api]\nbase_url = \"https://file.example/api/\"").unwrap();
        assert_eq!(toml.base_url(), "https://file.example/api");

        // Fallback env var beats the file
        unsafe { std::env::set_var("NEXT_PUBLIC_API_BASE_URL", "https://next.example/api") };
        assert_eq!(toml.base_url(), "https://next.example/api");

        // Primary env var beats the fallback
        unsafe { std::env::set_var("PLANBOARD_API_BASE_URL", "https://env.example/api") };
        assert_eq!(toml.base_url(), "https://env.example/api");

        restore_env(saved);
    }

    #[test]
    fn test_cli_base_url_wins() {
        let dir = tempdir().unwrap();
        let config = PlanboardConfig::with_cli_args(
            Some(dir.path().to_path_buf()),
            true,
            Some("http://127.0.0.1:9999/".to_string()),
        )
        .unwrap();
        assert!(config.verbose);
        assert_eq!(config.base_url(), "http://127.0.0.1:9999");
        assert_eq!(config.api_settings().base_url, "http://127.0.0.1:9999");
    }

    #[test]
    fn test_validate_flags_bad_values() {
        let content = r#"
[api]
base_url = "ftp://nope"
timeout_secs = 0

[auth]
session_ttl_secs = 0
"#;
        let warnings = PlanboardToml::parse(content).unwrap().validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("api.base_url"));
        assert!(PlanboardToml::default().validate().is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut toml = PlanboardToml::default();
        toml.api.base_url = Some("https://saved.example/api".into());
        toml.auth.session_ttl_secs = 12;
        toml.save(&path).unwrap();

        let loaded = PlanboardToml::load_or_default(dir.path()).unwrap();
        assert_eq!(loaded.api.base_url.as_deref(), Some("https://saved.example/api"));
        assert_eq!(loaded.auth.session_ttl_secs, 12);
    }

    #[test]
    fn test_config_paths_live_in_home() {
        let dir = tempdir().unwrap();
        let config = PlanboardConfig::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(config.config_file(), dir.path().join("planboard.toml"));
        assert_eq!(config.credentials_file(), dir.path().join("credentials.json"));
        assert_eq!(config.tenant_file(), dir.path().join("tenant.json"));
        assert_eq!(config.session_ttl(), Duration::from_secs(30));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[api\nbroken").unwrap();
        let err = PlanboardConfig::new(Some(dir.path().to_path_buf())).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse planboard.toml"));
    }
}
