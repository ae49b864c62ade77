use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::constants::{DEFAULT_AUTHORITY, DEFAULT_TIMEOUT_SECS};
use crate::auth::Credentials;
use crate::error::ExportError;
use crate::export::{FailurePolicy, MetadataProfile};

/// Optional settings file; credentials never live here
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub export: ExportSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportSection {
    pub crm_url: Option<String>,
    pub authority: Option<String>,
    pub output_root: Option<PathBuf>,
    pub profile: Option<MetadataProfile>,
    pub fail_fast: Option<bool>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()?.join("annotation-export")
        } else {
            dirs::home_dir()?.join(".annotation-export")
        };
        Some(config_dir.join("config.toml"))
    }

    /// Load an explicit settings file, or the default one when it exists
    pub fn load(path: Option<&Path>) -> Result<Self, ExportError> {
        let config_path = match path {
            Some(path) if !path.exists() => {
                return Err(ExportError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("No config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        debug!("Loading config from: {:?}", config_path);
        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            ExportError::Config(format!("Failed to read config file {:?}: {}", config_path, e))
        })?;

        let config = Self::from_toml_str(&config_content).map_err(|e| {
            ExportError::Config(format!("Failed to parse config file {:?}: {}", config_path, e))
        })?;
        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Values given on the command line; they win over everything else
#[derive(Debug, Clone, Default)]
pub struct ExportOverrides {
    pub crm_url: Option<String>,
    pub authority: Option<String>,
    pub output_root: Option<PathBuf>,
    pub profile: Option<MetadataProfile>,
    pub fail_fast: bool,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub crm_url: String,
    pub authority: String,
    pub output_root: PathBuf,
    pub profile: MetadataProfile,
    pub failure_policy: FailurePolicy,
    pub timeout: Duration,
}

impl ExportSettings {
    pub fn new(crm_url: impl Into<String>) -> Self {
        Self {
            crm_url: crm_url.into(),
            authority: DEFAULT_AUTHORITY.to_string(),
            output_root: PathBuf::from("."),
            profile: MetadataProfile::default(),
            failure_policy: FailurePolicy::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Merge flag > environment > settings file > default; the CRM url falls back to `RESOURCE`
    pub fn resolve(
        overrides: &ExportOverrides,
        env_crm_url: Option<String>,
        config: &Config,
        credentials: &Credentials,
    ) -> Self {
        let file = &config.export;

        let crm_url = overrides
            .crm_url
            .clone()
            .or(env_crm_url)
            .or_else(|| file.crm_url.clone())
            .unwrap_or_else(|| credentials.resource.clone());

        let fail_fast = overrides.fail_fast || file.fail_fast.unwrap_or(false);

        Self {
            crm_url,
            authority: overrides
                .authority
                .clone()
                .or_else(|| file.authority.clone())
                .unwrap_or_else(|| DEFAULT_AUTHORITY.to_string()),
            output_root: overrides
                .output_root
                .clone()
                .or_else(|| file.output_root.clone())
                .unwrap_or_else(|| PathBuf::from(".")),
            profile: overrides.profile.or(file.profile).unwrap_or_default(),
            failure_policy: FailurePolicy::from_fail_fast(fail_fast),
            timeout: Duration::from_secs(
                overrides
                    .timeout_secs
                    .or(file.timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        }
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = output_root.into();
        self
    }

    pub fn with_profile(mut self, profile: MetadataProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn http_client(&self) -> Result<reqwest::Client, ExportError> {
        crate::api::build_http_client(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("tenant", "client", "secret", "https://resource.crm.dynamics.com")
    }

    #[test]
    fn test_defaults_fall_back_to_resource() {
        let settings = ExportSettings::resolve(
            &ExportOverrides::default(),
            None,
            &Config::default(),
            &credentials(),
        );

        assert_eq!(settings.crm_url, "https://resource.crm.dynamics.com");
        assert_eq!(settings.authority, DEFAULT_AUTHORITY);
        assert_eq!(settings.output_root, PathBuf::from("."));
        assert_eq!(settings.profile, MetadataProfile::Basic);
        assert_eq!(settings.failure_policy, FailurePolicy::SkipAndReport);
        assert_eq!(settings.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_precedence_flag_env_file() {
        let config = Config::from_toml_str(
            r#"
            [export]
            crm_url = "https://file.crm.dynamics.com"
            output_root = "/data/exports"
            profile = "extended"
            fail_fast = true
            timeout_secs = 5
            "#,
        )
        .unwrap();

        let from_file = ExportSettings::resolve(&ExportOverrides::default(), None, &config, &credentials());
        assert_eq!(from_file.crm_url, "https://file.crm.dynamics.com");
        assert_eq!(from_file.output_root, PathBuf::from("/data/exports"));
        assert_eq!(from_file.profile, MetadataProfile::Extended);
        assert_eq!(from_file.failure_policy, FailurePolicy::FailFast);
        assert_eq!(from_file.timeout, Duration::from_secs(5));

        let from_env = ExportSettings::resolve(
            &ExportOverrides::default(),
            Some("https://env.crm.dynamics.com".to_string()),
            &config,
            &credentials(),
        );
        assert_eq!(from_env.crm_url, "https://env.crm.dynamics.com");

        let overrides = ExportOverrides {
            crm_url: Some("https://flag.crm.dynamics.com".to_string()),
            profile: Some(MetadataProfile::PerFile),
            timeout_secs: Some(1),
            ..Default::default()
        };
        let from_flag = ExportSettings::resolve(
            &overrides,
            Some("https://env.crm.dynamics.com".to_string()),
            &config,
            &credentials(),
        );
        assert_eq!(from_flag.crm_url, "https://flag.crm.dynamics.com");
        assert_eq!(from_flag.profile, MetadataProfile::PerFile);
        assert_eq!(from_flag.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_empty_config_file_is_valid() {
        let config = Config::from_toml_str("").unwrap();
        assert!(config.export.crm_url.is_none());
    }

    #[test]
    fn test_unknown_profile_is_rejected() {
        assert!(Config::from_toml_str("[export]\nprofile = \"everything\"").is_err());
    }

    #[test]
    fn test_explicit_missing_config_file() {
        let err = Config::load(Some(Path::new("/no/such/config.toml"))).unwrap_err();
        assert!(matches!(err, ExportError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[export]\nprofile = \"parent\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.export.profile, Some(MetadataProfile::Parent));
    }
}
