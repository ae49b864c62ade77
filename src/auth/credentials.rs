use log::info;
use std::fmt;
use std::path::Path;

use crate::error::ExportError;

pub const TENANT_ID_VAR: &str = "TENANT_ID";
pub const CLIENT_ID_VAR: &str = "CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "CLIENT_SECRET";
pub const RESOURCE_VAR: &str = "RESOURCE";

/// Client-credentials grant inputs, read once at startup
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub resource: String,
}

impl Credentials {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            resource: resource.into(),
        }
    }

    pub fn from_env() -> Result<Credentials, ExportError> {
        info!("Importing credentials from environment variables");
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load a specific dotenv file into the process environment, then read it
    pub fn from_env_file(path: &Path) -> Result<Credentials, ExportError> {
        info!("Importing credentials from .env file: {}", path.display());

        if !path.exists() {
            return Err(ExportError::Config(format!(
                "Environment file not found: {}",
                path.display()
            )));
        }

        dotenvy::from_path(path).map_err(|e| {
            ExportError::Config(format!("Failed to load .env file '{}': {}", path.display(), e))
        })?;

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build credentials from any variable source; the first missing variable is reported
    pub fn from_lookup<F>(lookup: F) -> Result<Credentials, ExportError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name).ok_or_else(|| {
                ExportError::Config(format!("{} environment variable not set", name))
            })
        };

        Ok(Credentials {
            tenant_id: require(TENANT_ID_VAR)?,
            client_id: require(CLIENT_ID_VAR)?,
            client_secret: require(CLIENT_SECRET_VAR)?,
            resource: require(RESOURCE_VAR)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("resource", &self.resource)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_from_lookup_reads_all_four_variables() {
        let env = vars(&[
            ("TENANT_ID", "tenant"),
            ("CLIENT_ID", "client"),
            ("CLIENT_SECRET", "secret"),
            ("RESOURCE", "https://org.crm.dynamics.com"),
        ]);

        let creds = Credentials::from_lookup(|name| env.get(name).cloned()).unwrap();
        assert_eq!(
            creds,
            Credentials::new("tenant", "client", "secret", "https://org.crm.dynamics.com")
        );
    }

    #[test]
    fn test_missing_variable_is_named() {
        let env = vars(&[("TENANT_ID", "tenant"), ("CLIENT_ID", "client")]);

        let err = Credentials::from_lookup(|name| env.get(name).cloned()).unwrap_err();
        assert!(matches!(err, ExportError::Config(_)));
        assert!(err.to_string().contains("CLIENT_SECRET"));
    }

    #[test]
    fn test_empty_values_are_passed_through() {
        let env = vars(&[
            ("TENANT_ID", ""),
            ("CLIENT_ID", ""),
            ("CLIENT_SECRET", ""),
            ("RESOURCE", ""),
        ]);

        let creds = Credentials::from_lookup(|name| env.get(name).cloned()).unwrap();
        assert_eq!(creds.tenant_id, "");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::new("tenant", "client", "super-secret", "https://org");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_missing_env_file() {
        let err = Credentials::from_env_file(Path::new("/definitely/not/here/.env")).unwrap_err();
        assert!(err.to_string().contains("Environment file not found"));
    }
}
