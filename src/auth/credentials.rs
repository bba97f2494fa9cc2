//! Application identity for WeChat platform authentication.

use secrecy::{ExposeSecret, SecretString};

/// The Official Account's identity: app ID plus app secret.
///
/// Set once at construction and never mutated. The secret participates in
/// token grants and the web authorization code exchange only; it is never
/// attached to ordinary API calls.
#[derive(Clone)]
pub struct AppCredentials {
    /// The application identifier (public)
    pub app_id: String,
    /// The application secret (private)
    app_secret: SecretString,
}

impl AppCredentials {
    /// Create new credentials from an app ID and app secret.
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: SecretString::from(app_secret.into()),
        }
    }

    /// Get the app secret for token grants.
    ///
    /// This method exposes the secret - use carefully.
    pub fn expose_secret(&self) -> &str {
        self.app_secret.expose_secret()
    }

    /// Create credentials from the default environment variables.
    ///
    /// Reads `WECHAT_APP_ID` and `WECHAT_APP_SECRET`.
    ///
    /// # Panics
    ///
    /// Panics if the environment variables are not set.
    pub fn from_env() -> Self {
        Self::from_env_vars("WECHAT_APP_ID", "WECHAT_APP_SECRET")
    }

    /// Create credentials from custom environment variable names.
    ///
    /// # Panics
    ///
    /// Panics if the environment variables are not set.
    pub fn from_env_vars(id_var: &str, secret_var: &str) -> Self {
        let app_id = std::env::var(id_var)
            .unwrap_or_else(|_| panic!("Environment variable {id_var} not set"));
        let app_secret = std::env::var(secret_var)
            .unwrap_or_else(|_| panic!("Environment variable {secret_var} not set"));

        Self::new(app_id, app_secret)
    }

    /// Try to create credentials from the default environment variables.
    ///
    /// Returns `None` if the environment variables are not set.
    pub fn try_from_env() -> Option<Self> {
        let app_id = std::env::var("WECHAT_APP_ID").ok()?;
        let app_secret = std::env::var("WECHAT_APP_SECRET").ok()?;

        Some(Self::new(app_id, app_secret))
    }
}

impl std::fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacted() {
        let creds = AppCredentials::new("wx1234", "super_secret");
        let debug_str = format!("{:?}", creds);
        assert!(debug_str.contains("wx1234"));
        assert!(!debug_str.contains("super_secret"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_expose_secret() {
        let creds = AppCredentials::new("wx1234", "secret");
        assert_eq!(creds.app_id, "wx1234");
        assert_eq!(creds.expose_secret(), "secret");
    }
}
