use std::path::PathBuf;

use crate::clients::errors::{Error, Result};

/// Callback address registered for the OAuth handshake.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8888/callback";

const CLIENT_ID_VARS: [&str; 2] = ["CLIENT_ID", "RSPOTIFY_CLIENT_ID"];
const CLIENT_SECRET_VARS: [&str; 2] = ["CLIENT_SECRET", "RSPOTIFY_CLIENT_SECRET"];
const REDIRECT_URI_VAR: &str = "RSPOTIFY_REDIRECT_URI";

/// Settings needed to talk to Spotify
#[derive(Debug, Clone)]
pub struct Config {
    /// Spotify application client id
    pub client_id: String,
    /// Spotify application client secret
    pub client_secret: String,
    /// OAuth callback address
    pub redirect_uri: String,
    /// File the OAuth token is cached in between runs
    pub token_cache_path: PathBuf,
}

/// Builds a [`Config`] from explicit values, falling back to the environment.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
    token_cache_path: Option<PathBuf>,
}

impl ConfigBuilder {
    /// A builder with nothing set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the client id.
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Overrides the client secret.
    #[must_use]
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Overrides the OAuth callback address.
    #[must_use]
    pub fn redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Overrides where the OAuth token is cached.
    #[must_use]
    pub fn token_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_cache_path = Some(path.into());
        self
    }

    /// Fills unset values from the process environment.
    pub fn build(self) -> Result<Config> {
        self.build_with(|key| std::env::var(key).ok())
    }

    /// Fills unset values through `lookup` instead of the process environment.
    pub fn build_with(self, lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
        let first_set = |keys: &[&str]| {
            keys.iter()
                .find_map(|&key| lookup(key).filter(|value| !value.is_empty()))
        };

        let client_id = self
            .client_id
            .or_else(|| first_set(&CLIENT_ID_VARS))
            .ok_or_else(|| missing(&CLIENT_ID_VARS))?;
        let client_secret = self
            .client_secret
            .or_else(|| first_set(&CLIENT_SECRET_VARS))
            .ok_or_else(|| missing(&CLIENT_SECRET_VARS))?;
        let redirect_uri = self
            .redirect_uri
            .or_else(|| first_set(&[REDIRECT_URI_VAR]))
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());
        let token_cache_path = self.token_cache_path.unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp")) // Fallback to /tmp if cache directory can't be determined
                .join(".cleanlist_token_cache")
        });

        Ok(Config {
            client_id,
            client_secret,
            redirect_uri,
            token_cache_path,
        })
    }
}

fn missing(keys: &[&str]) -> Error {
    Error::ConfigurationError(format!(
        "Missing Spotify credentials, set one of {} in the environment or .env",
        keys.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn reads_credentials_and_defaults_redirect() {
        let config = ConfigBuilder::new()
            .build_with(env(&[("CLIENT_ID", "id"), ("CLIENT_SECRET", "secret")]))
            .unwrap();
        assert_eq!(config.client_id, "id");
        assert_eq!(config.client_secret, "secret");
        assert_eq!(config.redirect_uri, DEFAULT_REDIRECT_URI);
        assert!(config.token_cache_path.ends_with(".cleanlist_token_cache"));
    }

    #[test]
    fn falls_back_to_rspotify_variables() {
        let config = ConfigBuilder::new()
            .build_with(env(&[
                ("CLIENT_ID", ""),
                ("RSPOTIFY_CLIENT_ID", "rs-id"),
                ("RSPOTIFY_CLIENT_SECRET", "rs-secret"),
                ("RSPOTIFY_REDIRECT_URI", "http://127.0.0.1:9000/cb"),
            ]))
            .unwrap();
        assert_eq!(config.client_id, "rs-id");
        assert_eq!(config.client_secret, "rs-secret");
        assert_eq!(config.redirect_uri, "http://127.0.0.1:9000/cb");
    }

    #[test]
    fn explicit_values_win_over_environment() {
        let config = ConfigBuilder::new()
            .client_id("explicit")
            .client_secret("explicit-secret")
            .token_cache_path("/tmp/cache")
            .build_with(env(&[("CLIENT_ID", "env"), ("CLIENT_SECRET", "env")]))
            .unwrap();
        assert_eq!(config.client_id, "explicit");
        assert_eq!(config.client_secret, "explicit-secret");
        assert_eq!(config.token_cache_path, PathBuf::from("/tmp/cache"));
    }

    #[test]
    fn missing_secret_is_a_configuration_error() {
        let err = ConfigBuilder::new()
            .build_with(env(&[("CLIENT_ID", "id")]))
            .unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(msg) if msg.contains("CLIENT_SECRET")));
    }
}
