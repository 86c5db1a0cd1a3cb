//! Ticketing platform (Pretix) configuration

use secrecy::SecretString;
use serde::Deserialize;

use super::error::ValidationError;

/// Pretix instance and OAuth client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PretixConfig {
    /// Base URL of the ticketing instance
    #[serde(default = "default_instance_url")]
    pub instance_url: String,

    /// OAuth2 client identifier
    pub client_id: String,

    /// OAuth2 client secret
    pub client_secret: SecretString,

    /// OAuth2 redirect URL registered for the client
    pub redirect_url: String,

    /// Timeout applied to every ticketing API request, in seconds
    #[serde(default = "default_api_timeout")]
    pub api_timeout_secs: u64,
}

impl PretixConfig {
    /// Validate ticketing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.client_id.is_empty() {
            return Err(ValidationError::MissingRequired("pretix.client_id"));
        }
        if !is_http_url(&self.instance_url) {
            return Err(ValidationError::InvalidInstanceUrl);
        }
        if !is_http_url(&self.redirect_url) {
            return Err(ValidationError::InvalidRedirectUrl);
        }
        if self.api_timeout_secs == 0 || self.api_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn default_instance_url() -> String {
    "https://pretix.eu".to_string()
}

fn default_api_timeout() -> u64 {
    30
}
