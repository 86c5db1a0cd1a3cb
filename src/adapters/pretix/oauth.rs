//! OAuth2 credential lifecycle for the ticketing API.
//!
//! The credential moves through four states: unauthenticated, authorizing
//! (operator visits the authorize URL), authorized, and authorized-expired,
//! which refreshes transparently on the next use. Every newly issued or
//! refreshed credential is persisted through the `TokenStore` before any
//! dependent call proceeds.

use secrecy::ExposeSecret;
use thiserror::Error;

use crate::domain::ticketing::Credential;
use crate::ports::StoreError;

use super::client::PretixClient;

/// Errors from the authorization flow.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authorized against the ticketing instance")]
    NotAuthorized,

    #[error("credential expired and no refresh token is available")]
    Expired,

    #[error("authorization callback URL is missing its {0} parameter")]
    MissingCallbackParam(&'static str),

    #[error("token endpoint returned HTTP {0}")]
    ExchangeFailed(u16),

    #[error("token endpoint request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PretixClient {
    fn oauth_base(&self) -> String {
        format!("{}/oauth", self.api_base())
    }

    /// The URL an operator visits to grant this client access.
    ///
    /// Carries an opaque `state` the authorization server echoes back; the
    /// callback is rejected if it comes back without one.
    pub fn authorization_url(&self) -> String {
        let state = format!("{:x}", std::time::UNIX_EPOCH.elapsed().map_or(0, |d| d.as_nanos()));
        format!(
            "{}/authorize?client_id={}&response_type=code&scope=read&state={}&redirect_uri={}",
            self.oauth_base(),
            percent_encode(&self.config.client_id),
            state,
            percent_encode(&self.config.redirect_url),
        )
    }

    /// Complete the authorization from the callback URL the operator was
    /// redirected to: extract the grant code, exchange it for a credential,
    /// and persist the credential.
    ///
    /// # Errors
    ///
    /// `AuthError::MissingCallbackParam` when the callback URL lacks its
    /// `code` or `state` query parameter; `ExchangeFailed`/`Network` when
    /// the token endpoint does not cooperate.
    pub async fn complete_authorization(&self, callback_url: &str) -> Result<(), AuthError> {
        let code = query_param(callback_url, "code")
            .ok_or(AuthError::MissingCallbackParam("code"))?;
        query_param(callback_url, "state").ok_or(AuthError::MissingCallbackParam("state"))?;

        let credential = self
            .exchange(&[
                ("grant_type", "authorization_code"),
                ("code", &code),
                ("redirect_uri", &self.config.redirect_url),
            ])
            .await?;

        self.install_credential(credential).await?;
        tracing::info!("ticketing authorization completed");
        Ok(())
    }

    /// Whether a usable credential is held, attempting one transparent
    /// refresh when the held one is expired and refreshable.
    pub async fn is_authorized(&self) -> bool {
        self.bearer_token().await.is_ok()
    }

    /// Probe the low-cost identity endpoint and report a diagnostic.
    ///
    /// Never fails: the diagnostic explains an unauthorized state instead.
    pub async fn test_authorization(&self) -> (bool, String) {
        let token = match self.bearer_token().await {
            Ok(token) => token,
            Err(e) => return (false, e.to_string()),
        };

        let url = format!("{}/me", self.api_base());
        match self.http.get(&url).bearer_auth(&token).send().await {
            Ok(response) if response.status().is_success() => {
                (true, "authorized against the ticketing instance".to_string())
            }
            Ok(response) => (
                false,
                format!("identity check returned HTTP {}", response.status().as_u16()),
            ),
            Err(e) => (false, format!("identity check failed: {e}")),
        }
    }

    /// Access token for the next API call, refreshing transparently when the
    /// held credential is expired and carries a refresh token.
    pub(super) async fn bearer_token(&self) -> Result<String, AuthError> {
        {
            let guard = self.credential.read().await;
            match guard.as_ref() {
                None => return Err(AuthError::NotAuthorized),
                Some(c) if !c.is_expired() => return Ok(c.access_token.clone()),
                Some(c) if !c.can_refresh() => return Err(AuthError::Expired),
                Some(_) => {}
            }
        }
        self.refresh().await
    }

    /// Refresh the held credential and persist the replacement.
    async fn refresh(&self) -> Result<String, AuthError> {
        let refresh_token = {
            let guard = self.credential.read().await;
            match guard.as_ref() {
                None => return Err(AuthError::NotAuthorized),
                // Another task may have refreshed while we waited.
                Some(c) if !c.is_expired() => return Ok(c.access_token.clone()),
                Some(c) => c
                    .refresh_token
                    .clone()
                    .ok_or(AuthError::Expired)?,
            }
        };

        tracing::debug!("refreshing expired ticketing credential");
        let credential = self
            .exchange(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", &refresh_token),
            ])
            .await?;
        let access_token = credential.access_token.clone();
        self.install_credential(credential).await?;
        Ok(access_token)
    }

    /// POST the token endpoint with client credentials plus `params`.
    async fn exchange(&self, params: &[(&str, &str)]) -> Result<Credential, AuthError> {
        let mut form: Vec<(&str, &str)> = vec![
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret().as_str()),
        ];
        form.extend_from_slice(params);

        let url = format!("{}/token", self.oauth_base());
        let response = self.http.post(&url).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::ExchangeFailed(status.as_u16()));
        }
        Ok(response.json().await?)
    }

    /// Store the credential in the session and persist it before anything
    /// depending on it proceeds.
    async fn install_credential(&self, credential: Credential) -> Result<(), AuthError> {
        self.token_store.save(&credential).await?;
        *self.credential.write().await = Some(credential);
        Ok(())
    }
}

/// Extract one query parameter value from a URL, percent-decoding left to
/// the caller (grant codes are URL-safe).
fn query_param(url: &str, name: &str) -> Option<String> {
    let query = url.split('?').nth(1)?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Minimal percent-encoding for query-string values.
fn percent_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::super::client::tests::{authorized_client, test_config};
    use super::*;
    use crate::adapters::storage::{InMemoryProcessedOrderStore, InMemoryTokenStore};
    use crate::ports::TokenStore;
    use chrono::{Duration, Utc};
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn unauthorized_client(instance_url: &str) -> (PretixClient, Arc<InMemoryTokenStore>) {
        let token_store = Arc::new(InMemoryTokenStore::new());
        let client = PretixClient::new(
            test_config(instance_url),
            token_store.clone(),
            Arc::new(InMemoryProcessedOrderStore::new()),
        )
        .unwrap();
        (client, token_store)
    }

    fn expired_credential() -> Credential {
        Credential {
            access_token: "stale".to_string(),
            refresh_token: Some("rtoken".to_string()),
            token_type: "Bearer".to_string(),
            scope: BTreeSet::new(),
            expires_at: Utc::now() - Duration::hours(1),
        }
    }

    #[test]
    fn percent_encode_escapes_reserved_characters() {
        assert_eq!(
            percent_encode("https://usher.example.org/callback"),
            "https%3A%2F%2Fusher.example.org%2Fcallback"
        );
        assert_eq!(percent_encode("plain-value_1.0~x"), "plain-value_1.0~x");
    }

    #[test]
    fn query_param_handles_missing_and_empty_values() {
        assert_eq!(
            query_param("https://x/cb?code=abc&state=s", "code").as_deref(),
            Some("abc")
        );
        assert_eq!(query_param("https://x/cb?state=s", "code"), None);
        assert_eq!(query_param("https://x/cb?code=&state=s", "code"), None);
        assert_eq!(query_param("https://x/cb", "code"), None);
    }

    #[tokio::test]
    async fn authorization_url_names_client_and_redirect() {
        let (client, _) = unauthorized_client("https://pretix.eu");
        let url = client.authorization_url();
        assert!(url.starts_with("https://pretix.eu/api/v1/oauth/authorize?"));
        assert!(url.contains("client_id=usher-client"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fusher.example.org%2Fcallback"));
    }

    #[tokio::test]
    async fn complete_authorization_requires_code_and_state() {
        let (client, _) = unauthorized_client("https://pretix.eu");

        let err = client
            .complete_authorization("https://usher.example.org/callback?state=s")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingCallbackParam("code")));

        let err = client
            .complete_authorization("https://usher.example.org/callback?code=abc")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingCallbackParam("state")));
    }

    #[tokio::test]
    async fn complete_authorization_exchanges_and_persists() {
        let mut server = mockito::Server::new_async().await;
        let token_mock = server
            .mock("POST", "/api/v1/oauth/token")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                mockito::Matcher::UrlEncoded("code".into(), "abc".into()),
                mockito::Matcher::UrlEncoded("client_id".into(), "usher-client".into()),
                mockito::Matcher::UrlEncoded("client_secret".into(), "s3cret".into()),
            ]))
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "access_token": "fresh",
                    "refresh_token": "rtoken",
                    "token_type": "Bearer",
                    "scope": "read write",
                    "expires_in": 3600
                })
                .to_string(),
            )
            .create_async()
            .await;

        let (client, token_store) = unauthorized_client(&server.url());
        client
            .complete_authorization("https://usher.example.org/callback?code=abc&state=s")
            .await
            .unwrap();

        assert!(client.is_authorized().await);

        // Persisted before any dependent call proceeds.
        let persisted = token_store.load().await.unwrap().unwrap();
        assert_eq!(persisted.access_token, "fresh");
        token_mock.assert_async().await;
    }

    #[tokio::test]
    async fn exchange_failure_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/oauth/token")
            .with_status(400)
            .create_async()
            .await;

        let (client, _) = unauthorized_client(&server.url());
        let err = client
            .complete_authorization("https://usher.example.org/callback?code=abc&state=s")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ExchangeFailed(400)));
    }

    #[tokio::test]
    async fn expired_credential_refreshes_transparently() {
        let mut server = mockito::Server::new_async().await;
        let refresh_mock = server
            .mock("POST", "/api/v1/oauth/token")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                mockito::Matcher::UrlEncoded("refresh_token".into(), "rtoken".into()),
            ]))
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "access_token": "fresh",
                    "refresh_token": "rtoken2",
                    "token_type": "Bearer",
                    "expires_in": 3600
                })
                .to_string(),
            )
            .create_async()
            .await;

        let token_store = Arc::new(InMemoryTokenStore::seeded(expired_credential()));
        let client = PretixClient::new(
            test_config(&server.url()),
            token_store.clone(),
            Arc::new(InMemoryProcessedOrderStore::new()),
        )
        .unwrap();
        client.start().await.unwrap();

        assert!(client.is_authorized().await);
        let persisted = token_store.load().await.unwrap().unwrap();
        assert_eq!(persisted.access_token, "fresh");
        assert_eq!(persisted.refresh_token.as_deref(), Some("rtoken2"));
        refresh_mock.assert_async().await;
    }

    #[tokio::test]
    async fn expired_credential_without_refresh_token_is_not_authorized() {
        let mut credential = expired_credential();
        credential.refresh_token = None;

        let client = PretixClient::new(
            test_config("https://pretix.eu"),
            Arc::new(InMemoryTokenStore::seeded(credential)),
            Arc::new(InMemoryProcessedOrderStore::new()),
        )
        .unwrap();
        client.start().await.unwrap();

        assert!(!client.is_authorized().await);
    }

    #[tokio::test]
    async fn test_authorization_reports_identity_check() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/me")
            .match_header("authorization", "Bearer atoken")
            .with_status(200)
            .with_body(r#"{"email": "usher@example.org"}"#)
            .create_async()
            .await;

        let client = authorized_client(&server.url()).await;
        let (ok, diagnostic) = client.test_authorization().await;
        assert!(ok, "diagnostic: {diagnostic}");
    }

    #[tokio::test]
    async fn test_authorization_without_credential_explains_itself() {
        let (client, _) = unauthorized_client("https://pretix.eu");
        let (ok, diagnostic) = client.test_authorization().await;
        assert!(!ok);
        assert!(diagnostic.contains("not authorized"));
    }
}
