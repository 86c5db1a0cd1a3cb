//! The OAuth2 bearer credential for the ticketing API.

use chrono::{DateTime, Duration, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;

/// Tokens this close to expiry count as expired, so a request never departs
/// with a token that dies in flight.
const EXPIRY_LEEWAY_SECS: i64 = 60;

/// An issued OAuth2 credential.
///
/// Persisted as JSON carrying `access_token`, `refresh_token`, `token_type`,
/// `scope`, and either `expires_in` (relative, as issued by the token
/// endpoint) or `expires_at` (absolute epoch seconds, preferred on reload).
/// Serialization always emits the absolute form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Bearer access token.
    pub access_token: String,

    /// Refresh token, when the grant issued one.
    pub refresh_token: Option<String>,

    /// Token type, normally `Bearer`.
    pub token_type: String,

    /// Granted scopes.
    pub scope: BTreeSet<String>,

    /// Absolute expiry instant.
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Whether the access token is expired (within the safety leeway).
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now() + Duration::seconds(EXPIRY_LEEWAY_SECS)
    }

    /// Whether a refresh can be attempted once the token expires.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }
}

/// Wire form accepted on reload and produced by the token endpoint.
#[derive(Debug, Serialize, Deserialize)]
struct CredentialWire {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default)]
    scope: ScopeWire,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<i64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// OAuth servers emit scope either as a space-joined string or a list.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ScopeWire {
    List(Vec<String>),
    Joined(String),
}

impl Default for ScopeWire {
    fn default() -> Self {
        ScopeWire::List(Vec::new())
    }
}

impl ScopeWire {
    fn into_set(self) -> BTreeSet<String> {
        match self {
            ScopeWire::List(list) => list.into_iter().collect(),
            ScopeWire::Joined(joined) => {
                joined.split_whitespace().map(str::to_string).collect()
            }
        }
    }
}

impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = CredentialWire {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            token_type: self.token_type.clone(),
            scope: ScopeWire::List(self.scope.iter().cloned().collect()),
            expires_in: None,
            expires_at: Some(self.expires_at.timestamp()),
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = CredentialWire::deserialize(deserializer)?;

        // Absolute expiry wins; the relative form is anchored to "now", which
        // is only correct at issuance.
        let expires_at = match (wire.expires_at, wire.expires_in) {
            (Some(epoch), _) => DateTime::<Utc>::from_timestamp(epoch, 0)
                .ok_or_else(|| D::Error::custom("expires_at out of range"))?,
            (None, Some(secs)) => Utc::now() + Duration::seconds(secs),
            (None, None) => {
                return Err(D::Error::custom(
                    "credential needs either expires_at or expires_in",
                ))
            }
        };

        Ok(Credential {
            access_token: wire.access_token,
            refresh_token: wire.refresh_token,
            token_type: wire.token_type,
            scope: wire.scope.into_set(),
            expires_at,
        })
    }
}
