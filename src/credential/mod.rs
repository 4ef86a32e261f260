//! Bearer-token acquisition from Microsoft Entra ID credential sources.
//!
//! The token flows themselves come from `azure_identity`; [`EntraCredential`]
//! adapts any of its credentials to [`TokenCredential`]. Callers build the
//! credential they want (usually [`DefaultCredential::chain`]) and hand it to the
//! issuer as an `Arc<dyn TokenCredential>`; nothing here is global.

pub mod chain;

use azure_core::credentials::AccessToken;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::debug;

use crate::Error;

pub use chain::{ChainedTokenCredential, DefaultCredential};

/// Upper bound on a single token request.
pub const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A bearer token and the instant it stops being valid.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    secret: String,
    expires_on: SystemTime,
}

impl Token {
    pub fn new(secret: impl Into<String>, expires_on: SystemTime) -> Self {
        Self {
            secret: secret.into(),
            expires_on,
        }
    }

    /// The raw token, as sent after `Bearer `.
    pub fn as_str(&self) -> &str {
        &self.secret
    }

    pub fn expires_on(&self) -> SystemTime {
        self.expires_on
    }

    pub fn is_expired(&self) -> bool {
        self.expires_on <= SystemTime::now()
    }
}

impl From<AccessToken> for Token {
    fn from(access: AccessToken) -> Self {
        Token::new(access.token.secret(), SystemTime::from(access.expires_on))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("secret", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Source of bearer tokens for a set of scopes.
#[async_trait::async_trait]
pub trait TokenCredential: Send + Sync {
    /// Short name used in logs and chain failure reports.
    fn name(&self) -> &'static str;

    async fn get_token(&self, scopes: &[&str]) -> Result<Token, Error>;
}

/// A token supplied up front through configuration.
///
/// The real expiry is unknown, so the token is reported as valid for an hour.
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait::async_trait]
impl TokenCredential for StaticTokenCredential {
    fn name(&self) -> &'static str {
        "StaticTokenCredential"
    }

    async fn get_token(&self, _scopes: &[&str]) -> Result<Token, Error> {
        if self.token.trim().is_empty() {
            return Err(Error::auth("configured access token is empty"));
        }
        Ok(Token::new(
            self.token.clone(),
            SystemTime::now() + Duration::from_secs(3600),
        ))
    }
}

/// An `azure_identity` credential (CLI, managed identity, client secret, ...)
/// behind [`TokenCredential`], bounded by [`TOKEN_REQUEST_TIMEOUT`].
pub struct EntraCredential {
    name: &'static str,
    inner: Arc<dyn azure_core::credentials::TokenCredential>,
    timeout: Duration,
}

impl EntraCredential {
    pub fn new(
        name: &'static str,
        inner: Arc<dyn azure_core::credentials::TokenCredential>,
    ) -> Self {
        Self {
            name,
            inner,
            timeout: TOKEN_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl TokenCredential for EntraCredential {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn get_token(&self, scopes: &[&str]) -> Result<Token, Error> {
        debug!(source = self.name, ?scopes, "requesting Entra ID token");
        let access = tokio::time::timeout(self.timeout, self.inner.get_token(scopes))
            .await
            .map_err(|_| Error::auth(format!("timed out after {:?}", self.timeout)))?
            .map_err(|e| Error::auth(e.to_string()))?;
        Ok(access.into())
    }
}
