use azure_core::credentials::Secret;
use azure_identity::{
    AzureCliCredential, ClientSecretCredential, ManagedIdentityCredential,
    WorkloadIdentityCredential,
};
use std::sync::Arc;
use tracing::{debug, info};

use super::{EntraCredential, StaticTokenCredential, Token, TokenCredential};
use crate::Error;

/// Tries each source in order and returns the first token obtained.
pub struct ChainedTokenCredential {
    sources: Vec<Arc<dyn TokenCredential>>,
}

impl ChainedTokenCredential {
    pub fn new(sources: Vec<Arc<dyn TokenCredential>>) -> Self {
        Self { sources }
    }

    /// Names of the sources, in the order they are tried.
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|source| source.name()).collect()
    }
}

#[async_trait::async_trait]
impl TokenCredential for ChainedTokenCredential {
    fn name(&self) -> &'static str {
        "ChainedTokenCredential"
    }

    async fn get_token(&self, scopes: &[&str]) -> Result<Token, Error> {
        if self.sources.is_empty() {
            return Err(Error::auth("no credential sources configured"));
        }

        let mut failures = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            match source.get_token(scopes).await {
                Ok(token) => {
                    info!(source = source.name(), "acquired bearer token");
                    return Ok(token);
                }
                Err(error) => {
                    let reason = match error {
                        Error::Authentication(message) => message,
                        other => other.to_string(),
                    };
                    debug!(source = source.name(), %reason, "credential source failed");
                    failures.push(format!("{}: {reason}", source.name()));
                }
            }
        }

        Err(Error::auth(format!(
            "every credential source failed ({})",
            failures.join("; ")
        )))
    }
}

/// Builds the standard fallback order: explicit token, environment service
/// principal, workload identity, managed identity, then the Azure CLI login.
pub struct DefaultCredential;

impl DefaultCredential {
    /// Chain driven by the process environment.
    pub fn chain(explicit_token: Option<String>) -> ChainedTokenCredential {
        Self::chain_with(explicit_token, |key| {
            std::env::var(key).ok().filter(|value| !value.is_empty())
        })
    }

    /// Chain driven by an arbitrary variable lookup. Sources whose variables are
    /// absent, or that `azure_identity` refuses to construct, are left out.
    pub fn chain_with(
        explicit_token: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ChainedTokenCredential {
        let mut sources: Vec<Arc<dyn TokenCredential>> = Vec::new();

        if let Some(token) = explicit_token.filter(|token| !token.is_empty()) {
            sources.push(Arc::new(StaticTokenCredential::new(token)));
        }

        if let (Some(tenant_id), Some(client_id), Some(client_secret)) = (
            lookup("AZURE_TENANT_ID"),
            lookup("AZURE_CLIENT_ID"),
            lookup("AZURE_CLIENT_SECRET"),
        ) {
            push_source(
                &mut sources,
                "ClientSecretCredential",
                ClientSecretCredential::new(&tenant_id, client_id, Secret::new(client_secret), None),
            );
        }

        if lookup("AZURE_FEDERATED_TOKEN_FILE").is_some() {
            push_source(
                &mut sources,
                "WorkloadIdentityCredential",
                WorkloadIdentityCredential::new(None),
            );
        }

        push_source(
            &mut sources,
            "ManagedIdentityCredential",
            ManagedIdentityCredential::new(None),
        );
        push_source(
            &mut sources,
            "AzureCliCredential",
            AzureCliCredential::new(None),
        );

        let chain = ChainedTokenCredential::new(sources);
        debug!(sources = ?chain.source_names(), "built default credential chain");
        chain
    }
}

fn push_source<C>(
    sources: &mut Vec<Arc<dyn TokenCredential>>,
    name: &'static str,
    built: azure_core::Result<Arc<C>>,
) where
    C: azure_core::credentials::TokenCredential + 'static,
{
    match built {
        Ok(credential) => sources.push(Arc::new(EntraCredential::new(name, credential))),
        Err(error) => debug!(source = name, %error, "skipping credential source"),
    }
}
