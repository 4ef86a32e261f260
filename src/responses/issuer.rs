use reqwest::{Client, Url};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::types::{ModelReply, ResponsesRequest};
use crate::config::IssuerConfig;
use crate::credential::{Token, TokenCredential};
use crate::pipeline::{
    with_api_version, ApiVersionQuery, BearerAuth, ClientRequestId, JsonContentType,
    OutgoingRequest, Pipeline, RequestDecorator,
};
use crate::Error;

/// Sends one prompt to the Responses endpoint with a freshly acquired bearer token.
pub struct ResponsesIssuer {
    client: Client,
    config: IssuerConfig,
    credential: Arc<dyn TokenCredential>,
    decorators: Vec<Arc<dyn RequestDecorator>>,
}

impl ResponsesIssuer {
    /// Create an issuer with its own HTTP client, bounded by `config.timeout`.
    pub fn new(config: IssuerConfig, credential: Arc<dyn TokenCredential>) -> Result<Self, Error> {
        let client = build_client(Client::builder().timeout(config.timeout))?;
        Ok(Self::with_client(config, credential, client))
    }

    /// Create an issuer around an existing HTTP client.
    pub fn with_client(
        config: IssuerConfig,
        credential: Arc<dyn TokenCredential>,
        client: Client,
    ) -> Self {
        Self {
            client,
            config,
            credential,
            decorators: Vec::new(),
        }
    }

    /// Run an extra decorator after the built-in ones.
    pub fn with_decorator(mut self, decorator: impl RequestDecorator + 'static) -> Self {
        self.decorators.push(Arc::new(decorator));
        self
    }

    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    /// `{base}/responses` without query decoration. A base that already points
    /// at `/responses` is used as-is.
    fn endpoint_url(&self) -> Url {
        let mut url = self.config.base_url.clone();
        let path = url.path().trim_end_matches('/');
        if !path.ends_with("/responses") {
            let joined = format!("{path}/responses");
            url.set_path(&joined);
        }
        url
    }

    /// The URL the request is sent to, `api-version` included.
    pub fn responses_url(&self) -> Url {
        let mut url = self.endpoint_url();
        with_api_version(&mut url, &self.config.api_version);
        url
    }

    pub fn build_request(&self, prompt: &str) -> ResponsesRequest {
        ResponsesRequest::new(
            self.config.model.clone(),
            prompt,
            self.config.max_output_tokens,
        )
    }

    fn pipeline(&self, token: &Token) -> Result<Pipeline, Error> {
        let auth = BearerAuth::new(token);
        if !auth.is_valid() {
            return Err(Error::auth("token contains characters not allowed in a header"));
        }

        let mut pipeline = Pipeline::new()
            .with(JsonContentType)
            .with(ClientRequestId)
            .with(ApiVersionQuery::new(self.config.api_version.clone()))
            .with(auth);
        for decorator in &self.decorators {
            pipeline.push(Box::new(SharedDecorator(decorator.clone())));
        }
        Ok(pipeline)
    }

    /// Acquire a token, send the prompt, and extract the first text output.
    ///
    /// The token is obtained before anything is sent to the model endpoint, and
    /// there are no retries: every failure is returned to the caller as is.
    #[tracing::instrument(skip_all, fields(model = %self.config.model))]
    pub async fn issue(&self, prompt: &str) -> Result<ModelReply, Error> {
        let scope = self.config.scope.as_str();
        debug!(%scope, "acquiring bearer token");
        let token = self.credential.get_token(&[scope]).await?;

        let request = OutgoingRequest::new(self.endpoint_url(), self.build_request(prompt));
        let request = self.pipeline(&token)?.apply(request);

        info!(url = %request.url, "sending Responses request");
        let response = self
            .client
            .post(request.url)
            .headers(request.headers)
            .json(&request.body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Responses endpoint returned an error");
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let reply = ModelReply::from_body(&body)?;
        debug!(model = %reply.model, chars = reply.text.len(), "received reply");
        Ok(reply)
    }
}

/// A client that cannot be built is a setup problem, not a failed round-trip.
fn build_client(builder: reqwest::ClientBuilder) -> Result<Client, Error> {
    builder
        .build()
        .map_err(|e| Error::config(format!("cannot build HTTP client: {e}")))
}

/// Lets user decorators be shared between pipelines built for each call.
struct SharedDecorator(Arc<dyn RequestDecorator>);

impl RequestDecorator for SharedDecorator {
    fn decorate(&self, request: OutgoingRequest) -> OutgoingRequest {
        self.0.decorate(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::StaticTokenCredential;

    fn issuer(base_url: &str) -> ResponsesIssuer {
        let config = IssuerConfig::new(base_url).unwrap();
        ResponsesIssuer::new(config, Arc::new(StaticTokenCredential::new("tok123"))).unwrap()
    }

    #[test]
    fn test_responses_url() {
        assert_eq!(
            issuer("https://example.foundry.test/openai").responses_url().as_str(),
            "https://example.foundry.test/openai/responses?api-version=2025-11-15-preview"
        );
        assert_eq!(
            issuer("https://example.foundry.test/openai/").responses_url().as_str(),
            "https://example.foundry.test/openai/responses?api-version=2025-11-15-preview"
        );
        assert_eq!(
            issuer("https://example.foundry.test/openai?tenant=a")
                .responses_url()
                .as_str(),
            "https://example.foundry.test/openai/responses?tenant=a&api-version=2025-11-15-preview"
        );
        assert_eq!(
            issuer("https://example.foundry.test/openai/responses?api-version=2025-11-15-preview")
                .responses_url()
                .as_str(),
            "https://example.foundry.test/openai/responses?api-version=2025-11-15-preview"
        );
    }

    #[test]
    fn test_build_request_uses_config() {
        let request = issuer("https://example.foundry.test/openai").build_request("hello");
        assert_eq!(request, ResponsesRequest::new("claude-sonnet-4-5", "hello", 1000));
    }

    #[test]
    fn test_client_build_failure_is_config_error() {
        let builder = Client::builder()
            .min_tls_version(reqwest::tls::Version::TLS_1_3)
            .max_tls_version(reqwest::tls::Version::TLS_1_2);
        let error = build_client(builder).unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::Config);
        assert!(error.to_string().contains("cannot build HTTP client"));
    }
}
