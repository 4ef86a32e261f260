//! Request decoration applied between building a request and sending it.
//!
//! Each decorator takes an [`OutgoingRequest`] and returns it modified. They are
//! applied in order by a [`Pipeline`] and must be idempotent: running a decorator
//! twice never yields a second `Authorization` header or `api-version` parameter.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use uuid::Uuid;

use crate::credential::Token;
use crate::responses::ResponsesRequest;

pub const API_VERSION_PARAM: &str = "api-version";

pub const CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";

/// A request that has not been handed to the HTTP client yet.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub body: ResponsesRequest,
}

impl OutgoingRequest {
    pub fn new(url: Url, body: ResponsesRequest) -> Self {
        Self {
            url,
            headers: HeaderMap::new(),
            body,
        }
    }
}

pub trait RequestDecorator: Send + Sync {
    fn decorate(&self, request: OutgoingRequest) -> OutgoingRequest;
}

/// Ordered list of decorators.
#[derive(Default)]
pub struct Pipeline {
    decorators: Vec<Box<dyn RequestDecorator>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, decorator: impl RequestDecorator + 'static) -> Self {
        self.decorators.push(Box::new(decorator));
        self
    }

    pub fn push(&mut self, decorator: Box<dyn RequestDecorator>) {
        self.decorators.push(decorator);
    }

    pub fn len(&self) -> usize {
        self.decorators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorators.is_empty()
    }

    pub fn apply(&self, request: OutgoingRequest) -> OutgoingRequest {
        self.decorators
            .iter()
            .fold(request, |request, decorator| decorator.decorate(request))
    }
}

/// Appends `api-version=<version>` unless the query already carries a non-empty one.
pub struct ApiVersionQuery {
    version: String,
}

impl ApiVersionQuery {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

impl RequestDecorator for ApiVersionQuery {
    fn decorate(&self, mut request: OutgoingRequest) -> OutgoingRequest {
        with_api_version(&mut request.url, &self.version);
        request
    }
}

/// `?api-version=` on a bare URL, `&api-version=` after an existing query, nothing
/// if the parameter is already there with a value. A valueless `api-version`
/// (`?api-version` or `?api-version=`) is dropped and replaced.
pub fn with_api_version(url: &mut Url, version: &str) {
    let mut valueless = false;
    for (key, value) in url.query_pairs() {
        if key == API_VERSION_PARAM {
            if !value.is_empty() {
                return;
            }
            valueless = true;
        }
    }

    if valueless {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != API_VERSION_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        url.set_query(None);
        url.query_pairs_mut()
            .extend_pairs(kept)
            .append_pair(API_VERSION_PARAM, version);
    } else {
        url.query_pairs_mut().append_pair(API_VERSION_PARAM, version);
    }
}

/// Sets `Authorization: Bearer <token>`, replacing any previous value.
pub struct BearerAuth {
    value: Option<HeaderValue>,
}

impl BearerAuth {
    pub fn new(token: &Token) -> Self {
        let value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
            .ok()
            .map(|mut value| {
                value.set_sensitive(true);
                value
            });
        Self { value }
    }

    /// False when the token contains bytes that cannot go in a header.
    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }
}

impl RequestDecorator for BearerAuth {
    fn decorate(&self, mut request: OutgoingRequest) -> OutgoingRequest {
        if let Some(value) = &self.value {
            request.headers.insert(AUTHORIZATION, value.clone());
        }
        request
    }
}

pub struct JsonContentType;

impl RequestDecorator for JsonContentType {
    fn decorate(&self, mut request: OutgoingRequest) -> OutgoingRequest {
        request
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        request
    }
}

/// Tags the request with a fresh correlation id unless one was already set.
///
/// The Azure SDK HTTP pipelines send the same `x-ms-client-request-id` header on
/// every call; service-side logs key on it. It carries no auth and the endpoint
/// does not require it.
pub struct ClientRequestId;

impl RequestDecorator for ClientRequestId {
    fn decorate(&self, mut request: OutgoingRequest) -> OutgoingRequest {
        let name = HeaderName::from_static(CLIENT_REQUEST_ID);
        if !request.headers.contains_key(&name) {
            if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
                request.headers.insert(name, value);
            }
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn request(url: &str) -> OutgoingRequest {
        OutgoingRequest::new(
            Url::parse(url).unwrap(),
            ResponsesRequest::new("claude-sonnet-4-5", "hi", 16),
        )
    }

    #[test]
    fn test_api_version_on_bare_url() {
        let decorated = ApiVersionQuery::new("2025-11-15-preview")
            .decorate(request("https://example.foundry.test/openai/responses"));
        assert_eq!(
            decorated.url.as_str(),
            "https://example.foundry.test/openai/responses?api-version=2025-11-15-preview"
        );
    }

    #[test]
    fn test_api_version_after_existing_query() {
        let decorated = ApiVersionQuery::new("2025-11-15-preview")
            .decorate(request("https://example.foundry.test/openai/responses?foo=bar"));
        assert_eq!(
            decorated.url.as_str(),
            "https://example.foundry.test/openai/responses?foo=bar&api-version=2025-11-15-preview"
        );
    }

    #[test]
    fn test_api_version_not_duplicated() {
        let decorator = ApiVersionQuery::new("2025-11-15-preview");
        let url = "https://example.foundry.test/openai/responses?api-version=2024-01-01";
        let decorated = decorator.decorate(decorator.decorate(request(url)));
        assert_eq!(decorated.url.as_str(), url);
    }

    #[test]
    fn test_valueless_api_version_is_replaced() {
        let decorator = ApiVersionQuery::new("2025-11-15-preview");

        let decorated =
            decorator.decorate(request("https://example.foundry.test/openai/responses?api-version"));
        assert_eq!(
            decorated.url.as_str(),
            "https://example.foundry.test/openai/responses?api-version=2025-11-15-preview"
        );

        let decorated = decorator.decorate(request(
            "https://example.foundry.test/openai/responses?foo=bar&api-version=",
        ));
        assert_eq!(
            decorated.url.as_str(),
            "https://example.foundry.test/openai/responses?foo=bar&api-version=2025-11-15-preview"
        );
        assert_eq!(
            decorated
                .url
                .query_pairs()
                .filter(|(key, _)| key == API_VERSION_PARAM)
                .count(),
            1
        );
    }

    #[test]
    fn test_bearer_auth_replaces_existing_header() {
        let token = Token::new("tok123", SystemTime::now());
        let mut initial = request("https://example.test/responses");
        initial
            .headers
            .insert(AUTHORIZATION, HeaderValue::from_static("Bearer stale"));

        let pipeline = Pipeline::new()
            .with(BearerAuth::new(&token))
            .with(BearerAuth::new(&token));
        let decorated = pipeline.apply(initial);

        let values: Vec<_> = decorated.headers.get_all(AUTHORIZATION).iter().collect();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0], "Bearer tok123");
    }

    #[test]
    fn test_bearer_auth_rejects_invalid_token() {
        let token = Token::new("bad\ntoken", SystemTime::now());
        let auth = BearerAuth::new(&token);
        assert!(!auth.is_valid());
        let decorated = auth.decorate(request("https://example.test/responses"));
        assert!(decorated.headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_client_request_id_kept_if_present() {
        let first = ClientRequestId.decorate(request("https://example.test/responses"));
        let id = first.headers.get(CLIENT_REQUEST_ID).cloned().unwrap();
        let second = ClientRequestId.decorate(first);
        assert_eq!(second.headers.get(CLIENT_REQUEST_ID), Some(&id));
        assert!(Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }

    #[test]
    fn test_pipeline_applies_in_order() {
        let token = Token::new("tok123", SystemTime::now());
        let pipeline = Pipeline::new()
            .with(JsonContentType)
            .with(ApiVersionQuery::new("v1"))
            .with(BearerAuth::new(&token));
        assert_eq!(pipeline.len(), 3);

        let decorated = pipeline.apply(pipeline.apply(request("https://example.test/responses")));
        assert_eq!(decorated.url.query(), Some("api-version=v1"));
        assert_eq!(decorated.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(decorated.headers.get_all(AUTHORIZATION).iter().count(), 1);
    }
}
