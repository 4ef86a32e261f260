//! Keyless access to an OpenAI-compatible Responses endpoint.
//!
//! A bearer token is obtained from a Microsoft Entra ID credential chain, the
//! request is decorated with that token and the pinned `api-version` query
//! parameter, and the first text output of the model is returned.

pub mod config;
pub mod credential;
pub mod error;
pub mod pipeline;
pub mod responses;

// Re-export core types for easy usage
pub use config::{
    IssuerConfig, IssuerConfigBuilder, DEFAULT_API_VERSION, DEFAULT_MAX_OUTPUT_TOKENS,
    DEFAULT_MODEL, DEFAULT_PROMPT, DEFAULT_SCOPE,
};
pub use credential::{
    ChainedTokenCredential, DefaultCredential, EntraCredential, StaticTokenCredential, Token,
    TokenCredential,
};
pub use error::{Error, ErrorKind};
pub use pipeline::{OutgoingRequest, Pipeline, RequestDecorator};
pub use responses::{ModelReply, ResponsesIssuer, ResponsesRequest};
