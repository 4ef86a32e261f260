//! The Responses endpoint: wire types and the authenticated issuer.

pub mod issuer;
pub mod types;

pub use issuer::ResponsesIssuer;
pub use types::{ModelReply, ResponsesRequest};
