use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::Error;

/// Body of `POST /responses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsesRequest {
    pub model: String,
    pub input: String,
    pub max_output_tokens: u32,
}

impl ResponsesRequest {
    pub fn new(model: impl Into<String>, input: impl Into<String>, max_output_tokens: u32) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            max_output_tokens,
        }
    }
}

/// The parts of a successful response we surface: the model that answered and
/// `output[0].content[0].text`, untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReply {
    pub model: String,
    pub text: String,
}

impl ModelReply {
    /// Parse a raw response body.
    pub fn from_body(body: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::malformed(format!("response body is not valid JSON: {e}")))?;
        Self::from_json(&value)
    }

    /// Walk the documented shape, reporting the first missing or mis-typed path.
    pub fn from_json(value: &Value) -> Result<Self, Error> {
        let root = as_object(value, "response body")?;

        let model = as_str(field(root, "model", "model")?, "model")?;

        let output = as_array(field(root, "output", "output")?, "output")?;
        let item = as_object(first(output, "output")?, "output[0]")?;

        let content = as_array(
            field(item, "content", "output[0].content")?,
            "output[0].content",
        )?;
        let part = as_object(first(content, "output[0].content")?, "output[0].content[0]")?;

        let text = as_str(
            field(part, "text", "output[0].content[0].text")?,
            "output[0].content[0].text",
        )?;

        Ok(Self {
            model: model.to_string(),
            text: text.to_string(),
        })
    }
}

impl fmt::Display for ModelReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Response from model: {}:\n\n{}", self.model, self.text)
    }
}

fn field<'a>(object: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a Value, Error> {
    match object.get(key) {
        Some(Value::Null) | None => Err(Error::malformed(format!("`{path}` is missing"))),
        Some(value) => Ok(value),
    }
}

fn first<'a>(items: &'a [Value], path: &str) -> Result<&'a Value, Error> {
    items
        .first()
        .ok_or_else(|| Error::malformed(format!("`{path}` is empty")))
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, Error> {
    value
        .as_object()
        .ok_or_else(|| Error::malformed(format!("`{path}` is not an object")))
}

fn as_array<'a>(value: &'a Value, path: &str) -> Result<&'a [Value], Error> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| Error::malformed(format!("`{path}` is not an array")))
}

fn as_str<'a>(value: &'a Value, path: &str) -> Result<&'a str, Error> {
    value
        .as_str()
        .ok_or_else(|| Error::malformed(format!("`{path}` is not a string")))
}
