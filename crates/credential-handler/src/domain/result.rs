//! # Hook Results and Replies
//!
//! `HandlerResult` is the decision an application hook makes for one event.
//! Hooks hand back raw JSON, so the shape is validated here before any
//! branch is taken: object check first, then the `type` tag.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use url::Url;

use super::errors::ShapeError;

/// Tag of an inline answer.
pub const RESPONSE_TYPE: &str = "response";

/// Tag of a redirect into a window.
pub const REDIRECT_TYPE: &str = "redirect";

/// Final reply committed to the platform, inline or after a redirect.
///
/// Usually `{dataType, data}`. Whatever a window sends back is kept as is,
/// extra fields and missing ones included.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialReply(Value);

impl CredentialReply {
    /// Create a `{dataType, data}` reply.
    pub fn new(data_type: impl Into<String>, data: Value) -> Self {
        Self(json!({ "dataType": data_type.into(), "data": data }))
    }

    /// Reply carrying only the fields a `response` result supplied.
    pub fn from_parts(data_type: Option<Value>, data: Option<Value>) -> Self {
        let mut fields = Map::new();
        if let Some(data_type) = data_type {
            fields.insert("dataType".to_string(), data_type);
        }
        if let Some(data) = data {
            fields.insert("data".to_string(), data);
        }
        Self(Value::Object(fields))
    }

    /// Wrap a reply received from a window.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// `dataType`, when it is a string.
    pub fn data_type(&self) -> Option<&str> {
        self.0.get("dataType").and_then(Value::as_str)
    }

    /// `data`, if present.
    pub fn data(&self) -> Option<&Value> {
        self.0.get("data")
    }

    /// Reply as JSON.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Unwrap into JSON.
    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Decision returned by a `get` or `store` hook.
#[derive(Clone, Debug, PartialEq)]
pub enum HandlerResult {
    /// Answer inline; no window is opened.
    ///
    /// Both fields are copied into the reply as given, absent ones stay
    /// absent.
    Response {
        /// Type of the returned data
        data_type: Option<Value>,
        /// Returned data
        data: Option<Value>,
    },
    /// Defer to a window loaded at `url`.
    Redirect {
        /// Window location
        url: Url,
    },
}

impl HandlerResult {
    /// Inline answer.
    pub fn response(data_type: impl Into<String>, data: Value) -> Self {
        HandlerResult::Response {
            data_type: Some(Value::String(data_type.into())),
            data: Some(data),
        }
    }

    /// Redirect into a window.
    pub fn redirect(url: Url) -> Self {
        HandlerResult::Redirect { url }
    }

    /// Tag value of this result.
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerResult::Response { .. } => RESPONSE_TYPE,
            HandlerResult::Redirect { .. } => REDIRECT_TYPE,
        }
    }

    /// Validate a raw hook result.
    ///
    /// A non-object never reaches the tag check.
    pub fn from_value(value: Value) -> Result<Self, ShapeError> {
        let Value::Object(mut fields) = value else {
            return Err(ShapeError::NotAnObject);
        };

        let tag = fields.get("type").and_then(Value::as_str).map(str::to_owned);
        match tag.as_deref() {
            Some(RESPONSE_TYPE) => Ok(HandlerResult::Response {
                data_type: fields.remove("dataType"),
                data: fields.remove("data"),
            }),
            Some(REDIRECT_TYPE) => Self::redirect_from(&fields),
            _ => Err(ShapeError::UnknownType),
        }
    }

    fn redirect_from(fields: &Map<String, Value>) -> Result<Self, ShapeError> {
        let raw = fields
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| ShapeError::InvalidRedirect("missing \"url\"".to_string()))?;
        let url = Url::parse(raw)
            .map_err(|e| ShapeError::InvalidRedirect(format!("{raw}: {e}")))?;

        Ok(HandlerResult::Redirect { url })
    }
}

impl From<HandlerResult> for Value {
    fn from(result: HandlerResult) -> Self {
        match result {
            HandlerResult::Response { data_type, data } => {
                let mut fields = Map::new();
                fields.insert("type".to_string(), Value::from(RESPONSE_TYPE));
                if let Some(data_type) = data_type {
                    fields.insert("dataType".to_string(), data_type);
                }
                if let Some(data) = data {
                    fields.insert("data".to_string(), data);
                }
                Value::Object(fields)
            }
            HandlerResult::Redirect { url } => json!({
                "type": REDIRECT_TYPE,
                "url": url.as_str(),
            }),
        }
    }
}
