use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;

/// The API's top-level `{"error": {"code", "info"}}` object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorObject {
    #[serde(default = "unknown_code")]
    pub code: String,
    #[serde(default)]
    pub info: String,
}

fn unknown_code() -> String {
    "unknown".to_owned()
}

impl From<ApiErrorObject> for ApiError {
    fn from(error: ApiErrorObject) -> Self {
        Self::Api {
            code: error.code,
            info: error.info,
        }
    }
}

/// Decode a raw response body into a JSON tree.
///
/// An embedded `error` object is authoritative: it is returned as
/// [`ApiError::Api`] with `code` and `info` copied verbatim.
pub fn decode_response(body: &str) -> Result<Value, ApiError> {
    let value: Value = serde_json::from_str(body).map_err(ApiError::MalformedBody)?;
    if !value.is_object() {
        return Err(ApiError::UnexpectedShape(format!(
            "expected a JSON object, got {}",
            value_type_name(&value)
        )));
    }

    if let Some(error) = value.get("error") {
        let error = ApiErrorObject::deserialize(error).map_err(ApiError::MalformedBody)?;
        return Err(error.into());
    }

    if let Some(warnings) = value.get("warnings") {
        debug!(%warnings, "API returned warnings");
    }

    Ok(value)
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
