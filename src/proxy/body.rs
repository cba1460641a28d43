//! Request-body checks applied before anything is forwarded.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Parse a request body as a JSON object. An empty body is an empty object.
pub fn json_object(body: &Bytes) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::invalid_json("Request body must be a JSON object")),
        Err(e) => Err(ApiError::invalid_json(format!("Invalid JSON body: {}", e))),
    }
}

/// Dashboard forms treat `null`, `false`, `0` and `""` as not filled in.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn require_fields(body: &Map<String, Value>, required: &[&str]) -> Result<(), ApiError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|field| !body.get(**field).is_some_and(is_present))
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::missing_fields(missing))
    }
}

/// Checks `required` then shapes the body into the forwarded payload type.
pub fn payload<T: DeserializeOwned>(body: &Bytes, required: &[&str], what: &str) -> Result<T, ApiError> {
    let map = json_object(body)?;
    require_fields(&map, required)?;
    serde_json::from_value(Value::Object(map))
        .map_err(|e| ApiError::validation_error(format!("Invalid {}: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CancelPayload, PlanPayload};
    use serde_json::json;

    #[test]
    fn falsy_values_count_as_missing() {
        let body = json!({ "name": "", "price": 0, "duration_days": null, "features": {} });
        let err = require_fields(body.as_object().unwrap(), PlanPayload::REQUIRED).unwrap_err();
        match err {
            ApiError::ValidationError { missing_fields, .. } => {
                assert_eq!(missing_fields, vec!["name", "price", "duration_days"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn plan_description_defaults_to_empty() {
        let body = Bytes::from_static(br#"{"name":"Pro","price":49.5,"duration_days":30,"features":{"chat":true}}"#);
        let plan: PlanPayload = payload(&body, PlanPayload::REQUIRED, "plan").unwrap();
        assert_eq!(plan.description, "");
        assert_eq!(serde_json::to_value(&plan).unwrap()["features"], json!({"chat": true}));
    }

    #[test]
    fn empty_body_is_empty_object() {
        let cancel: CancelPayload = payload(&Bytes::new(), &[], "cancellation").unwrap();
        assert_eq!(cancel.cancellation_reason, "");
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(matches!(json_object(&Bytes::from_static(b"[1,2]")), Err(ApiError::InvalidJson(_))));
        assert!(matches!(json_object(&Bytes::from_static(b"{oops")), Err(ApiError::InvalidJson(_))));
    }
}
