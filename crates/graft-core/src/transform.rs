//! Preparation of exported dashboards for import on another instance.

use serde_json::Value;

use crate::error::{GraftError, Result};
use crate::model::Dashboard;

/// Document fields assigned by the source instance.
///
/// Left populated, the target either rejects the import with a version
/// conflict or overwrites whichever of its own dashboards shares the id.
pub const SYSTEM_ASSIGNED_FIELDS: [&str; 2] = ["id", "version"];

/// Returns a copy of `dashboard` with system-assigned fields set to `null`.
///
/// Pure and idempotent. Fails only when the document is not a JSON object.
pub fn sanitize_for_import(dashboard: &Dashboard) -> Result<Dashboard> {
    let Value::Object(document) = &dashboard.payload else {
        return Err(GraftError::invalid_payload(
            &dashboard.uid,
            format!(
                "dashboard document must be a JSON object, got {}",
                json_kind(&dashboard.payload)
            ),
        ));
    };

    let mut document = document.clone();
    for field in SYSTEM_ASSIGNED_FIELDS {
        document.insert(field.to_string(), Value::Null);
    }

    Ok(Dashboard {
        payload: Value::Object(document),
        ..dashboard.clone()
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
