use serde::Serialize;
use serde_json::Value;

use super::errors::FieldError;

/// Outcome of one validation call. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Normalized record, present only when valid
    pub data: Option<Value>,
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn success(data: Value) -> Self {
        Self {
            is_valid: true,
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn failure(errors: Vec<FieldError>) -> Self {
        Self {
            is_valid: false,
            data: None,
            errors,
        }
    }

    /// Normalized record or the full error list
    pub fn into_result(self) -> Result<Value, Vec<FieldError>> {
        match self.data {
            Some(data) if self.is_valid => Ok(data),
            _ => Err(self.errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let ok = serde_json::to_value(ValidationResult::success(json!({"id": 1}))).unwrap();
        assert_eq!(ok, json!({"isValid": true, "data": {"id": 1}, "errors": []}));

        let failed =
            serde_json::to_value(ValidationResult::failure(vec![FieldError::required("id")]))
                .unwrap();
        assert_eq!(failed["isValid"], json!(false));
        assert_eq!(failed["data"], Value::Null);
        assert_eq!(failed["errors"][0]["code"], json!("required"));
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationResult::success(json!({})).into_result().is_ok());
        let errors = ValidationResult::failure(vec![FieldError::required("x")])
            .into_result()
            .unwrap_err();
        assert_eq!(errors.len(), 1);
    }
}
