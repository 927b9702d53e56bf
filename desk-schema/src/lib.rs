//! Input validation for JSON records.
//!
//! Services describe their input shape as a `validator`-derive struct;
//! [`validate`] deserializes the incoming JSON into it and flattens any
//! failures into per-field error arrays on an `Unprocessable` error.

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use validator::Validate;

use desk_core::errors::DeskError;

/// Accumulates field-level validation errors.
#[derive(Default)]
pub struct SchemaErrors {
    map: Map<String, Value>,
}

impl SchemaErrors {
    pub fn push_schema(&mut self, msg: impl Into<String>) {
        Self::push_to(&mut self.map, "_schema", msg);
    }

    pub fn push_field(&mut self, field: &str, msg: impl Into<String>) {
        Self::push_to(&mut self.map, field, msg);
    }

    fn push_to(map: &mut Map<String, Value>, key: &str, msg: impl Into<String>) {
        let msg = Value::String(msg.into());
        match map.get_mut(key) {
            Some(Value::Array(arr)) => arr.push(msg),
            Some(_) | None => {
                map.insert(key.to_string(), Value::Array(vec![msg]));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn into_unprocessable_anyhow(self, message: &str) -> anyhow::Error {
        DeskError::unprocessable(message)
            .with_errors(Value::Object(self.map))
            .into_anyhow()
    }
}

pub fn unprocessable(message: &str, errors: Value) -> anyhow::Error {
    DeskError::unprocessable(message)
        .with_errors(errors)
        .into_anyhow()
}

pub fn schema_error(message: &str, msg: impl Into<String>) -> anyhow::Error {
    unprocessable(message, json!({"_schema": [msg.into()]}))
}

fn friendly_message(code: &str) -> Option<&'static str> {
    match code {
        "required" => Some("is required"),
        "email" => Some("must be a valid email"),
        "length" => Some("has invalid length"),
        "range" => Some("is out of range"),
        "url" => Some("must be a valid URL"),
        _ => None,
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn join_index(prefix: &str, idx: usize) -> String {
    format!("{prefix}[{idx}]")
}

fn push_validation_errors(out: &mut SchemaErrors, prefix: &str, errs: &validator::ValidationErrors) {
    for (field, kind) in errs.errors() {
        match kind {
            validator::ValidationErrorsKind::Field(field_errors) => {
                let key = join_path(prefix, field);
                for e in field_errors {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .or_else(|| friendly_message(&e.code).map(|m| m.to_string()))
                        .unwrap_or_else(|| e.code.to_string());
                    out.push_field(&key, msg);
                }
            }
            validator::ValidationErrorsKind::Struct(struct_errs) => {
                let next = join_path(prefix, field);
                push_validation_errors(out, &next, struct_errs.as_ref());
            }
            validator::ValidationErrorsKind::List(list_errs) => {
                let base = join_path(prefix, field);
                for (idx, nested) in list_errs {
                    let next = join_index(&base, *idx);
                    push_validation_errors(out, &next, nested.as_ref());
                }
            }
        }
    }
}

fn validator_errors_to_schema_errors(errs: &validator::ValidationErrors) -> SchemaErrors {
    let mut out = SchemaErrors::default();
    push_validation_errors(&mut out, "", errs);
    out
}

/// Deserialize `data` into `T` and run its validation rules.
///
/// Both deserialization and rule failures surface as `Unprocessable`
/// with field-keyed error arrays.
pub fn validate<T>(data: &Value, error_message: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned + Validate,
{
    let parsed: T = serde_json::from_value(data.clone())
        .map_err(|e| unprocessable(error_message, json!({"_schema": [e.to_string()]})))?;

    parsed
        .validate()
        .map_err(|e| validator_errors_to_schema_errors(&e).into_unprocessable_anyhow(error_message))?;

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use desk_core::errors::DeskError;
    use serde::Deserialize;
    use serde_json::json;
    use validator::Validate;

    use super::validate;

    #[derive(Debug, Deserialize, Validate)]
    struct TicketInput {
        #[validate(length(min = 1, message = "name must not be empty"))]
        name: String,

        #[validate(email(message = "email must be a valid email"))]
        email: String,

        #[validate(length(min = 1, message = "subject must not be empty"))]
        subject: String,
    }

    #[test]
    fn invalid_fields_are_collected_per_field() {
        let data = json!({
            "name": "",
            "email": "not-an-email",
            "subject": "Printer on fire"
        });

        let err = validate::<TicketInput>(&data, "Ticket validation failed").unwrap_err();
        let desk = DeskError::from_anyhow(&err).expect("must be DeskError");
        assert_eq!(desk.code(), 422);

        let errors = desk.errors.as_ref().unwrap();
        assert_eq!(errors["name"][0], "name must not be empty");
        assert_eq!(errors["email"][0], "email must be a valid email");
        assert!(errors.get("subject").is_none());
    }

    #[test]
    fn missing_fields_surface_as_schema_errors() {
        let err = validate::<TicketInput>(&json!({"name": "A"}), "Ticket validation failed")
            .unwrap_err();
        let desk = DeskError::from_anyhow(&err).unwrap();
        assert!(desk.errors.as_ref().unwrap().get("_schema").is_some());
    }

    #[test]
    fn valid_input_parses() {
        let data = json!({
            "name": "Alice",
            "email": "alice@example.com",
            "subject": "Printer on fire"
        });
        let parsed = validate::<TicketInput>(&data, "Ticket validation failed").unwrap();
        assert_eq!(parsed.name, "Alice");
    }
}
