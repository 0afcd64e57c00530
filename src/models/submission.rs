use serde_json::{Map, Value};
use thiserror::Error;

/// The declared field set of a signup deployment. Both variants share one
/// schema and one controller; only the field list differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSet {
    /// {name, email, company} — the lead-capture flow.
    Company,
    /// {name, email, password} — the account-signup flow.
    Password,
}

impl FieldSet {
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            FieldSet::Company => &["name", "email", "company"],
            FieldSet::Password => &["name", "email", "password"],
        }
    }

    /// Secret fields are accepted in submissions but must never be copied
    /// into an analytics event.
    pub fn is_secret(&self, field: &str) -> bool {
        matches!(self, FieldSet::Password) && field == "password"
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields().contains(&field)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Request body is not valid JSON")]
    InvalidJson,
    #[error("Request body must be a JSON object")]
    NotAnObject,
    #[error("Field '{field}' must be a string")]
    NotAString { field: String },
    #[error("Unknown field '{field}'")]
    UnknownField { field: String },
}

/// The form field values exchanged between client and server. Always holds
/// exactly the declared field set; values may be empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    field_set: FieldSet,
    values: Vec<(&'static str, String)>,
}

impl SubmissionPayload {
    /// All declared fields present, all empty.
    pub fn empty(field_set: FieldSet) -> Self {
        let values = field_set
            .fields()
            .iter()
            .map(|name| (*name, String::new()))
            .collect();
        SubmissionPayload { field_set, values }
    }

    pub fn field_set(&self) -> FieldSet {
        self.field_set
    }

    /// Updates exactly the named field, leaving every other field untouched.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), SchemaError> {
        match self.values.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => {
                *slot = value.to_string();
                Ok(())
            }
            None => Err(SchemaError::UnknownField {
                field: field.to_string(),
            }),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value.as_str())
    }

    /// Resets every declared field back to the empty string.
    pub fn clear(&mut self) {
        for (_, value) in &mut self.values {
            value.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|(_, value)| value.is_empty())
    }

    /// Boundary validation: the body must be a JSON object whose declared
    /// fields, where present, are strings. Absent fields surface as empty
    /// strings; undeclared keys are ignored.
    pub fn from_json(body: &Value, field_set: FieldSet) -> Result<Self, SchemaError> {
        let object = body.as_object().ok_or(SchemaError::NotAnObject)?;

        let mut payload = SubmissionPayload::empty(field_set);
        for field in field_set.fields() {
            match object.get(*field) {
                None => {}
                Some(Value::String(value)) => {
                    payload.set_field(field, value)?;
                }
                Some(_) => {
                    return Err(SchemaError::NotAString {
                        field: field.to_string(),
                    })
                }
            }
        }
        Ok(payload)
    }

    /// Serializes the full field set, secrets included, as the wire body.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (name, value) in &self.values {
            object.insert(name.to_string(), Value::String(value.clone()));
        }
        Value::Object(object)
    }

    /// The property map handed to the analytics sink. Secret fields are
    /// excluded here, on both the client and server paths.
    pub fn analytics_properties(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        for (name, value) in &self.values {
            if self.field_set.is_secret(name) {
                continue;
            }
            properties.insert(name.to_string(), Value::String(value.clone()));
        }
        properties
    }

    pub fn email(&self) -> &str {
        self.get("email").unwrap_or_default()
    }
}
