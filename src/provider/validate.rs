//! Attribute validation
//!
//! Runs the validators registered in the schema registry, plus the
//! required-attribute check every schema implies.

use super::registry::{get_validator, SchemaDef, ValidateFunction, ValidatorDef, ValueType};
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{resource}: required attribute {attribute:?} is not set")]
    MissingRequired { resource: String, attribute: String },

    #[error("{attribute:?} must be a {expected}")]
    WrongType { attribute: String, expected: &'static str },

    #[error("{attribute:?} must contain a value from {allowed:?}, got {got:?}")]
    NotAllowed {
        attribute: String,
        allowed: Vec<String>,
        got: String,
    },

    #[error("{attribute:?} ({got:?}) must contain from {min} to {max} characters")]
    InvalidLength {
        attribute: String,
        got: String,
        min: usize,
        max: usize,
    },

    #[error("{attribute:?} ({got:?}) must match regular expression {regexp:?}")]
    InvalidFormat {
        attribute: String,
        got: String,
        regexp: String,
    },

    #[error("no validator registered for {resource}.{attribute}")]
    NoValidator { resource: String, attribute: String },
}

/// Run the validator registered for `resource`.`attribute` on `value`
pub fn invoke_validator(resource: &str, attribute: &str, value: &str) -> Result<(), ValidationError> {
    let Some(validator) = get_validator(resource, attribute) else {
        return Err(ValidationError::NoValidator {
            resource: resource.to_string(),
            attribute: attribute.to_string(),
        });
    };

    match validator.function {
        ValidateFunction::AllowedStringValue => validate_allowed_string(attribute, value, validator),
        ValidateFunction::RegexpLen => validate_regexp_len(attribute, value, validator),
    }
}

fn validate_allowed_string(
    attribute: &str,
    value: &str,
    validator: &ValidatorDef,
) -> Result<(), ValidationError> {
    let allowed = validator.allowed_values();
    if allowed.iter().any(|a| a == value) {
        return Ok(());
    }
    Err(ValidationError::NotAllowed {
        attribute: attribute.to_string(),
        allowed,
        got: value.to_string(),
    })
}

fn validate_regexp_len(
    attribute: &str,
    value: &str,
    validator: &ValidatorDef,
) -> Result<(), ValidationError> {
    let min = validator.min_length.unwrap_or(0);
    let max = validator.max_length.unwrap_or(usize::MAX);
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationError::InvalidLength {
            attribute: attribute.to_string(),
            got: value.to_string(),
            min,
            max,
        });
    }

    if let Some(pattern) = validator.regexp.as_deref() {
        // Registry patterns are covered by tests; an invalid one rejects everything
        let matches = Regex::new(pattern)
            .map(|re| re.is_match(value))
            .unwrap_or(false);
        if !matches {
            return Err(ValidationError::InvalidFormat {
                attribute: attribute.to_string(),
                got: value.to_string(),
                regexp: pattern.to_string(),
            });
        }
    }

    Ok(())
}

/// Check a configuration against `schema`: required attributes present,
/// string attributes typed correctly, registered validators passing.
pub fn validate_config(
    name: &str,
    schema: &SchemaDef,
    config: &Map<String, Value>,
) -> Result<(), ValidationError> {
    for (attribute, def) in &schema.attributes {
        let value = config.get(attribute).filter(|v| !v.is_null());

        let Some(value) = value else {
            if def.required {
                return Err(ValidationError::MissingRequired {
                    resource: name.to_string(),
                    attribute: attribute.clone(),
                });
            }
            continue;
        };

        if def.value_type == ValueType::String && def.validate {
            let Some(s) = value.as_str() else {
                return Err(ValidationError::WrongType {
                    attribute: attribute.clone(),
                    expected: "string",
                });
            };
            invoke_validator(name, attribute, s)?;
        }
    }

    Ok(())
}
