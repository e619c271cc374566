//! Field rules shared by the proxy handlers and the client request layer.
//!
//! Both enforcement points run the same `FieldRule` tables, so a request the
//! client accepts is a request the server accepts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DEFAULT_TOP_N: i64 = 10;
pub const DEFAULT_THRESHOLD: f64 = 0.4;

/// A rejected field: its path in the request and a human-readable reason.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    /// A string of at least `min_chars` characters.
    Text { min_chars: usize },
    /// A whole number, coerced from numeric strings, defaulted when absent.
    Integer { default: i64 },
    /// A finite number, coerced from numeric strings, defaulted when absent.
    Number { default: f64 },
}

#[derive(Debug, Clone, Copy)]
struct FieldRule {
    name: &'static str,
    label: &'static str,
    rule: Rule,
}

const JD_RULES: &[FieldRule] = &[
    FieldRule {
        name: "description",
        label: "Description",
        rule: Rule::Text {
            min_chars: DESCRIPTION_MIN_CHARS,
        },
    },
    FieldRule {
        name: "topN",
        label: "topN",
        rule: Rule::Integer {
            default: DEFAULT_TOP_N,
        },
    },
    FieldRule {
        name: "threshold",
        label: "Threshold",
        rule: Rule::Number {
            default: DEFAULT_THRESHOLD,
        },
    },
];

const JOB_ROLE_RULE: FieldRule = FieldRule {
    name: "jobRole",
    label: "Job role",
    rule: Rule::Text { min_chars: 1 },
};

impl FieldRule {
    /// Checks one raw value and returns its normalized form.
    fn apply(&self, raw: Option<&Value>) -> Result<Value, FieldError> {
        let fail = |message: String| FieldError::new(self.name, message);

        match self.rule {
            Rule::Text { min_chars } => {
                let text = match raw {
                    None | Some(Value::Null) => {
                        return Err(fail(format!("{} is required", self.label)))
                    }
                    Some(Value::String(s)) => s,
                    Some(_) => return Err(fail(format!("{} must be a string", self.label))),
                };
                if text.chars().count() < min_chars {
                    return Err(if min_chars <= 1 {
                        fail(format!("{} is required", self.label))
                    } else {
                        fail(format!(
                            "{} must be at least {min_chars} characters",
                            self.label
                        ))
                    });
                }
                Ok(Value::String(text.clone()))
            }
            Rule::Integer { default } => {
                let Some(n) = self.coerce_number(raw)? else {
                    return Ok(Value::from(default));
                };
                if n.fract() != 0.0 {
                    return Err(fail(format!("{} must be a whole number", self.label)));
                }
                Ok(Value::from(n as i64))
            }
            Rule::Number { default } => {
                let Some(n) = self.coerce_number(raw)? else {
                    return Ok(Value::from(default));
                };
                Ok(Value::from(n))
            }
        }
    }

    /// `None` means "absent", which selects the default.
    fn coerce_number(&self, raw: Option<&Value>) -> Result<Option<f64>, FieldError> {
        let invalid = || FieldError::new(self.name, format!("{} must be a number", self.label));

        let n = match raw {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Number(n)) => n.as_f64().ok_or_else(invalid)?,
            Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
            Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| invalid())?,
            Some(_) => return Err(invalid()),
        };
        if !n.is_finite() {
            return Err(invalid());
        }
        Ok(Some(n))
    }
}

/// Runs every rule in order and stops at the first failing field.
fn apply_rules(rules: &[FieldRule], body: &Value) -> Result<Map<String, Value>, FieldError> {
    let object = body
        .as_object()
        .ok_or_else(|| FieldError::new("body", "Request body must be a JSON object"))?;

    let mut normalized = Map::new();
    for rule in rules {
        let value = rule.apply(object.get(rule.name))?;
        normalized.insert(rule.name.to_string(), value);
    }
    Ok(normalized)
}

/// A validated job-description analysis request, as forwarded to the NLP service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JdAnalysisRequest {
    pub description: String,
    pub top_n: i64,
    pub threshold: f64,
}

impl JdAnalysisRequest {
    /// Validates and normalizes an untyped request body.
    pub fn parse(body: &Value) -> Result<Self, FieldError> {
        let normalized = apply_rules(JD_RULES, body)?;
        serde_json::from_value(Value::Object(normalized))
            .map_err(|e| FieldError::new("body", e.to_string()))
    }

    pub fn new(
        description: impl Into<String>,
        top_n: Option<i64>,
        threshold: Option<f64>,
    ) -> Result<Self, FieldError> {
        let mut body = Map::new();
        body.insert("description".to_string(), Value::String(description.into()));
        if let Some(top_n) = top_n {
            body.insert("topN".to_string(), Value::from(top_n));
        }
        if let Some(threshold) = threshold {
            body.insert("threshold".to_string(), Value::from(threshold));
        }
        Self::parse(&Value::Object(body))
    }
}

/// Validates the `jobRole` field of a résumé screening request.
pub fn validate_job_role(raw: Option<&str>) -> Result<String, FieldError> {
    let raw = raw.map(|s| Value::String(s.to_string()));
    match JOB_ROLE_RULE.apply(raw.as_ref())? {
        Value::String(role) => Ok(role),
        _ => Err(FieldError::new(JOB_ROLE_RULE.name, "Job role must be a string")),
    }
}
