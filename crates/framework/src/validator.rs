//! Schema validation over a request context.
//!
//! All four sections are checked independently and their errors merged into a
//! single ordered list; validation never stops at the first failure. The
//! checker itself failing (a malformed or unsupported schema) is reported as
//! an `unknown_error` instead of being propagated.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::context::Context;
use crate::schema::{CtxSchema, FieldSpec, FieldType, Shape};

/// Nesting limit for body shapes; exceeding it is a schema defect, not a
/// request defect.
pub const MAX_SCHEMA_DEPTH: usize = 32;

/// Request section a validation error belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Body,
    Params,
    Query,
    Headers,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Section::Body => "body",
            Section::Params => "params",
            Section::Query => "query",
            Section::Headers => "headers",
        };
        f.write_str(name)
    }
}

/// A single field-level failure. Serialized as `{"type", "path", "message"}`
/// in the 400 response body.
#[derive(Clone, Debug, Serialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub section: Section,
    pub path: String,
    pub message: String,
}

/// Overall outcome description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Description {
    Success,
    InvalidRequest,
    UnknownError,
}

/// Result of validating one request against one route schema. Computed once
/// per request and never persisted.
#[derive(Clone, Debug)]
pub struct ValidationReport {
    pub failed: bool,
    pub description: Description,
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn success() -> Self {
        Self { failed: false, description: Description::Success, errors: Vec::new() }
    }

    pub fn invalid(errors: Vec<FieldError>) -> Self {
        Self { failed: true, description: Description::InvalidRequest, errors }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
struct SchemaError {
    section: Section,
    message: String,
}

/// Validate a context against a route schema. Pure; the only output is the
/// returned report.
pub fn validate(ctx: &Context, schema: &CtxSchema) -> ValidationReport {
    match try_validate(ctx, schema) {
        Ok(errors) if errors.is_empty() => ValidationReport::success(),
        Ok(errors) => ValidationReport::invalid(errors),
        Err(e) => ValidationReport {
            failed: true,
            description: Description::UnknownError,
            errors: vec![FieldError {
                section: e.section,
                path: String::new(),
                message: e.message,
            }],
        },
    }
}

fn try_validate(ctx: &Context, schema: &CtxSchema) -> Result<Vec<FieldError>, SchemaError> {
    let mut errors = Vec::new();
    if let Some(shape) = &schema.body {
        check_body(&ctx.body, shape, &mut errors)?;
    }
    if let Some(shape) = &schema.params {
        check_string_map(Section::Params, &ctx.params, shape, &mut errors)?;
    }
    if let Some(shape) = &schema.query {
        check_string_map(Section::Query, &ctx.query, shape, &mut errors)?;
    }
    if let Some(shape) = &schema.headers {
        check_string_map(Section::Headers, &ctx.headers, shape, &mut errors)?;
    }
    Ok(errors)
}

fn check_body(
    body: &Value,
    shape: &Shape,
    errors: &mut Vec<FieldError>,
) -> Result<(), SchemaError> {
    match body.as_object() {
        Some(obj) => check_object(Section::Body, "", 0, obj, shape, errors),
        None => {
            errors.push(FieldError {
                section: Section::Body,
                path: String::new(),
                message: "expected object".to_string(),
            });
            Ok(())
        }
    }
}

fn check_object(
    section: Section,
    path: &str,
    depth: usize,
    obj: &serde_json::Map<String, Value>,
    shape: &Shape,
    errors: &mut Vec<FieldError>,
) -> Result<(), SchemaError> {
    if depth > MAX_SCHEMA_DEPTH {
        return Err(SchemaError {
            section,
            message: format!("schema nesting exceeds supported depth of {}", MAX_SCHEMA_DEPTH),
        });
    }
    for field in &shape.fields {
        let child_path = format!("{}/{}", path, field.name);
        match obj.get(&field.name) {
            Some(value) => check_value(section, &child_path, depth, value, &field.ty, errors)?,
            None if field.required => errors.push(FieldError {
                section,
                path: child_path,
                message: "required property".to_string(),
            }),
            None => {}
        }
    }
    Ok(())
}

fn check_value(
    section: Section,
    path: &str,
    depth: usize,
    value: &Value,
    ty: &FieldType,
    errors: &mut Vec<FieldError>,
) -> Result<(), SchemaError> {
    let matches = match ty {
        FieldType::String => value.is_string(),
        FieldType::Number => value.is_number(),
        FieldType::Integer => value.is_i64() || value.is_u64(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Array(inner) => match value.as_array() {
            Some(items) => {
                for (idx, item) in items.iter().enumerate() {
                    let item_path = format!("{}/{}", path, idx);
                    check_value(section, &item_path, depth + 1, item, inner, errors)?;
                }
                return Ok(());
            }
            None => false,
        },
        FieldType::Object(shape) => match value.as_object() {
            Some(obj) => {
                return check_object(section, path, depth + 1, obj, shape, errors);
            }
            None => false,
        },
    };
    if !matches {
        errors.push(FieldError {
            section,
            path: path.to_string(),
            message: format!("expected {}", ty.expected()),
        });
    }
    Ok(())
}

/// Params, query and headers carry string values only; scalar types are
/// accepted when the string parses as that type.
fn check_string_map(
    section: Section,
    map: &HashMap<String, String>,
    shape: &Shape,
    errors: &mut Vec<FieldError>,
) -> Result<(), SchemaError> {
    for field in &shape.fields {
        let child_path = format!("/{}", field.name);
        match map.get(&field.name) {
            Some(value) => check_string_scalar(section, &child_path, value, field, errors)?,
            None if field.required => errors.push(FieldError {
                section,
                path: child_path,
                message: "required property".to_string(),
            }),
            None => {}
        }
    }
    Ok(())
}

fn check_string_scalar(
    section: Section,
    path: &str,
    value: &str,
    field: &FieldSpec,
    errors: &mut Vec<FieldError>,
) -> Result<(), SchemaError> {
    let matches = match &field.ty {
        FieldType::String => true,
        FieldType::Number => value.parse::<f64>().is_ok(),
        FieldType::Integer => value.parse::<i64>().is_ok(),
        FieldType::Boolean => matches!(value, "true" | "false"),
        FieldType::Array(_) | FieldType::Object(_) => {
            return Err(SchemaError {
                section,
                message: format!(
                    "unsupported {} shape for string-valued section",
                    field.ty.expected()
                ),
            });
        }
    };
    if !matches {
        errors.push(FieldError {
            section,
            path: path.to_string(),
            message: format!("expected {}", field.ty.expected()),
        });
    }
    Ok(())
}
