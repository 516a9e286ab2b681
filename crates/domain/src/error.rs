//! Caller-correctable error types.

use common::ProductId;
use thiserror::Error;

/// A single field-level rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Path of the offending field, e.g. `order_items[1].quantity`.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Malformed or incomplete input. Lists every violation found, in rule order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", format_violations(.violations))]
pub struct ValidationError {
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    /// Returns all violations in the order the rules were evaluated.
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Returns true if `field` has at least one violation.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The order references an entity another service does not know about.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// The owning user does not exist in the identity service.
    #[error("Invalid User ID")]
    UnknownUser,

    /// One or more products do not exist in the catalog service.
    #[error("Invalid Product IDs: {}", join_ids(.0))]
    UnknownProducts(Vec<ProductId>),
}

fn join_ids(ids: &[ProductId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
