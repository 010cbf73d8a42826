//! Strongly-typed query predicates.
//!
//! Filters are equality clauses over a per-table field enum, AND-composed.
//! The store never accepts caller-supplied SQL text; values always travel
//! as bound parameters.

use rusqlite::types::Value;

/// A column of a queryable table.
pub trait Field: Copy {
    fn column(self) -> &'static str;
}

/// A filter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Text(String),
    Int(i64),
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Text(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Text(value)
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Arg::Int(value)
    }
}

/// An AND-composed conjunction of equality clauses.
#[derive(Debug, Clone)]
pub struct Predicate<F: Field> {
    clauses: Vec<(F, Arg)>,
}

impl<F: Field> Predicate<F> {
    /// The empty predicate: matches every row.
    pub fn any() -> Self {
        Self { clauses: Vec::new() }
    }

    pub fn eq(mut self, field: F, value: impl Into<Arg>) -> Self {
        self.clauses.push((field, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Human-readable form used in NotUnique error messages.
    pub fn describe(&self) -> String {
        if self.clauses.is_empty() {
            return "<all rows>".to_string();
        }
        self.clauses
            .iter()
            .map(|(field, arg)| match arg {
                Arg::Text(text) => format!("{}={}", field.column(), text),
                Arg::Int(int) => format!("{}={}", field.column(), int),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `WHERE`-clause text with positional placeholders; empty string when
    /// the predicate matches everything.
    pub(crate) fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            return String::new();
        }
        let clauses: Vec<String> = self
            .clauses
            .iter()
            .enumerate()
            .map(|(i, (field, _))| format!("{} = ?{}", field.column(), i + 1))
            .collect();
        format!(" WHERE {}", clauses.join(" AND "))
    }

    pub(crate) fn params(&self) -> Vec<Value> {
        self.clauses
            .iter()
            .map(|(_, arg)| match arg {
                Arg::Text(text) => Value::Text(text.clone()),
                Arg::Int(int) => Value::Integer(*int),
            })
            .collect()
    }
}

/// Queryable columns of the session table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionField {
    Id,
    Name,
    WorkflowName,
    UserName,
    Status,
}

impl Field for SessionField {
    fn column(self) -> &'static str {
        match self {
            SessionField::Id => "id",
            SessionField::Name => "name",
            SessionField::WorkflowName => "workflow_name",
            SessionField::UserName => "user_name",
            SessionField::Status => "status",
        }
    }
}

/// Queryable columns of the service table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceField {
    Id,
    SessionId,
    Name,
    Status,
    Jobid,
}

impl Field for ServiceField {
    fn column(self) -> &'static str {
        match self {
            ServiceField::Id => "id",
            ServiceField::SessionId => "session_id",
            ServiceField::Name => "name",
            ServiceField::Status => "status",
            ServiceField::Jobid => "jobid",
        }
    }
}

/// Queryable columns of the step-description table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDescriptionField {
    Id,
    SessionId,
    Name,
    ServiceId,
}

impl Field for StepDescriptionField {
    fn column(self) -> &'static str {
        match self {
            StepDescriptionField::Id => "id",
            StepDescriptionField::SessionId => "session_id",
            StepDescriptionField::Name => "name",
            StepDescriptionField::ServiceId => "service_id",
        }
    }
}

/// Queryable columns of the step table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepField {
    Id,
    StepDescriptionId,
    InstanceName,
    Jobid,
}

impl Field for StepField {
    fn column(self) -> &'static str {
        match self {
            StepField::Id => "id",
            StepField::StepDescriptionId => "step_description_id",
            StepField::InstanceName => "instance_name",
            StepField::Jobid => "jobid",
        }
    }
}
