//! # Join Module
//!
//! Relationship configuration between profiled tables, the heuristic
//! suggester that proposes it, and the engine that executes it into one
//! flattened dataset.
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub mod engine;
pub mod suggest;

/// Errors raised while executing a data model.
#[derive(Error, Debug, PartialEq)]
pub enum JoinError {
    /// The model's base table is not in the table collection
    #[error("Base table '{id}' not found")]
    MissingBaseTable { id: String },
}

/// How unmatched left rows are treated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinType {
    /// Keep unmatched rows with nulls for the right columns
    #[default]
    Left,
    /// Drop unmatched rows
    Inner,
}

impl JoinType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            JoinType::Left => "LEFT",
            JoinType::Inner => "INNER",
        }
    }
}

/// One join step: match `left_column` of the accumulated rows against
/// `right_column` of the table `right_table_id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinConfig {
    pub id: String,
    pub right_table_id: String,
    pub left_column: String,
    pub right_column: String,
    #[serde(default)]
    pub join_type: JoinType,
}

impl JoinConfig {
    /// Creates a join step with a fresh identifier.
    pub fn new(
        right_table_id: impl Into<String>,
        left_column: impl Into<String>,
        right_column: impl Into<String>,
        join_type: JoinType,
    ) -> Self {
        JoinConfig {
            id: Uuid::new_v4().to_string(),
            right_table_id: right_table_id.into(),
            left_column: left_column.into(),
            right_column: right_column.into(),
            join_type,
        }
    }
}

/// A base table and the joins applied to it, in order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataModel {
    pub base_table_id: String,
    #[serde(default)]
    pub joins: Vec<JoinConfig>,
}

impl DataModel {
    pub fn new(base_table_id: impl Into<String>, joins: Vec<JoinConfig>) -> Self {
        DataModel {
            base_table_id: base_table_id.into(),
            joins,
        }
    }
}
