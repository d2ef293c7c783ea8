//! Session domain model.
//!
//! This module contains the core Session entity: one anonymous user's
//! attempt at the tutorial and the results collected so far.

use crate::result::{TaskId, TaskResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents one tutorial session in the domain layer.
///
/// This is the "pure" domain model the store operates on, independent of any
/// storage format or schema version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque unique session identifier
    pub id: String,
    /// When the first result of this session was saved
    pub created_at: DateTime<Utc>,
    /// Task results in insertion order, at most one per task id
    pub results: Vec<TaskResult>,
}

impl Session {
    /// Creates an empty session stamped with the current time.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            results: Vec::new(),
        }
    }

    /// Looks up the result for a task.
    pub fn result(&self, task_id: TaskId) -> Option<&TaskResult> {
        self.results.iter().find(|r| r.task_id == task_id)
    }

    /// Inserts a result, replacing any earlier result for the same task.
    ///
    /// A replaced result keeps its position in the collection. Returns the
    /// result that was replaced, if any.
    pub fn upsert_result(&mut self, result: TaskResult) -> Option<TaskResult> {
        match self
            .results
            .iter_mut()
            .find(|existing| existing.task_id == result.task_id)
        {
            Some(existing) => Some(std::mem::replace(existing, result)),
            None => {
                self.results.push(result);
                None
            }
        }
    }

    /// Results ordered by task id, as they are presented.
    pub fn sorted_results(&self) -> Vec<&TaskResult> {
        let mut sorted: Vec<&TaskResult> = self.results.iter().collect();
        sorted.sort_by_key(|r| r.task_id);
        sorted
    }
}
