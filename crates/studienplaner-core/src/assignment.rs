//! Assignments: work set on a course. Creating one triggers fan-out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{AssignmentId, CourseId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentKind {
  Homework,
  Project,
  Exam,
  Test,
  Presentation,
  Essay,
  Lab,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
  pub assignment_id: AssignmentId,
  pub title:         String,
  pub description:   String,
  #[serde(rename = "type")]
  pub kind:          AssignmentKind,
  pub deadline:      DateTime<Utc>,
  /// The owning course. Exactly one.
  pub course_id:     CourseId,
}

/// Input to [`crate::store::CourseStore::create_assignment`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewAssignment {
  pub title:       String,
  pub description: String,
  #[serde(rename = "type")]
  pub kind:        AssignmentKind,
  pub deadline:    DateTime<Utc>,
  pub course_id:   CourseId,
}
