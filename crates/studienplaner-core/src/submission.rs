//! Submissions: one student's work on one assignment.
//!
//! Submissions are created either in bulk by fan-out (no content, status
//! [`SubmissionStatus::NotSubmitted`]) or individually when a student hands
//! in work. The two paths are not merged, so a (assignment, student) pair may
//! have more than one submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{AssignmentId, SubmissionId, UserId};

/// Progress of a submission. Any value may follow any other.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
  #[default]
  NotSubmitted,
  Submitted,
  Reviewed,
  Graded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
  pub submission_id: SubmissionId,
  pub assignment_id: AssignmentId,
  pub student_id:    UserId,
  pub submitted_at:  DateTime<Utc>,
  pub content:       Option<String>,
  pub status:        SubmissionStatus,
  /// No range is enforced here.
  pub grade:         Option<f64>,
}

/// Input to [`crate::store::CourseStore::insert_submissions`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
  pub assignment_id: AssignmentId,
  pub student_id:    UserId,
  pub submitted_at:  DateTime<Utc>,
  pub content:       Option<String>,
  pub status:        SubmissionStatus,
  pub grade:         Option<f64>,
}

impl NewSubmission {
  /// An empty placeholder as produced by fan-out.
  pub fn placeholder(
    assignment_id: AssignmentId,
    student_id: UserId,
    submitted_at: DateTime<Utc>,
  ) -> Self {
    Self {
      assignment_id,
      student_id,
      submitted_at,
      content: None,
      status: SubmissionStatus::NotSubmitted,
      grade: None,
    }
  }

  /// Work handed in directly by a student.
  pub fn handed_in(
    assignment_id: AssignmentId,
    student_id: UserId,
    content: String,
    submitted_at: DateTime<Utc>,
  ) -> Self {
    Self {
      assignment_id,
      student_id,
      submitted_at,
      content: Some(content),
      status: SubmissionStatus::Submitted,
      grade: None,
    }
  }
}

/// A partial update applied by [`crate::store::CourseStore::update_submission`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubmissionUpdate {
  Status(SubmissionStatus),
  Grade(f64),
}

impl Submission {
  pub fn apply(&mut self, update: SubmissionUpdate) {
    match update {
      SubmissionUpdate::Status(status) => self.status = status,
      SubmissionUpdate::Grade(grade) => self.grade = Some(grade),
    }
  }
}
