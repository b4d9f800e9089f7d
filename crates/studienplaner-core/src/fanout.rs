//! Submission fan-out: one placeholder submission per enrolled student.
//!
//! The engine is pure. The store calls it from inside the same atomic unit
//! that persists the new assignment (see
//! [`CourseStore::create_assignment`](crate::store::CourseStore::create_assignment)),
//! so either the assignment and its whole batch are stored, or neither is.

use chrono::{DateTime, Utc};

use crate::{Error, Result, assignment::Assignment, submission::NewSubmission, user::User};

/// Derive the submission batch for `assignment` from its course roster.
///
/// - `roster == None` means the store could not tell who is enrolled; this is
///   [`Error::InvalidState`], not an empty batch.
/// - Only [`Role::Student`](crate::user::Role::Student) entries receive a
///   submission. A student enrolled twice receives two.
/// - The order of the batch follows the roster and carries no meaning.
pub fn generate_submissions(
  assignment: &Assignment,
  roster: Option<&[User]>,
  now: DateTime<Utc>,
) -> Result<Vec<NewSubmission>> {
  let roster = roster.ok_or_else(|| {
    Error::InvalidState(format!(
      "student set of course {} is unavailable for assignment {}",
      assignment.course_id, assignment.assignment_id
    ))
  })?;

  let batch: Vec<NewSubmission> = roster
    .iter()
    .filter(|user| user.is_student())
    .map(|student| NewSubmission::placeholder(assignment.assignment_id, student.user_id, now))
    .collect();

  tracing::info!(
    assignment_id = %assignment.assignment_id,
    course_id = %assignment.course_id,
    enrolled = roster.len(),
    generated = batch.len(),
    "fan-out generated submissions"
  );

  Ok(batch)
}
