use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::{
  Error, Result,
  access::{Principal, require},
  assignment::{Assignment, NewAssignment},
  fanout::generate_submissions,
  id::AssignmentId,
  store::CourseStore,
  submission::Submission,
  user::Role,
};

/// A newly created assignment and the submissions fan-out produced for it.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedAssignment {
  #[serde(flatten)]
  pub assignment:  Assignment,
  pub submissions: Vec<Submission>,
}

pub struct AssignmentService<S> {
  store: Arc<S>,
}

impl<S> AssignmentService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }
}

impl<S> AssignmentService<S>
where
  S: CourseStore,
  Error: From<S::Error>,
{
  /// Create an assignment on an existing course and fan out one submission
  /// per enrolled student, atomically.
  pub async fn create(
    &self,
    principal: &Principal,
    input: NewAssignment,
  ) -> Result<PublishedAssignment> {
    require(principal, &[Role::Teacher], "create assignments")?;

    if !self.store.course_exists(input.course_id).await? {
      return Err(Error::NotFound(format!("course {} not found", input.course_id)));
    }

    let (assignment, submissions) = self
      .store
      .create_assignment(input, |assignment, roster| {
        generate_submissions(assignment, roster, Utc::now())
      })
      .await?;

    tracing::info!(
      assignment_id = %assignment.assignment_id,
      course_id = %assignment.course_id,
      submissions = submissions.len(),
      "assignment published"
    );
    Ok(PublishedAssignment { assignment, submissions })
  }

  pub async fn get_by_id(&self, principal: &Principal, id: AssignmentId) -> Result<Assignment> {
    require(principal, &[Role::Teacher, Role::Student], "view assignments")?;
    self
      .store
      .get_assignment(id)
      .await?
      .ok_or_else(|| Error::NotFound(format!("assignment {id} not found")))
  }

  pub async fn list_all(&self, principal: &Principal) -> Result<Vec<Assignment>> {
    require(principal, &[Role::Teacher, Role::Student], "list assignments")?;
    Ok(self.store.list_assignments().await?)
  }

  /// Delete an assignment together with its submissions.
  pub async fn delete_by_id(&self, principal: &Principal, id: AssignmentId) -> Result<()> {
    require(principal, &[Role::Teacher], "delete assignments")?;
    if !self.store.assignment_exists(id).await? {
      return Err(Error::NotFound(format!("assignment {id} not found")));
    }
    let removed = delete_assignment_cascade(self.store.as_ref(), id).await?;
    tracing::info!(assignment_id = %id, submissions = removed, "assignment deleted");
    Ok(())
  }
}

/// Delete the submissions of `id`, then `id` itself. Returns the number of
/// submissions removed.
pub(super) async fn delete_assignment_cascade<S>(store: &S, id: AssignmentId) -> Result<usize>
where
  S: CourseStore,
  Error: From<S::Error>,
{
  let ids: Vec<_> = store
    .submissions_for_assignment(id)
    .await?
    .into_iter()
    .map(|s| s.submission_id)
    .collect();
  let removed = store.delete_submissions(ids).await?;
  store.delete_assignment(id).await?;
  Ok(removed)
}
