use std::sync::Arc;

use chrono::Utc;

use crate::{
  Error, Result,
  access::{Principal, require, require_own_or_role},
  fanout::generate_submissions,
  id::{AssignmentId, SubmissionId, UserId},
  store::CourseStore,
  submission::{NewSubmission, Submission, SubmissionStatus, SubmissionUpdate},
  user::Role,
};

pub struct SubmissionService<S> {
  store: Arc<S>,
}

impl<S> SubmissionService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }
}

impl<S> SubmissionService<S>
where
  S: CourseStore,
  Error: From<S::Error>,
{
  /// Hand in work on `assignment_id` as the calling student.
  ///
  /// This always creates a new row, even if fan-out already created a
  /// placeholder for the same student.
  pub async fn submit(
    &self,
    principal: &Principal,
    assignment_id: AssignmentId,
    content: String,
  ) -> Result<Submission> {
    require(principal, &[Role::Student], "hand in submissions")?;
    let student_id = principal
      .user_id
      .ok_or_else(|| Error::Forbidden("submissions need an identified student".into()))?;

    if !self.store.assignment_exists(assignment_id).await? {
      return Err(Error::NotFound(format!("assignment {assignment_id} not found")));
    }
    if !self.store.user_exists(student_id).await? {
      return Err(Error::NotFound(format!("user {student_id} not found")));
    }

    let new = NewSubmission::handed_in(assignment_id, student_id, content, Utc::now());
    let submission = self
      .store
      .insert_submissions(vec![new])
      .await?
      .pop()
      .ok_or_else(|| Error::InvalidState("store returned no submission".into()))?;

    tracing::info!(
      submission_id = %submission.submission_id,
      %assignment_id,
      %student_id,
      "submission handed in"
    );
    Ok(submission)
  }

  pub async fn get_by_id(&self, principal: &Principal, id: SubmissionId) -> Result<Submission> {
    require(principal, &[Role::Teacher], "view submissions")?;
    self.find(id).await
  }

  pub async fn list_all(&self, principal: &Principal) -> Result<Vec<Submission>> {
    require(principal, &[Role::Teacher], "list submissions")?;
    Ok(self.store.list_submissions().await?)
  }

  pub async fn list_for_assignment(
    &self,
    principal: &Principal,
    assignment_id: AssignmentId,
  ) -> Result<Vec<Submission>> {
    require(principal, &[Role::Teacher], "list submissions")?;
    Ok(self.store.submissions_for_assignment(assignment_id).await?)
  }

  /// A student's own submissions; teachers may view anyone's.
  pub async fn list_for_student(
    &self,
    principal: &Principal,
    student_id: UserId,
  ) -> Result<Vec<Submission>> {
    require_own_or_role(principal, student_id, &[Role::Teacher], "list submissions")?;
    Ok(self.store.submissions_for_student(student_id).await?)
  }

  /// Delete a submission. Students may delete their own; teachers may not
  /// delete any.
  pub async fn delete_by_id(&self, principal: &Principal, id: SubmissionId) -> Result<()> {
    require(principal, &[Role::Student], "delete submissions")?;
    let submission = self.find(id).await?;
    require_own_or_role(
      principal,
      submission.student_id,
      &[Role::Admin],
      "delete this submission",
    )?;
    self.store.delete_submissions(vec![id]).await?;
    Ok(())
  }

  /// Set the status. Any status may follow any other.
  pub async fn set_status(
    &self,
    principal: &Principal,
    id: SubmissionId,
    status: SubmissionStatus,
  ) -> Result<Submission> {
    require(principal, &[Role::Teacher], "change submission status")?;
    self.update(id, SubmissionUpdate::Status(status)).await
  }

  /// Set the grade. No range is enforced, but NaN is refused since no
  /// store can hold it.
  pub async fn set_grade(
    &self,
    principal: &Principal,
    id: SubmissionId,
    grade: f64,
  ) -> Result<Submission> {
    require(principal, &[Role::Teacher], "grade submissions")?;
    if grade.is_nan() {
      return Err(Error::InvalidState("a grade must be a number, not NaN".into()));
    }
    self.update(id, SubmissionUpdate::Grade(grade)).await
  }

  /// Run fan-out again for an existing assignment against its current
  /// roster. Students who already have a submission receive another one.
  pub async fn generate_submissions(
    &self,
    principal: &Principal,
    assignment_id: AssignmentId,
  ) -> Result<Vec<Submission>> {
    require(principal, &[Role::Teacher], "generate submissions")?;
    let assignment = self
      .store
      .get_assignment(assignment_id)
      .await?
      .ok_or_else(|| Error::NotFound(format!("assignment {assignment_id} not found")))?;

    let roster = self.store.course_roster(assignment.course_id).await?;
    let batch = generate_submissions(&assignment, roster.as_deref(), Utc::now())?;
    Ok(self.store.insert_submissions(batch).await?)
  }

  async fn update(&self, id: SubmissionId, update: SubmissionUpdate) -> Result<Submission> {
    let updated = self
      .store
      .update_submission(id, update)
      .await?
      .ok_or_else(|| Error::NotFound(format!("submission {id} not found")))?;
    tracing::debug!(submission_id = %id, ?update, "submission updated");
    Ok(updated)
  }

  async fn find(&self, id: SubmissionId) -> Result<Submission> {
    self
      .store
      .get_submission(id)
      .await?
      .ok_or_else(|| Error::NotFound(format!("submission {id} not found")))
  }
}
