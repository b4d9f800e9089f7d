use std::sync::Arc;

use crate::{
  Error, Result,
  access::{Principal, require},
  assignment::Assignment,
  course::{Course, NewCourse},
  id::CourseId,
  store::CourseStore,
  user::{Role, User},
};

use super::assignments::delete_assignment_cascade;

pub struct CourseService<S> {
  store: Arc<S>,
}

impl<S> CourseService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }
}

impl<S> CourseService<S>
where
  S: CourseStore,
  Error: From<S::Error>,
{
  /// Create a course. A named tutor must exist.
  pub async fn create(&self, principal: &Principal, input: NewCourse) -> Result<Course> {
    require(principal, &[Role::Teacher], "create courses")?;

    if let Some(tutor_id) = input.tutor_id
      && !self.store.user_exists(tutor_id).await?
    {
      return Err(Error::NotFound(format!("tutor {tutor_id} not found")));
    }

    let course = self.store.insert_course(input).await?;
    tracing::info!(course_id = %course.course_id, title = %course.title, "course created");
    Ok(course)
  }

  pub async fn get_by_id(&self, principal: &Principal, id: CourseId) -> Result<Course> {
    require(principal, &[], "view courses")?;
    self.find(id).await
  }

  pub async fn list_all(&self, principal: &Principal) -> Result<Vec<Course>> {
    require(principal, &[], "list courses")?;
    Ok(self.store.list_courses().await?)
  }

  pub async fn get_assignments(
    &self,
    principal: &Principal,
    id: CourseId,
  ) -> Result<Vec<Assignment>> {
    require(principal, &[], "view course assignments")?;
    self.find(id).await?;
    Ok(self.store.assignments_for_course(id).await?)
  }

  /// Everyone enrolled in the course, whatever their role, one entry per
  /// enrollment.
  pub async fn get_students(&self, principal: &Principal, id: CourseId) -> Result<Vec<User>> {
    require(principal, &[], "view course students")?;
    self.find(id).await?;
    self
      .store
      .course_roster(id)
      .await?
      .ok_or_else(|| Error::InvalidState(format!("student set of course {id} is unavailable")))
  }

  /// Delete a course together with its assignments and their submissions.
  pub async fn delete_by_id(&self, principal: &Principal, id: CourseId) -> Result<()> {
    require(principal, &[Role::Teacher], "delete courses")?;
    self.find(id).await?;

    let assignments = self.store.assignments_for_course(id).await?;
    let mut removed_submissions = 0;
    for assignment in &assignments {
      removed_submissions +=
        delete_assignment_cascade(self.store.as_ref(), assignment.assignment_id).await?;
    }

    if !self.store.delete_course(id).await? {
      return Err(Error::NotFound(format!("course {id} not found")));
    }

    tracing::info!(
      course_id = %id,
      assignments = assignments.len(),
      submissions = removed_submissions,
      "course deleted"
    );
    Ok(())
  }

  async fn find(&self, id: CourseId) -> Result<Course> {
    self
      .store
      .get_course(id)
      .await?
      .ok_or_else(|| Error::NotFound(format!("course {id} not found")))
  }
}
