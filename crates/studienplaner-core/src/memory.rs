//! [`MemoryStore`], an in-process [`CourseStore`] for tests and demos.
//!
//! All state sits behind one mutex, so every call (including the
//! read-then-write sequences of enrollment and fan-out) is atomic with
//! respect to the others.

use std::{
  collections::BTreeMap,
  sync::{Mutex, MutexGuard},
};

use crate::{
  Error, Result,
  assignment::{Assignment, NewAssignment},
  course::{Course, NewCourse},
  enrollment::EnrollmentIndex,
  id::{AssignmentId, CourseId, SubmissionId, UserId},
  store::CourseStore,
  submission::{NewSubmission, Submission, SubmissionUpdate},
  user::{NewUser, Role, User},
};

#[derive(Default)]
struct State {
  last_id:     i64,
  users:       BTreeMap<UserId, User>,
  courses:     BTreeMap<CourseId, Course>,
  assignments: BTreeMap<AssignmentId, Assignment>,
  submissions: BTreeMap<SubmissionId, Submission>,
  enrollments: EnrollmentIndex,
}

impl State {
  fn next_id(&mut self) -> i64 {
    self.last_id += 1;
    self.last_id
  }

  fn roster(&self, course_id: CourseId) -> Option<Vec<User>> {
    let ids = self.enrollments.roster_of(course_id)?;
    Some(ids.iter().filter_map(|id| self.users.get(id).cloned()).collect())
  }

  fn insert_batch(&mut self, batch: Vec<NewSubmission>) -> Vec<Submission> {
    batch
      .into_iter()
      .map(|new| {
        let submission = Submission {
          submission_id: SubmissionId(self.next_id()),
          assignment_id: new.assignment_id,
          student_id:    new.student_id,
          submitted_at:  new.submitted_at,
          content:       new.content,
          status:        new.status,
          grade:         new.grade,
        };
        self.submissions.insert(submission.submission_id, submission.clone());
        submission
      })
      .collect()
  }
}

#[derive(Default)]
pub struct MemoryStore {
  state: Mutex<State>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn state(&self) -> Result<MutexGuard<'_, State>> {
    self
      .state
      .lock()
      .map_err(|_| Error::Store("memory store lock poisoned".into()))
  }

  /// Forget a course's roster while keeping the course, leaving the store in
  /// the state where the enrolled-student set is unknown.
  #[cfg(test)]
  pub(crate) fn forget_roster(&self, course_id: CourseId) {
    if let Ok(mut state) = self.state() {
      state.enrollments.remove_course(course_id);
    }
  }
}

impl CourseStore for MemoryStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn insert_user(&self, input: NewUser) -> Result<User> {
    let mut state = self.state()?;
    if state.users.values().any(|u| u.email == input.email) {
      return Err(Error::Conflict(format!("email {} is already registered", input.email)));
    }
    let user = User {
      user_id:       UserId(state.next_id()),
      name:          input.name,
      surname:       input.surname,
      role:          input.role,
      email:         input.email,
      password_hash: input.password_hash,
    };
    state.users.insert(user.user_id, user.clone());
    Ok(user)
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    Ok(self.state()?.users.get(&id).cloned())
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    Ok(self.state()?.users.values().cloned().collect())
  }

  async fn user_exists(&self, id: UserId) -> Result<bool> {
    Ok(self.state()?.users.contains_key(&id))
  }

  async fn find_user_by_email<'a>(&'a self, email: &'a str) -> Result<Option<User>> {
    Ok(self.state()?.users.values().find(|u| u.email == email).cloned())
  }

  async fn find_users_by_role(&self, role: Role) -> Result<Vec<User>> {
    Ok(
      self
        .state()?
        .users
        .values()
        .filter(|u| u.role == role)
        .cloned()
        .collect(),
    )
  }

  async fn delete_user(&self, id: UserId) -> Result<bool> {
    let mut state = self.state()?;
    if state.users.remove(&id).is_none() {
      return Ok(false);
    }
    state.enrollments.remove_user(id);
    for course in state.courses.values_mut() {
      if course.tutor_id == Some(id) {
        course.tutor_id = None;
      }
    }
    Ok(true)
  }

  // ── Courses & enrollment ──────────────────────────────────────────────────

  async fn insert_course(&self, input: NewCourse) -> Result<Course> {
    let mut state = self.state()?;
    let course = Course {
      course_id:   CourseId(state.next_id()),
      title:       input.title,
      description: input.description,
      ects:        input.ects,
      tutor_id:    input.tutor_id,
    };
    state.courses.insert(course.course_id, course.clone());
    state.enrollments.register_course(course.course_id);
    Ok(course)
  }

  async fn get_course(&self, id: CourseId) -> Result<Option<Course>> {
    Ok(self.state()?.courses.get(&id).cloned())
  }

  async fn list_courses(&self) -> Result<Vec<Course>> {
    Ok(self.state()?.courses.values().cloned().collect())
  }

  async fn course_exists(&self, id: CourseId) -> Result<bool> {
    Ok(self.state()?.courses.contains_key(&id))
  }

  async fn delete_course(&self, id: CourseId) -> Result<bool> {
    let mut state = self.state()?;
    if state.courses.remove(&id).is_none() {
      return Ok(false);
    }
    state.enrollments.remove_course(id);
    Ok(true)
  }

  async fn assignments_for_course(&self, id: CourseId) -> Result<Vec<Assignment>> {
    Ok(
      self
        .state()?
        .assignments
        .values()
        .filter(|a| a.course_id == id)
        .cloned()
        .collect(),
    )
  }

  async fn course_roster(&self, id: CourseId) -> Result<Option<Vec<User>>> {
    Ok(self.state()?.roster(id))
  }

  async fn courses_for_user(&self, id: UserId) -> Result<Vec<Course>> {
    let state = self.state()?;
    Ok(
      state
        .enrollments
        .courses_of(id)
        .iter()
        .filter_map(|c| state.courses.get(c).cloned())
        .collect(),
    )
  }

  async fn enroll(&self, user_id: UserId, course_id: CourseId) -> Result<()> {
    self.state()?.enrollments.enroll(user_id, course_id);
    Ok(())
  }

  // ── Assignments ───────────────────────────────────────────────────────────

  async fn create_assignment<F>(
    &self,
    input: NewAssignment,
    fan_out: F,
  ) -> Result<(Assignment, Vec<Submission>)>
  where
    F: FnOnce(&Assignment, Option<&[User]>) -> Result<Vec<NewSubmission>> + Send + 'static,
  {
    let mut state = self.state()?;
    let assignment = Assignment {
      assignment_id: AssignmentId(state.next_id()),
      title:         input.title,
      description:   input.description,
      kind:          input.kind,
      deadline:      input.deadline,
      course_id:     input.course_id,
    };

    // Rows are written only once the batch is known; a failing fan-out
    // stores nothing.
    let roster = state.roster(assignment.course_id);
    let batch = fan_out(&assignment, roster.as_deref())?;

    state.assignments.insert(assignment.assignment_id, assignment.clone());
    let submissions = state.insert_batch(batch);
    Ok((assignment, submissions))
  }

  async fn get_assignment(&self, id: AssignmentId) -> Result<Option<Assignment>> {
    Ok(self.state()?.assignments.get(&id).cloned())
  }

  async fn list_assignments(&self) -> Result<Vec<Assignment>> {
    Ok(self.state()?.assignments.values().cloned().collect())
  }

  async fn assignment_exists(&self, id: AssignmentId) -> Result<bool> {
    Ok(self.state()?.assignments.contains_key(&id))
  }

  async fn delete_assignment(&self, id: AssignmentId) -> Result<bool> {
    Ok(self.state()?.assignments.remove(&id).is_some())
  }

  // ── Submissions ───────────────────────────────────────────────────────────

  async fn insert_submissions(&self, batch: Vec<NewSubmission>) -> Result<Vec<Submission>> {
    Ok(self.state()?.insert_batch(batch))
  }

  async fn get_submission(&self, id: SubmissionId) -> Result<Option<Submission>> {
    Ok(self.state()?.submissions.get(&id).cloned())
  }

  async fn list_submissions(&self) -> Result<Vec<Submission>> {
    Ok(self.state()?.submissions.values().cloned().collect())
  }

  async fn submission_exists(&self, id: SubmissionId) -> Result<bool> {
    Ok(self.state()?.submissions.contains_key(&id))
  }

  async fn submissions_for_assignment(&self, id: AssignmentId) -> Result<Vec<Submission>> {
    Ok(
      self
        .state()?
        .submissions
        .values()
        .filter(|s| s.assignment_id == id)
        .cloned()
        .collect(),
    )
  }

  async fn submissions_for_student(&self, id: UserId) -> Result<Vec<Submission>> {
    Ok(
      self
        .state()?
        .submissions
        .values()
        .filter(|s| s.student_id == id)
        .cloned()
        .collect(),
    )
  }

  async fn update_submission(
    &self,
    id: SubmissionId,
    update: SubmissionUpdate,
  ) -> Result<Option<Submission>> {
    let mut state = self.state()?;
    Ok(state.submissions.get_mut(&id).map(|s| {
      s.apply(update);
      s.clone()
    }))
  }

  async fn delete_submissions(&self, ids: Vec<SubmissionId>) -> Result<usize> {
    let mut state = self.state()?;
    let mut removed = 0;
    for id in ids {
      if state.submissions.remove(&id).is_some() {
        removed += 1;
      }
    }
    Ok(removed)
  }
}
