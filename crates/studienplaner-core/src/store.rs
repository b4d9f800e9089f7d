//! The `CourseStore` trait, the persistence collaborator the services need.
//!
//! The trait is implemented by storage backends (e.g.
//! `studienplaner-store-sqlite`, or [`MemoryStore`](crate::memory::MemoryStore)).
//! "Find" methods return `None` or an empty list when nothing matches; turning
//! absence into [`Error::NotFound`](crate::Error::NotFound) is the services'
//! job.

use std::future::Future;

use crate::{
  assignment::{Assignment, NewAssignment},
  course::{Course, NewCourse},
  id::{AssignmentId, CourseId, SubmissionId, UserId},
  submission::{NewSubmission, Submission, SubmissionUpdate},
  user::{NewUser, Role, User},
};

/// Abstraction over a course/assignment/submission store backend.
///
/// Implementations provide their own mutual exclusion: each method is atomic
/// with respect to other calls on the same store, and
/// [`create_assignment`](Self::create_assignment) is atomic as a whole.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CourseStore: Send + Sync {
  /// Backend error. Must carry core errors raised inside the store (such as a
  /// failing fan-out) and convert back into them.
  type Error: std::error::Error + Send + Sync + 'static + From<crate::Error>;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user. A duplicate email is reported as a conflict.
  fn insert_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn list_users(&self) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  fn user_exists(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  fn find_users_by_role(
    &self,
    role: Role,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Delete a user, its enrollment entries, and any tutor references to it.
  /// Returns `false` if no such user existed.
  fn delete_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Courses & enrollment ──────────────────────────────────────────────

  /// Persist a new course with an empty (but present) roster.
  fn insert_course(
    &self,
    input: NewCourse,
  ) -> impl Future<Output = Result<Course, Self::Error>> + Send + '_;

  fn get_course(
    &self,
    id: CourseId,
  ) -> impl Future<Output = Result<Option<Course>, Self::Error>> + Send + '_;

  fn list_courses(&self) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + '_;

  fn course_exists(
    &self,
    id: CourseId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete a course and its roster. Assignments must already be gone.
  /// Returns `false` if no such course existed.
  fn delete_course(
    &self,
    id: CourseId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn assignments_for_course(
    &self,
    id: CourseId,
  ) -> impl Future<Output = Result<Vec<Assignment>, Self::Error>> + Send + '_;

  /// Everyone enrolled in the course, one entry per enrollment.
  /// `None` if the roster cannot be determined.
  fn course_roster(
    &self,
    id: CourseId,
  ) -> impl Future<Output = Result<Option<Vec<User>>, Self::Error>> + Send + '_;

  /// The courses a user is enrolled in, one entry per enrollment.
  fn courses_for_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + '_;

  /// Append one enrollment entry. Never deduplicates.
  fn enroll(
    &self,
    user_id: UserId,
    course_id: CourseId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Assignments ───────────────────────────────────────────────────────

  /// Insert an assignment, then read its course roster, run `fan_out`, and
  /// insert the resulting batch, all as one atomic unit. If `fan_out` fails
  /// nothing is stored and its error is returned.
  fn create_assignment<F>(
    &self,
    input: NewAssignment,
    fan_out: F,
  ) -> impl Future<Output = Result<(Assignment, Vec<Submission>), Self::Error>> + Send + '_
  where
    F: FnOnce(&Assignment, Option<&[User]>) -> crate::Result<Vec<NewSubmission>>
      + Send
      + 'static;

  fn get_assignment(
    &self,
    id: AssignmentId,
  ) -> impl Future<Output = Result<Option<Assignment>, Self::Error>> + Send + '_;

  fn list_assignments(
    &self,
  ) -> impl Future<Output = Result<Vec<Assignment>, Self::Error>> + Send + '_;

  fn assignment_exists(
    &self,
    id: AssignmentId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete an assignment. Its submissions must already be gone.
  fn delete_assignment(
    &self,
    id: AssignmentId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Submissions ───────────────────────────────────────────────────────

  /// Bulk insert; all rows are stored or none are.
  fn insert_submissions(
    &self,
    batch: Vec<NewSubmission>,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  fn get_submission(
    &self,
    id: SubmissionId,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  fn list_submissions(
    &self,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  fn submission_exists(
    &self,
    id: SubmissionId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn submissions_for_assignment(
    &self,
    id: AssignmentId,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  fn submissions_for_student(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  /// Apply `update` and return the stored result, or `None` if the
  /// submission does not exist.
  fn update_submission(
    &self,
    id: SubmissionId,
    update: SubmissionUpdate,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// Delete the given submissions; returns how many existed.
  fn delete_submissions(
    &self,
    ids: Vec<SubmissionId>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
