//! Resource orchestration.
//!
//! Each service checks the caller's [`Principal`](crate::access::Principal)
//! with the access evaluator before touching the store, turns absent lookups
//! into [`Error::NotFound`](crate::Error::NotFound), and runs enrollment,
//! fan-out, and cascading deletes as explicit sequences of store calls.

mod assignments;
mod courses;
mod submissions;
mod users;

#[cfg(test)]
mod tests;

use std::sync::Arc;

pub use assignments::{AssignmentService, PublishedAssignment};
pub use courses::CourseService;
pub use submissions::SubmissionService;
pub use users::UserService;

/// All four services over one shared store.
pub struct Services<S> {
  pub courses:     CourseService<S>,
  pub assignments: AssignmentService<S>,
  pub submissions: SubmissionService<S>,
  pub users:       UserService<S>,
  store:           Arc<S>,
}

impl<S> Services<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      courses:     CourseService::new(store.clone()),
      assignments: AssignmentService::new(store.clone()),
      submissions: SubmissionService::new(store.clone()),
      users:       UserService::new(store.clone()),
      store,
    }
  }

  /// The underlying store, for collaborators that need unchecked reads
  /// (e.g. resolving credentials into a principal).
  pub fn store(&self) -> &Arc<S> { &self.store }
}

impl<S> Clone for Services<S> {
  fn clone(&self) -> Self { Self::new(self.store.clone()) }
}
