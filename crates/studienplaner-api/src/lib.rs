//! JSON REST API for Studienplaner.
//!
//! Exposes an axum [`Router`] over [`Services`] backed by any
//! [`CourseStore`]. Callers authenticate with HTTP Basic (`email:password`);
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", studienplaner_api::api_router(services.clone()))
//! ```

pub mod assignments;
pub mod auth;
pub mod courses;
pub mod error;
pub mod submissions;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use studienplaner_core::{service::Services, store::CourseStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `services`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(services: Arc<Services<S>>) -> Router<()>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  Router::new()
    // Users
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route("/users/{id}", get(users::get_one::<S>).delete(users::delete_one::<S>))
    .route("/users/email/{email}", get(users::by_email::<S>))
    .route("/users/role/{role}", get(users::by_role::<S>))
    .route("/users/{id}/courses", get(users::courses::<S>))
    .route("/users/{id}/courses/{course_id}", post(users::enroll::<S>))
    // Courses
    .route("/courses", get(courses::list::<S>).post(courses::create::<S>))
    .route("/courses/{id}", get(courses::get_one::<S>).delete(courses::delete_one::<S>))
    .route("/courses/{id}/assignments", get(courses::assignments::<S>))
    .route("/courses/{id}/students", get(courses::students::<S>))
    // Assignments
    .route("/assignments", get(assignments::list::<S>).post(assignments::create::<S>))
    .route(
      "/assignments/{id}",
      get(assignments::get_one::<S>).delete(assignments::delete_one::<S>),
    )
    .route("/assignments/{id}/submissions", post(assignments::generate_submissions::<S>))
    // Submissions
    .route("/submissions", get(submissions::list::<S>).post(submissions::submit::<S>))
    .route(
      "/submissions/{id}",
      get(submissions::get_one::<S>).delete(submissions::delete_one::<S>),
    )
    .route("/submissions/assignment/{id}", get(submissions::for_assignment::<S>))
    .route("/submissions/student/{id}", get(submissions::for_student::<S>))
    .route("/submissions/{id}/status", put(submissions::set_status::<S>))
    .route("/submissions/{id}/grade", put(submissions::set_grade::<S>))
    .with_state(services)
}
