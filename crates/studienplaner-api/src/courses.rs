//! Handlers for `/courses` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use studienplaner_core::{
  assignment::Assignment,
  course::{Course, NewCourse},
  id::CourseId,
  service::Services,
  store::CourseStore,
  user::User,
};

use crate::{auth::CurrentUser, error::ApiError};

/// `POST /courses`
pub async fn create<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Json(body): Json<NewCourse>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  let course = services.courses.create(&principal, body).await?;
  Ok((StatusCode::CREATED, Json(course)))
}

/// `GET /courses`
pub async fn list<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<Course>>, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  Ok(Json(services.courses.list_all(&principal).await?))
}

/// `GET /courses/{id}`
pub async fn get_one<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(id): Path<CourseId>,
) -> Result<Json<Course>, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  Ok(Json(services.courses.get_by_id(&principal, id).await?))
}

/// `GET /courses/{id}/assignments`
pub async fn assignments<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(id): Path<CourseId>,
) -> Result<Json<Vec<Assignment>>, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  Ok(Json(services.courses.get_assignments(&principal, id).await?))
}

/// `GET /courses/{id}/students`, one entry per enrollment.
pub async fn students<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(id): Path<CourseId>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  Ok(Json(services.courses.get_students(&principal, id).await?))
}

/// `DELETE /courses/{id}`; also removes its assignments and their submissions.
pub async fn delete_one<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(id): Path<CourseId>,
) -> Result<StatusCode, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  services.courses.delete_by_id(&principal, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
