//! Handlers for `/assignments` endpoints.
//!
//! Creating an assignment answers with the assignment plus the placeholder
//! submissions generated for every enrolled student.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use studienplaner_core::{
  assignment::{Assignment, NewAssignment},
  id::AssignmentId,
  service::Services,
  store::CourseStore,
};

use crate::{auth::CurrentUser, error::ApiError};

/// `POST /assignments`
pub async fn create<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Json(body): Json<NewAssignment>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  let published = services.assignments.create(&principal, body).await?;
  Ok((StatusCode::CREATED, Json(published)))
}

/// `GET /assignments`
pub async fn list<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<Assignment>>, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  Ok(Json(services.assignments.list_all(&principal).await?))
}

/// `GET /assignments/{id}`
pub async fn get_one<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(id): Path<AssignmentId>,
) -> Result<Json<Assignment>, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  Ok(Json(services.assignments.get_by_id(&principal, id).await?))
}

/// `POST /assignments/{id}/submissions`: run fan-out again against the
/// current roster.
pub async fn generate_submissions<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(id): Path<AssignmentId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  let submissions = services.submissions.generate_submissions(&principal, id).await?;
  Ok((StatusCode::CREATED, Json(submissions)))
}

/// `DELETE /assignments/{id}`
pub async fn delete_one<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(id): Path<AssignmentId>,
) -> Result<StatusCode, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  services.assignments.delete_by_id(&principal, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
