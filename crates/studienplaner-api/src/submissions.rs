//! Handlers for `/submissions` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/submissions` | TEACHER |
//! | `POST`   | `/submissions` | STUDENT; body: `{"assignment_id":1,"content":"…"}` |
//! | `GET`    | `/submissions/{id}` | TEACHER |
//! | `DELETE` | `/submissions/{id}` | STUDENT, own rows only |
//! | `GET`    | `/submissions/assignment/{id}` | TEACHER |
//! | `GET`    | `/submissions/student/{id}` | own or TEACHER |
//! | `PUT`    | `/submissions/{id}/status` | TEACHER; body: `{"status":"GRADED"}` |
//! | `PUT`    | `/submissions/{id}/grade` | TEACHER; body: `{"grade":1.3}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use studienplaner_core::{
  id::{AssignmentId, SubmissionId, UserId},
  service::Services,
  store::CourseStore,
  submission::{Submission, SubmissionStatus},
};

use crate::{auth::CurrentUser, error::ApiError};

// ─── Hand in ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub assignment_id: AssignmentId,
  pub content:       String,
}

/// `POST /submissions`
pub async fn submit<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Json(body): Json<SubmitBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  let submission = services
    .submissions
    .submit(&principal, body.assignment_id, body.content)
    .await?;
  Ok((StatusCode::CREATED, Json(submission)))
}

// ─── Read ────────────────────────────────────────────────────────────────────

/// `GET /submissions`
pub async fn list<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<Submission>>, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  Ok(Json(services.submissions.list_all(&principal).await?))
}

/// `GET /submissions/{id}`
pub async fn get_one<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(id): Path<SubmissionId>,
) -> Result<Json<Submission>, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  Ok(Json(services.submissions.get_by_id(&principal, id).await?))
}

/// `GET /submissions/assignment/{id}`
pub async fn for_assignment<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(id): Path<AssignmentId>,
) -> Result<Json<Vec<Submission>>, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  Ok(Json(services.submissions.list_for_assignment(&principal, id).await?))
}

/// `GET /submissions/student/{id}`
pub async fn for_student<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(id): Path<UserId>,
) -> Result<Json<Vec<Submission>>, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  Ok(Json(services.submissions.list_for_student(&principal, id).await?))
}

// ─── Review ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: SubmissionStatus,
}

/// `PUT /submissions/{id}/status`
pub async fn set_status<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(id): Path<SubmissionId>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Submission>, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  Ok(Json(services.submissions.set_status(&principal, id, body.status).await?))
}

#[derive(Debug, Deserialize)]
pub struct GradeBody {
  pub grade: f64,
}

/// `PUT /submissions/{id}/grade`
pub async fn set_grade<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(id): Path<SubmissionId>,
  Json(body): Json<GradeBody>,
) -> Result<Json<Submission>, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  Ok(Json(services.submissions.set_grade(&principal, id, body.grade).await?))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /submissions/{id}`
pub async fn delete_one<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(id): Path<SubmissionId>,
) -> Result<StatusCode, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  services.submissions.delete_by_id(&principal, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
