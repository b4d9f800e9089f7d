//! Handlers for `/users` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/users` | TEACHER |
//! | `POST`   | `/users` | ADMIN; body carries the plain password |
//! | `GET`    | `/users/{id}` | own or TEACHER |
//! | `DELETE` | `/users/{id}` | ADMIN; removes the user's submissions |
//! | `GET`    | `/users/email/{email}` | TEACHER |
//! | `GET`    | `/users/role/{role}` | TEACHER; 404 if nobody holds the role |
//! | `GET`    | `/users/{id}/courses` | own or TEACHER |
//! | `POST`   | `/users/{id}/courses/{course_id}` | own or TEACHER; not idempotent |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use studienplaner_core::{
  course::Course,
  id::{CourseId, UserId},
  service::Services,
  store::CourseStore,
  user::{NewUser, Role, User},
};

use crate::{
  auth::{CurrentUser, hash_password},
  error::ApiError,
};

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:     String,
  pub surname:  String,
  pub role:     Role,
  pub email:    String,
  pub password: String,
}

/// `POST /users`
pub async fn create<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  let user = services
    .users
    .create_with(&principal, || {
      Ok::<_, ApiError>(NewUser {
        name:          body.name,
        surname:       body.surname,
        role:          body.role,
        email:         body.email,
        password_hash: hash_password(&body.password)?,
      })
    })
    .await?;
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Read ────────────────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  Ok(Json(services.users.list_all(&principal).await?))
}

/// `GET /users/{id}`
pub async fn get_one<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(id): Path<UserId>,
) -> Result<Json<User>, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  Ok(Json(services.users.get_by_id(&principal, id).await?))
}

/// `GET /users/email/{email}`
pub async fn by_email<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(email): Path<String>,
) -> Result<Json<User>, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  Ok(Json(services.users.find_by_email(&principal, &email).await?))
}

/// `GET /users/role/{role}`; accepts `TEACHER` as well as `ROLE_TEACHER`.
pub async fn by_role<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(role): Path<String>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  let role: Role = role.parse().map_err(|e| ApiError::BadRequest(format!("{e}")))?;
  Ok(Json(services.users.find_by_role(&principal, role).await?))
}

// ─── Enrollment ──────────────────────────────────────────────────────────────

/// `GET /users/{id}/courses`
pub async fn courses<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(id): Path<UserId>,
) -> Result<Json<Vec<Course>>, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  Ok(Json(services.users.get_all_courses_for_user(&principal, id).await?))
}

/// `POST /users/{id}/courses/{course_id}`
pub async fn enroll<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path((id, course_id)): Path<(UserId, CourseId)>,
) -> Result<StatusCode, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  services.users.enroll(&principal, id, course_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /users/{id}`
pub async fn delete_one<S>(
  State(services): State<Arc<Services<S>>>,
  CurrentUser(principal): CurrentUser,
  Path(id): Path<UserId>,
) -> Result<StatusCode, ApiError>
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  services.users.delete_by_id(&principal, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
