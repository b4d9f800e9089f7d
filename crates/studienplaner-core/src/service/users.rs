use std::sync::Arc;

use crate::{
  Error, Result,
  access::{Principal, require, require_own_or_role},
  course::Course,
  id::{CourseId, UserId},
  store::CourseStore,
  user::{NewUser, Role, User},
};

pub struct UserService<S> {
  store: Arc<S>,
}

impl<S> UserService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }
}

impl<S> UserService<S>
where
  S: CourseStore,
  Error: From<S::Error>,
{
  /// Register a user. Duplicate emails surface as [`Error::Conflict`].
  pub async fn create(&self, principal: &Principal, input: NewUser) -> Result<User> {
    self.create_with(principal, || Ok::<_, Error>(input)).await
  }

  /// Register a user whose input is built by `build`, which runs only once
  /// the principal may register users. Password hashing belongs in `build`.
  pub async fn create_with<F, E>(&self, principal: &Principal, build: F) -> Result<User, E>
  where
    F: FnOnce() -> Result<NewUser, E>,
    E: From<Error>,
  {
    require(principal, &[Role::Admin], "register users")?;
    let input = build()?;
    let user = self.store.insert_user(input).await.map_err(Error::from)?;
    tracing::info!(user_id = %user.user_id, role = %user.role, "user registered");
    Ok(user)
  }

  pub async fn get_by_id(&self, principal: &Principal, id: UserId) -> Result<User> {
    require_own_or_role(principal, id, &[Role::Teacher], "view users")?;
    self.find(id).await
  }

  pub async fn list_all(&self, principal: &Principal) -> Result<Vec<User>> {
    require(principal, &[Role::Teacher], "list users")?;
    Ok(self.store.list_users().await?)
  }

  pub async fn find_by_email(&self, principal: &Principal, email: &str) -> Result<User> {
    require(principal, &[Role::Teacher], "look up users")?;
    self
      .store
      .find_user_by_email(email)
      .await?
      .ok_or_else(|| Error::NotFound(format!("no user with email {email}")))
  }

  /// All users holding `role`. An empty result is reported as
  /// [`Error::NotFound`] rather than an empty list.
  pub async fn find_by_role(&self, principal: &Principal, role: Role) -> Result<Vec<User>> {
    require(principal, &[Role::Teacher], "list users")?;
    let users = self.store.find_users_by_role(role).await?;
    if users.is_empty() {
      return Err(Error::NotFound(format!("there are no users with role {role}")));
    }
    Ok(users)
  }

  /// The courses `user_id` is enrolled in, one entry per enrollment.
  pub async fn get_all_courses_for_user(
    &self,
    principal: &Principal,
    user_id: UserId,
  ) -> Result<Vec<Course>> {
    require_own_or_role(principal, user_id, &[Role::Teacher], "view enrollments")?;
    self.find(user_id).await?;
    Ok(self.store.courses_for_user(user_id).await?)
  }

  /// Enroll `user_id` in `course_id`.
  ///
  /// Not idempotent: enrolling the same pair again records a second entry,
  /// which fan-out will then count twice.
  pub async fn enroll(
    &self,
    principal: &Principal,
    user_id: UserId,
    course_id: CourseId,
  ) -> Result<()> {
    require_own_or_role(principal, user_id, &[Role::Teacher], "enroll users")?;

    if !self.store.user_exists(user_id).await? {
      return Err(Error::NotFound(format!("user {user_id} not found")));
    }
    if !self.store.course_exists(course_id).await? {
      return Err(Error::NotFound(format!("course {course_id} not found")));
    }

    self.store.enroll(user_id, course_id).await?;
    tracing::info!(%user_id, %course_id, "user enrolled");
    Ok(())
  }

  /// Delete a user together with their submissions. The store drops the
  /// user's enrollment entries and tutor references.
  pub async fn delete_by_id(&self, principal: &Principal, id: UserId) -> Result<()> {
    require(principal, &[Role::Admin], "delete users")?;
    self.find(id).await?;

    let submissions: Vec<_> = self
      .store
      .submissions_for_student(id)
      .await?
      .into_iter()
      .map(|s| s.submission_id)
      .collect();
    let removed = self.store.delete_submissions(submissions).await?;

    if !self.store.delete_user(id).await? {
      return Err(Error::NotFound(format!("user {id} not found")));
    }
    tracing::info!(user_id = %id, submissions = removed, "user deleted");
    Ok(())
  }

  async fn find(&self, id: UserId) -> Result<User> {
    self
      .store
      .get_user(id)
      .await?
      .ok_or_else(|| Error::NotFound(format!("user {id} not found")))
  }
}
