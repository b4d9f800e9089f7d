//! Users: identities with a fixed role.
//!
//! Course membership is not stored on the user. It lives in the enrollment
//! index and is reached through [`CourseStore::courses_for_user`].
//!
//! [`CourseStore::courses_for_user`]: crate::store::CourseStore::courses_for_user

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// The role a user holds. Assigned on registration and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
  Admin,
  Student,
  Teacher,
}

impl Role {
  pub const ALL: [Role; 3] = [Role::Admin, Role::Student, Role::Teacher];

  /// The authority string, e.g. `"TEACHER"`.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Admin => "ADMIN",
      Self::Student => "STUDENT",
      Self::Teacher => "TEACHER",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Returned when a string names no known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
  type Err = UnknownRole;

  /// Accepts `"TEACHER"` as well as the prefixed authority form
  /// `"ROLE_TEACHER"`, case-insensitively.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let upper = s.trim().to_ascii_uppercase();
    let bare = upper.strip_prefix("ROLE_").unwrap_or(&upper);
    Role::ALL
      .into_iter()
      .find(|r| r.as_str() == bare)
      .ok_or_else(|| UnknownRole(s.to_owned()))
  }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub user_id:       UserId,
  pub name:          String,
  pub surname:       String,
  pub role:          Role,
  /// Unique across all users; the store reports duplicates as a conflict.
  pub email:         String,
  /// Argon2 PHC string. Never leaves the process in a response body.
  #[serde(skip_serializing, default)]
  pub password_hash: String,
}

impl User {
  pub fn is_student(&self) -> bool { self.role == Role::Student }
}

/// Input to [`crate::store::CourseStore::insert_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub name:          String,
  pub surname:       String,
  pub role:          Role,
  pub email:         String,
  pub password_hash: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn role_parses_bare_and_prefixed_forms() {
    assert_eq!("TEACHER".parse::<Role>(), Ok(Role::Teacher));
    assert_eq!("ROLE_ADMIN".parse::<Role>(), Ok(Role::Admin));
    assert_eq!("student".parse::<Role>(), Ok(Role::Student));
    assert!("ROLE_JANITOR".parse::<Role>().is_err());
  }

  #[test]
  fn role_serialises_in_upper_case() {
    assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), "\"TEACHER\"");
  }

  #[test]
  fn password_hash_is_not_serialised() {
    let user = User {
      user_id:       UserId(1),
      name:          "Alice".into(),
      surname:       "Liddell".into(),
      role:          Role::Student,
      email:         "alice@example.com".into(),
      password_hash: "$argon2id$secret".into(),
    };
    let json = serde_json::to_string(&user).unwrap();
    assert!(!json.contains("argon2"), "{json}");
  }
}
