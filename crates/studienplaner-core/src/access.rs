//! Role-scoped access control.
//!
//! The evaluator is a pair of pure functions over a [`Principal`] snapshot.
//! ADMIN satisfies every role check; a principal without authorities fails
//! every check, including the "any authenticated principal" check expressed
//! by an empty role set.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  id::UserId,
  user::{Role, UnknownRole, User},
};

/// The actor making a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
  /// `None` for an unauthenticated caller.
  pub user_id:     Option<UserId>,
  pub authorities: Vec<Role>,
}

impl Principal {
  /// An unauthenticated caller: no id, no authorities.
  pub fn anonymous() -> Self { Self::default() }

  pub fn new(user_id: UserId, authorities: impl IntoIterator<Item = Role>) -> Self {
    Self {
      user_id:     Some(user_id),
      authorities: authorities.into_iter().collect(),
    }
  }

  /// Build a principal from authority strings such as `"ROLE_TEACHER"`.
  pub fn from_authorities<I, S>(user_id: Option<UserId>, authorities: I) -> Result<Self, UnknownRole>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let authorities = authorities
      .into_iter()
      .map(|a| a.as_ref().parse())
      .collect::<Result<Vec<Role>, _>>()?;
    Ok(Self { user_id, authorities })
  }

  pub fn has_authority(&self, role: Role) -> bool {
    self.authorities.contains(&role)
  }

  pub fn is_authenticated(&self) -> bool { !self.authorities.is_empty() }
}

impl From<&User> for Principal {
  fn from(user: &User) -> Self { Self::new(user.user_id, [user.role]) }
}

/// Whether `principal` holds one of `required`.
///
/// An empty `required` set means "any authenticated principal".
pub fn can_access(principal: &Principal, required: &[Role]) -> bool {
  if !principal.is_authenticated() {
    return false;
  }
  if principal.has_authority(Role::Admin) || required.is_empty() {
    return true;
  }
  principal.authorities.iter().any(|a| required.contains(a))
}

/// Whether `principal` is the owner `owner_id`, or otherwise passes
/// [`can_access`] for `required`.
pub fn can_access_own_or_role(
  principal: &Principal,
  owner_id: UserId,
  required: &[Role],
) -> bool {
  principal.user_id == Some(owner_id) || can_access(principal, required)
}

/// [`can_access`], turning a denial into [`Error::Forbidden`].
pub fn require(principal: &Principal, required: &[Role], operation: &str) -> Result<()> {
  if can_access(principal, required) {
    Ok(())
  } else {
    tracing::debug!(user_id = ?principal.user_id, operation, "access denied");
    Err(Error::Forbidden(format!("not permitted to {operation}")))
  }
}

/// [`can_access_own_or_role`], turning a denial into [`Error::Forbidden`].
pub fn require_own_or_role(
  principal: &Principal,
  owner_id: UserId,
  required: &[Role],
  operation: &str,
) -> Result<()> {
  if can_access_own_or_role(principal, owner_id, required) {
    Ok(())
  } else {
    tracing::debug!(user_id = ?principal.user_id, %owner_id, operation, "access denied");
    Err(Error::Forbidden(format!("not permitted to {operation}")))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn with(roles: &[Role]) -> Principal { Principal::new(UserId(7), roles.iter().copied()) }

  #[test]
  fn admin_satisfies_any_role_set() {
    let admin = with(&[Role::Admin]);
    assert!(can_access(&admin, &[Role::Teacher]));
    assert!(can_access(&admin, &[Role::Student, Role::Teacher]));
    assert!(can_access(&admin, &[]));
  }

  #[test]
  fn matching_authority_is_granted() {
    let teacher = with(&[Role::Teacher]);
    assert!(can_access(&teacher, &[Role::Teacher]));
    assert!(can_access(&teacher, &[Role::Student, Role::Teacher]));
    assert!(!can_access(&teacher, &[Role::Student]));
    assert!(!can_access(&teacher, &[Role::Admin]));
  }

  #[test]
  fn empty_role_set_admits_any_authenticated_principal() {
    assert!(can_access(&with(&[Role::Student]), &[]));
  }

  #[test]
  fn anonymous_is_always_denied() {
    let anon = Principal::anonymous();
    assert!(!can_access(&anon, &[]));
    for role in Role::ALL {
      assert!(!can_access(&anon, &[role]));
    }
    // An id alone does not authenticate.
    let id_only = Principal { user_id: Some(UserId(1)), authorities: vec![] };
    assert!(!can_access(&id_only, &[]));
  }

  #[test]
  fn owner_passes_without_the_role() {
    let student = with(&[Role::Student]);
    assert!(can_access_own_or_role(&student, UserId(7), &[Role::Teacher]));
    assert!(!can_access_own_or_role(&student, UserId(8), &[Role::Teacher]));
  }

  #[test]
  fn own_or_role_falls_back_to_the_role_check() {
    let teacher = with(&[Role::Teacher]);
    assert!(can_access_own_or_role(&teacher, UserId(99), &[Role::Teacher]));
    assert!(!can_access_own_or_role(&Principal::anonymous(), UserId(7), &[]));
  }

  #[test]
  fn parses_prefixed_authorities() {
    let p = Principal::from_authorities(Some(UserId(3)), ["ROLE_TEACHER"]).unwrap();
    assert!(can_access(&p, &[Role::Teacher]));
    assert!(Principal::from_authorities(None, ["ROLE_DEAN"]).is_err());
  }

  #[test]
  fn require_reports_forbidden() {
    let err = require(&with(&[Role::Student]), &[Role::Teacher], "create course").unwrap_err();
    assert!(matches!(err, Error::Forbidden(m) if m.contains("create course")));
  }
}
