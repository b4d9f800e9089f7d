//! Numeric entity identifiers.
//!
//! Each entity gets its own newtype so a `CourseId` can never be passed where
//! a `UserId` is expected. Ids are assigned by the store.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl $name {
      pub fn get(self) -> i64 { self.0 }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
      }
    }

    impl From<i64> for $name {
      fn from(raw: i64) -> Self { Self(raw) }
    }
  };
}

entity_id!(
  /// Identifies a [`User`](crate::user::User).
  UserId
);
entity_id!(
  /// Identifies a [`Course`](crate::course::Course).
  CourseId
);
entity_id!(
  /// Identifies an [`Assignment`](crate::assignment::Assignment).
  AssignmentId
);
entity_id!(
  /// Identifies a [`Submission`](crate::submission::Submission).
  SubmissionId
);
