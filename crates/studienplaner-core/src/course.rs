//! Courses: units of teaching that own assignments and have a roster.

use std::num::NonZeroU16;

use serde::{Deserialize, Serialize};

use crate::id::{CourseId, UserId};

/// A course. Its assignments and enrolled students are not held here; they
/// are looked up through the store so no entity carries a back-reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
  pub course_id:   CourseId,
  pub title:       String,
  pub description: String,
  /// Credit value; always positive.
  pub ects:        NonZeroU16,
  /// The course's designated responsible teacher.
  pub tutor_id:    Option<UserId>,
}

/// Input to [`crate::store::CourseStore::insert_course`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
  pub title:       String,
  pub description: String,
  pub ects:        NonZeroU16,
  #[serde(default)]
  pub tutor_id:    Option<UserId>,
}
