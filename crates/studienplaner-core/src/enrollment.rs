//! The Course↔User enrollment relation.
//!
//! Held as two independent indexes, `course → users` and `user → courses`,
//! so no entity keeps a live back-reference to another. Entries are
//! append-only and not deduplicated: enrolling the same pair twice records
//! two entries on both sides, and every consumer (rosters, fan-out, course
//! listings) sees both.
//!
//! A course that was never registered has no roster at all, which is
//! distinct from a registered course with nobody enrolled.

use std::collections::HashMap;

use crate::id::{CourseId, UserId};

#[derive(Debug, Clone, Default)]
pub struct EnrollmentIndex {
  by_course: HashMap<CourseId, Vec<UserId>>,
  by_user:   HashMap<UserId, Vec<CourseId>>,
}

impl EnrollmentIndex {
  pub fn new() -> Self { Self::default() }

  /// Give `course_id` an empty roster. Existing entries are kept.
  pub fn register_course(&mut self, course_id: CourseId) {
    self.by_course.entry(course_id).or_default();
  }

  /// Append one enrollment entry on both sides.
  pub fn enroll(&mut self, user_id: UserId, course_id: CourseId) {
    self.by_course.entry(course_id).or_default().push(user_id);
    self.by_user.entry(user_id).or_default().push(course_id);
  }

  /// The enrolled user ids in enrollment order, or `None` for an unknown
  /// course.
  pub fn roster_of(&self, course_id: CourseId) -> Option<&[UserId]> {
    self.by_course.get(&course_id).map(Vec::as_slice)
  }

  /// The courses `user_id` is enrolled in, one per entry.
  pub fn courses_of(&self, user_id: UserId) -> &[CourseId] {
    self.by_user.get(&user_id).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Number of entries for the exact pair.
  pub fn entries_for(&self, user_id: UserId, course_id: CourseId) -> usize {
    self
      .courses_of(user_id)
      .iter()
      .filter(|c| **c == course_id)
      .count()
  }

  /// Drop the course and every entry pointing at it.
  pub fn remove_course(&mut self, course_id: CourseId) {
    if let Some(users) = self.by_course.remove(&course_id) {
      for user_id in users {
        if let Some(courses) = self.by_user.get_mut(&user_id) {
          courses.retain(|c| *c != course_id);
        }
      }
    }
  }

  /// Drop every entry for the user.
  pub fn remove_user(&mut self, user_id: UserId) {
    if let Some(courses) = self.by_user.remove(&user_id) {
      for course_id in courses {
        if let Some(users) = self.by_course.get_mut(&course_id) {
          users.retain(|u| *u != user_id);
        }
      }
    }
  }
}
