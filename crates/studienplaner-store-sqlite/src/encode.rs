//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and enums as their upper-case
//! wire names, so the database reads the same as the JSON API.

use std::num::NonZeroU16;

use chrono::{DateTime, Utc};
use studienplaner_core::{
  assignment::{Assignment, AssignmentKind},
  course::Course,
  id::{AssignmentId, CourseId, SubmissionId, UserId},
  submission::{Submission, SubmissionStatus},
  user::{Role, User},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str { r.as_str() }

pub fn decode_role(s: &str) -> Result<Role> {
  s.parse::<Role>().map_err(|e| Error::Decode(e.to_string()))
}

// ─── AssignmentKind ──────────────────────────────────────────────────────────

pub fn encode_kind(k: AssignmentKind) -> &'static str {
  match k {
    AssignmentKind::Homework => "HOMEWORK",
    AssignmentKind::Project => "PROJECT",
    AssignmentKind::Exam => "EXAM",
    AssignmentKind::Test => "TEST",
    AssignmentKind::Presentation => "PRESENTATION",
    AssignmentKind::Essay => "ESSAY",
    AssignmentKind::Lab => "LAB",
  }
}

pub fn decode_kind(s: &str) -> Result<AssignmentKind> {
  match s {
    "HOMEWORK" => Ok(AssignmentKind::Homework),
    "PROJECT" => Ok(AssignmentKind::Project),
    "EXAM" => Ok(AssignmentKind::Exam),
    "TEST" => Ok(AssignmentKind::Test),
    "PRESENTATION" => Ok(AssignmentKind::Presentation),
    "ESSAY" => Ok(AssignmentKind::Essay),
    "LAB" => Ok(AssignmentKind::Lab),
    other => Err(Error::Decode(format!("unknown assignment type: {other:?}"))),
  }
}

// ─── SubmissionStatus ────────────────────────────────────────────────────────

pub fn encode_status(s: SubmissionStatus) -> &'static str {
  match s {
    SubmissionStatus::NotSubmitted => "NOT_SUBMITTED",
    SubmissionStatus::Submitted => "SUBMITTED",
    SubmissionStatus::Reviewed => "REVIEWED",
    SubmissionStatus::Graded => "GRADED",
  }
}

pub fn decode_status(s: &str) -> Result<SubmissionStatus> {
  match s {
    "NOT_SUBMITTED" => Ok(SubmissionStatus::NotSubmitted),
    "SUBMITTED" => Ok(SubmissionStatus::Submitted),
    "REVIEWED" => Ok(SubmissionStatus::Reviewed),
    "GRADED" => Ok(SubmissionStatus::Graded),
    other => Err(Error::Decode(format!("unknown submission status: {other:?}"))),
  }
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Column list matching [`RawUser::from_row`].
pub const USER_COLUMNS: &str = "u.user_id, u.name, u.surname, u.role, u.email, u.password_hash";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:       i64,
  pub name:          String,
  pub surname:       String,
  pub role:          String,
  pub email:         String,
  pub password_hash: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      name:          row.get(1)?,
      surname:       row.get(2)?,
      role:          row.get(3)?,
      email:         row.get(4)?,
      password_hash: row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       UserId(self.user_id),
      name:          self.name,
      surname:       self.surname,
      role:          decode_role(&self.role)?,
      email:         self.email,
      password_hash: self.password_hash,
    })
  }
}

pub const COURSE_COLUMNS: &str = "c.course_id, c.title, c.description, c.ects, c.tutor_id";

/// Raw values read directly from a `courses` row.
pub struct RawCourse {
  pub course_id:   i64,
  pub title:       String,
  pub description: String,
  pub ects:        i64,
  pub tutor_id:    Option<i64>,
}

impl RawCourse {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      course_id:   row.get(0)?,
      title:       row.get(1)?,
      description: row.get(2)?,
      ects:        row.get(3)?,
      tutor_id:    row.get(4)?,
    })
  }

  pub fn into_course(self) -> Result<Course> {
    let ects = u16::try_from(self.ects)
      .ok()
      .and_then(NonZeroU16::new)
      .ok_or_else(|| Error::Decode(format!("invalid ects value: {}", self.ects)))?;
    Ok(Course {
      course_id: CourseId(self.course_id),
      title: self.title,
      description: self.description,
      ects,
      tutor_id: self.tutor_id.map(UserId),
    })
  }
}

pub const ASSIGNMENT_COLUMNS: &str =
  "a.assignment_id, a.title, a.description, a.kind, a.deadline, a.course_id";

/// Raw values read directly from an `assignments` row.
pub struct RawAssignment {
  pub assignment_id: i64,
  pub title:         String,
  pub description:   String,
  pub kind:          String,
  pub deadline:      String,
  pub course_id:     i64,
}

impl RawAssignment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      assignment_id: row.get(0)?,
      title:         row.get(1)?,
      description:   row.get(2)?,
      kind:          row.get(3)?,
      deadline:      row.get(4)?,
      course_id:     row.get(5)?,
    })
  }

  pub fn into_assignment(self) -> Result<Assignment> {
    Ok(Assignment {
      assignment_id: AssignmentId(self.assignment_id),
      title:         self.title,
      description:   self.description,
      kind:          decode_kind(&self.kind)?,
      deadline:      decode_dt(&self.deadline)?,
      course_id:     CourseId(self.course_id),
    })
  }
}

pub const SUBMISSION_COLUMNS: &str = "s.submission_id, s.assignment_id, s.student_id, \
                                      s.submitted_at, s.content, s.status, s.grade";

/// Raw values read directly from a `submissions` row.
pub struct RawSubmission {
  pub submission_id: i64,
  pub assignment_id: i64,
  pub student_id:    i64,
  pub submitted_at:  String,
  pub content:       Option<String>,
  pub status:        String,
  pub grade:         Option<f64>,
}

impl RawSubmission {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      submission_id: row.get(0)?,
      assignment_id: row.get(1)?,
      student_id:    row.get(2)?,
      submitted_at:  row.get(3)?,
      content:       row.get(4)?,
      status:        row.get(5)?,
      grade:         row.get(6)?,
    })
  }

  pub fn into_submission(self) -> Result<Submission> {
    Ok(Submission {
      submission_id: SubmissionId(self.submission_id),
      assignment_id: AssignmentId(self.assignment_id),
      student_id:    UserId(self.student_id),
      submitted_at:  decode_dt(&self.submitted_at)?,
      content:       self.content,
      status:        decode_status(&self.status)?,
      grade:         self.grade,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn enums_decode_what_they_encode() {
    for kind in [AssignmentKind::Homework, AssignmentKind::Lab, AssignmentKind::Presentation] {
      assert_eq!(decode_kind(encode_kind(kind)).unwrap(), kind);
    }
    assert_eq!(decode_status("NOT_SUBMITTED").unwrap(), SubmissionStatus::NotSubmitted);
    assert_eq!(decode_role("TEACHER").unwrap(), Role::Teacher);
  }

  #[test]
  fn unknown_values_are_decode_errors() {
    assert!(matches!(decode_kind("QUIZ"), Err(Error::Decode(_))));
    assert!(matches!(decode_status("LATE"), Err(Error::Decode(_))));
    assert!(matches!(decode_role("JANITOR"), Err(Error::Decode(_))));
  }

  #[test]
  fn zero_ects_is_rejected() {
    let raw = RawCourse {
      course_id:   1,
      title:       "Void".into(),
      description: String::new(),
      ects:        0,
      tutor_id:    None,
    };
    assert!(matches!(raw.into_course(), Err(Error::Decode(_))));
  }
}
