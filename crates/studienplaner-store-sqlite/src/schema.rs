//! SQL schema for the Studienplaner SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    surname       TEXT NOT NULL,
    role          TEXT NOT NULL,          -- 'ADMIN' | 'STUDENT' | 'TEACHER'
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS courses (
    course_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    ects        INTEGER NOT NULL CHECK (ects > 0),
    tutor_id    INTEGER REFERENCES users(user_id)
);

CREATE TABLE IF NOT EXISTS assignments (
    assignment_id INTEGER PRIMARY KEY AUTOINCREMENT,
    title         TEXT NOT NULL,
    description   TEXT NOT NULL,
    kind          TEXT NOT NULL,          -- 'HOMEWORK' | 'PROJECT' | ...
    deadline      TEXT NOT NULL,          -- ISO 8601 UTC
    course_id     INTEGER NOT NULL REFERENCES courses(course_id)
);

-- No uniqueness on (assignment_id, student_id): fan-out placeholders and
-- handed-in work are separate rows.
CREATE TABLE IF NOT EXISTS submissions (
    submission_id INTEGER PRIMARY KEY AUTOINCREMENT,
    assignment_id INTEGER NOT NULL REFERENCES assignments(assignment_id),
    student_id    INTEGER NOT NULL REFERENCES users(user_id),
    submitted_at  TEXT NOT NULL,
    content       TEXT,
    status        TEXT NOT NULL DEFAULT 'NOT_SUBMITTED',
    grade         REAL
);

-- Append-only membership entries. The same (user, course) pair may appear
-- more than once.
CREATE TABLE IF NOT EXISTS enrollments (
    enrollment_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id       INTEGER NOT NULL REFERENCES users(user_id),
    course_id     INTEGER NOT NULL REFERENCES courses(course_id)
);

CREATE INDEX IF NOT EXISTS enrollments_course_idx    ON enrollments(course_id);
CREATE INDEX IF NOT EXISTS enrollments_user_idx      ON enrollments(user_id);
CREATE INDEX IF NOT EXISTS assignments_course_idx    ON assignments(course_id);
CREATE INDEX IF NOT EXISTS submissions_assignment_idx ON submissions(assignment_id);
CREATE INDEX IF NOT EXISTS submissions_student_idx   ON submissions(student_id);

PRAGMA user_version = 1;
";
