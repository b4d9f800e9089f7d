//! [`SqliteStore`], the SQLite implementation of [`CourseStore`].

use std::path::Path;

use rusqlite::types::Value;

use studienplaner_core::{
  assignment::{Assignment, NewAssignment},
  course::{Course, NewCourse},
  id::{AssignmentId, CourseId, SubmissionId, UserId},
  store::CourseStore,
  submission::{NewSubmission, Submission, SubmissionUpdate},
  user::{NewUser, Role, User},
};

use crate::{
  Error, Result,
  encode::{
    ASSIGNMENT_COLUMNS, COURSE_COLUMNS, RawAssignment, RawCourse, RawSubmission, RawUser,
    SUBMISSION_COLUMNS, USER_COLUMNS, encode_dt, encode_kind, encode_role, encode_status,
  },
  schema::SCHEMA,
};

type RowMapper<R> = fn(&rusqlite::Row<'_>) -> rusqlite::Result<R>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Studienplaner store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let conn = tokio_rusqlite::Connection::open(&path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "sqlite store opened");
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `sql` with `params` and map every row.
  async fn fetch<R>(&self, sql: String, params: Vec<Value>, map: RowMapper<R>) -> Result<Vec<R>>
  where
    R: Send + 'static,
  {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), map)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  /// Run a single-statement write and return the number of affected rows.
  async fn execute(&self, sql: &'static str, params: Vec<Value>) -> Result<usize> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params_from_iter(params))?))
      .await?;
    Ok(changed)
  }

  async fn exists(&self, sql: &'static str, id: i64) -> Result<bool> {
    let found = self
      .conn
      .call(move |conn| Ok(conn.query_row(sql, [id], |row| row.get::<_, bool>(0))?))
      .await?;
    Ok(found)
  }

  async fn users_where(&self, filter: &str, params: Vec<Value>) -> Result<Vec<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u {filter} ORDER BY u.user_id");
    let raws = self.fetch(sql, params, RawUser::from_row).await?;
    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn courses_where(&self, filter: &str, params: Vec<Value>) -> Result<Vec<Course>> {
    let sql = format!("SELECT {COURSE_COLUMNS} FROM courses c {filter} ORDER BY c.course_id");
    let raws = self.fetch(sql, params, RawCourse::from_row).await?;
    raws.into_iter().map(RawCourse::into_course).collect()
  }

  async fn assignments_where(&self, filter: &str, params: Vec<Value>) -> Result<Vec<Assignment>> {
    let sql =
      format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments a {filter} ORDER BY a.assignment_id");
    let raws = self.fetch(sql, params, RawAssignment::from_row).await?;
    raws.into_iter().map(RawAssignment::into_assignment).collect()
  }

  async fn submissions_where(&self, filter: &str, params: Vec<Value>) -> Result<Vec<Submission>> {
    let sql =
      format!("SELECT {SUBMISSION_COLUMNS} FROM submissions s {filter} ORDER BY s.submission_id");
    let raws = self.fetch(sql, params, RawSubmission::from_row).await?;
    raws.into_iter().map(RawSubmission::into_submission).collect()
  }
}

// ─── Connection-level helpers ────────────────────────────────────────────────

/// Read the roster of `course_id` in enrollment order, or `None` if the
/// course row does not exist.
fn read_roster(
  conn: &rusqlite::Connection,
  course_id: i64,
) -> rusqlite::Result<Option<Vec<RawUser>>> {
  let known: bool = conn.query_row(
    "SELECT EXISTS(SELECT 1 FROM courses WHERE course_id = ?1)",
    [course_id],
    |row| row.get(0),
  )?;
  if !known {
    return Ok(None);
  }

  let mut stmt = conn.prepare_cached(&format!(
    "SELECT {USER_COLUMNS} FROM enrollments e
       JOIN users u ON u.user_id = e.user_id
      WHERE e.course_id = ?1
      ORDER BY e.enrollment_id"
  ))?;
  let rows = stmt
    .query_map([course_id], RawUser::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(Some(rows))
}

/// Insert every row of `batch`, returning them with their assigned ids.
/// Callers wrap this in a transaction.
fn insert_batch(
  conn: &rusqlite::Connection,
  batch: Vec<NewSubmission>,
) -> rusqlite::Result<Vec<Submission>> {
  let mut stmt = conn.prepare_cached(
    "INSERT INTO submissions (
       assignment_id, student_id, submitted_at, content, status, grade
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
  )?;

  let mut stored = Vec::with_capacity(batch.len());
  for new in batch {
    stmt.execute(rusqlite::params![
      new.assignment_id.get(),
      new.student_id.get(),
      encode_dt(new.submitted_at),
      new.content,
      encode_status(new.status),
      new.grade,
    ])?;
    stored.push(Submission {
      submission_id: SubmissionId(conn.last_insert_rowid()),
      assignment_id: new.assignment_id,
      student_id:    new.student_id,
      submitted_at:  new.submitted_at,
      content:       new.content,
      status:        new.status,
      grade:         new.grade,
    });
  }
  Ok(stored)
}

// ─── CourseStore impl ────────────────────────────────────────────────────────

impl CourseStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn insert_user(&self, input: NewUser) -> Result<User> {
    let role_str = encode_role(input.role).to_owned();
    let (name, surname, email, hash) = (
      input.name.clone(),
      input.surname.clone(),
      input.email.clone(),
      input.password_hash.clone(),
    );

    let user_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (name, surname, role, email, password_hash)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![name, surname, role_str, email, hash],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(User {
      user_id:       UserId(user_id),
      name:          input.name,
      surname:       input.surname,
      role:          input.role,
      email:         input.email,
      password_hash: input.password_hash,
    })
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let users = self.users_where("WHERE u.user_id = ?1", vec![id.get().into()]).await?;
    Ok(users.into_iter().next())
  }

  async fn list_users(&self) -> Result<Vec<User>> { self.users_where("", Vec::new()).await }

  async fn user_exists(&self, id: UserId) -> Result<bool> {
    self
      .exists("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = ?1)", id.get())
      .await
  }

  async fn find_user_by_email<'a>(&'a self, email: &'a str) -> Result<Option<User>> {
    let users = self
      .users_where("WHERE u.email = ?1", vec![email.to_owned().into()])
      .await?;
    Ok(users.into_iter().next())
  }

  async fn find_users_by_role(&self, role: Role) -> Result<Vec<User>> {
    self
      .users_where("WHERE u.role = ?1", vec![encode_role(role).to_owned().into()])
      .await
  }

  async fn delete_user(&self, id: UserId) -> Result<bool> {
    let raw = id.get();
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM enrollments WHERE user_id = ?1", [raw])?;
        tx.execute("UPDATE courses SET tutor_id = NULL WHERE tutor_id = ?1", [raw])?;
        let n = tx.execute("DELETE FROM users WHERE user_id = ?1", [raw])?;
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;
    Ok(deleted)
  }

  // ── Courses & enrollment ──────────────────────────────────────────────────

  async fn insert_course(&self, input: NewCourse) -> Result<Course> {
    let (title, description) = (input.title.clone(), input.description.clone());
    let ects = i64::from(input.ects.get());
    let tutor_id = input.tutor_id.map(UserId::get);

    let course_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO courses (title, description, ects, tutor_id) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![title, description, ects, tutor_id],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Course {
      course_id:   CourseId(course_id),
      title:       input.title,
      description: input.description,
      ects:        input.ects,
      tutor_id:    input.tutor_id,
    })
  }

  async fn get_course(&self, id: CourseId) -> Result<Option<Course>> {
    let courses = self.courses_where("WHERE c.course_id = ?1", vec![id.get().into()]).await?;
    Ok(courses.into_iter().next())
  }

  async fn list_courses(&self) -> Result<Vec<Course>> { self.courses_where("", Vec::new()).await }

  async fn course_exists(&self, id: CourseId) -> Result<bool> {
    self
      .exists("SELECT EXISTS(SELECT 1 FROM courses WHERE course_id = ?1)", id.get())
      .await
  }

  async fn delete_course(&self, id: CourseId) -> Result<bool> {
    let raw = id.get();
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM enrollments WHERE course_id = ?1", [raw])?;
        let n = tx.execute("DELETE FROM courses WHERE course_id = ?1", [raw])?;
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;
    Ok(deleted)
  }

  async fn assignments_for_course(&self, id: CourseId) -> Result<Vec<Assignment>> {
    self
      .assignments_where("WHERE a.course_id = ?1", vec![id.get().into()])
      .await
  }

  async fn course_roster(&self, id: CourseId) -> Result<Option<Vec<User>>> {
    let raw = id.get();
    let roster = self.conn.call(move |conn| Ok(read_roster(conn, raw)?)).await?;
    roster
      .map(|raws| raws.into_iter().map(RawUser::into_user).collect::<Result<Vec<_>>>())
      .transpose()
  }

  async fn courses_for_user(&self, id: UserId) -> Result<Vec<Course>> {
    let sql = format!(
      "SELECT {COURSE_COLUMNS} FROM enrollments e
         JOIN courses c ON c.course_id = e.course_id
        WHERE e.user_id = ?1
        ORDER BY e.enrollment_id"
    );
    let raws = self.fetch(sql, vec![id.get().into()], RawCourse::from_row).await?;
    raws.into_iter().map(RawCourse::into_course).collect()
  }

  async fn enroll(&self, user_id: UserId, course_id: CourseId) -> Result<()> {
    self
      .execute(
        "INSERT INTO enrollments (user_id, course_id) VALUES (?1, ?2)",
        vec![user_id.get().into(), course_id.get().into()],
      )
      .await?;
    Ok(())
  }

  // ── Assignments ───────────────────────────────────────────────────────────

  async fn create_assignment<F>(
    &self,
    input: NewAssignment,
    fan_out: F,
  ) -> Result<(Assignment, Vec<Submission>)>
  where
    F: FnOnce(&Assignment, Option<&[User]>) -> studienplaner_core::Result<Vec<NewSubmission>>
      + Send
      + 'static,
  {
    // The assignment, the roster read, and the batch share one transaction.
    // Returning early drops `tx`, which rolls everything back.
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO assignments (title, description, kind, deadline, course_id)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            input.title,
            input.description,
            encode_kind(input.kind),
            encode_dt(input.deadline),
            input.course_id.get(),
          ],
        )?;

        let assignment = Assignment {
          assignment_id: AssignmentId(tx.last_insert_rowid()),
          title:         input.title,
          description:   input.description,
          kind:          input.kind,
          deadline:      input.deadline,
          course_id:     input.course_id,
        };

        let roster = match read_roster(&tx, assignment.course_id.get())? {
          Some(raws) => match raws.into_iter().map(RawUser::into_user).collect::<Result<Vec<_>>>()
          {
            Ok(users) => Some(users),
            Err(e) => return Ok(Err(e)),
          },
          None => None,
        };

        let batch = match fan_out(&assignment, roster.as_deref()) {
          Ok(batch) => batch,
          Err(e) => return Ok(Err(Error::Core(e))),
        };

        let submissions = insert_batch(&tx, batch)?;
        tx.commit()?;
        Ok(Ok((assignment, submissions)))
      })
      .await?;
    outcome
  }

  async fn get_assignment(&self, id: AssignmentId) -> Result<Option<Assignment>> {
    let found = self
      .assignments_where("WHERE a.assignment_id = ?1", vec![id.get().into()])
      .await?;
    Ok(found.into_iter().next())
  }

  async fn list_assignments(&self) -> Result<Vec<Assignment>> {
    self.assignments_where("", Vec::new()).await
  }

  async fn assignment_exists(&self, id: AssignmentId) -> Result<bool> {
    self
      .exists("SELECT EXISTS(SELECT 1 FROM assignments WHERE assignment_id = ?1)", id.get())
      .await
  }

  async fn delete_assignment(&self, id: AssignmentId) -> Result<bool> {
    let n = self
      .execute("DELETE FROM assignments WHERE assignment_id = ?1", vec![id.get().into()])
      .await?;
    Ok(n > 0)
  }

  // ── Submissions ───────────────────────────────────────────────────────────

  async fn insert_submissions(&self, batch: Vec<NewSubmission>) -> Result<Vec<Submission>> {
    let stored = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let stored = insert_batch(&tx, batch)?;
        tx.commit()?;
        Ok(stored)
      })
      .await?;
    Ok(stored)
  }

  async fn get_submission(&self, id: SubmissionId) -> Result<Option<Submission>> {
    let found = self
      .submissions_where("WHERE s.submission_id = ?1", vec![id.get().into()])
      .await?;
    Ok(found.into_iter().next())
  }

  async fn list_submissions(&self) -> Result<Vec<Submission>> {
    self.submissions_where("", Vec::new()).await
  }

  async fn submission_exists(&self, id: SubmissionId) -> Result<bool> {
    self
      .exists("SELECT EXISTS(SELECT 1 FROM submissions WHERE submission_id = ?1)", id.get())
      .await
  }

  async fn submissions_for_assignment(&self, id: AssignmentId) -> Result<Vec<Submission>> {
    self
      .submissions_where("WHERE s.assignment_id = ?1", vec![id.get().into()])
      .await
  }

  async fn submissions_for_student(&self, id: UserId) -> Result<Vec<Submission>> {
    self
      .submissions_where("WHERE s.student_id = ?1", vec![id.get().into()])
      .await
  }

  async fn update_submission(
    &self,
    id: SubmissionId,
    update: SubmissionUpdate,
  ) -> Result<Option<Submission>> {
    let changed = match update {
      SubmissionUpdate::Status(status) => {
        self
          .execute(
            "UPDATE submissions SET status = ?1 WHERE submission_id = ?2",
            vec![encode_status(status).to_owned().into(), id.get().into()],
          )
          .await?
      }
      SubmissionUpdate::Grade(grade) => {
        self
          .execute(
            "UPDATE submissions SET grade = ?1 WHERE submission_id = ?2",
            vec![grade.into(), id.get().into()],
          )
          .await?
      }
    };

    if changed == 0 {
      return Ok(None);
    }
    self.get_submission(id).await
  }

  async fn delete_submissions(&self, ids: Vec<SubmissionId>) -> Result<usize> {
    let raw: Vec<i64> = ids.into_iter().map(SubmissionId::get).collect();
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut removed = 0;
        {
          let mut stmt = tx.prepare_cached("DELETE FROM submissions WHERE submission_id = ?1")?;
          for id in raw {
            removed += stmt.execute([id])?;
          }
        }
        tx.commit()?;
        Ok(removed)
      })
      .await?;
    Ok(removed)
  }
}
