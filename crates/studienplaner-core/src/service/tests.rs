//! Orchestration tests against [`MemoryStore`].

use std::{num::NonZeroU16, sync::Arc};

use chrono::{Duration, Utc};

use super::Services;
use crate::{
  Error, ErrorKind,
  access::Principal,
  assignment::{AssignmentKind, NewAssignment},
  course::{Course, NewCourse},
  id::{AssignmentId, CourseId, SubmissionId, UserId},
  memory::MemoryStore,
  store::CourseStore,
  submission::SubmissionStatus,
  user::{NewUser, Role, User},
};

struct Fixture {
  store:    Arc<MemoryStore>,
  services: Services<MemoryStore>,
  admin:    Principal,
  teacher:  Principal,
}

async fn fixture() -> Fixture {
  let store = Arc::new(MemoryStore::new());
  let services = Services::new(store.clone());
  let admin = Principal::from(&add_user(&store, "Root", Role::Admin).await);
  let teacher = Principal::from(&add_user(&store, "Tess", Role::Teacher).await);
  Fixture { store, services, admin, teacher }
}

async fn add_user(store: &MemoryStore, name: &str, role: Role) -> User {
  store
    .insert_user(NewUser {
      name:          name.into(),
      surname:       "Example".into(),
      role,
      email:         format!("{}@example.com", name.to_lowercase()),
      password_hash: String::new(),
    })
    .await
    .unwrap()
}

fn course_input(title: &str) -> NewCourse {
  NewCourse {
    title:       title.into(),
    description: format!("{title} description"),
    ects:        NonZeroU16::new(5).unwrap(),
    tutor_id:    None,
  }
}

fn homework(course_id: CourseId, title: &str) -> NewAssignment {
  NewAssignment {
    title: title.into(),
    description: "Read chapter one".into(),
    kind: AssignmentKind::Homework,
    deadline: Utc::now() + Duration::days(7),
    course_id,
  }
}

impl Fixture {
  async fn course(&self, title: &str) -> Course {
    self.services.courses.create(&self.teacher, course_input(title)).await.unwrap()
  }

  async fn enroll(&self, user: &User, course: &Course) {
    self
      .services
      .users
      .enroll(&self.teacher, user.user_id, course.course_id)
      .await
      .unwrap();
  }
}

// ─── Fan-out ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cs101_homework_reaches_only_students() {
  let f = fixture().await;
  let cs101 = f.course("CS101").await;
  let alice = add_user(&f.store, "Alice", Role::Student).await;
  let bob = add_user(&f.store, "Bob", Role::Student).await;
  let carol = add_user(&f.store, "Carol", Role::Teacher).await;
  for user in [&alice, &bob, &carol] {
    f.enroll(user, &cs101).await;
  }

  let published = f
    .services
    .assignments
    .create(&f.teacher, homework(cs101.course_id, "HW1"))
    .await
    .unwrap();

  let mut students: Vec<UserId> = published.submissions.iter().map(|s| s.student_id).collect();
  students.sort();
  assert_eq!(students, vec![alice.user_id, bob.user_id]);
  assert!(published.submissions.iter().all(|s| {
    s.assignment_id == published.assignment.assignment_id
      && s.status == SubmissionStatus::NotSubmitted
      && s.grade.is_none()
      && s.content.is_none()
  }));

  let stored = f
    .services
    .submissions
    .list_for_assignment(&f.teacher, published.assignment.assignment_id)
    .await
    .unwrap();
  assert_eq!(stored.len(), 2);
  assert!(stored.iter().all(|s| s.student_id != carol.user_id));
}

#[tokio::test]
async fn course_without_enrollments_yields_empty_batch() {
  let f = fixture().await;
  let course = f.course("Empty").await;

  let published = f
    .services
    .assignments
    .create(&f.teacher, homework(course.course_id, "HW"))
    .await
    .unwrap();

  assert!(published.submissions.is_empty());
  assert_eq!(f.store.list_assignments().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_roster_fails_without_storing_the_assignment() {
  let f = fixture().await;
  let course = f.course("Detached").await;
  f.store.forget_roster(course.course_id);

  let err = f
    .services
    .assignments
    .create(&f.teacher, homework(course.course_id, "HW"))
    .await
    .unwrap_err();

  assert_eq!(err.kind(), ErrorKind::InvalidState);
  assert!(f.store.list_assignments().await.unwrap().is_empty());
  assert!(f.store.list_submissions().await.unwrap().is_empty());
}

#[tokio::test]
async fn assignment_on_missing_course_is_not_found() {
  let f = fixture().await;
  let err = f
    .services
    .assignments
    .create(&f.teacher, homework(CourseId(404), "HW"))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  assert!(f.store.list_assignments().await.unwrap().is_empty());
}

#[tokio::test]
async fn refan_out_inserts_fresh_rows() {
  let f = fixture().await;
  let course = f.course("Repeat").await;
  let alice = add_user(&f.store, "Alice", Role::Student).await;
  f.enroll(&alice, &course).await;
  let published = f
    .services
    .assignments
    .create(&f.teacher, homework(course.course_id, "HW"))
    .await
    .unwrap();

  let again = f
    .services
    .submissions
    .generate_submissions(&f.teacher, published.assignment.assignment_id)
    .await
    .unwrap();

  assert_eq!(again.len(), 1);
  let all = f.store.submissions_for_student(alice.user_id).await.unwrap();
  assert_eq!(all.len(), 2);
}

// ─── Enrollment ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn enrolling_twice_records_two_entries() {
  let f = fixture().await;
  let course = f.course("Twice").await;
  let alice = add_user(&f.store, "Alice", Role::Student).await;

  f.enroll(&alice, &course).await;
  f.enroll(&alice, &course).await;

  let courses = f
    .services
    .users
    .get_all_courses_for_user(&f.teacher, alice.user_id)
    .await
    .unwrap();
  assert_eq!(courses.len(), 2);

  let roster = f.services.courses.get_students(&f.teacher, course.course_id).await.unwrap();
  assert_eq!(roster.len(), 2);

  let published = f
    .services
    .assignments
    .create(&f.teacher, homework(course.course_id, "HW"))
    .await
    .unwrap();
  assert_eq!(published.submissions.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_enrollments_are_all_kept() {
  let f = fixture().await;
  let course = f.course("Crowded").await;
  let services = Arc::new(Services::new(f.store.clone()));

  let mut students = Vec::new();
  for i in 0..20 {
    students.push(add_user(&f.store, &format!("Student{i}"), Role::Student).await);
  }

  let handles: Vec<_> = students
    .iter()
    .map(|student| {
      let services = services.clone();
      let teacher = f.teacher.clone();
      let (user_id, course_id) = (student.user_id, course.course_id);
      tokio::spawn(async move { services.users.enroll(&teacher, user_id, course_id).await })
    })
    .collect();
  for handle in handles {
    handle.await.unwrap().unwrap();
  }

  let roster = f.store.course_roster(course.course_id).await.unwrap().unwrap();
  assert_eq!(roster.len(), students.len());
  for student in &students {
    assert!(roster.iter().any(|u| u.user_id == student.user_id));
  }
}

#[tokio::test]
async fn enroll_names_the_missing_id_and_changes_nothing() {
  let f = fixture().await;
  let course = f.course("Real").await;
  let alice = add_user(&f.store, "Alice", Role::Student).await;

  let err = f
    .services
    .users
    .enroll(&f.teacher, UserId(999), course.course_id)
    .await
    .unwrap_err();
  assert!(matches!(&err, Error::NotFound(m) if m.contains("user 999")));

  let err = f
    .services
    .users
    .enroll(&f.teacher, alice.user_id, CourseId(888))
    .await
    .unwrap_err();
  assert!(matches!(&err, Error::NotFound(m) if m.contains("course 888")));

  assert!(f.store.courses_for_user(alice.user_id).await.unwrap().is_empty());
  assert_eq!(f.store.course_roster(course.course_id).await.unwrap(), Some(vec![]));
}

#[tokio::test]
async fn students_may_enroll_themselves_but_not_others() {
  let f = fixture().await;
  let course = f.course("Self").await;
  let alice = add_user(&f.store, "Alice", Role::Student).await;
  let bob = add_user(&f.store, "Bob", Role::Student).await;
  let as_alice = Principal::from(&alice);

  f.services
    .users
    .enroll(&as_alice, alice.user_id, course.course_id)
    .await
    .unwrap();

  let err = f
    .services
    .users
    .enroll(&as_alice, bob.user_id, course.course_id)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
  assert!(f.store.courses_for_user(bob.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn courses_for_missing_user_is_not_found() {
  let f = fixture().await;
  let err = f
    .services
    .users
    .get_all_courses_for_user(&f.teacher, UserId(999))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Courses ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_course_is_not_found_and_state_unchanged() {
  let f = fixture().await;
  f.course("Only").await;

  let err = f.services.courses.get_by_id(&f.teacher, CourseId(404)).await.unwrap_err();

  assert_eq!(err.kind(), ErrorKind::NotFound);
  assert_eq!(f.store.list_courses().await.unwrap().len(), 1);
}

#[tokio::test]
async fn students_cannot_create_courses() {
  let f = fixture().await;
  let alice = Principal::from(&add_user(&f.store, "Alice", Role::Student).await);

  let err = f.services.courses.create(&alice, course_input("Nope")).await.unwrap_err();

  assert_eq!(err.kind(), ErrorKind::Forbidden);
  assert!(f.store.list_courses().await.unwrap().is_empty());
}

#[tokio::test]
async fn anonymous_callers_cannot_even_list() {
  let f = fixture().await;
  f.course("Visible").await;
  let err = f.services.courses.list_all(&Principal::anonymous()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn admin_passes_teacher_checks() {
  let f = fixture().await;
  let course = f.services.courses.create(&f.admin, course_input("Admin")).await.unwrap();
  assert_eq!(course.title, "Admin");
}

#[tokio::test]
async fn course_with_unknown_tutor_is_rejected() {
  let f = fixture().await;
  let mut input = course_input("Tutored");
  input.tutor_id = Some(UserId(404));

  let err = f.services.courses.create(&f.teacher, input).await.unwrap_err();

  assert_eq!(err.kind(), ErrorKind::NotFound);
  assert!(f.store.list_courses().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_course_cascades_explicitly() {
  let f = fixture().await;
  let course = f.course("Doomed").await;
  let other = f.course("Survivor").await;
  let alice = add_user(&f.store, "Alice", Role::Student).await;
  f.enroll(&alice, &course).await;
  f.enroll(&alice, &other).await;
  f.services
    .assignments
    .create(&f.teacher, homework(course.course_id, "HW1"))
    .await
    .unwrap();
  f.services
    .assignments
    .create(&f.teacher, homework(course.course_id, "HW2"))
    .await
    .unwrap();
  let kept = f
    .services
    .assignments
    .create(&f.teacher, homework(other.course_id, "HW3"))
    .await
    .unwrap();

  f.services.courses.delete_by_id(&f.teacher, course.course_id).await.unwrap();

  assert!(!f.store.course_exists(course.course_id).await.unwrap());
  assert_eq!(f.store.list_assignments().await.unwrap(), vec![kept.assignment.clone()]);
  let remaining = f.store.list_submissions().await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].assignment_id, kept.assignment.assignment_id);
  let alice_courses = f.store.courses_for_user(alice.user_id).await.unwrap();
  assert_eq!(alice_courses, vec![other]);
}

#[tokio::test]
async fn assignments_of_course_are_listed() {
  let f = fixture().await;
  let course = f.course("Listed").await;
  f.services
    .assignments
    .create(&f.teacher, homework(course.course_id, "HW1"))
    .await
    .unwrap();

  let student = Principal::from(&add_user(&f.store, "Alice", Role::Student).await);
  let assignments = f
    .services
    .courses
    .get_assignments(&student, course.course_id)
    .await
    .unwrap();
  assert_eq!(assignments.len(), 1);

  let err = f
    .services
    .courses
    .get_assignments(&student, CourseId(404))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Submissions ─────────────────────────────────────────────────────────────

async fn published_with_alice(f: &Fixture) -> (User, AssignmentId, SubmissionId) {
  let course = f.course("Graded").await;
  let alice = add_user(&f.store, "Alice", Role::Student).await;
  f.enroll(&alice, &course).await;
  let published = f
    .services
    .assignments
    .create(&f.teacher, homework(course.course_id, "HW"))
    .await
    .unwrap();
  let placeholder = published.submissions[0].submission_id;
  (alice, published.assignment.assignment_id, placeholder)
}

#[tokio::test]
async fn status_may_move_backwards() {
  let f = fixture().await;
  let (_, _, id) = published_with_alice(&f).await;
  let subs = &f.services.submissions;

  let graded = subs.set_status(&f.teacher, id, SubmissionStatus::Graded).await.unwrap();
  assert_eq!(graded.status, SubmissionStatus::Graded);

  let reset = subs.set_status(&f.teacher, id, SubmissionStatus::NotSubmitted).await.unwrap();
  assert_eq!(reset.status, SubmissionStatus::NotSubmitted);
}

#[tokio::test]
async fn any_grade_is_accepted() {
  let f = fixture().await;
  let (_, _, id) = published_with_alice(&f).await;

  let graded = f.services.submissions.set_grade(&f.teacher, id, -12.5).await.unwrap();
  assert_eq!(graded.grade, Some(-12.5));
  let stored = f.store.get_submission(id).await.unwrap().unwrap();
  assert_eq!(stored.grade, Some(-12.5));
}

#[tokio::test]
async fn nan_grade_is_refused_and_nothing_changes() {
  let f = fixture().await;
  let (_, _, id) = published_with_alice(&f).await;
  let subs = &f.services.submissions;

  subs.set_grade(&f.teacher, id, 2.0).await.unwrap();
  let err = subs.set_grade(&f.teacher, id, f64::NAN).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidState);
  assert_eq!(f.store.get_submission(id).await.unwrap().unwrap().grade, Some(2.0));

  let graded = subs.set_grade(&f.teacher, id, f64::INFINITY).await.unwrap();
  assert_eq!(graded.grade, Some(f64::INFINITY));
}

#[tokio::test]
async fn updating_missing_submission_is_not_found() {
  let f = fixture().await;
  let subs = &f.services.submissions;
  let err = subs
    .set_status(&f.teacher, SubmissionId(404), SubmissionStatus::Reviewed)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  let err = subs.set_grade(&f.teacher, SubmissionId(404), 1.0).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn students_cannot_grade() {
  let f = fixture().await;
  let (alice, _, id) = published_with_alice(&f).await;
  let err = f
    .services
    .submissions
    .set_grade(&Principal::from(&alice), id, 1.0)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
  assert_eq!(f.store.get_submission(id).await.unwrap().unwrap().grade, None);
}

#[tokio::test]
async fn handing_in_coexists_with_the_placeholder() {
  let f = fixture().await;
  let (alice, assignment_id, placeholder) = published_with_alice(&f).await;
  let as_alice = Principal::from(&alice);

  let handed_in = f
    .services
    .submissions
    .submit(&as_alice, assignment_id, "My answer".into())
    .await
    .unwrap();

  assert_ne!(handed_in.submission_id, placeholder);
  assert_eq!(handed_in.student_id, alice.user_id);
  assert_eq!(handed_in.status, SubmissionStatus::Submitted);
  assert_eq!(handed_in.content.as_deref(), Some("My answer"));

  let mine = f
    .services
    .submissions
    .list_for_student(&as_alice, alice.user_id)
    .await
    .unwrap();
  assert_eq!(mine.len(), 2);
}

#[tokio::test]
async fn handing_in_on_missing_assignment_is_not_found() {
  let f = fixture().await;
  let alice = Principal::from(&add_user(&f.store, "Alice", Role::Student).await);
  let err = f
    .services
    .submissions
    .submit(&alice, AssignmentId(404), "text".into())
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  assert!(f.store.list_submissions().await.unwrap().is_empty());
}

#[tokio::test]
async fn students_see_only_their_own_submissions() {
  let f = fixture().await;
  let (alice, _, placeholder) = published_with_alice(&f).await;
  let bob = Principal::from(&add_user(&f.store, "Bob", Role::Student).await);

  let err = f
    .services
    .submissions
    .list_for_student(&bob, alice.user_id)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);

  let err = f.services.submissions.delete_by_id(&bob, placeholder).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
  let err = f.services.submissions.delete_by_id(&f.teacher, placeholder).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
  assert!(f.store.submission_exists(placeholder).await.unwrap());

  f.services
    .submissions
    .delete_by_id(&Principal::from(&alice), placeholder)
    .await
    .unwrap();
  assert!(!f.store.submission_exists(placeholder).await.unwrap());
}

#[tokio::test]
async fn admins_may_delete_any_submission() {
  let f = fixture().await;
  let (_, _, placeholder) = published_with_alice(&f).await;
  f.services.submissions.delete_by_id(&f.admin, placeholder).await.unwrap();
  assert!(!f.store.submission_exists(placeholder).await.unwrap());

  let err = f.services.submissions.delete_by_id(&f.admin, placeholder).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Users ───────────────────────────────────────────────────────────────────

fn registration(email: &str, role: Role) -> NewUser {
  NewUser {
    name: "New".into(),
    surname: "Comer".into(),
    role,
    email: email.into(),
    password_hash: "hash".into(),
  }
}

#[tokio::test]
async fn only_admins_register_users() {
  let f = fixture().await;
  let err = f
    .services
    .users
    .create(&f.teacher, registration("x@example.com", Role::Student))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
  assert!(f.store.find_user_by_email("x@example.com").await.unwrap().is_none());

  let user = f
    .services
    .users
    .create(&f.admin, registration("x@example.com", Role::Student))
    .await
    .unwrap();
  assert_eq!(user.role, Role::Student);
}

#[tokio::test]
async fn registration_input_is_built_only_after_the_admin_check() {
  let f = fixture().await;
  let mut built = 0;

  for principal in [Principal::anonymous(), f.teacher.clone()] {
    let err = f
      .services
      .users
      .create_with(&principal, || {
        built += 1;
        Ok::<_, Error>(registration("y@example.com", Role::Student))
      })
      .await
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
  }
  assert_eq!(built, 0);

  let user = f
    .services
    .users
    .create_with(&f.admin, || {
      built += 1;
      Ok::<_, Error>(registration("y@example.com", Role::Student))
    })
    .await
    .unwrap();
  assert_eq!(built, 1);
  assert_eq!(user.email, "y@example.com");
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
  let f = fixture().await;
  let err = f
    .services
    .users
    .create(&f.admin, registration("tess@example.com", Role::Teacher))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn lookups_by_email_and_role() {
  let f = fixture().await;
  let users = &f.services.users;

  let tess = users.find_by_email(&f.teacher, "tess@example.com").await.unwrap();
  assert_eq!(tess.role, Role::Teacher);
  let err = users.find_by_email(&f.teacher, "nobody@example.com").await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);

  let teachers = users.find_by_role(&f.teacher, Role::Teacher).await.unwrap();
  assert_eq!(teachers.len(), 1);
  let err = users.find_by_role(&f.teacher, Role::Student).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn users_may_view_themselves() {
  let f = fixture().await;
  let alice = add_user(&f.store, "Alice", Role::Student).await;
  let bob = add_user(&f.store, "Bob", Role::Student).await;
  let as_alice = Principal::from(&alice);

  assert_eq!(
    f.services.users.get_by_id(&as_alice, alice.user_id).await.unwrap().user_id,
    alice.user_id
  );
  let err = f.services.users.get_by_id(&as_alice, bob.user_id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn deleting_a_user_removes_submissions_and_enrollments() {
  let f = fixture().await;
  let (alice, assignment_id, _) = published_with_alice(&f).await;
  let bob = add_user(&f.store, "Bob", Role::Student).await;

  f.services.users.delete_by_id(&f.admin, alice.user_id).await.unwrap();

  assert!(!f.store.user_exists(alice.user_id).await.unwrap());
  assert!(f.store.submissions_for_student(alice.user_id).await.unwrap().is_empty());
  let assignment = f.store.get_assignment(assignment_id).await.unwrap().unwrap();
  let roster = f.store.course_roster(assignment.course_id).await.unwrap().unwrap();
  assert!(roster.is_empty());

  let err = f.services.users.delete_by_id(&f.teacher, bob.user_id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
  assert!(f.store.user_exists(bob.user_id).await.unwrap());
}
