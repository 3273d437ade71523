//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container and need a Docker daemon,
//! so they are ignored by default. Run with:
//!
//! ```bash
//! cargo test -p record-store --test postgres_integration -- --ignored --test-threads=1
//! ```

use std::sync::Arc;

use record_store::{
    CourseRecord, Lecturer, LecturerId, PostgresStore, Record, RecordStore, RecordStoreExt,
    StoreError, Student, StudentId,
};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PostgresStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE course_students, courses, students, lecturers RESTART IDENTITY")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

fn student(first_name: &str) -> Student {
    Student::new(first_name, "Smith", "123456", 2021)
}

fn lecturer() -> Lecturer {
    Lecturer::new("John", "Doe", "Dr", "john.doe@uni.edu")
}

#[tokio::test]
#[serial]
#[ignore = "requires a Docker daemon"]
async fn insert_assigns_identity() {
    let store = get_test_store().await;

    let saved = store.save(student("John")).await.unwrap();

    assert!(saved.id().is_some());
    assert_eq!(saved.first_name, "John");
    let fetched = RecordStore::<Student>::get(&store, saved.id().unwrap())
        .await
        .unwrap();
    assert_eq!(fetched, Some(saved));
}

#[tokio::test]
#[serial]
#[ignore = "requires a Docker daemon"]
async fn save_with_id_replaces_row() {
    let store = get_test_store().await;
    let saved = store.save(lecturer()).await.unwrap();

    let mut replacement = saved.clone();
    replacement.title = "Prof".to_string();
    store.save(replacement).await.unwrap();

    let fetched = RecordStore::<Lecturer>::get(&store, saved.id().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.title, "Prof");
    assert_eq!(RecordStoreExt::<Lecturer>::count(&store).await.unwrap(), 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires a Docker daemon"]
async fn exists_and_delete() {
    let store = get_test_store().await;
    let id = store.save(student("John")).await.unwrap().id().unwrap();

    assert!(RecordStore::<Student>::exists(&store, id).await.unwrap());
    RecordStore::<Student>::delete(&store, id).await.unwrap();
    assert!(!RecordStore::<Student>::exists(&store, id).await.unwrap());
}

#[tokio::test]
#[serial]
#[ignore = "requires a Docker daemon"]
async fn course_membership_round_trips() {
    let store = get_test_store().await;
    let lecturer = store.save(lecturer()).await.unwrap();
    let a = store.save(student("A")).await.unwrap();
    let b = store.save(student("B")).await.unwrap();

    let course = store
        .save(CourseRecord::new(
            "CS101",
            lecturer.id().unwrap(),
            [a.id().unwrap(), b.id().unwrap()],
        ))
        .await
        .unwrap();

    let fetched = RecordStore::<CourseRecord>::get(&store, course.id().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched, course);

    let all = RecordStore::<CourseRecord>::list(&store).await.unwrap();
    assert_eq!(all, vec![course]);
}

#[tokio::test]
#[serial]
#[ignore = "requires a Docker daemon"]
async fn course_save_replaces_membership() {
    let store = get_test_store().await;
    let lecturer = store.save(lecturer()).await.unwrap();
    let a = store.save(student("A")).await.unwrap();
    let c = store.save(student("C")).await.unwrap();

    let course = store
        .save(CourseRecord::new(
            "CS101",
            lecturer.id().unwrap(),
            [a.id().unwrap()],
        ))
        .await
        .unwrap();

    let replacement =
        CourseRecord::new("CS101", lecturer.id().unwrap(), [c.id().unwrap()])
            .with_id(course.id().unwrap());
    store.save(replacement).await.unwrap();

    let fetched = RecordStore::<CourseRecord>::get(&store, course.id().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        fetched.student_ids.into_iter().collect::<Vec<_>>(),
        vec![c.id().unwrap()]
    );
}

#[tokio::test]
#[serial]
#[ignore = "requires a Docker daemon"]
async fn dangling_references_are_rejected() {
    let store = get_test_store().await;

    let result = store
        .save(CourseRecord::new("CS101", LecturerId::new(999), []))
        .await;
    assert!(matches!(result, Err(StoreError::Constraint { .. })));

    let lecturer = store.save(lecturer()).await.unwrap();
    let result = store
        .save(CourseRecord::new(
            "CS101",
            lecturer.id().unwrap(),
            [StudentId::new(999)],
        ))
        .await;
    assert!(matches!(result, Err(StoreError::Constraint { .. })));

    // The failed membership insert rolled back the course row as well.
    assert_eq!(RecordStoreExt::<CourseRecord>::count(&store).await.unwrap(), 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires a Docker daemon"]
async fn referenced_rows_cannot_be_deleted() {
    let store = get_test_store().await;
    let lecturer = store.save(lecturer()).await.unwrap();
    let student = store.save(student("A")).await.unwrap();
    let course = store
        .save(CourseRecord::new(
            "CS101",
            lecturer.id().unwrap(),
            [student.id().unwrap()],
        ))
        .await
        .unwrap();

    let result = RecordStore::<Student>::delete(&store, student.id().unwrap()).await;
    assert!(result.unwrap_err().is_constraint_violation());

    let result = RecordStore::<Lecturer>::delete(&store, lecturer.id().unwrap()).await;
    assert!(result.unwrap_err().is_constraint_violation());

    // Deleting the course keeps its members.
    RecordStore::<CourseRecord>::delete(&store, course.id().unwrap())
        .await
        .unwrap();
    assert!(
        RecordStore::<Student>::exists(&store, student.id().unwrap())
            .await
            .unwrap()
    );
}

#[tokio::test]
#[serial]
#[ignore = "requires a Docker daemon"]
async fn explicit_ids_advance_the_sequence() {
    let store = get_test_store().await;

    store
        .save(student("Explicit").with_id(StudentId::new(10)))
        .await
        .unwrap();
    let next = store.save(student("Generated")).await.unwrap();
    assert_eq!(next.id(), Some(StudentId::new(11)));

    store
        .save(lecturer().with_id(LecturerId::new(5)))
        .await
        .unwrap();
    let next = store.save(lecturer()).await.unwrap();
    assert_eq!(next.id(), Some(LecturerId::new(6)));
}
