use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use common::{CourseId, LecturerId, StudentId};
use futures_util::TryStreamExt;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{CourseRecord, Lecturer, Record, RecordStore, Result, StoreError, Student};

/// PostgreSQL-backed record store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL record store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool to `database_url` and wraps it.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_student(row: PgRow) -> Result<Student> {
        let id: i64 = row.try_get("id")?;
        Ok(Student::new(
            row.try_get::<String, _>("first_name")?,
            row.try_get::<String, _>("last_name")?,
            row.try_get::<String, _>("index_code")?,
            row.try_get::<i32, _>("studies_start_year")?,
        )
        .with_id(StudentId::new(id)))
    }

    fn row_to_lecturer(row: PgRow) -> Result<Lecturer> {
        let id: i64 = row.try_get("id")?;
        Ok(Lecturer::new(
            row.try_get::<String, _>("first_name")?,
            row.try_get::<String, _>("last_name")?,
            row.try_get::<String, _>("title")?,
            row.try_get::<String, _>("email")?,
        )
        .with_id(LecturerId::new(id)))
    }

    fn row_to_course(row: &PgRow, student_ids: BTreeSet<StudentId>) -> Result<CourseRecord> {
        let id: i64 = row.try_get("id")?;
        let lecturer_id: i64 = row.try_get("leading_lecturer_id")?;
        Ok(CourseRecord::new(
            row.try_get::<String, _>("course_name")?,
            LecturerId::new(lecturer_id),
            student_ids,
        )
        .with_id(CourseId::new(id)))
    }
}

/// Moves a table's identity sequence past its highest id.
///
/// Needed after writing an explicit id, otherwise a later insert without one
/// can be handed a value already in use.
async fn advance_identity<'c, E>(executor: E, sql: &'static str) -> Result<()>
where
    E: sqlx::PgExecutor<'c>,
{
    sqlx::query(sql).execute(executor).await?;
    Ok(())
}

const ADVANCE_STUDENTS: &str =
    "SELECT setval(pg_get_serial_sequence('students', 'id'), (SELECT MAX(id) FROM students))";
const ADVANCE_LECTURERS: &str =
    "SELECT setval(pg_get_serial_sequence('lecturers', 'id'), (SELECT MAX(id) FROM lecturers))";
const ADVANCE_COURSES: &str =
    "SELECT setval(pg_get_serial_sequence('courses', 'id'), (SELECT MAX(id) FROM courses))";

/// Maps constraint violations to [`StoreError::Constraint`], everything else
/// to [`StoreError::Database`].
fn classify(kind: &'static str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err
        && (db_err.is_foreign_key_violation() || db_err.is_unique_violation())
    {
        return StoreError::Constraint {
            kind,
            detail: db_err
                .constraint()
                .map(|c| format!("violates {c}"))
                .unwrap_or_else(|| db_err.message().to_string()),
        };
    }
    StoreError::Database(err)
}

#[async_trait]
impl RecordStore<Student> for PostgresStore {
    async fn exists(&self, id: StudentId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE id = $1)")
            .bind(id.as_i64())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn get(&self, id: StudentId) -> Result<Option<Student>> {
        let row = sqlx::query(
            r#"
            SELECT id, first_name, last_name, index_code, studies_start_year
            FROM students
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_student).transpose()
    }

    async fn list(&self) -> Result<Vec<Student>> {
        let rows = sqlx::query(
            r#"
            SELECT id, first_name, last_name, index_code, studies_start_year
            FROM students
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_student).collect()
    }

    async fn save(&self, record: Student) -> Result<Student> {
        let row = match record.id() {
            None => sqlx::query(
                r#"
                INSERT INTO students (first_name, last_name, index_code, studies_start_year)
                VALUES ($1, $2, $3, $4)
                RETURNING id, first_name, last_name, index_code, studies_start_year
                "#,
            )
            .bind(&record.first_name)
            .bind(&record.last_name)
            .bind(&record.index_code)
            .bind(record.studies_start_year)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(Student::KIND, e))?,
            Some(id) => sqlx::query(
                r#"
                INSERT INTO students (id, first_name, last_name, index_code, studies_start_year)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (id) DO UPDATE SET
                    first_name = EXCLUDED.first_name,
                    last_name = EXCLUDED.last_name,
                    index_code = EXCLUDED.index_code,
                    studies_start_year = EXCLUDED.studies_start_year
                RETURNING id, first_name, last_name, index_code, studies_start_year
                "#,
            )
            .bind(id.as_i64())
            .bind(&record.first_name)
            .bind(&record.last_name)
            .bind(&record.index_code)
            .bind(record.studies_start_year)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(Student::KIND, e))?,
        };

        if record.id().is_some() {
            advance_identity(&self.pool, ADVANCE_STUDENTS).await?;
        }

        Self::row_to_student(row)
    }

    async fn delete(&self, id: StudentId) -> Result<()> {
        sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| classify(Student::KIND, e))?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore<Lecturer> for PostgresStore {
    async fn exists(&self, id: LecturerId) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM lecturers WHERE id = $1)")
                .bind(id.as_i64())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn get(&self, id: LecturerId) -> Result<Option<Lecturer>> {
        let row = sqlx::query(
            r#"
            SELECT id, first_name, last_name, title, email
            FROM lecturers
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_lecturer).transpose()
    }

    async fn list(&self) -> Result<Vec<Lecturer>> {
        let rows = sqlx::query(
            r#"
            SELECT id, first_name, last_name, title, email
            FROM lecturers
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_lecturer).collect()
    }

    async fn save(&self, record: Lecturer) -> Result<Lecturer> {
        let row = match record.id() {
            None => sqlx::query(
                r#"
                INSERT INTO lecturers (first_name, last_name, title, email)
                VALUES ($1, $2, $3, $4)
                RETURNING id, first_name, last_name, title, email
                "#,
            )
            .bind(&record.first_name)
            .bind(&record.last_name)
            .bind(&record.title)
            .bind(&record.email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(Lecturer::KIND, e))?,
            Some(id) => sqlx::query(
                r#"
                INSERT INTO lecturers (id, first_name, last_name, title, email)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (id) DO UPDATE SET
                    first_name = EXCLUDED.first_name,
                    last_name = EXCLUDED.last_name,
                    title = EXCLUDED.title,
                    email = EXCLUDED.email
                RETURNING id, first_name, last_name, title, email
                "#,
            )
            .bind(id.as_i64())
            .bind(&record.first_name)
            .bind(&record.last_name)
            .bind(&record.title)
            .bind(&record.email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(Lecturer::KIND, e))?,
        };

        if record.id().is_some() {
            advance_identity(&self.pool, ADVANCE_LECTURERS).await?;
        }

        Self::row_to_lecturer(row)
    }

    async fn delete(&self, id: LecturerId) -> Result<()> {
        sqlx::query("DELETE FROM lecturers WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| classify(Lecturer::KIND, e))?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore<CourseRecord> for PostgresStore {
    async fn exists(&self, id: CourseId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
            .bind(id.as_i64())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn get(&self, id: CourseId) -> Result<Option<CourseRecord>> {
        let Some(row) = sqlx::query(
            r#"
            SELECT id, course_name, leading_lecturer_id
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let student_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT student_id FROM course_students WHERE course_id = $1 ORDER BY student_id ASC",
        )
        .bind(id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        let members = student_ids.into_iter().map(StudentId::new).collect();
        Self::row_to_course(&row, members).map(Some)
    }

    async fn list(&self) -> Result<Vec<CourseRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, course_name, leading_lecturer_id
            FROM courses
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut memberships: BTreeMap<i64, BTreeSet<StudentId>> = sqlx::query(
            "SELECT course_id, student_id FROM course_students ORDER BY course_id, student_id",
        )
        .fetch(&self.pool)
        .try_fold(BTreeMap::new(), |mut acc, row| async move {
            let course_id: i64 = row.try_get("course_id")?;
            let student_id: i64 = row.try_get("student_id")?;
            acc.entry(course_id)
                .or_insert_with(BTreeSet::new)
                .insert(StudentId::new(student_id));
            Ok::<_, sqlx::Error>(acc)
        })
        .await?;

        rows.iter()
            .map(|row| {
                let id: i64 = row.try_get("id")?;
                let members = memberships.remove(&id).unwrap_or_default();
                Self::row_to_course(row, members)
            })
            .collect()
    }

    async fn save(&self, record: CourseRecord) -> Result<CourseRecord> {
        let lecturer_id = record.leading_lecturer_id.as_i64();

        // Course row and membership rows are written together or not at all.
        let mut tx = self.pool.begin().await?;

        let course_id: i64 = match record.id() {
            None => sqlx::query_scalar(
                r#"
                INSERT INTO courses (course_name, leading_lecturer_id)
                VALUES ($1, $2)
                RETURNING id
                "#,
            )
            .bind(&record.course_name)
            .bind(lecturer_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| classify(CourseRecord::KIND, e))?,
            Some(id) => sqlx::query_scalar(
                r#"
                INSERT INTO courses (id, course_name, leading_lecturer_id)
                VALUES ($1, $2, $3)
                ON CONFLICT (id) DO UPDATE SET
                    course_name = EXCLUDED.course_name,
                    leading_lecturer_id = EXCLUDED.leading_lecturer_id
                RETURNING id
                "#,
            )
            .bind(id.as_i64())
            .bind(&record.course_name)
            .bind(lecturer_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| classify(CourseRecord::KIND, e))?,
        };

        if record.id().is_some() {
            advance_identity(&mut *tx, ADVANCE_COURSES).await?;
        }

        sqlx::query("DELETE FROM course_students WHERE course_id = $1")
            .bind(course_id)
            .execute(&mut *tx)
            .await?;

        for student_id in &record.student_ids {
            sqlx::query("INSERT INTO course_students (course_id, student_id) VALUES ($1, $2)")
                .bind(course_id)
                .bind(student_id.as_i64())
                .execute(&mut *tx)
                .await
                .map_err(|e| classify(CourseRecord::KIND, e))?;
        }

        tx.commit().await?;

        tracing::debug!(
            course_id,
            members = record.student_ids.len(),
            "course row written"
        );

        Ok(record.with_id(CourseId::new(course_id)))
    }

    async fn delete(&self, id: CourseId) -> Result<()> {
        // Membership rows go with the course (ON DELETE CASCADE); students stay.
        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| classify(CourseRecord::KIND, e))?;
        Ok(())
    }
}
