use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{CourseId, LecturerId, StudentId};
use tokio::sync::RwLock;

use crate::{CourseRecord, Lecturer, Record, RecordStore, Result, StoreError, Student};

/// One table: rows keyed by id plus the last id handed out.
#[derive(Debug)]
struct Table<R: Record> {
    rows: BTreeMap<R::Id, R>,
    last_id: i64,
}

impl<R: Record> Default for Table<R> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<R: Record> Table<R> {
    fn contains(&self, id: R::Id) -> bool {
        self.rows.contains_key(&id)
    }

    fn get(&self, id: R::Id) -> Option<R> {
        self.rows.get(&id).cloned()
    }

    fn list(&self) -> Vec<R> {
        self.rows.values().cloned().collect()
    }

    fn upsert(&mut self, record: R) -> R {
        let (id, record) = match record.id() {
            Some(id) => (id, record),
            None => {
                self.last_id += 1;
                let id = R::Id::from(self.last_id);
                (id, record.with_id(id))
            }
        };

        // Explicit ids must never be handed out again by the sequence.
        let raw: i64 = id.into();
        self.last_id = self.last_id.max(raw);

        self.rows.insert(id, record.clone());
        record
    }

    fn remove(&mut self, id: R::Id) {
        self.rows.remove(&id);
    }
}

#[derive(Debug, Default)]
struct Tables {
    students: Table<Student>,
    lecturers: Table<Lecturer>,
    courses: Table<CourseRecord>,
}

impl Tables {
    fn course_enrolling(&self, student_id: StudentId) -> Option<CourseId> {
        self.courses
            .rows
            .iter()
            .find(|(_, course)| course.student_ids.contains(&student_id))
            .map(|(id, _)| *id)
    }

    fn course_led_by(&self, lecturer_id: LecturerId) -> Option<CourseId> {
        self.courses
            .rows
            .iter()
            .find(|(_, course)| course.leading_lecturer_id == lecturer_id)
            .map(|(id, _)| *id)
    }

    fn check_references(&self, course: &CourseRecord) -> Result<()> {
        if !self.lecturers.contains(course.leading_lecturer_id) {
            return Err(StoreError::Constraint {
                kind: CourseRecord::KIND,
                detail: format!(
                    "leading lecturer {} does not exist",
                    course.leading_lecturer_id
                ),
            });
        }

        if let Some(missing) = course
            .student_ids
            .iter()
            .find(|id| !self.students.contains(**id))
        {
            return Err(StoreError::Constraint {
                kind: CourseRecord::KIND,
                detail: format!("student {missing} does not exist"),
            });
        }

        Ok(())
    }
}

/// In-memory relational store.
///
/// Holds all three tables behind a single lock, so every operation observes
/// and enforces the same referential constraints as the PostgreSQL schema.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all tables and resets the id sequences.
    pub async fn clear(&self) {
        *self.tables.write().await = Tables::default();
    }
}

#[async_trait]
impl RecordStore<Student> for InMemoryStore {
    async fn exists(&self, id: StudentId) -> Result<bool> {
        Ok(self.tables.read().await.students.contains(id))
    }

    async fn get(&self, id: StudentId) -> Result<Option<Student>> {
        Ok(self.tables.read().await.students.get(id))
    }

    async fn list(&self) -> Result<Vec<Student>> {
        Ok(self.tables.read().await.students.list())
    }

    async fn save(&self, record: Student) -> Result<Student> {
        Ok(self.tables.write().await.students.upsert(record))
    }

    async fn delete(&self, id: StudentId) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(course_id) = tables.course_enrolling(id) {
            return Err(StoreError::Constraint {
                kind: Student::KIND,
                detail: format!("student {id} is enrolled in course {course_id}"),
            });
        }
        tables.students.remove(id);
        Ok(())
    }
}

#[async_trait]
impl RecordStore<Lecturer> for InMemoryStore {
    async fn exists(&self, id: LecturerId) -> Result<bool> {
        Ok(self.tables.read().await.lecturers.contains(id))
    }

    async fn get(&self, id: LecturerId) -> Result<Option<Lecturer>> {
        Ok(self.tables.read().await.lecturers.get(id))
    }

    async fn list(&self) -> Result<Vec<Lecturer>> {
        Ok(self.tables.read().await.lecturers.list())
    }

    async fn save(&self, record: Lecturer) -> Result<Lecturer> {
        Ok(self.tables.write().await.lecturers.upsert(record))
    }

    async fn delete(&self, id: LecturerId) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(course_id) = tables.course_led_by(id) {
            return Err(StoreError::Constraint {
                kind: Lecturer::KIND,
                detail: format!("lecturer {id} leads course {course_id}"),
            });
        }
        tables.lecturers.remove(id);
        Ok(())
    }
}

#[async_trait]
impl RecordStore<CourseRecord> for InMemoryStore {
    async fn exists(&self, id: CourseId) -> Result<bool> {
        Ok(self.tables.read().await.courses.contains(id))
    }

    async fn get(&self, id: CourseId) -> Result<Option<CourseRecord>> {
        Ok(self.tables.read().await.courses.get(id))
    }

    async fn list(&self) -> Result<Vec<CourseRecord>> {
        Ok(self.tables.read().await.courses.list())
    }

    async fn save(&self, record: CourseRecord) -> Result<CourseRecord> {
        let mut tables = self.tables.write().await;
        tables.check_references(&record)?;
        Ok(tables.courses.upsert(record))
    }

    async fn delete(&self, id: CourseId) -> Result<()> {
        // Membership lives on the course row, so nothing else to cascade.
        self.tables.write().await.courses.remove(id);
        Ok(())
    }
}
