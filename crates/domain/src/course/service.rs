//! Course service orchestrating lecturer and student resolution.

use std::collections::HashMap;

use common::{CourseId, LecturerId, StudentId};
use record_store::{
    CourseRecord, Lecturer, Record, RecordStore, StoreError, Student, UniversityStore,
};

use crate::error::DomainError;
use crate::lecturer::LecturerService;
use crate::service::RecordService;
use crate::student::StudentService;

use super::{Course, CourseError, CreateCourse, UpdateCourse};

/// Service for managing courses.
///
/// Every referenced lecturer and student is resolved before anything is
/// written, so a failed resolution leaves the store untouched.
pub struct CourseService<S: UniversityStore> {
    courses: RecordService<S, CourseRecord>,
    students: StudentService<S>,
    lecturers: LecturerService<S>,
}

impl<S: UniversityStore> Clone for CourseService<S> {
    fn clone(&self) -> Self {
        Self {
            courses: self.courses.clone(),
            students: self.students.clone(),
            lecturers: self.lecturers.clone(),
        }
    }
}

/// Entities already fetched while loading courses within one call.
#[derive(Default)]
struct Resolved {
    lecturers: HashMap<LecturerId, Lecturer>,
    students: HashMap<StudentId, Student>,
}

impl<S: UniversityStore> CourseService<S> {
    /// Creates a new course service over the given store.
    pub fn new(store: S) -> Self {
        Self {
            courses: RecordService::new(store.clone()),
            students: StudentService::new(store.clone()),
            lecturers: LecturerService::new(store),
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        self.courses.store()
    }

    /// Assembles and persists a new course.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, cmd: CreateCourse) -> Result<Course, DomainError> {
        let course = self
            .assemble(cmd.course_name, cmd.leading_lecturer_id, &cmd.student_ids)
            .await?;

        let saved = self.courses.create(course.to_record()).await?;
        let id = saved.id().ok_or(StoreError::Unassigned {
            kind: CourseRecord::KIND,
        })?;

        Ok(course.with_id(id))
    }

    /// Fetches a course with its lecturer and students resolved.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: CourseId) -> Result<Course, DomainError> {
        let record = self.courses.get_by_id(id).await?;
        let mut resolved = Resolved::default();
        self.load(record, &mut resolved).await
    }

    /// Returns every course in store order.
    #[tracing::instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<Course>, DomainError> {
        let records = self.courses.get_all().await?;
        let mut resolved = Resolved::default();

        let mut courses = Vec::with_capacity(records.len());
        for record in records {
            courses.push(self.load(record, &mut resolved).await?);
        }
        Ok(courses)
    }

    /// Replaces an existing course, rebuilding its membership from scratch.
    #[tracing::instrument(skip(self))]
    pub async fn update(&self, cmd: UpdateCourse) -> Result<Course, DomainError> {
        let course = self
            .assemble(cmd.course_name, cmd.leading_lecturer_id, &cmd.student_ids)
            .await?
            .with_id(cmd.id);

        self.courses.update(course.to_record()).await?;
        Ok(course)
    }

    /// Deletes a course. Its lecturer and students are kept.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_id(&self, id: CourseId) -> Result<(), DomainError> {
        self.courses.delete(id).await
    }

    /// Resolves every reference, then builds the aggregate through its
    /// membership rules. Nothing is written here.
    async fn assemble(
        &self,
        course_name: String,
        leading_lecturer_id: LecturerId,
        student_ids: &[StudentId],
    ) -> Result<Course, DomainError> {
        let lecturer = self.lecturers.get_by_id(leading_lecturer_id).await?;

        let mut students = Vec::with_capacity(student_ids.len());
        for &student_id in student_ids {
            students.push(self.students.get_by_id(student_id).await?);
        }

        let mut course = Course::new(course_name, lecturer)?;
        for student in students {
            if let Err(err) = course.add_student(student) {
                if matches!(err, CourseError::DuplicateMember { .. }) {
                    metrics::counter!("course_membership_rejections_total").increment(1);
                }
                tracing::warn!(error = %err, "course membership rejected");
                return Err(err.into());
            }
        }

        Ok(course)
    }

    /// Rebuilds an aggregate from its persisted form.
    async fn load(
        &self,
        record: CourseRecord,
        resolved: &mut Resolved,
    ) -> Result<Course, DomainError> {
        let course_id = record.id().ok_or(StoreError::Unassigned {
            kind: CourseRecord::KIND,
        })?;

        let lecturer = resolve(
            &self.lecturers,
            &mut resolved.lecturers,
            course_id,
            record.leading_lecturer_id,
        )
        .await?;

        let mut course = Course::new(record.course_name, lecturer)?.with_id(course_id);
        for student_id in record.student_ids {
            let student =
                resolve(&self.students, &mut resolved.students, course_id, student_id).await?;
            course.add_student(student)?;
        }

        Ok(course)
    }
}

/// Fetches a referenced record, consulting and filling the per-call cache.
async fn resolve<S, R>(
    service: &RecordService<S, R>,
    cache: &mut HashMap<R::Id, R>,
    course_id: CourseId,
    id: R::Id,
) -> Result<R, DomainError>
where
    S: RecordStore<R>,
    R: Record,
{
    if let Some(record) = cache.get(&id) {
        return Ok(record.clone());
    }

    let record = service
        .find(id)
        .await?
        .ok_or_else(|| DomainError::DanglingReference {
            kind: CourseRecord::KIND,
            id: course_id.to_string(),
            missing_kind: R::KIND,
            missing_id: id.to_string(),
        })?;

    cache.insert(id, record.clone());
    Ok(record)
}
