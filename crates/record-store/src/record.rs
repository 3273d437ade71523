//! Persisted record types and the trait the store is parametrized over.

use std::collections::BTreeSet;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use common::{CourseId, LecturerId, StudentId};
use serde::{Deserialize, Serialize};

/// A row-like entity a [`RecordStore`](crate::RecordStore) can persist.
///
/// The identity is `None` until the store assigns one on first save and is
/// never changed by the store afterwards.
pub trait Record: Clone + Debug + Send + Sync + 'static {
    /// Typed surrogate key.
    type Id: Copy + Eq + Ord + Hash + Debug + Display + Into<i64> + From<i64> + Send + Sync;

    /// Human readable entity kind, used in messages and metrics labels.
    const KIND: &'static str;

    /// Returns the identity, if one has been assigned.
    fn id(&self) -> Option<Self::Id>;

    /// Returns the same record carrying the given identity.
    fn with_id(self, id: Self::Id) -> Self;
}

/// A student enrolled at the university.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    id: Option<StudentId>,
    pub first_name: String,
    pub last_name: String,
    /// Institutional identifier. Uniqueness is not enforced here.
    pub index_code: String,
    pub studies_start_year: i32,
}

impl Student {
    /// Creates a student that has not been persisted yet.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        index_code: impl Into<String>,
        studies_start_year: i32,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            index_code: index_code.into(),
            studies_start_year,
        }
    }
}

impl Record for Student {
    type Id = StudentId;

    const KIND: &'static str = "Student";

    fn id(&self) -> Option<StudentId> {
        self.id
    }

    fn with_id(mut self, id: StudentId) -> Self {
        self.id = Some(id);
        self
    }
}

/// A lecturer who may lead courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecturer {
    id: Option<LecturerId>,
    pub first_name: String,
    pub last_name: String,
    /// Academic title, e.g. "Dr".
    pub title: String,
    pub email: String,
}

impl Lecturer {
    /// Creates a lecturer that has not been persisted yet.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        title: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            title: title.into(),
            email: email.into(),
        }
    }
}

impl Record for Lecturer {
    type Id = LecturerId;

    const KIND: &'static str = "Lecturer";

    fn id(&self) -> Option<LecturerId> {
        self.id
    }

    fn with_id(mut self, id: LecturerId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Persisted form of a course: foreign keys only, never nested entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    id: Option<CourseId>,
    pub course_name: String,
    pub leading_lecturer_id: LecturerId,
    pub student_ids: BTreeSet<StudentId>,
}

impl CourseRecord {
    /// Creates a course row that has not been persisted yet.
    pub fn new(
        course_name: impl Into<String>,
        leading_lecturer_id: LecturerId,
        student_ids: impl IntoIterator<Item = StudentId>,
    ) -> Self {
        Self {
            id: None,
            course_name: course_name.into(),
            leading_lecturer_id,
            student_ids: student_ids.into_iter().collect(),
        }
    }
}

impl Record for CourseRecord {
    type Id = CourseId;

    const KIND: &'static str = "Course";

    fn id(&self) -> Option<CourseId> {
        self.id
    }

    fn with_id(mut self, id: CourseId) -> Self {
        self.id = Some(id);
        self
    }
}
