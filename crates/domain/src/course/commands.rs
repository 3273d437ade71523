//! Course commands.

use common::{CourseId, LecturerId, StudentId};

/// Command to create a new course.
#[derive(Debug, Clone)]
pub struct CreateCourse {
    pub course_name: String,

    /// Lecturer who leads the course. Must already exist.
    pub leading_lecturer_id: LecturerId,

    /// Students to enroll, in request order. Repeats are rejected.
    pub student_ids: Vec<StudentId>,
}

impl CreateCourse {
    /// Creates a new CreateCourse command.
    pub fn new(
        course_name: impl Into<String>,
        leading_lecturer_id: LecturerId,
        student_ids: impl IntoIterator<Item = StudentId>,
    ) -> Self {
        Self {
            course_name: course_name.into(),
            leading_lecturer_id,
            student_ids: student_ids.into_iter().collect(),
        }
    }
}

/// Command to replace an existing course.
///
/// Every field is overwritten. Students missing from `student_ids` are
/// dropped from the course.
#[derive(Debug, Clone)]
pub struct UpdateCourse {
    pub id: CourseId,
    pub course_name: String,
    pub leading_lecturer_id: LecturerId,
    pub student_ids: Vec<StudentId>,
}

impl UpdateCourse {
    /// Creates a new UpdateCourse command.
    pub fn new(
        id: CourseId,
        course_name: impl Into<String>,
        leading_lecturer_id: LecturerId,
        student_ids: impl IntoIterator<Item = StudentId>,
    ) -> Self {
        Self {
            id,
            course_name: course_name.into(),
            leading_lecturer_id,
            student_ids: student_ids.into_iter().collect(),
        }
    }
}
