//! Course aggregate and related types.

mod aggregate;
mod commands;
mod projection;
mod service;

pub use aggregate::{Course, Members};
pub use commands::{CreateCourse, UpdateCourse};
pub use projection::CourseDto;
pub use service::CourseService;

use common::StudentId;
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors raised by the course membership rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CourseError {
    /// The student is already a member of the course.
    #[error("Student with id {student_id} is already enrolled in course {course_name}")]
    DuplicateMember {
        student_id: StudentId,
        course_name: String,
    },

    /// The student is not a member of the course.
    #[error("Student with id {student_id} is not enrolled in course {course_name}")]
    MemberNotFound {
        student_id: StudentId,
        course_name: String,
    },

    /// A removal was attempted on a course that never had members.
    #[error("Course {course_name} has no enrolled students")]
    NoMembers { course_name: String },

    /// The entity has not been persisted yet and cannot be referenced.
    #[error("{kind} must be saved before it can be assigned to a course")]
    Transient { kind: &'static str },
}

impl CourseError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CourseError::DuplicateMember { .. } => ErrorKind::DuplicateMember,
            CourseError::MemberNotFound { .. } => ErrorKind::MemberNotFound,
            CourseError::NoMembers { .. } => ErrorKind::InvalidState,
            CourseError::Transient { .. } => ErrorKind::InvalidArgument,
        }
    }
}
