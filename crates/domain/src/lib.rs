//! Domain layer for the university records system.
//!
//! This crate provides:
//! - RecordService, the generic CRUD service with identity rules
//! - Student and lecturer services with their projections
//! - The Course aggregate and the service that assembles it from
//!   independently stored lecturers and students
//! - The error taxonomy shared with the HTTP boundary

pub mod course;
pub mod error;
pub mod lecturer;
pub mod service;
pub mod student;

pub use course::{
    Course, CourseDto, CourseError, CourseService, CreateCourse, Members, UpdateCourse,
};
pub use error::{DomainError, ErrorKind};
pub use lecturer::{LecturerDto, LecturerService};
pub use service::RecordService;
pub use student::{StudentDto, StudentService};
