//! Shared identity types for the university records service.

mod types;

pub use types::{CourseId, LecturerId, StudentId};
