//! HTTP handlers.

pub mod courses;
pub mod lecturers;
pub mod ops;
pub mod students;
