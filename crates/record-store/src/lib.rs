//! Relational record store for students, lecturers and courses.
//!
//! The [`RecordStore`] trait is parametrized per record type; both engines
//! ([`InMemoryStore`] and [`PostgresStore`]) implement it for all three
//! records and enforce the same referential constraints.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use common::{CourseId, LecturerId, StudentId};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use record::{CourseRecord, Lecturer, Record, Student};
pub use store::{RecordStore, RecordStoreExt, UniversityStore};
