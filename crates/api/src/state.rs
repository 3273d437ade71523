//! Shared application state.

use domain::{CourseService, LecturerService, StudentService};
use record_store::UniversityStore;

/// Services accessible from all handlers, all over the same store.
pub struct AppState<S: UniversityStore> {
    pub students: StudentService<S>,
    pub lecturers: LecturerService<S>,
    pub courses: CourseService<S>,
}

impl<S: UniversityStore> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            students: StudentService::new(store.clone()),
            lecturers: LecturerService::new(store.clone()),
            courses: CourseService::new(store),
        }
    }
}
