//! Lecturer service and projection.

use common::LecturerId;
use record_store::{Lecturer, Record};
use serde::{Deserialize, Serialize};

use crate::service::RecordService;

/// CRUD service for lecturers.
pub type LecturerService<S> = RecordService<S, Lecturer>;

/// Externally visible view of a lecturer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LecturerDto {
    pub id: Option<LecturerId>,
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    pub email: String,
}

impl From<&Lecturer> for LecturerDto {
    fn from(lecturer: &Lecturer) -> Self {
        Self {
            id: lecturer.id(),
            first_name: lecturer.first_name.clone(),
            last_name: lecturer.last_name.clone(),
            title: lecturer.title.clone(),
            email: lecturer.email.clone(),
        }
    }
}
