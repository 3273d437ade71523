//! Student service and projection.

use common::StudentId;
use record_store::{Record, Student};
use serde::{Deserialize, Serialize};

use crate::service::RecordService;

/// CRUD service for students.
pub type StudentService<S> = RecordService<S, Student>;

/// Externally visible view of a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDto {
    pub id: Option<StudentId>,
    pub first_name: String,
    pub last_name: String,
    pub index_code: String,
    pub studies_start_year: i32,
}

impl From<&Student> for StudentDto {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id(),
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            index_code: student.index_code.clone(),
            studies_start_year: student.studies_start_year,
        }
    }
}
