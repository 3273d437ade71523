//! Course read model.

use common::CourseId;
use serde::{Deserialize, Serialize};

use crate::lecturer::LecturerDto;
use crate::student::StudentDto;

/// Fully expanded view of a course.
///
/// Students are listed in ascending id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    pub id: Option<CourseId>,
    pub course_name: String,
    pub leading_lecturer_dto: LecturerDto,
    pub student_dtos: Vec<StudentDto>,
}
