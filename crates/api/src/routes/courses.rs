//! Course endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::{CourseId, LecturerId, StudentId};
use domain::{CourseDto, CreateCourse, UpdateCourse};
use record_store::UniversityStore;
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::{IdPath, ValidatedJson};
use crate::state::AppState;
use crate::validation::{Validate, Violations};

// -- Request types --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub course_name: Option<String>,
    pub leading_lecturer_id: Option<LecturerId>,
    pub students_ids: Option<Vec<StudentId>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCourseRequest {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub fields: CreateCourseRequest,
}

impl Validate for CreateCourseRequest {
    fn validate(&self, v: &mut Violations) {
        v.not_blank(
            "courseName",
            self.course_name.as_deref(),
            "Course name must not be empty",
        )
        .not_null(
            "leadingLecturerId",
            self.leading_lecturer_id.as_ref(),
            "Leading lecturer id must not be null",
        )
        .not_null(
            "studentsIds",
            self.students_ids.as_ref(),
            "Students ids must not be null",
        );
    }
}

impl Validate for UpdateCourseRequest {
    fn validate(&self, v: &mut Violations) {
        v.not_null("id", self.id.as_ref(), "Course id must not be null")
            .min("id", self.id, 1, "Course id should not be less than 1");
        self.fields.validate(v);
    }
}

impl CreateCourseRequest {
    /// Splits a validated request into its parts.
    fn into_parts(self) -> Result<(String, LecturerId, Vec<StudentId>), ApiError> {
        let leading_lecturer_id = self.leading_lecturer_id.ok_or_else(|| {
            ApiError::InvalidArgument("Leading lecturer id must not be null".to_string())
        })?;
        Ok((
            self.course_name.unwrap_or_default(),
            leading_lecturer_id,
            self.students_ids.unwrap_or_default(),
        ))
    }
}

// -- Handlers --

/// POST /courses
#[tracing::instrument(skip(state, req))]
pub async fn create<S: UniversityStore>(
    State(state): State<Arc<AppState<S>>>,
    ValidatedJson(req): ValidatedJson<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CourseDto>), ApiError> {
    let (course_name, leading_lecturer_id, student_ids) = req.into_parts()?;

    let course = state
        .courses
        .create(CreateCourse::new(
            course_name,
            leading_lecturer_id,
            student_ids,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(course.to_projection())))
}

/// GET /courses
#[tracing::instrument(skip(state))]
pub async fn list<S: UniversityStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<CourseDto>>, ApiError> {
    let courses = state.courses.get_all().await?;
    Ok(Json(courses.iter().map(|c| c.to_projection()).collect()))
}

/// GET /courses/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: UniversityStore>(
    State(state): State<Arc<AppState<S>>>,
    IdPath(id): IdPath<CourseId>,
) -> Result<Json<CourseDto>, ApiError> {
    let course = state.courses.get_by_id(id).await?;
    Ok(Json(course.to_projection()))
}

/// PUT /courses
#[tracing::instrument(skip(state, req))]
pub async fn update<S: UniversityStore>(
    State(state): State<Arc<AppState<S>>>,
    ValidatedJson(req): ValidatedJson<UpdateCourseRequest>,
) -> Result<Json<CourseDto>, ApiError> {
    let id = req
        .id
        .map(CourseId::new)
        .ok_or_else(|| ApiError::InvalidArgument("Course id must not be null".to_string()))?;
    let (course_name, leading_lecturer_id, student_ids) = req.fields.into_parts()?;

    let course = state
        .courses
        .update(UpdateCourse::new(
            id,
            course_name,
            leading_lecturer_id,
            student_ids,
        ))
        .await?;

    Ok(Json(course.to_projection()))
}

/// DELETE /courses/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: UniversityStore>(
    State(state): State<Arc<AppState<S>>>,
    IdPath(id): IdPath<CourseId>,
) -> Result<StatusCode, ApiError> {
    state.courses.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_all_reported() {
        let req: UpdateCourseRequest = serde_json::from_value(serde_json::json!({})).unwrap();

        let mut v = Violations::new();
        req.validate(&mut v);
        let fields: Vec<_> = v.into_inner().into_iter().map(|f| f.field).collect();

        assert_eq!(
            fields,
            vec!["id", "courseName", "leadingLecturerId", "studentsIds"]
        );
    }

    #[test]
    fn empty_student_list_is_allowed() {
        let req: CreateCourseRequest = serde_json::from_value(serde_json::json!({
            "courseName": "CS101",
            "leadingLecturerId": 1,
            "studentsIds": []
        }))
        .unwrap();

        let mut v = Violations::new();
        req.validate(&mut v);
        assert!(v.is_empty());

        let (name, lecturer, students) = req.into_parts().unwrap();
        assert_eq!(name, "CS101");
        assert_eq!(lecturer, LecturerId::new(1));
        assert!(students.is_empty());
    }
}
