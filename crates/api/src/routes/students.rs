//! Student CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::StudentId;
use domain::StudentDto;
use record_store::{Record, Student, UniversityStore};
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::{IdPath, ValidatedJson};
use crate::state::AppState;
use crate::validation::{Validate, Violations};

// -- Request types --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub index_code: Option<String>,
    pub studies_start_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub fields: CreateStudentRequest,
}

impl CreateStudentRequest {
    fn validate_fields(&self, v: &mut Violations, year: Option<i64>) {
        v.not_blank("firstName", self.first_name.as_deref(), "First name cannot be empty")
            .not_blank("lastName", self.last_name.as_deref(), "Last name cannot be empty")
            .not_blank("indexCode", self.index_code.as_deref(), "Index code cannot be empty")
            .min(
                "studiesStartYear",
                year,
                2000,
                "Studies start year should not be less than 2000",
            )
            .max(
                "studiesStartYear",
                year,
                2099,
                "Studies start year should not be greater than 2099",
            );
    }
}

impl Validate for CreateStudentRequest {
    /// An absent year counts as 0 and fails the lower bound.
    fn validate(&self, v: &mut Violations) {
        let year = self.studies_start_year.map_or(0, i64::from);
        self.validate_fields(v, Some(year));
    }
}

impl Validate for UpdateStudentRequest {
    fn validate(&self, v: &mut Violations) {
        v.not_null("id", self.id.as_ref(), "Student id must not be null")
            .min("id", self.id, 1, "Student id should not be less than 1")
            .not_null(
                "studiesStartYear",
                self.fields.studies_start_year.as_ref(),
                "Studies start year must not be null",
            );
        let year = self.fields.studies_start_year.map(i64::from);
        self.fields.validate_fields(v, year);
    }
}

impl CreateStudentRequest {
    fn into_student(self) -> Student {
        Student::new(
            self.first_name.unwrap_or_default(),
            self.last_name.unwrap_or_default(),
            self.index_code.unwrap_or_default(),
            self.studies_start_year.unwrap_or_default(),
        )
    }
}

impl UpdateStudentRequest {
    fn into_student(self) -> Student {
        let student = self.fields.into_student();
        match self.id {
            Some(id) => student.with_id(StudentId::new(id)),
            None => student,
        }
    }
}

// -- Handlers --

/// POST /students
#[tracing::instrument(skip(state, req))]
pub async fn create<S: UniversityStore>(
    State(state): State<Arc<AppState<S>>>,
    ValidatedJson(req): ValidatedJson<CreateStudentRequest>,
) -> Result<(StatusCode, Json<StudentDto>), ApiError> {
    let student = state.students.create(req.into_student()).await?;
    Ok((StatusCode::CREATED, Json(StudentDto::from(&student))))
}

/// GET /students
#[tracing::instrument(skip(state))]
pub async fn list<S: UniversityStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<StudentDto>>, ApiError> {
    let students = state.students.get_all().await?;
    Ok(Json(students.iter().map(StudentDto::from).collect()))
}

/// GET /students/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: UniversityStore>(
    State(state): State<Arc<AppState<S>>>,
    IdPath(id): IdPath<StudentId>,
) -> Result<Json<StudentDto>, ApiError> {
    let student = state.students.get_by_id(id).await?;
    Ok(Json(StudentDto::from(&student)))
}

/// PUT /students
#[tracing::instrument(skip(state, req))]
pub async fn update<S: UniversityStore>(
    State(state): State<Arc<AppState<S>>>,
    ValidatedJson(req): ValidatedJson<UpdateStudentRequest>,
) -> Result<StatusCode, ApiError> {
    state.students.update(req.into_student()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /students/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: UniversityStore>(
    State(state): State<Arc<AppState<S>>>,
    IdPath(id): IdPath<StudentId>,
) -> Result<StatusCode, ApiError> {
    state.students.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
