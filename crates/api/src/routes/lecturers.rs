//! Lecturer CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::LecturerId;
use domain::LecturerDto;
use record_store::{Lecturer, Record, UniversityStore};
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::{IdPath, ValidatedJson};
use crate::state::AppState;
use crate::validation::{Validate, Violations};

// -- Request types --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLecturerRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLecturerRequest {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub fields: CreateLecturerRequest,
}

impl Validate for CreateLecturerRequest {
    fn validate(&self, v: &mut Violations) {
        let email = self.email.as_deref();
        v.not_blank("firstName", self.first_name.as_deref(), "First name cannot be empty")
            .not_blank("lastName", self.last_name.as_deref(), "Last name cannot be empty")
            .not_blank("title", self.title.as_deref(), "Title name cannot be empty")
            .not_blank("email", email, "Email name cannot be empty")
            .email("email", email, "Email should be valid");
    }
}

impl Validate for UpdateLecturerRequest {
    fn validate(&self, v: &mut Violations) {
        v.not_null("id", self.id.as_ref(), "Lecturer id must not be null")
            .min("id", self.id, 1, "Lecturer id should not be less than 1");
        self.fields.validate(v);
    }
}

impl From<CreateLecturerRequest> for Lecturer {
    fn from(req: CreateLecturerRequest) -> Self {
        Lecturer::new(
            req.first_name.unwrap_or_default(),
            req.last_name.unwrap_or_default(),
            req.title.unwrap_or_default(),
            req.email.unwrap_or_default(),
        )
    }
}

impl From<UpdateLecturerRequest> for Lecturer {
    fn from(req: UpdateLecturerRequest) -> Self {
        let lecturer = Lecturer::from(req.fields);
        match req.id {
            Some(id) => lecturer.with_id(LecturerId::new(id)),
            None => lecturer,
        }
    }
}

// -- Handlers --

/// POST /lecturers
#[tracing::instrument(skip(state, req))]
pub async fn create<S: UniversityStore>(
    State(state): State<Arc<AppState<S>>>,
    ValidatedJson(req): ValidatedJson<CreateLecturerRequest>,
) -> Result<(StatusCode, Json<LecturerDto>), ApiError> {
    let lecturer = state.lecturers.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(LecturerDto::from(&lecturer))))
}

/// GET /lecturers
#[tracing::instrument(skip(state))]
pub async fn list<S: UniversityStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<LecturerDto>>, ApiError> {
    let lecturers = state.lecturers.get_all().await?;
    Ok(Json(lecturers.iter().map(LecturerDto::from).collect()))
}

/// GET /lecturers/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: UniversityStore>(
    State(state): State<Arc<AppState<S>>>,
    IdPath(id): IdPath<LecturerId>,
) -> Result<Json<LecturerDto>, ApiError> {
    let lecturer = state.lecturers.get_by_id(id).await?;
    Ok(Json(LecturerDto::from(&lecturer)))
}

/// PUT /lecturers
#[tracing::instrument(skip(state, req))]
pub async fn update<S: UniversityStore>(
    State(state): State<Arc<AppState<S>>>,
    ValidatedJson(req): ValidatedJson<UpdateLecturerRequest>,
) -> Result<StatusCode, ApiError> {
    state.lecturers.update(req.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /lecturers/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: UniversityStore>(
    State(state): State<Arc<AppState<S>>>,
    IdPath(id): IdPath<LecturerId>,
) -> Result<StatusCode, ApiError> {
    state.lecturers.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
