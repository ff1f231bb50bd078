use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use super::{
    extract::{ApiJson, ApiPath},
    ApiError,
};
use crate::{
    adapters::inbound::http::ProjectResponse,
    app_state::AppState,
    auth::AuthUser,
    domain::models::{NewProject, ProjectId, ProjectUpdate},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/:project_id",
            get(get_project).put(update_project).delete(delete_project),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    name: String,
    description: Option<String>,
    color: Option<String>,
}

impl From<CreateProjectPayload> for NewProject {
    fn from(payload: CreateProjectPayload) -> Self {
        let mut project = NewProject::new(payload.name);
        if let Some(description) = payload.description {
            project = project.with_description(description);
        }
        if let Some(color) = payload.color {
            project = project.with_color(color);
        }
        project
    }
}

/// Partial update. An explicit `"description": null` clears the description.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectPayload {
    name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    description: Option<Option<String>>,
    color: Option<String>,
}

impl From<UpdateProjectPayload> for ProjectUpdate {
    fn from(payload: UpdateProjectPayload) -> Self {
        Self {
            name: payload.name,
            description: payload.description,
            color: payload.color,
        }
    }
}

#[instrument(name = "list_projects", skip(app_state, user), fields(username = %user.username))]
async fn list_projects(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let projects = app_state.project_service.list_projects().await?;

    let response: Vec<ProjectResponse> = projects.into_iter().map(ProjectResponse::from).collect();

    Ok(Json(response))
}

#[instrument(name = "get_project", skip(app_state, user), fields(username = %user.username))]
async fn get_project(
    user: AuthUser,
    State(app_state): State<AppState>,
    ApiPath(project_id): ApiPath<i32>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let project = app_state
        .project_service
        .get_project(&ProjectId::new(project_id))
        .await?;

    Ok(Json(project.into()))
}

#[instrument(name = "create_project", skip(app_state, user), fields(username = %user.username))]
async fn create_project(
    user: AuthUser,
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<CreateProjectPayload>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    let project = app_state
        .project_service
        .create_project(payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(project.into())))
}

#[instrument(name = "update_project", skip(app_state, user), fields(username = %user.username))]
async fn update_project(
    user: AuthUser,
    State(app_state): State<AppState>,
    ApiPath(project_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateProjectPayload>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let project = app_state
        .project_service
        .update_project(&ProjectId::new(project_id), payload.into())
        .await?;

    Ok(Json(project.into()))
}

#[instrument(name = "delete_project", skip(app_state, user), fields(username = %user.username))]
async fn delete_project(
    user: AuthUser,
    State(app_state): State<AppState>,
    ApiPath(project_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    app_state
        .project_service
        .delete_project(&ProjectId::new(project_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
