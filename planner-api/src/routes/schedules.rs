use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use time::{Date, Time};
use tracing::instrument;

use super::{
    extract::{ApiJson, ApiPath, ApiQuery},
    ApiError,
};
use crate::{
    adapters::inbound::http::{
        formats::{calendar_date, parse_calendar_date, time_of_day},
        ScheduleResponse,
    },
    app_state::AppState,
    auth::AuthUser,
    domain::models::{
        NewSchedule, Priority, ProjectId, ScheduleFilter, ScheduleId, ScheduleStatus,
        ScheduleUpdate, UserId,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_schedules).post(create_schedule))
        .route(
            "/:schedule_id",
            get(get_schedule).put(update_schedule).delete(delete_schedule),
        )
        .route("/:schedule_id/status", patch(set_status))
}

/// Query filters for `GET /schedules`.
///
/// `date` selects a single calendar day and cannot be combined with
/// `from`/`to`. Status and priority match case-insensitively. Date-time
/// values should be percent-encoded; an unencoded `+` offset arrives as a
/// space and is read back as `+`.
#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleQuery {
    date: Option<String>,
    from: Option<String>,
    to: Option<String>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    status: Option<ScheduleStatus>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    priority: Option<Priority>,
    project_id: Option<i32>,
}

impl ScheduleQuery {
    fn into_filter(self) -> Result<ScheduleFilter, ApiError> {
        let parse = |raw: Option<String>| -> Result<Option<Date>, ApiError> {
            raw.map(|raw| parse_calendar_date(&raw).map_err(ApiError::bad_request))
                .transpose()
        };

        let dates = match self.date {
            Some(_) if self.from.is_some() || self.to.is_some() => {
                return Err(ApiError::validation(
                    "'date' cannot be combined with 'from' or 'to'",
                ));
            }
            Some(date) => {
                ScheduleFilter::on(parse_calendar_date(&date).map_err(ApiError::bad_request)?)
            }
            None => ScheduleFilter {
                from: parse(self.from)?,
                to: parse(self.to)?,
                ..Default::default()
            },
        };

        Ok(ScheduleFilter {
            status: self.status,
            priority: self.priority,
            project_id: self.project_id.map(ProjectId::new),
            ..dates
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchedulePayload {
    title: String,
    description: Option<String>,
    #[serde(with = "calendar_date")]
    date: Date,
    #[serde(default, with = "time_of_day::option")]
    start_time: Option<Time>,
    #[serde(default, with = "time_of_day::option")]
    end_time: Option<Time>,
    status: Option<ScheduleStatus>,
    priority: Option<Priority>,
    project_id: Option<i32>,
}

impl CreateSchedulePayload {
    fn into_new_schedule(self, owner: UserId) -> NewSchedule {
        let mut schedule = NewSchedule::new(owner, self.title, self.date)
            .with_times(self.start_time, self.end_time)
            .with_status(self.status.unwrap_or_default())
            .with_priority(self.priority.unwrap_or_default())
            .with_project(self.project_id.map(ProjectId::new));
        if let Some(description) = self.description {
            schedule = schedule.with_description(description);
        }
        schedule
    }
}

/// Partial update. Absent fields are left untouched; `description`,
/// `startTime`, `endTime` and `projectId` may be set to null explicitly.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSchedulePayload {
    title: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    description: Option<Option<String>>,
    #[serde(default, deserialize_with = "calendar_date::option::deserialize")]
    date: Option<Date>,
    #[serde(default, deserialize_with = "time_of_day::double_option::deserialize")]
    start_time: Option<Option<Time>>,
    #[serde(default, deserialize_with = "time_of_day::double_option::deserialize")]
    end_time: Option<Option<Time>>,
    status: Option<ScheduleStatus>,
    priority: Option<Priority>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    project_id: Option<Option<i32>>,
}

impl From<UpdateSchedulePayload> for ScheduleUpdate {
    fn from(payload: UpdateSchedulePayload) -> Self {
        Self {
            title: payload.title,
            description: payload.description,
            date: payload.date,
            start_time: payload.start_time,
            end_time: payload.end_time,
            status: payload.status,
            priority: payload.priority,
            project_id: payload.project_id.map(|id| id.map(ProjectId::new)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    status: ScheduleStatus,
}

#[instrument(name = "list_schedules", skip(app_state, user), fields(username = %user.username))]
async fn list_schedules(
    user: AuthUser,
    State(app_state): State<AppState>,
    ApiQuery(query): ApiQuery<ScheduleQuery>,
) -> Result<Json<Vec<ScheduleResponse>>, ApiError> {
    let filter = query.into_filter()?;

    let schedules = app_state
        .schedule_service
        .list_schedules(&user.id, &filter)
        .await?;

    let response: Vec<ScheduleResponse> = schedules.into_iter().map(Into::into).collect();

    Ok(Json(response))
}

#[instrument(name = "get_schedule", skip(app_state, user), fields(username = %user.username))]
async fn get_schedule(
    user: AuthUser,
    State(app_state): State<AppState>,
    ApiPath(schedule_id): ApiPath<i32>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let schedule = app_state
        .schedule_service
        .get_schedule(&user.id, &ScheduleId::new(schedule_id))
        .await?;

    Ok(Json(schedule.into()))
}

#[instrument(name = "create_schedule", skip(app_state, user), fields(username = %user.username))]
async fn create_schedule(
    user: AuthUser,
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<CreateSchedulePayload>,
) -> Result<(StatusCode, Json<ScheduleResponse>), ApiError> {
    let schedule = app_state
        .schedule_service
        .create_schedule(payload.into_new_schedule(user.id))
        .await?;

    Ok((StatusCode::CREATED, Json(schedule.into())))
}

#[instrument(name = "update_schedule", skip(app_state, user), fields(username = %user.username))]
async fn update_schedule(
    user: AuthUser,
    State(app_state): State<AppState>,
    ApiPath(schedule_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateSchedulePayload>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let schedule = app_state
        .schedule_service
        .update_schedule(&user.id, &ScheduleId::new(schedule_id), payload.into())
        .await?;

    Ok(Json(schedule.into()))
}

#[instrument(name = "set_schedule_status", skip(app_state, user), fields(username = %user.username))]
async fn set_status(
    user: AuthUser,
    State(app_state): State<AppState>,
    ApiPath(schedule_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<StatusPayload>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let schedule = app_state
        .schedule_service
        .set_status(&user.id, &ScheduleId::new(schedule_id), payload.status)
        .await?;

    Ok(Json(schedule.into()))
}

#[instrument(name = "delete_schedule", skip(app_state, user), fields(username = %user.username))]
async fn delete_schedule(
    user: AuthUser,
    State(app_state): State<AppState>,
    ApiPath(schedule_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    app_state
        .schedule_service
        .delete_schedule(&user.id, &ScheduleId::new(schedule_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
