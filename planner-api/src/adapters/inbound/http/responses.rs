//! HTTP response types for the planner endpoints.
//!
//! These types serialize to the camelCase JSON the web client expects.

use serde::Serialize;
use time::{Date, OffsetDateTime, Time};

use super::formats::{calendar_date, time_of_day};
use crate::domain::models::{AuthGrant, Priority, Project, Schedule, ScheduleStatus, User};

/// Public view of a user. The password hash never leaves the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_i32(),
            username: user.username,
            display_name: user.display_name,
            created_at: user.created_at,
        }
    }
}

/// Response for login and registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    /// Always `Bearer`.
    pub token_type: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub user: UserResponse,
}

impl From<AuthGrant> for AuthResponse {
    fn from(grant: AuthGrant) -> Self {
        Self {
            token: grant.token.token,
            token_type: "Bearer",
            expires_at: grant.token.expires_at,
            user: grant.user.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id.as_i32(),
            name: project.name,
            description: project.description,
            color: project.color,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    /// Calendar day (`YYYY-MM-DD`).
    #[serde(with = "calendar_date")]
    pub date: Date,
    /// `HH:MM`, or null for an all-day item.
    #[serde(with = "time_of_day::option")]
    pub start_time: Option<Time>,
    #[serde(with = "time_of_day::option")]
    pub end_time: Option<Time>,
    pub status: ScheduleStatus,
    pub priority: Priority,
    pub project_id: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Schedule> for ScheduleResponse {
    fn from(schedule: Schedule) -> Self {
        Self {
            id: schedule.id.as_i32(),
            user_id: schedule.user_id.as_i32(),
            title: schedule.title,
            description: schedule.description,
            date: schedule.date,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
            status: schedule.status,
            priority: schedule.priority,
            project_id: schedule.project_id.map(|id| id.as_i32()),
            created_at: schedule.created_at,
            updated_at: schedule.updated_at,
        }
    }
}
