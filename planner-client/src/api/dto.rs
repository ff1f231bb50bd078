use serde::{Deserialize, Serialize, Serializer};
use time::{Date, OffsetDateTime, Time};

time::serde::format_description!(calendar_date, Date, "[year]-[month]-[day]");
time::serde::format_description!(hm_time, Time, "[hour]:[minute]");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub user: User,
}

/// Error body returned by the API for every non-2xx response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleStatus {
    Planned,
    InProgress,
    Completed,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Project {
    /// Apply a patch locally, mirroring the server's merge.
    pub fn apply(&mut self, patch: &ProjectPatch) {
        if let Some(name) = &patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "calendar_date")]
    pub date: Date,
    #[serde(with = "hm_time::option")]
    pub start_time: Option<Time>,
    #[serde(with = "hm_time::option")]
    pub end_time: Option<Time>,
    pub status: ScheduleStatus,
    pub priority: Priority,
    pub project_id: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Schedule {
    /// Apply a patch locally, mirroring the server's merge.
    pub fn apply(&mut self, patch: &SchedulePatch) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(start_time) = patch.start_time {
            self.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            self.end_time = end_time;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(project_id) = patch.project_id {
            self.project_id = project_id;
        }
    }
}

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Partial project update. `description: Some(None)` sends an explicit null.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchedule {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "calendar_date")]
    pub date: Date,
    #[serde(with = "hm_time::option", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Time>,
    #[serde(with = "hm_time::option", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Time>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ScheduleStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i32>,
}

impl NewSchedule {
    pub fn new(title: impl Into<String>, date: Date) -> Self {
        Self {
            title: title.into(),
            description: None,
            date,
            start_time: None,
            end_time: None,
            status: None,
            priority: None,
            project_id: None,
        }
    }
}

/// Partial schedule update. Fields left as `None` are not sent; `Some(None)`
/// sends an explicit null for the nullable ones.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(with = "calendar_date::option", skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(serialize_with = "serialize_patch_time", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Option<Time>>,
    #[serde(serialize_with = "serialize_patch_time", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Option<Time>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ScheduleStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<i32>>,
}

fn serialize_patch_time<S: Serializer>(
    value: &Option<Option<Time>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(Some(time)) => hm_time::serialize(time, serializer),
        _ => serializer.serialize_none(),
    }
}

#[derive(Serialize)]
pub struct StatusRequest {
    pub status: ScheduleStatus,
}

/// Filters for listing schedules. `date` excludes `from`/`to`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleQuery {
    pub date: Option<Date>,
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub status: Option<ScheduleStatus>,
    pub priority: Option<Priority>,
    pub project_id: Option<i32>,
}

impl ScheduleQuery {
    pub fn on(date: Date) -> Self {
        Self {
            date: Some(date),
            ..Default::default()
        }
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(date) = self.date {
            pairs.push(("date", format_date(date)));
        }
        if let Some(from) = self.from {
            pairs.push(("from", format_date(from)));
        }
        if let Some(to) = self.to {
            pairs.push(("to", format_date(to)));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", priority.as_str().to_string()));
        }
        if let Some(project_id) = self.project_id {
            pairs.push(("projectId", project_id.to_string()));
        }
        pairs
    }
}

pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

pub fn format_time(time: Time) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}
