use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::{Date, OffsetDateTime, Time};

use super::{ProjectId, ScheduleId, UserId};
use crate::domain::ScheduleError;

const MAX_TITLE_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 5000;

/// Lifecycle stage of a schedule.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ScheduleStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
}

/// Urgency tag of a schedule.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// A dated task or event owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub id: ScheduleId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub date: Date,
    pub start_time: Option<Time>,
    pub end_time: Option<Time>,
    pub status: ScheduleStatus,
    pub priority: Priority,
    pub project_id: Option<ProjectId>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Schedule {
    /// Apply a partial update. Fields absent from `update` are kept as-is.
    pub fn merged(&self, update: &ScheduleUpdate) -> Schedule {
        let mut merged = self.clone();
        if let Some(title) = &update.title {
            merged.title = title.trim().to_string();
        }
        if let Some(description) = &update.description {
            merged.description = normalize_description(description.clone());
        }
        if let Some(date) = update.date {
            merged.date = date;
        }
        if let Some(start_time) = update.start_time {
            merged.start_time = start_time;
        }
        if let Some(end_time) = update.end_time {
            merged.end_time = end_time;
        }
        if let Some(status) = update.status {
            merged.status = status;
        }
        if let Some(priority) = update.priority {
            merged.priority = priority;
        }
        if let Some(project_id) = update.project_id {
            merged.project_id = project_id;
        }
        merged
    }
}

/// Data for creating a schedule.
#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub date: Date,
    pub start_time: Option<Time>,
    pub end_time: Option<Time>,
    pub status: ScheduleStatus,
    pub priority: Priority,
    pub project_id: Option<ProjectId>,
}

impl NewSchedule {
    pub fn new(user_id: UserId, title: impl Into<String>, date: Date) -> Self {
        Self {
            user_id,
            title: title.into(),
            description: None,
            date,
            start_time: None,
            end_time: None,
            status: ScheduleStatus::default(),
            priority: Priority::default(),
            project_id: None,
        }
    }

    pub fn with_times(mut self, start_time: Option<Time>, end_time: Option<Time>) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: ScheduleStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_project(mut self, project_id: Option<ProjectId>) -> Self {
        self.project_id = project_id;
        self
    }

    /// Trim input and check it against the schedule rules.
    pub fn normalized(self) -> Result<NewSchedule, ScheduleError> {
        let schedule = NewSchedule {
            title: self.title.trim().to_string(),
            description: normalize_description(self.description),
            ..self
        };
        validate_title(&schedule.title)?;
        validate_description(schedule.description.as_deref())?;
        validate_time_range(schedule.start_time, schedule.end_time)?;
        Ok(schedule)
    }
}

/// Partial schedule update.
///
/// The outer `Option` says whether a field was supplied; for nullable fields
/// the inner `Option` carries an explicit null.
#[derive(Debug, Clone, Default)]
pub struct ScheduleUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub date: Option<Date>,
    pub start_time: Option<Option<Time>>,
    pub end_time: Option<Option<Time>>,
    pub status: Option<ScheduleStatus>,
    pub priority: Option<Priority>,
    pub project_id: Option<Option<ProjectId>>,
}

impl ScheduleUpdate {
    pub fn status(status: ScheduleStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Whether the update touches any field the time-range rule depends on.
    pub fn touches_time_range(&self) -> bool {
        self.date.is_some() || self.start_time.is_some() || self.end_time.is_some()
    }

    /// Validate the supplied fields and, when needed, the merged record.
    pub fn validate_against(&self, merged: &Schedule) -> Result<(), ScheduleError> {
        if self.title.is_some() {
            validate_title(&merged.title)?;
        }
        if self.description.is_some() {
            validate_description(merged.description.as_deref())?;
        }
        if self.touches_time_range() {
            validate_time_range(merged.start_time, merged.end_time)?;
        }
        Ok(())
    }
}

/// Filters for listing a user's schedules. Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleFilter {
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub status: Option<ScheduleStatus>,
    pub priority: Option<Priority>,
    pub project_id: Option<ProjectId>,
}

impl ScheduleFilter {
    /// Restrict the filter to a single calendar day.
    pub fn on(date: Date) -> Self {
        Self {
            from: Some(date),
            to: Some(date),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if from > to => Err(ScheduleError::InvalidDateRange),
            _ => Ok(()),
        }
    }

    #[cfg(test)]
    pub fn matches(&self, schedule: &Schedule) -> bool {
        self.from.map_or(true, |from| schedule.date >= from)
            && self.to.map_or(true, |to| schedule.date <= to)
            && self.status.map_or(true, |s| schedule.status == s)
            && self.priority.map_or(true, |p| schedule.priority == p)
            && self
                .project_id
                .map_or(true, |p| schedule.project_id == Some(p))
    }
}

/// Start must strictly precede end when both are present.
pub fn validate_time_range(start: Option<Time>, end: Option<Time>) -> Result<(), ScheduleError> {
    match (start, end) {
        (Some(start), Some(end)) if start >= end => Err(ScheduleError::InvalidTimeRange {
            start: format_hm(start),
            end: format_hm(end),
        }),
        _ => Ok(()),
    }
}

/// Listing order: date, then untimed before timed, then start time, then id.
#[cfg(test)]
pub fn sort_schedules(schedules: &mut [Schedule]) {
    schedules.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.start_time.cmp(&b.start_time))
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn format_hm(t: Time) -> String {
    format!("{:02}:{:02}", t.hour(), t.minute())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

fn validate_title(title: &str) -> Result<(), ScheduleError> {
    if title.is_empty() {
        return Err(ScheduleError::Validation("title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ScheduleError::Validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), ScheduleError> {
    match description {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LEN => Err(ScheduleError::Validation(
            format!("description must be at most {MAX_DESCRIPTION_LEN} characters"),
        )),
        _ => Ok(()),
    }
}
