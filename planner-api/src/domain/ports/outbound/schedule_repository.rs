use async_trait::async_trait;

use crate::domain::{
    models::{NewSchedule, ProjectId, Schedule, ScheduleFilter, ScheduleId, UserId},
    RepositoryError,
};

/// Outbound port for schedule persistence.
///
/// Every read and write except [`ScheduleRepository::detach_project`] is
/// scoped to the owning user.
#[async_trait]
pub trait ScheduleRepository: Send + Sync + 'static {
    /// Schedules matching `filter`, ordered by date, start time, then id.
    async fn list_schedules(
        &self,
        owner: &UserId,
        filter: &ScheduleFilter,
    ) -> Result<Vec<Schedule>, RepositoryError>;

    async fn get_schedule(
        &self,
        owner: &UserId,
        id: &ScheduleId,
    ) -> Result<Option<Schedule>, RepositoryError>;

    async fn create_schedule(&self, schedule: &NewSchedule) -> Result<Schedule, RepositoryError>;

    /// Write back a merged schedule. Returns `None` when it no longer exists.
    async fn update_schedule(&self, schedule: &Schedule)
        -> Result<Option<Schedule>, RepositoryError>;

    /// Returns whether a row was deleted.
    async fn delete_schedule(&self, owner: &UserId, id: &ScheduleId)
        -> Result<bool, RepositoryError>;

    /// Clear the project reference on every schedule pointing at `project_id`.
    ///
    /// Returns the number of schedules detached.
    async fn detach_project(&self, project_id: &ProjectId) -> Result<u64, RepositoryError>;
}
