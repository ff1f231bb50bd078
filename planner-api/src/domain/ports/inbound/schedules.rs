use async_trait::async_trait;

use crate::domain::{
    models::{
        NewSchedule, Schedule, ScheduleFilter, ScheduleId, ScheduleStatus, ScheduleUpdate, UserId,
    },
    ScheduleError,
};

/// Inbound port for schedule management.
///
/// All operations act on the schedules owned by `owner`; another user's
/// schedule is reported as not found.
#[async_trait]
pub trait ScheduleService: Send + Sync + 'static {
    async fn list_schedules(
        &self,
        owner: &UserId,
        filter: &ScheduleFilter,
    ) -> Result<Vec<Schedule>, ScheduleError>;

    async fn get_schedule(&self, owner: &UserId, id: &ScheduleId)
        -> Result<Schedule, ScheduleError>;

    async fn create_schedule(&self, schedule: NewSchedule) -> Result<Schedule, ScheduleError>;

    /// Merge `update` into the stored schedule and validate the result.
    async fn update_schedule(
        &self,
        owner: &UserId,
        id: &ScheduleId,
        update: ScheduleUpdate,
    ) -> Result<Schedule, ScheduleError>;

    async fn set_status(
        &self,
        owner: &UserId,
        id: &ScheduleId,
        status: ScheduleStatus,
    ) -> Result<Schedule, ScheduleError>;

    async fn delete_schedule(&self, owner: &UserId, id: &ScheduleId) -> Result<(), ScheduleError>;
}
