use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::domain::{
    models::{
        NewSchedule, ProjectId, Schedule, ScheduleFilter, ScheduleId, ScheduleStatus,
        ScheduleUpdate, UserId,
    },
    ports::{
        inbound::ScheduleService,
        outbound::{ProjectRepository, ScheduleRepository},
    },
    ScheduleError,
};

/// Implementation of the ScheduleService inbound port.
///
/// Uses the project repository only to check that referenced projects exist.
pub struct ScheduleServiceImpl<S, P> {
    schedules: Arc<S>,
    projects: Arc<P>,
}

impl<S, P> ScheduleServiceImpl<S, P> {
    pub fn new(schedules: Arc<S>, projects: Arc<P>) -> Self {
        Self {
            schedules,
            projects,
        }
    }
}

impl<S: ScheduleRepository, P: ProjectRepository> ScheduleServiceImpl<S, P> {
    async fn ensure_project_exists(&self, project_id: Option<ProjectId>) -> Result<(), ScheduleError> {
        let Some(project_id) = project_id else {
            return Ok(());
        };
        if self.projects.get_project(&project_id).await?.is_none() {
            return Err(ScheduleError::UnknownProject(project_id));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: ScheduleRepository, P: ProjectRepository> ScheduleService for ScheduleServiceImpl<S, P> {
    async fn list_schedules(
        &self,
        owner: &UserId,
        filter: &ScheduleFilter,
    ) -> Result<Vec<Schedule>, ScheduleError> {
        filter.validate()?;
        Ok(self.schedules.list_schedules(owner, filter).await?)
    }

    async fn get_schedule(
        &self,
        owner: &UserId,
        id: &ScheduleId,
    ) -> Result<Schedule, ScheduleError> {
        self.schedules
            .get_schedule(owner, id)
            .await?
            .ok_or(ScheduleError::NotFound(*id))
    }

    #[instrument(name = "create_schedule", skip(self), fields(user_id = %schedule.user_id))]
    async fn create_schedule(&self, schedule: NewSchedule) -> Result<Schedule, ScheduleError> {
        let schedule = schedule.normalized()?;
        self.ensure_project_exists(schedule.project_id).await?;

        let created = self.schedules.create_schedule(&schedule).await?;
        tracing::info!(schedule_id = %created.id, "schedule created");
        Ok(created)
    }

    #[instrument(name = "update_schedule", skip(self))]
    async fn update_schedule(
        &self,
        owner: &UserId,
        id: &ScheduleId,
        update: ScheduleUpdate,
    ) -> Result<Schedule, ScheduleError> {
        let current = self.get_schedule(owner, id).await?;

        let merged = current.merged(&update);
        update.validate_against(&merged)?;
        if let Some(project_id) = update.project_id {
            self.ensure_project_exists(project_id).await?;
        }

        self.schedules
            .update_schedule(&merged)
            .await?
            .ok_or(ScheduleError::NotFound(*id))
    }

    #[instrument(name = "set_schedule_status", skip(self))]
    async fn set_status(
        &self,
        owner: &UserId,
        id: &ScheduleId,
        status: ScheduleStatus,
    ) -> Result<Schedule, ScheduleError> {
        self.update_schedule(owner, id, ScheduleUpdate::status(status))
            .await
    }

    #[instrument(name = "delete_schedule", skip(self))]
    async fn delete_schedule(&self, owner: &UserId, id: &ScheduleId) -> Result<(), ScheduleError> {
        if !self.schedules.delete_schedule(owner, id).await? {
            return Err(ScheduleError::NotFound(*id));
        }
        tracing::info!(schedule_id = %id, "schedule deleted");
        Ok(())
    }
}
