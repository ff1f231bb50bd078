use std::{collections::BTreeMap, sync::RwLock};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::domain::{
    models::{
        sort_schedules, NewSchedule, ProjectId, Schedule, ScheduleFilter, ScheduleId, UserId,
    },
    ports::outbound::ScheduleRepository,
    RepositoryError,
};

#[derive(Default)]
pub struct InMemoryScheduleRepository {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    next_id: i32,
    schedules: BTreeMap<ScheduleId, Schedule>,
}

impl InMemoryScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored schedule regardless of owner, for test assertions.
    pub fn all(&self) -> Vec<Schedule> {
        self.state.read().unwrap().schedules.values().cloned().collect()
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryScheduleRepository {
    async fn list_schedules(
        &self,
        owner: &UserId,
        filter: &ScheduleFilter,
    ) -> Result<Vec<Schedule>, RepositoryError> {
        let mut schedules: Vec<Schedule> = self
            .state
            .read()
            .unwrap()
            .schedules
            .values()
            .filter(|s| s.user_id == *owner && filter.matches(s))
            .cloned()
            .collect();
        sort_schedules(&mut schedules);
        Ok(schedules)
    }

    async fn get_schedule(
        &self,
        owner: &UserId,
        id: &ScheduleId,
    ) -> Result<Option<Schedule>, RepositoryError> {
        Ok(self
            .state
            .read()
            .unwrap()
            .schedules
            .get(id)
            .filter(|s| s.user_id == *owner)
            .cloned())
    }

    async fn create_schedule(&self, schedule: &NewSchedule) -> Result<Schedule, RepositoryError> {
        let mut state = self.state.write().unwrap();
        state.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let created = Schedule {
            id: ScheduleId::new(state.next_id),
            user_id: schedule.user_id,
            title: schedule.title.clone(),
            description: schedule.description.clone(),
            date: schedule.date,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
            status: schedule.status,
            priority: schedule.priority,
            project_id: schedule.project_id,
            created_at: now,
            updated_at: now,
        };
        state.schedules.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_schedule(
        &self,
        schedule: &Schedule,
    ) -> Result<Option<Schedule>, RepositoryError> {
        let mut state = self.state.write().unwrap();
        match state.schedules.get_mut(&schedule.id) {
            Some(existing) if existing.user_id == schedule.user_id => {
                *existing = Schedule {
                    updated_at: OffsetDateTime::now_utc(),
                    ..schedule.clone()
                };
                Ok(Some(existing.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_schedule(
        &self,
        owner: &UserId,
        id: &ScheduleId,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().unwrap();
        match state.schedules.get(id) {
            Some(s) if s.user_id == *owner => Ok(state.schedules.remove(id).is_some()),
            _ => Ok(false),
        }
    }

    async fn detach_project(&self, project_id: &ProjectId) -> Result<u64, RepositoryError> {
        let mut state = self.state.write().unwrap();
        let mut detached = 0;
        for schedule in state.schedules.values_mut() {
            if schedule.project_id == Some(*project_id) {
                schedule.project_id = None;
                schedule.updated_at = OffsetDateTime::now_utc();
                detached += 1;
            }
        }
        Ok(detached)
    }
}
