//! In-memory mirrors of the server's projects and schedules.
//!
//! Every mutation is applied locally first and then sent to the backend.
//! When the call fails the local change is rolled back and the error is
//! returned to the caller.

use async_trait::async_trait;
use time::{Date, OffsetDateTime};

use crate::{
    api::dto::{
        NewProject, NewSchedule, Priority, Project, ProjectPatch, Schedule, ScheduleQuery,
        SchedulePatch, ScheduleStatus,
    },
    error::ClientError,
};

pub const DEFAULT_PROJECT_COLOR: &str = "#3B82F6";

/// The remote operations the stores depend on.
#[async_trait]
pub trait PlannerBackend: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>, ClientError>;
    async fn create_project(&self, project: &NewProject) -> Result<Project, ClientError>;
    async fn update_project(&self, id: i32, patch: &ProjectPatch)
        -> Result<Project, ClientError>;
    async fn delete_project(&self, id: i32) -> Result<(), ClientError>;

    async fn list_schedules(&self, query: &ScheduleQuery) -> Result<Vec<Schedule>, ClientError>;
    async fn create_schedule(&self, schedule: &NewSchedule) -> Result<Schedule, ClientError>;
    async fn update_schedule(
        &self,
        id: i32,
        patch: &SchedulePatch,
    ) -> Result<Schedule, ClientError>;
    async fn set_schedule_status(
        &self,
        id: i32,
        status: ScheduleStatus,
    ) -> Result<Schedule, ClientError>;
    async fn delete_schedule(&self, id: i32) -> Result<(), ClientError>;
}

/// Hands out negative ids for records that exist only locally until the
/// server answers.
#[derive(Debug)]
struct TempIds(i32);

impl Default for TempIds {
    fn default() -> Self {
        Self(-1)
    }
}

impl TempIds {
    fn next(&mut self) -> i32 {
        let id = self.0;
        self.0 -= 1;
        id
    }
}

#[derive(Debug, Default)]
pub struct ProjectStore {
    projects: Vec<Project>,
    temp_ids: TempIds,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Projects ordered by name, case-insensitively.
    pub fn all(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, id: i32) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub async fn load(&mut self, backend: &dyn PlannerBackend) -> Result<(), ClientError> {
        self.projects = backend.list_projects().await?;
        self.sort();
        Ok(())
    }

    pub async fn create(
        &mut self,
        backend: &dyn PlannerBackend,
        project: NewProject,
    ) -> Result<Project, ClientError> {
        let temp_id = self.temp_ids.next();
        let now = OffsetDateTime::now_utc();
        self.projects.push(Project {
            id: temp_id,
            name: project.name.trim().to_string(),
            description: project.description.clone(),
            color: project
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_PROJECT_COLOR.to_string()),
            created_at: now,
            updated_at: now,
        });
        self.sort();

        match backend.create_project(&project).await {
            Ok(created) => {
                self.projects.retain(|p| p.id != temp_id);
                self.projects.push(created.clone());
                self.sort();
                Ok(created)
            }
            Err(err) => {
                self.projects.retain(|p| p.id != temp_id);
                Err(err)
            }
        }
    }

    pub async fn update(
        &mut self,
        backend: &dyn PlannerBackend,
        id: i32,
        patch: ProjectPatch,
    ) -> Result<Project, ClientError> {
        let snapshot = self.get(id).cloned();
        if let Some(project) = self.projects.iter_mut().find(|p| p.id == id) {
            project.apply(&patch);
        }
        self.sort();

        match backend.update_project(id, &patch).await {
            Ok(updated) => {
                self.upsert(updated.clone());
                Ok(updated)
            }
            Err(err) => {
                if let Some(snapshot) = snapshot {
                    self.upsert(snapshot);
                }
                Err(err)
            }
        }
    }

    pub async fn delete(
        &mut self,
        backend: &dyn PlannerBackend,
        id: i32,
    ) -> Result<(), ClientError> {
        let removed = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .map(|index| self.projects.remove(index));

        if let Err(err) = backend.delete_project(id).await {
            if let Some(project) = removed {
                self.upsert(project);
            }
            return Err(err);
        }
        Ok(())
    }

    fn upsert(&mut self, project: Project) {
        match self.projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project,
            None => self.projects.push(project),
        }
        self.sort();
    }

    fn sort(&mut self) {
        self.projects
            .sort_by_cached_key(|p| (p.name.to_lowercase(), p.id));
    }
}

#[derive(Debug, Default)]
pub struct ScheduleStore {
    schedules: Vec<Schedule>,
    temp_ids: TempIds,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules ordered by date, then start time (untimed first).
    pub fn all(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn get(&self, id: i32) -> Option<&Schedule> {
        self.schedules.iter().find(|s| s.id == id)
    }

    pub fn by_date(&self, date: Date) -> Vec<&Schedule> {
        self.schedules.iter().filter(|s| s.date == date).collect()
    }

    /// Replace the local contents with the server's answer to `query`.
    pub async fn load(
        &mut self,
        backend: &dyn PlannerBackend,
        query: &ScheduleQuery,
    ) -> Result<(), ClientError> {
        self.schedules = backend.list_schedules(query).await?;
        self.sort();
        Ok(())
    }

    pub async fn create(
        &mut self,
        backend: &dyn PlannerBackend,
        schedule: NewSchedule,
    ) -> Result<Schedule, ClientError> {
        let temp_id = self.temp_ids.next();
        let now = OffsetDateTime::now_utc();
        self.schedules.push(Schedule {
            id: temp_id,
            user_id: 0,
            title: schedule.title.trim().to_string(),
            description: schedule.description.clone(),
            date: schedule.date,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
            status: schedule.status.unwrap_or(ScheduleStatus::Planned),
            priority: schedule.priority.unwrap_or(Priority::Medium),
            project_id: schedule.project_id,
            created_at: now,
            updated_at: now,
        });
        self.sort();

        match backend.create_schedule(&schedule).await {
            Ok(created) => {
                self.schedules.retain(|s| s.id != temp_id);
                self.schedules.push(created.clone());
                self.sort();
                Ok(created)
            }
            Err(err) => {
                self.schedules.retain(|s| s.id != temp_id);
                Err(err)
            }
        }
    }

    pub async fn update(
        &mut self,
        backend: &dyn PlannerBackend,
        id: i32,
        patch: SchedulePatch,
    ) -> Result<Schedule, ClientError> {
        let snapshot = self.apply_locally(id, &patch);
        let result = backend.update_schedule(id, &patch).await;
        self.settle(snapshot, result)
    }

    pub async fn set_status(
        &mut self,
        backend: &dyn PlannerBackend,
        id: i32,
        status: ScheduleStatus,
    ) -> Result<Schedule, ClientError> {
        let patch = SchedulePatch {
            status: Some(status),
            ..Default::default()
        };
        let snapshot = self.apply_locally(id, &patch);
        let result = backend.set_schedule_status(id, status).await;
        self.settle(snapshot, result)
    }

    pub async fn delete(
        &mut self,
        backend: &dyn PlannerBackend,
        id: i32,
    ) -> Result<(), ClientError> {
        let removed = self
            .schedules
            .iter()
            .position(|s| s.id == id)
            .map(|index| self.schedules.remove(index));

        if let Err(err) = backend.delete_schedule(id).await {
            if let Some(schedule) = removed {
                self.upsert(schedule);
            }
            return Err(err);
        }
        Ok(())
    }

    /// Mirror the server's `ON DELETE SET NULL` after a project is deleted.
    pub fn detach_project(&mut self, project_id: i32) -> usize {
        let mut detached = 0;
        for schedule in &mut self.schedules {
            if schedule.project_id == Some(project_id) {
                schedule.project_id = None;
                detached += 1;
            }
        }
        detached
    }

    fn apply_locally(&mut self, id: i32, patch: &SchedulePatch) -> Option<Schedule> {
        let schedule = self.schedules.iter_mut().find(|s| s.id == id)?;
        let snapshot = schedule.clone();
        schedule.apply(patch);
        self.sort();
        Some(snapshot)
    }

    fn settle(
        &mut self,
        snapshot: Option<Schedule>,
        result: Result<Schedule, ClientError>,
    ) -> Result<Schedule, ClientError> {
        match result {
            Ok(updated) => {
                self.upsert(updated.clone());
                Ok(updated)
            }
            Err(err) => {
                if let Some(snapshot) = snapshot {
                    self.upsert(snapshot);
                }
                Err(err)
            }
        }
    }

    fn upsert(&mut self, schedule: Schedule) {
        match self.schedules.iter_mut().find(|s| s.id == schedule.id) {
            Some(existing) => *existing = schedule,
            None => self.schedules.push(schedule),
        }
        self.sort();
    }

    fn sort(&mut self) {
        self.schedules
            .sort_by_key(|s| (s.date, s.start_time, s.id));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, AtomicI32, Ordering},
        Mutex,
    };

    use time::macros::{date, time};

    use super::*;

    /// Backend that keeps records in memory and can be switched to fail
    /// every call.
    #[derive(Default)]
    struct FakeBackend {
        fail: AtomicBool,
        next_id: AtomicI32,
        projects: Mutex<Vec<Project>>,
        schedules: Mutex<Vec<Schedule>>,
    }

    impl FakeBackend {
        fn failing(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), ClientError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ClientError::Api {
                    status: 500,
                    code: Some("INTERNAL".into()),
                    message: "internal server error".into(),
                });
            }
            Ok(())
        }

        fn id(&self) -> i32 {
            self.next_id.fetch_add(1, Ordering::SeqCst) + 1
        }

        fn not_found() -> ClientError {
            ClientError::Api {
                status: 404,
                code: Some("NOT_FOUND".into()),
                message: "not found".into(),
            }
        }
    }

    #[async_trait]
    impl PlannerBackend for FakeBackend {
        async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
            self.check()?;
            Ok(self.projects.lock().unwrap().clone())
        }

        async fn create_project(&self, project: &NewProject) -> Result<Project, ClientError> {
            self.check()?;
            let now = OffsetDateTime::now_utc();
            let created = Project {
                id: self.id(),
                name: project.name.trim().to_string(),
                description: project.description.clone(),
                color: project
                    .color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PROJECT_COLOR.into()),
                created_at: now,
                updated_at: now,
            };
            self.projects.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn update_project(
            &self,
            id: i32,
            patch: &ProjectPatch,
        ) -> Result<Project, ClientError> {
            self.check()?;
            let mut projects = self.projects.lock().unwrap();
            let project = projects
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(Self::not_found)?;
            project.apply(patch);
            Ok(project.clone())
        }

        async fn delete_project(&self, id: i32) -> Result<(), ClientError> {
            self.check()?;
            self.projects.lock().unwrap().retain(|p| p.id != id);
            Ok(())
        }

        async fn list_schedules(
            &self,
            query: &ScheduleQuery,
        ) -> Result<Vec<Schedule>, ClientError> {
            self.check()?;
            Ok(self
                .schedules
                .lock()
                .unwrap()
                .iter()
                .filter(|s| query.date.map_or(true, |d| s.date == d))
                .cloned()
                .collect())
        }

        async fn create_schedule(&self, schedule: &NewSchedule) -> Result<Schedule, ClientError> {
            self.check()?;
            let now = OffsetDateTime::now_utc();
            let created = Schedule {
                id: self.id(),
                user_id: 1,
                title: schedule.title.trim().to_string(),
                description: schedule.description.clone(),
                date: schedule.date,
                start_time: schedule.start_time,
                end_time: schedule.end_time,
                status: schedule.status.unwrap_or(ScheduleStatus::Planned),
                priority: schedule.priority.unwrap_or(Priority::Medium),
                project_id: schedule.project_id,
                created_at: now,
                updated_at: now,
            };
            self.schedules.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn update_schedule(
            &self,
            id: i32,
            patch: &SchedulePatch,
        ) -> Result<Schedule, ClientError> {
            self.check()?;
            let mut schedules = self.schedules.lock().unwrap();
            let schedule = schedules
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or_else(Self::not_found)?;
            schedule.apply(patch);
            Ok(schedule.clone())
        }

        async fn set_schedule_status(
            &self,
            id: i32,
            status: ScheduleStatus,
        ) -> Result<Schedule, ClientError> {
            let patch = SchedulePatch {
                status: Some(status),
                ..Default::default()
            };
            self.update_schedule(id, &patch).await
        }

        async fn delete_schedule(&self, id: i32) -> Result<(), ClientError> {
            self.check()?;
            self.schedules.lock().unwrap().retain(|s| s.id != id);
            Ok(())
        }
    }

    fn standup() -> NewSchedule {
        NewSchedule {
            start_time: Some(time!(09:00)),
            end_time: Some(time!(09:15)),
            ..NewSchedule::new("Standup", date!(2024 - 05 - 01))
        }
    }

    #[tokio::test]
    async fn create_replaces_temporary_record_with_server_copy() {
        let backend = FakeBackend::default();
        let mut store = ScheduleStore::new();

        let created = store.create(&backend, standup()).await.unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(store.all().len(), 1);
        assert_eq!(store.all()[0].id, 1);
        assert!(store.all().iter().all(|s| s.id > 0));
    }

    #[tokio::test]
    async fn failed_create_leaves_no_trace() {
        let backend = FakeBackend::default();
        backend.failing(true);
        let mut store = ScheduleStore::new();

        let err = store.create(&backend, standup()).await.unwrap_err();

        assert!(matches!(err, ClientError::Api { status: 500, .. }));
        assert!(store.all().is_empty());
    }

    #[tokio::test]
    async fn failed_update_rolls_back_to_snapshot() {
        let backend = FakeBackend::default();
        let mut store = ScheduleStore::new();
        let created = store.create(&backend, standup()).await.unwrap();

        backend.failing(true);
        let patch = SchedulePatch {
            title: Some("Renamed".into()),
            ..Default::default()
        };
        assert!(store.update(&backend, created.id, patch).await.is_err());
        assert_eq!(store.get(created.id), Some(&created));

        backend.failing(false);
        let updated = store
            .set_status(&backend, created.id, ScheduleStatus::Completed)
            .await
            .unwrap();
        assert_eq!(updated.status, ScheduleStatus::Completed);
        assert_eq!(store.get(created.id).unwrap().title, "Standup");
    }

    #[tokio::test]
    async fn failed_delete_restores_the_schedule() {
        let backend = FakeBackend::default();
        let mut store = ScheduleStore::new();
        let created = store.create(&backend, standup()).await.unwrap();

        backend.failing(true);
        assert!(store.delete(&backend, created.id).await.is_err());
        assert_eq!(store.all().len(), 1);

        backend.failing(false);
        store.delete(&backend, created.id).await.unwrap();
        assert!(store.all().is_empty());
    }

    #[tokio::test]
    async fn by_date_orders_untimed_first() {
        let backend = FakeBackend::default();
        let mut store = ScheduleStore::new();

        store
            .create(
                &backend,
                NewSchedule {
                    start_time: Some(time!(14:00)),
                    ..NewSchedule::new("Review", date!(2024 - 05 - 01))
                },
            )
            .await
            .unwrap();
        store.create(&backend, standup()).await.unwrap();
        store
            .create(&backend, NewSchedule::new("Errands", date!(2024 - 05 - 01)))
            .await
            .unwrap();
        store
            .create(&backend, NewSchedule::new("Other day", date!(2024 - 05 - 02)))
            .await
            .unwrap();

        let titles: Vec<_> = store
            .by_date(date!(2024 - 05 - 01))
            .into_iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, ["Errands", "Standup", "Review"]);
    }

    #[tokio::test]
    async fn load_replaces_local_contents() {
        let backend = FakeBackend::default();
        let mut store = ScheduleStore::new();
        store.create(&backend, standup()).await.unwrap();
        store
            .create(&backend, NewSchedule::new("Other day", date!(2024 - 05 - 02)))
            .await
            .unwrap();

        store
            .load(&backend, &ScheduleQuery::on(date!(2024 - 05 - 02)))
            .await
            .unwrap();

        assert_eq!(store.all().len(), 1);
        assert_eq!(store.all()[0].title, "Other day");
    }

    #[tokio::test]
    async fn projects_stay_sorted_and_roll_back() {
        let backend = FakeBackend::default();
        let mut store = ProjectStore::new();

        for name in ["work", "Personal", "Study"] {
            store
                .create(
                    &backend,
                    NewProject {
                        name: name.into(),
                        description: None,
                        color: None,
                    },
                )
                .await
                .unwrap();
        }
        let names: Vec<_> = store.all().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Personal", "Study", "work"]);
        assert!(store.all().iter().all(|p| p.color == DEFAULT_PROJECT_COLOR));

        let work = store.all()[2].clone();
        backend.failing(true);
        let patch = ProjectPatch {
            name: Some("Alpha".into()),
            ..Default::default()
        };
        assert!(store.update(&backend, work.id, patch).await.is_err());
        assert_eq!(store.all()[2], work);

        assert!(store.delete(&backend, work.id).await.is_err());
        assert_eq!(store.all().len(), 3);
    }

    #[tokio::test]
    async fn detach_project_clears_local_references() {
        let backend = FakeBackend::default();
        let mut store = ScheduleStore::new();
        store
            .create(
                &backend,
                NewSchedule {
                    project_id: Some(7),
                    ..standup()
                },
            )
            .await
            .unwrap();

        assert_eq!(store.detach_project(7), 1);
        assert_eq!(store.all()[0].project_id, None);
    }
}
