use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::domain::{
    models::{name_key, validate_project, NewProject, Project, ProjectId, ProjectUpdate},
    ports::{
        inbound::ProjectService,
        outbound::{ProjectRepository, ScheduleRepository},
    },
    ProjectError, RepositoryError,
};

/// Implementation of the ProjectService inbound port.
///
/// Holds the schedule repository as well, so that deleting a project can
/// detach the schedules that referenced it.
pub struct ProjectServiceImpl<P, S> {
    projects: Arc<P>,
    schedules: Arc<S>,
}

impl<P, S> ProjectServiceImpl<P, S> {
    pub fn new(projects: Arc<P>, schedules: Arc<S>) -> Self {
        Self {
            projects,
            schedules,
        }
    }
}

impl<P: ProjectRepository, S> ProjectServiceImpl<P, S> {
    async fn ensure_name_free(&self, name: &str, except: Option<ProjectId>) -> Result<(), ProjectError> {
        match self.projects.find_by_name(name).await? {
            Some(existing) if Some(existing.id) != except => {
                Err(ProjectError::NameTaken(name.to_string()))
            }
            _ => Ok(()),
        }
    }
}

fn conflict_as_name_taken(name: &str) -> impl FnOnce(RepositoryError) -> ProjectError + '_ {
    move |err| match err {
        RepositoryError::Conflict(_) => ProjectError::NameTaken(name.to_string()),
        other => ProjectError::Repository(other),
    }
}

#[async_trait]
impl<P: ProjectRepository, S: ScheduleRepository> ProjectService for ProjectServiceImpl<P, S> {
    async fn list_projects(&self) -> Result<Vec<Project>, ProjectError> {
        Ok(self.projects.list_projects().await?)
    }

    async fn get_project(&self, id: &ProjectId) -> Result<Project, ProjectError> {
        self.projects
            .get_project(id)
            .await?
            .ok_or(ProjectError::NotFound(*id))
    }

    #[instrument(name = "create_project", skip(self))]
    async fn create_project(&self, project: NewProject) -> Result<Project, ProjectError> {
        let project = project.normalized()?;
        self.ensure_name_free(&project.name, None).await?;

        // The unique index still catches a concurrent insert of the same name.
        let created = self
            .projects
            .create_project(&project)
            .await
            .map_err(conflict_as_name_taken(&project.name))?;

        tracing::info!(project_id = %created.id, "project created");
        Ok(created)
    }

    #[instrument(name = "update_project", skip(self))]
    async fn update_project(
        &self,
        id: &ProjectId,
        update: ProjectUpdate,
    ) -> Result<Project, ProjectError> {
        let current = self.get_project(id).await?;
        if update.is_empty() {
            return Ok(current);
        }

        let merged = current.merged(&update);
        validate_project(&merged)?;
        if name_key(&merged.name) != name_key(&current.name) {
            self.ensure_name_free(&merged.name, Some(*id)).await?;
        }

        self.projects
            .update_project(&merged)
            .await
            .map_err(conflict_as_name_taken(&merged.name))?
            .ok_or(ProjectError::NotFound(*id))
    }

    #[instrument(name = "delete_project", skip(self))]
    async fn delete_project(&self, id: &ProjectId) -> Result<(), ProjectError> {
        // Existence first, so a missing project leaves schedules untouched.
        self.get_project(id).await?;

        let detached = self.schedules.detach_project(id).await?;
        if !self.projects.delete_project(id).await? {
            return Err(ProjectError::NotFound(*id));
        }

        tracing::info!(project_id = %id, detached, "project deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::{
        adapters::outbound::memory::{InMemoryProjectRepository, InMemoryScheduleRepository},
        domain::models::{NewSchedule, UserId},
    };

    fn service() -> (
        ProjectServiceImpl<InMemoryProjectRepository, InMemoryScheduleRepository>,
        Arc<InMemoryScheduleRepository>,
    ) {
        let schedules = Arc::new(InMemoryScheduleRepository::new());
        let service = ProjectServiceImpl::new(
            Arc::new(InMemoryProjectRepository::new()),
            Arc::clone(&schedules),
        );
        (service, schedules)
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let (service, _) = service();
        let project = service.create_project(NewProject::new("Work")).await.unwrap();

        assert_eq!(project.name, "Work");
        assert_eq!(project.color, "#3B82F6");
        assert_eq!(project.description, None);
    }

    #[tokio::test]
    async fn names_are_unique_ignoring_case() {
        let (service, _) = service();
        service.create_project(NewProject::new("Work")).await.unwrap();

        let err = service
            .create_project(NewProject::new(" WORK "))
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectError::NameTaken(name) if name == "WORK"));
    }

    #[tokio::test]
    async fn rename_to_existing_name_conflicts_but_recasing_self_is_allowed() {
        let (service, _) = service();
        service.create_project(NewProject::new("Work")).await.unwrap();
        let home = service.create_project(NewProject::new("Home")).await.unwrap();

        let err = service
            .update_project(
                &home.id,
                ProjectUpdate {
                    name: Some("work".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectError::NameTaken(_)));

        let renamed = service
            .update_project(
                &home.id,
                ProjectUpdate {
                    name: Some("HOME".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "HOME");
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let (service, _) = service();
        let project = service
            .create_project(
                NewProject::new("Work")
                    .with_description("Office things")
                    .with_color("#112233"),
            )
            .await
            .unwrap();

        let updated = service
            .update_project(
                &project.id,
                ProjectUpdate {
                    color: Some("#445566".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Work");
        assert_eq!(updated.description.as_deref(), Some("Office things"));
        assert_eq!(updated.color, "#445566");
    }

    #[tokio::test]
    async fn invalid_update_is_rejected() {
        let (service, _) = service();
        let project = service.create_project(NewProject::new("Work")).await.unwrap();

        let err = service
            .update_project(
                &project.id,
                ProjectUpdate {
                    color: Some("blue".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_project_is_not_found() {
        let (service, _) = service();
        let missing = ProjectId::new(404);

        assert!(matches!(
            service.get_project(&missing).await,
            Err(ProjectError::NotFound(_))
        ));
        assert!(matches!(
            service.update_project(&missing, ProjectUpdate::default()).await,
            Err(ProjectError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_project(&missing).await,
            Err(ProjectError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_detaches_schedules_instead_of_deleting_them() {
        let (service, schedules) = service();
        let work = service.create_project(NewProject::new("Work")).await.unwrap();
        let home = service.create_project(NewProject::new("Home")).await.unwrap();

        let owner = UserId::new(1);
        for (title, project) in [("a", work.id), ("b", work.id), ("c", home.id)] {
            schedules
                .create_schedule(
                    &NewSchedule::new(owner, title, date!(2024 - 05 - 01))
                        .with_project(Some(project)),
                )
                .await
                .unwrap();
        }

        service.delete_project(&work.id).await.unwrap();

        let remaining = schedules.all();
        assert_eq!(remaining.len(), 3);
        assert!(remaining
            .iter()
            .filter(|s| s.title != "c")
            .all(|s| s.project_id.is_none()));
        assert!(remaining
            .iter()
            .any(|s| s.title == "c" && s.project_id == Some(home.id)));

        let projects = service.list_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, home.id);
    }

    #[tokio::test]
    async fn list_is_ordered_by_name() {
        let (service, _) = service();
        for name in ["beta", "Alpha", "gamma"] {
            service.create_project(NewProject::new(name)).await.unwrap();
        }

        let names: Vec<String> = service
            .list_projects()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "beta", "gamma"]);
    }
}
