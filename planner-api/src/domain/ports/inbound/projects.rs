use async_trait::async_trait;

use crate::domain::{
    models::{NewProject, Project, ProjectId, ProjectUpdate},
    ProjectError,
};

/// Inbound port for project management.
#[async_trait]
pub trait ProjectService: Send + Sync + 'static {
    async fn list_projects(&self) -> Result<Vec<Project>, ProjectError>;

    async fn get_project(&self, id: &ProjectId) -> Result<Project, ProjectError>;

    /// Create a project. Names are unique ignoring case.
    async fn create_project(&self, project: NewProject) -> Result<Project, ProjectError>;

    /// Apply a partial update.
    async fn update_project(
        &self,
        id: &ProjectId,
        update: ProjectUpdate,
    ) -> Result<Project, ProjectError>;

    /// Delete a project, detaching (not deleting) its schedules.
    async fn delete_project(&self, id: &ProjectId) -> Result<(), ProjectError>;
}
