use async_trait::async_trait;

use crate::domain::{
    models::{NewProject, Project, ProjectId},
    RepositoryError,
};

/// Outbound port for project persistence.
#[async_trait]
pub trait ProjectRepository: Send + Sync + 'static {
    /// All projects, ordered by name (case-insensitive) then id.
    async fn list_projects(&self) -> Result<Vec<Project>, RepositoryError>;

    async fn get_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError>;

    /// Case-insensitive lookup by name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Project>, RepositoryError>;

    async fn create_project(&self, project: &NewProject) -> Result<Project, RepositoryError>;

    /// Write back a merged project. Returns `None` when it no longer exists.
    async fn update_project(&self, project: &Project) -> Result<Option<Project>, RepositoryError>;

    /// Returns whether a row was deleted.
    async fn delete_project(&self, id: &ProjectId) -> Result<bool, RepositoryError>;
}
