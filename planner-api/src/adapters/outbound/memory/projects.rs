use std::{collections::BTreeMap, sync::RwLock};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::domain::{
    models::{name_key, NewProject, Project, ProjectId},
    ports::outbound::ProjectRepository,
    RepositoryError,
};

#[derive(Default)]
pub struct InMemoryProjectRepository {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    next_id: i32,
    projects: BTreeMap<ProjectId, Project>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl State {
    fn name_taken(&self, name: &str, except: Option<ProjectId>) -> bool {
        let key = name_key(name);
        self.projects
            .values()
            .any(|p| Some(p.id) != except && name_key(&p.name) == key)
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn list_projects(&self) -> Result<Vec<Project>, RepositoryError> {
        let mut projects: Vec<Project> =
            self.state.read().unwrap().projects.values().cloned().collect();
        projects.sort_by(|a, b| name_key(&a.name).cmp(&name_key(&b.name)).then(a.id.cmp(&b.id)));
        Ok(projects)
    }

    async fn get_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        Ok(self.state.read().unwrap().projects.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Project>, RepositoryError> {
        let key = name_key(name);
        Ok(self
            .state
            .read()
            .unwrap()
            .projects
            .values()
            .find(|p| name_key(&p.name) == key)
            .cloned())
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project, RepositoryError> {
        let mut state = self.state.write().unwrap();
        if state.name_taken(&project.name, None) {
            return Err(RepositoryError::Conflict("projects_name_lower_key".into()));
        }

        state.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let created = Project {
            id: ProjectId::new(state.next_id),
            name: project.name.clone(),
            description: project.description.clone(),
            color: project.color.clone(),
            created_at: now,
            updated_at: now,
        };
        state.projects.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_project(&self, project: &Project) -> Result<Option<Project>, RepositoryError> {
        let mut state = self.state.write().unwrap();
        if !state.projects.contains_key(&project.id) {
            return Ok(None);
        }
        if state.name_taken(&project.name, Some(project.id)) {
            return Err(RepositoryError::Conflict("projects_name_lower_key".into()));
        }

        let mut updated = project.clone();
        updated.updated_at = OffsetDateTime::now_utc();
        state.projects.insert(updated.id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<bool, RepositoryError> {
        Ok(self.state.write().unwrap().projects.remove(id).is_some())
    }
}
