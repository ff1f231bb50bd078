use std::sync::Arc;

use crate::{
    config::SeedSettings,
    domain::{
        models::{NewProject, Registration},
        ports::inbound::{AuthService, ProjectService},
        AuthError, ProjectError,
    },
};

/// Outcome of a seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub projects_created: usize,
}

/// Creates the configured users and projects. Safe to run on every startup:
/// entries that already exist are skipped.
pub struct Seeder {
    auth: Arc<dyn AuthService>,
    projects: Arc<dyn ProjectService>,
}

impl Seeder {
    pub fn new(auth: Arc<dyn AuthService>, projects: Arc<dyn ProjectService>) -> Self {
        Self { auth, projects }
    }

    pub async fn run(&self, settings: &SeedSettings) -> anyhow::Result<SeedReport> {
        let mut report = SeedReport::default();

        for user in &settings.users {
            let registration =
                Registration::new(&user.username, &user.password, &user.display_name);
            match self.auth.register(registration).await {
                Ok(_) => report.users_created += 1,
                Err(AuthError::UsernameTaken(username)) => {
                    tracing::debug!("Seed user '{}' already exists", username);
                }
                Err(err) => return Err(err.into()),
            }
        }

        for project in &settings.projects {
            let mut new_project = NewProject::new(&project.name);
            if let Some(description) = &project.description {
                new_project = new_project.with_description(description);
            }
            if let Some(color) = &project.color {
                new_project = new_project.with_color(color);
            }

            match self.projects.create_project(new_project).await {
                Ok(_) => report.projects_created += 1,
                Err(ProjectError::NameTaken(name)) => {
                    tracing::debug!("Seed project '{}' already exists", name);
                }
                Err(err) => return Err(err.into()),
            }
        }

        tracing::info!(
            users = report.users_created,
            projects = report.projects_created,
            "Seeding finished"
        );
        Ok(report)
    }
}
