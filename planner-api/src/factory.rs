//! Composition root: the only place that names concrete outbound adapters.

use std::sync::Arc;

use sqlx::PgPool;
use time::Duration;

use crate::{
    adapters::outbound::{
        crypto::Argon2PasswordHasher,
        postgres::{PostgresProjectRepository, PostgresScheduleRepository, PostgresUserRepository},
    },
    app_state::AppState,
    config::AuthSettings,
    domain::{
        services::{AuthServiceImpl, ProjectServiceImpl, ScheduleServiceImpl},
        AuthError, SessionTokenCodec, TokenKeyError,
    },
    seed::Seeder,
};

#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("invalid auth.token_key: {0}")]
    TokenKey(#[from] TokenKeyError),
    #[error("failed to initialise password hashing: {0}")]
    Hasher(#[from] AuthError),
}

struct Repositories {
    users: Arc<PostgresUserRepository>,
    projects: Arc<PostgresProjectRepository>,
    schedules: Arc<PostgresScheduleRepository>,
}

impl Repositories {
    fn new(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            projects: Arc::new(PostgresProjectRepository::new(pool.clone())),
            schedules: Arc::new(PostgresScheduleRepository::new(pool.clone())),
        }
    }
}

fn auth_service(
    users: Arc<PostgresUserRepository>,
    settings: &AuthSettings,
) -> Result<AuthServiceImpl<PostgresUserRepository, Argon2PasswordHasher>, FactoryError> {
    let tokens = SessionTokenCodec::from_base64_key(
        &settings.token_key,
        Duration::hours(settings.token_ttl_hours),
    )?;
    let hasher = Arc::new(Argon2PasswordHasher::default());

    Ok(AuthServiceImpl::new(users, hasher, tokens)?)
}

/// Build the Postgres-backed services the router runs on.
pub fn build_app_state(pool: &PgPool, settings: &AuthSettings) -> Result<AppState, FactoryError> {
    let repos = Repositories::new(pool);

    let auth = auth_service(Arc::clone(&repos.users), settings)?
        .with_registration(settings.allow_registration);
    let projects = ProjectServiceImpl::new(Arc::clone(&repos.projects), Arc::clone(&repos.schedules));
    let schedules = ScheduleServiceImpl::new(repos.schedules, repos.projects);

    Ok(AppState {
        auth_service: Arc::new(auth),
        project_service: Arc::new(projects),
        schedule_service: Arc::new(schedules),
    })
}

/// Build a seeder. Seeding registers users even when public registration is
/// turned off.
pub fn build_seeder(pool: &PgPool, settings: &AuthSettings) -> Result<Seeder, FactoryError> {
    let repos = Repositories::new(pool);

    let auth = auth_service(repos.users, settings)?;
    let projects = ProjectServiceImpl::new(repos.projects, repos.schedules);

    Ok(Seeder::new(Arc::new(auth), Arc::new(projects)))
}
