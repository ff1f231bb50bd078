use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::domain::{
    models::{NewProject, Project, ProjectId},
    ports::outbound::ProjectRepository,
    RepositoryError,
};

pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: i32,
    name: String,
    description: Option<String>,
    color: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: ProjectId::new(row.id),
            name: row.name,
            description: row.description,
            color: row.color,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn list_projects(&self) -> Result<Vec<Project>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, color, created_at, updated_at
            FROM projects
            ORDER BY lower(name), id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn get_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, color, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Project::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Project>, RepositoryError> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, color, created_at, updated_at
            FROM projects
            WHERE lower(name) = lower($1)
            "#,
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Project::from))
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project, RepositoryError> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            INSERT INTO projects (name, description, color)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, color, created_at, updated_at
            "#,
        )
        .bind(&project.name)
        .bind(project.description.as_deref())
        .bind(&project.color)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        Ok(row.into())
    }

    async fn update_project(&self, project: &Project) -> Result<Option<Project>, RepositoryError> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            UPDATE projects
            SET name = $2,
                description = $3,
                color = $4,
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, description, color, created_at, updated_at
            "#,
        )
        .bind(project.id.as_i32())
        .bind(&project.name)
        .bind(project.description.as_deref())
        .bind(&project.color)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        Ok(row.map(Project::from))
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<bool, RepositoryError> {
        // schedules.project_id is ON DELETE SET NULL
        let result = sqlx::query(
            r#"
            DELETE FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
