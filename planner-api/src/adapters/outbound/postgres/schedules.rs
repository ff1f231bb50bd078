use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;
use time::{Date, OffsetDateTime, Time};

use crate::domain::{
    models::{
        NewSchedule, Priority, ProjectId, Schedule, ScheduleFilter, ScheduleId, ScheduleStatus,
        UserId,
    },
    ports::outbound::ScheduleRepository,
    RepositoryError,
};

const SCHEDULE_COLUMNS: &str = "id, user_id, title, description, date, start_time, end_time, \
     status, priority, project_id, created_at, updated_at";

pub struct PostgresScheduleRepository {
    pool: PgPool,
}

impl PostgresScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ScheduleRow {
    id: i32,
    user_id: i32,
    title: String,
    description: Option<String>,
    date: Date,
    start_time: Option<Time>,
    end_time: Option<Time>,
    status: String,
    priority: String,
    project_id: Option<i32>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<ScheduleRow> for Schedule {
    type Error = RepositoryError;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        let status = ScheduleStatus::from_str(&row.status)
            .map_err(|e| RepositoryError::Database(sqlx::Error::Decode(Box::new(e))))?;
        let priority = Priority::from_str(&row.priority)
            .map_err(|e| RepositoryError::Database(sqlx::Error::Decode(Box::new(e))))?;

        Ok(Schedule {
            id: ScheduleId::new(row.id),
            user_id: UserId::new(row.user_id),
            title: row.title,
            description: row.description,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            status,
            priority,
            project_id: row.project_id.map(ProjectId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl ScheduleRepository for PostgresScheduleRepository {
    async fn list_schedules(
        &self,
        owner: &UserId,
        filter: &ScheduleFilter,
    ) -> Result<Vec<Schedule>, RepositoryError> {
        let query = format!(
            r#"
            SELECT {SCHEDULE_COLUMNS}
            FROM schedules
            WHERE user_id = $1
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date <= $3)
              AND ($4::text IS NULL OR status = $4)
              AND ($5::text IS NULL OR priority = $5)
              AND ($6::int IS NULL OR project_id = $6)
            ORDER BY date, start_time NULLS FIRST, id
            "#
        );

        let rows = sqlx::query_as::<_, ScheduleRow>(&query)
            .bind(owner.as_i32())
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.status.map(|s| s.to_string()))
            .bind(filter.priority.map(|p| p.to_string()))
            .bind(filter.project_id.map(|p| p.as_i32()))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Schedule::try_from).collect()
    }

    async fn get_schedule(
        &self,
        owner: &UserId,
        id: &ScheduleId,
    ) -> Result<Option<Schedule>, RepositoryError> {
        let query = format!(
            r#"
            SELECT {SCHEDULE_COLUMNS}
            FROM schedules
            WHERE id = $1 AND user_id = $2
            "#
        );

        let row = sqlx::query_as::<_, ScheduleRow>(&query)
            .bind(id.as_i32())
            .bind(owner.as_i32())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Schedule::try_from).transpose()
    }

    async fn create_schedule(&self, schedule: &NewSchedule) -> Result<Schedule, RepositoryError> {
        let query = format!(
            r#"
            INSERT INTO schedules
                (user_id, title, description, date, start_time, end_time, status, priority, project_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {SCHEDULE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ScheduleRow>(&query)
            .bind(schedule.user_id.as_i32())
            .bind(&schedule.title)
            .bind(schedule.description.as_deref())
            .bind(schedule.date)
            .bind(schedule.start_time)
            .bind(schedule.end_time)
            .bind(schedule.status.to_string())
            .bind(schedule.priority.to_string())
            .bind(schedule.project_id.map(|p| p.as_i32()))
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;

        row.try_into()
    }

    async fn update_schedule(
        &self,
        schedule: &Schedule,
    ) -> Result<Option<Schedule>, RepositoryError> {
        let query = format!(
            r#"
            UPDATE schedules
            SET title = $3,
                description = $4,
                date = $5,
                start_time = $6,
                end_time = $7,
                status = $8,
                priority = $9,
                project_id = $10,
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING {SCHEDULE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ScheduleRow>(&query)
            .bind(schedule.id.as_i32())
            .bind(schedule.user_id.as_i32())
            .bind(&schedule.title)
            .bind(schedule.description.as_deref())
            .bind(schedule.date)
            .bind(schedule.start_time)
            .bind(schedule.end_time)
            .bind(schedule.status.to_string())
            .bind(schedule.priority.to_string())
            .bind(schedule.project_id.map(|p| p.as_i32()))
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;

        row.map(Schedule::try_from).transpose()
    }

    async fn delete_schedule(
        &self,
        owner: &UserId,
        id: &ScheduleId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM schedules
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id.as_i32())
        .bind(owner.as_i32())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn detach_project(&self, project_id: &ProjectId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE schedules
            SET project_id = NULL,
                updated_at = now()
            WHERE project_id = $1
            "#,
        )
        .bind(project_id.as_i32())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
