mod projects;
mod schedules;
mod users;

pub use projects::PostgresProjectRepository;
pub use schedules::PostgresScheduleRepository;
pub use users::PostgresUserRepository;
