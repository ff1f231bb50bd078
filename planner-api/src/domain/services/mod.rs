mod auth;
mod projects;
mod schedules;

pub use auth::AuthServiceImpl;
pub use projects::ProjectServiceImpl;
pub use schedules::ScheduleServiceImpl;
