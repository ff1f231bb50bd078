//! In-memory implementations of the persistence ports, used by tests.

mod projects;
mod schedules;
mod users;

pub use projects::InMemoryProjectRepository;
pub use schedules::InMemoryScheduleRepository;
pub use users::InMemoryUserRepository;
