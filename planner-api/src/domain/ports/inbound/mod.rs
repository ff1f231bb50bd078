mod auth;
mod projects;
mod schedules;

pub use auth::*;
pub use projects::*;
pub use schedules::*;
